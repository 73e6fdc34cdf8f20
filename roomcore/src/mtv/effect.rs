//! Side-effect descriptors produced by `MtvRoomState::apply`.
//!
//! `apply` never performs I/O: it returns a list of these, which
//! `mtv::runner` interprets by calling the `MtvActivities` trait and
//! arming/cancelling the timers it owns. This is the split the §9 design
//! note asks for ("Actions are pure functions from (state, event) to a
//! list of side-effect descriptors").

use crate::mtv::query::MtvExposedState;
use crate::track::TrackId;
use crate::user::UserId;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MtvEffect {
    FetchInitialTracks(Vec<TrackId>),
    /// Awaited by the runner; failure is fatal (§4.3, §7).
    AcknowledgeRoomCreation(MtvExposedState),
    Pause(MtvExposedState),
    Play(MtvExposedState),
    JoinAcknowledgement {
        state: MtvExposedState,
        user_id: UserId,
    },
    UserLengthUpdate(MtvExposedState),
    UserVoteAcknowledgement(MtvExposedState),
    ChangeUserEmittingDeviceAcknowledgement(MtvExposedState),
    FetchSuggestedTracks {
        track_ids: Vec<TrackId>,
        user_id: UserId,
        device_id: Option<String>,
    },
    NotifySuggestOrVoteUpdate(MtvExposedState),
    AcknowledgeTracksSuggestion {
        user_id: UserId,
        device_id: Option<String>,
    },
    ArmPlaybackTimer {
        duration: Duration,
        created_on: SystemTime,
    },
    CancelPlaybackTimer,
    ArmVoteDebounceTimer,
    ClearVoteDebounceTimer,
}
