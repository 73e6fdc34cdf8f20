//! MTV FSM events — §4.3, re-architected as a tagged-variant enum
//! per the §9 design note ("Callback-heavy FSM").

use crate::mtv::user::MtvUserRecord;
use crate::track::{TrackId, TrackMetadata};
use crate::user::UserId;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerExpiredReason {
    Finished,
    Canceled,
}

/// Snapshot of the timer at the moment it expired, carried by
/// `TimerExpired` so the FSM can compute elapsed time without reading the
/// clock itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpiredTimer {
    pub duration: Duration,
    pub created_on: SystemTime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MtvEvent {
    InitialTracksFetched(Vec<TrackMetadata>),
    Play,
    Pause,
    /// `now` is the side-effect-recorded clock reading at timer
    /// resolution, used to compute partial-play elapsed time on a
    /// cancellation (path 3 of §4.3's `waiting-timer-end`).
    TimerExpired {
        reason: TimerExpiredReason,
        timer: ExpiredTimer,
        now: SystemTime,
    },
    AddUser(MtvUserRecord),
    RemoveUser(UserId),
    VoteForTrack {
        user_id: UserId,
        track_id: TrackId,
    },
    ChangeUserEmittingDevice {
        user_id: UserId,
        device_id: String,
    },
    GoToNextTrack,
    SuggestTracks {
        user_id: UserId,
        device_id: Option<String>,
        track_ids: Vec<TrackId>,
    },
    SuggestedTracksFetched {
        user_id: UserId,
        device_id: Option<String>,
        tracks: Vec<TrackMetadata>,
    },
    VoteDebounceTick,
    UpdateUserFitsPositionConstraint {
        user_id: UserId,
        fits: Option<bool>,
    },
    UpdateControlAndDelegationPermission {
        user_id: UserId,
        has_permission: bool,
    },
}
