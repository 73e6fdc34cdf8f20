//! Side-effect descriptors produced by `MpeRoomState::apply` — see
//! `mtv::effect` for the rationale behind the pure-function/effect split.
//!
//! Unlike MTV's creation acknowledgement, MPE's is fire-and-forget: its
//! result is never awaited, so a failure here cannot make the room fatal.

use crate::mpe::event::MtvRoomCreationOptions;
use crate::mpe::query::MpeExposedState;
use crate::track::TrackId;
use crate::user::UserId;

#[derive(Debug, Clone)]
pub enum MpeEffect {
    FetchInitialTracks(Vec<TrackId>),
    AcknowledgeRoomCreation(MpeExposedState),
    FetchAddedTracks {
        track_ids: Vec<TrackId>,
        user_id: UserId,
        device_id: Option<String>,
    },
    AcknowledgeAddingTracks(MpeExposedState),
    RejectAddingTracks {
        user_id: UserId,
        device_id: Option<String>,
    },
    AcknowledgeChangeTrackOrder(MpeExposedState),
    RejectChangeTrackOrder {
        user_id: UserId,
        device_id: Option<String>,
    },
    AcknowledgeDeleteTracks(MpeExposedState),
    RejectDeleteTracks {
        user_id: UserId,
        device_id: Option<String>,
    },
    JoinAcknowledgement {
        state: MpeExposedState,
        user_id: UserId,
    },
    LeaveAcknowledgement(MpeExposedState),
    SendMtvRoomCreationRequest {
        track_ids: Vec<TrackId>,
        options: MtvRoomCreationOptions,
    },
}
