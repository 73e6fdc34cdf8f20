//! MPE FSM events — §4.4.

use crate::mpe::user::MpeUserRecord;
use crate::track::{TrackId, TrackMetadata};
use crate::user::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReorderOperation {
    Up,
    Down,
}

/// Options the gateway forwards from an `EXPORT_TO_MTV_ROOM` signal into
/// the MTV room it asks the server to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MtvRoomCreationOptions {
    pub room_name: String,
    pub is_open: bool,
    pub is_open_only_invited_users_can_vote: bool,
    pub minimum_score_to_be_played: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MpeEvent {
    InitialTracksFetched(Vec<TrackMetadata>),
    AddTracks {
        user_id: UserId,
        device_id: Option<String>,
        track_ids: Vec<TrackId>,
    },
    AddedTracksInformationFetched {
        user_id: UserId,
        device_id: Option<String>,
        tracks: Vec<TrackMetadata>,
    },
    ChangeTrackOrder {
        user_id: UserId,
        device_id: Option<String>,
        track_id: TrackId,
        from_index: usize,
        operation: ReorderOperation,
    },
    DeleteTracks {
        user_id: UserId,
        device_id: Option<String>,
        track_ids: Vec<TrackId>,
    },
    AddUser(MpeUserRecord),
    RemoveUser(UserId),
    ExportToMtvRoom {
        user_id: UserId,
        device_id: Option<String>,
        options: MtvRoomCreationOptions,
    },
}
