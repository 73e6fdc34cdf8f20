//! MPE room parameters — §3 "Room parameters", MPE subset.

use crate::track::TrackId;
use crate::user::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpeRoomParameters {
    pub room_id: String,
    pub room_creator_user_id: UserId,
    pub room_name: String,
    pub is_open: bool,
    pub only_invited_users_can_edit: bool,
    pub initial_track_ids: Vec<TrackId>,
}

impl MpeRoomParameters {
    /// MPE carries no constraint-window invariant of its own, so only the
    /// trivial shape check (a room must name itself and its creator) is
    /// enforced here.
    pub fn validate(&self) -> Result<(), String> {
        if self.room_name.trim().is_empty() {
            return Err("room_name must not be empty".to_string());
        }
        Ok(())
    }
}
