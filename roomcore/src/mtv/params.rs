//! MTV room parameters — §3 "Room parameters (immutable after
//! creation)".

use crate::track::TrackId;
use crate::user::UserId;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayingMode {
    Direct,
    Broadcast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalAndTimeConstraints {
    pub physical_constraint_place_id: String,
    pub physical_constraint_radius_meters: f64,
    pub starts_at: SystemTime,
    pub ends_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MtvRoomParameters {
    pub room_id: String,
    pub room_creator_user_id: UserId,
    pub room_name: String,
    pub playing_mode: PlayingMode,
    pub is_open: bool,
    pub is_open_only_invited_users_can_vote: bool,
    pub minimum_score_to_be_played: u32,
    pub has_physical_and_time_constraints: bool,
    pub physical_and_time_constraints: Option<PhysicalAndTimeConstraints>,
    pub initial_track_ids: Vec<TrackId>,
}

impl MtvRoomParameters {
    /// Physical/time constraints require a well-formed window, and
    /// vote-restriction implies the room is open.
    pub fn validate(&self, now: SystemTime) -> Result<(), String> {
        if self.is_open_only_invited_users_can_vote && !self.is_open {
            return Err(
                "is_open_only_invited_users_can_vote requires is_open".to_string(),
            );
        }

        if self.has_physical_and_time_constraints {
            let constraints = self
                .physical_and_time_constraints
                .as_ref()
                .ok_or_else(|| {
                    "has_physical_and_time_constraints is set but no constraints object was provided".to_string()
                })?;

            if constraints.starts_at >= constraints.ends_at {
                return Err("starts_at must be strictly before ends_at".to_string());
            }

            if constraints.ends_at <= now {
                return Err("ends_at must be in the future".to_string());
            }
        }

        Ok(())
    }
}
