//! MTV per-user record — §3 "User record".

use crate::user::{Identified, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::track::TrackId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MtvUserRecord {
    pub user_id: UserId,
    pub emitting_device_id: Option<String>,
    pub tracks_voted_for: HashSet<TrackId>,
    pub user_fits_position_constraint: Option<bool>,
    pub has_control_and_delegation_permission: bool,
    pub user_has_been_invited: bool,
}

impl MtvUserRecord {
    pub fn new(user_id: UserId, emitting_device_id: Option<String>) -> Self {
        Self {
            user_id,
            emitting_device_id,
            tracks_voted_for: HashSet::new(),
            user_fits_position_constraint: None,
            has_control_and_delegation_permission: false,
            user_has_been_invited: false,
        }
    }

    pub fn has_voted_for(&self, track_id: &TrackId) -> bool {
        self.tracks_voted_for.contains(track_id)
    }
}

impl Identified for MtvUserRecord {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
