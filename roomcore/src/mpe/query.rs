//! MPE query projection — §4.7, §6 "Exposed state", MPE subset.

use crate::mpe::user::MpeUserRecord;
use crate::track::TrackMetadata;
use crate::user::UserId;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MpeExposedTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub duration: i64,
}

impl From<&TrackMetadata> for MpeExposedTrack {
    fn from(track: &TrackMetadata) -> Self {
        Self {
            id: track.id.0.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration: track.duration.as_millis() as i64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MpeExposedState {
    pub room_id: String,
    pub room_creator_user_id: String,
    pub room_name: String,
    pub is_open: bool,
    pub only_invited_users_can_edit: bool,
    pub tracks: Vec<MpeExposedTrack>,
    pub users_length: usize,
    pub user_related_information: Option<MpeUserRecord>,
}

impl MpeExposedState {
    pub fn user_related_information_for(
        related_user_id: &UserId,
        user: Option<&MpeUserRecord>,
    ) -> Option<MpeUserRecord> {
        if related_user_id.0 == crate::user::NO_RELATED_USER_ID {
            return None;
        }
        user.cloned()
    }
}
