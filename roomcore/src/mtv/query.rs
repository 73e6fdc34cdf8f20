//! MTV query projection — §4.7 / §6 "Exposed state".
//!
//! Durations are exported in milliseconds at the boundary, nanosecond
//! precision is kept internally (§3).

use crate::mtv::user::MtvUserRecord;
use crate::track::ScoredTrack;
use crate::user::UserId;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ExposedTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub duration: i64,
    pub score: u32,
}

impl From<&ScoredTrack> for ExposedTrack {
    fn from(track: &ScoredTrack) -> Self {
        Self {
            id: track.metadata.id.0.clone(),
            title: track.metadata.title.clone(),
            artist: track.metadata.artist.clone(),
            duration: track.metadata.duration.as_millis() as i64,
            score: track.score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExposedCurrentTrack {
    #[serde(flatten)]
    pub track: ExposedTrack,
    pub elapsed: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MtvExposedState {
    pub room_id: String,
    pub room_creator_user_id: String,
    pub room_name: String,
    pub playing: bool,
    pub current_track: Option<ExposedCurrentTrack>,
    pub tracks: Vec<ExposedTrack>,
    pub users_length: usize,
    pub user_related_information: Option<MtvUserRecord>,
}

impl MtvExposedState {
    pub fn user_related_information_for(
        related_user_id: &UserId,
        user: Option<&MtvUserRecord>,
    ) -> Option<MtvUserRecord> {
        if related_user_id.0 == crate::user::NO_RELATED_USER_ID {
            return None;
        }
        user.cloned()
    }
}
