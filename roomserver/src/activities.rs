//! Logging stand-in for the out-of-scope back-office application
//! (§1 "Out of scope"). It implements the same trait boundary a
//! real Adonis-backed client would, so swapping it out later only means
//! swapping this file: the room engine never changes.

use async_trait::async_trait;
use std::time::Duration;

use roomcore::activity::{MpeActivities, MtvActivities};
use roomcore::mpe::event::MtvRoomCreationOptions;
use roomcore::mpe::query::MpeExposedState;
use roomcore::mtv::query::MtvExposedState;
use roomcore::track::{TrackId, TrackMetadata};
use roomcore::user::UserId;

/// Fallback duration used when the back-office catalogue cannot be
/// reached for real metadata (every track here, since this stand-in
/// never actually looks one up).
const PLACEHOLDER_TRACK_DURATION: Duration = Duration::from_secs(180);

pub struct LoggingActivities {
    adonis_endpoint: String,
}

impl LoggingActivities {
    pub fn new(adonis_endpoint: String) -> Self {
        Self { adonis_endpoint }
    }

    fn placeholder_metadata(&self, ids: &[TrackId]) -> Vec<TrackMetadata> {
        ids.iter()
            .map(|id| TrackMetadata {
                id: id.clone(),
                title: format!("track {id}"),
                artist: "unknown".to_string(),
                duration: PLACEHOLDER_TRACK_DURATION,
            })
            .collect()
    }
}

#[async_trait]
impl MtvActivities for LoggingActivities {
    async fn fetch_tracks_information(&self, track_ids: Vec<TrackId>) -> anyhow::Result<Vec<TrackMetadata>> {
        tracing::info!(endpoint = %self.adonis_endpoint, count = track_ids.len(), "fetching track metadata");
        Ok(self.placeholder_metadata(&track_ids))
    }

    async fn fetch_tracks_information_and_forward_initiator(
        &self,
        track_ids: Vec<TrackId>,
        user_id: UserId,
        device_id: Option<String>,
    ) -> anyhow::Result<Vec<TrackMetadata>> {
        tracing::info!(%user_id, ?device_id, count = track_ids.len(), "fetching suggested track metadata");
        Ok(self.placeholder_metadata(&track_ids))
    }

    async fn acknowledge_room_creation(&self, state: MtvExposedState) -> anyhow::Result<()> {
        tracing::info!(room_id = %state.room_id, "mtv room created");
        Ok(())
    }

    async fn pause(&self, state: MtvExposedState) {
        tracing::info!(room_id = %state.room_id, "pause");
    }

    async fn play(&self, state: MtvExposedState) {
        tracing::info!(room_id = %state.room_id, "play");
    }

    async fn join_acknowledgement(&self, state: MtvExposedState, user_id: UserId) {
        tracing::info!(room_id = %state.room_id, %user_id, "join acknowledged");
    }

    async fn user_length_update(&self, state: MtvExposedState) {
        tracing::info!(room_id = %state.room_id, users = state.users_length, "user length update");
    }

    async fn user_vote_acknowledgement(&self, state: MtvExposedState) {
        tracing::info!(room_id = %state.room_id, "vote acknowledged");
    }

    async fn change_user_emitting_device_acknowledgement(&self, state: MtvExposedState) {
        tracing::info!(room_id = %state.room_id, "emitting device changed");
    }

    async fn notify_suggest_or_vote_update(&self, state: MtvExposedState) {
        tracing::info!(room_id = %state.room_id, "suggest/vote update notification");
    }

    async fn acknowledge_tracks_suggestion(&self, user_id: UserId, device_id: Option<String>) {
        tracing::info!(%user_id, ?device_id, "tracks suggestion acknowledged");
    }
}

#[async_trait]
impl MpeActivities for LoggingActivities {
    async fn fetch_tracks_information(&self, track_ids: Vec<TrackId>) -> anyhow::Result<Vec<TrackMetadata>> {
        tracing::info!(endpoint = %self.adonis_endpoint, count = track_ids.len(), "fetching mpe initial track metadata");
        Ok(self.placeholder_metadata(&track_ids))
    }

    async fn fetch_added_tracks_information(&self, track_ids: Vec<TrackId>) -> anyhow::Result<Vec<TrackMetadata>> {
        tracing::info!(count = track_ids.len(), "fetching added track metadata");
        Ok(self.placeholder_metadata(&track_ids))
    }

    async fn acknowledge_room_creation(&self, state: MpeExposedState) {
        tracing::info!(room_id = %state.room_id, "mpe room created");
    }

    async fn acknowledge_adding_tracks(&self, state: MpeExposedState) {
        tracing::info!(room_id = %state.room_id, tracks = state.tracks.len(), "tracks added");
    }

    async fn reject_adding_tracks(&self, user_id: UserId, device_id: Option<String>) {
        tracing::info!(%user_id, ?device_id, "add tracks rejected");
    }

    async fn acknowledge_change_track_order(&self, state: MpeExposedState) {
        tracing::info!(room_id = %state.room_id, "track order changed");
    }

    async fn reject_change_track_order(&self, user_id: UserId, device_id: Option<String>) {
        tracing::info!(%user_id, ?device_id, "change track order rejected");
    }

    async fn acknowledge_delete_tracks(&self, state: MpeExposedState) {
        tracing::info!(room_id = %state.room_id, tracks = state.tracks.len(), "tracks deleted");
    }

    async fn acknowledge_join(&self, state: MpeExposedState, user_id: UserId) {
        tracing::info!(room_id = %state.room_id, %user_id, "join acknowledged");
    }

    async fn acknowledge_leave(&self, state: MpeExposedState) {
        tracing::info!(room_id = %state.room_id, "leave acknowledged");
    }

    async fn send_mtv_room_creation_request(&self, track_ids: Vec<TrackId>, options: MtvRoomCreationOptions) {
        tracing::info!(
            endpoint = %self.adonis_endpoint,
            room_name = %options.room_name,
            count = track_ids.len(),
            "forwarding mtv room creation request"
        );
    }
}
