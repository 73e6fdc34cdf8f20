//! Outbound activity interfaces — §4.8.
//!
//! Every call here is at-least-once, with a one-minute schedule-to-start
//! and start-to-close timeout enforced by the caller (`roomserver`'s
//! concrete implementation), not by these traits themselves: the traits
//! only describe the shape of the call, grounded the way
//! `pmoplaylist::handle::write` separates the "what" of a mutation from
//! the "how" of persisting it.

use async_trait::async_trait;

use crate::mtv::query::MtvExposedState;
use crate::track::{TrackId, TrackMetadata};
use crate::user::UserId;

/// Outbound calls the MTV runner dispatches. Everything here is
/// fire-and-forget from the room's perspective except
/// [`MtvActivities::acknowledge_room_creation`], which is awaited and
/// whose failure is fatal (§4.3, §7).
#[async_trait]
pub trait MtvActivities: Send + Sync {
    async fn fetch_tracks_information(&self, track_ids: Vec<TrackId>) -> anyhow::Result<Vec<TrackMetadata>>;

    async fn fetch_tracks_information_and_forward_initiator(
        &self,
        track_ids: Vec<TrackId>,
        user_id: UserId,
        device_id: Option<String>,
    ) -> anyhow::Result<Vec<TrackMetadata>>;

    async fn acknowledge_room_creation(&self, state: MtvExposedState) -> anyhow::Result<()>;

    async fn pause(&self, state: MtvExposedState);
    async fn play(&self, state: MtvExposedState);
    async fn join_acknowledgement(&self, state: MtvExposedState, user_id: UserId);
    async fn user_length_update(&self, state: MtvExposedState);
    async fn user_vote_acknowledgement(&self, state: MtvExposedState);
    async fn change_user_emitting_device_acknowledgement(&self, state: MtvExposedState);
    async fn notify_suggest_or_vote_update(&self, state: MtvExposedState);
    async fn acknowledge_tracks_suggestion(&self, user_id: UserId, device_id: Option<String>);
}

/// Outbound calls the MPE runner dispatches. The creation acknowledgement
/// here is fire-and-forget, unlike MTV's: nothing awaits its result.
#[async_trait]
pub trait MpeActivities: Send + Sync {
    async fn fetch_tracks_information(&self, track_ids: Vec<TrackId>) -> anyhow::Result<Vec<TrackMetadata>>;

    async fn fetch_added_tracks_information(
        &self,
        track_ids: Vec<TrackId>,
    ) -> anyhow::Result<Vec<TrackMetadata>>;

    async fn acknowledge_room_creation(&self, state: crate::mpe::query::MpeExposedState);

    async fn acknowledge_adding_tracks(&self, state: crate::mpe::query::MpeExposedState);
    async fn reject_adding_tracks(&self, user_id: UserId, device_id: Option<String>);
    async fn acknowledge_change_track_order(&self, state: crate::mpe::query::MpeExposedState);
    async fn reject_change_track_order(&self, user_id: UserId, device_id: Option<String>);
    async fn acknowledge_delete_tracks(&self, state: crate::mpe::query::MpeExposedState);
    async fn acknowledge_join(&self, state: crate::mpe::query::MpeExposedState, user_id: UserId);
    async fn acknowledge_leave(&self, state: crate::mpe::query::MpeExposedState);
    async fn send_mtv_room_creation_request(
        &self,
        track_ids: Vec<TrackId>,
        options: crate::mpe::event::MtvRoomCreationOptions,
    );
}
