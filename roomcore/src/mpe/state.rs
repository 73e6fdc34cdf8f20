//! MPE state machine — §4.4.

use crate::mpe::effect::MpeEffect;
use crate::mpe::event::{MpeEvent, ReorderOperation};
use crate::mpe::params::MpeRoomParameters;
use crate::mpe::query::{MpeExposedState, MpeExposedTrack};
use crate::mpe::user::MpeUserRecord;
use crate::track::{TrackId, TrackSet};
use crate::user::{UserId, UserRegistry, NO_RELATED_USER_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpeLocation {
    FetchingInitialTracks,
    Ready,
}

pub struct MpeRoomState {
    pub params: MpeRoomParameters,
    pub location: MpeLocation,
    pub users: UserRegistry<MpeUserRecord>,
    pub tracks: TrackSet,
    /// Set when an unrecognised signal route is received: MPE's router,
    /// unlike MTV's, treats that as fatal (§4.5, §7).
    pub fatal_error: bool,
}

impl MpeRoomState {
    pub fn new(params: MpeRoomParameters, creator: MpeUserRecord) -> (Self, Vec<MpeEffect>) {
        let mut users = UserRegistry::new();
        users.add(creator);

        let initial_track_ids = params.initial_track_ids.clone();
        let state = Self {
            params,
            location: MpeLocation::FetchingInitialTracks,
            users,
            tracks: TrackSet::new(),
            fatal_error: false,
        };

        (state, vec![MpeEffect::FetchInitialTracks(initial_track_ids)])
    }

    fn no_related_user() -> UserId {
        UserId(NO_RELATED_USER_ID.to_string())
    }

    pub fn export(&self, related_user_id: &UserId) -> MpeExposedState {
        let tracks = self.tracks.values().iter().map(MpeExposedTrack::from).collect();
        let user_related_information = MpeExposedState::user_related_information_for(
            related_user_id,
            self.users.get(related_user_id),
        );

        MpeExposedState {
            room_id: self.params.room_id.clone(),
            room_creator_user_id: self.params.room_creator_user_id.0.clone(),
            room_name: self.params.room_name.clone(),
            is_open: self.params.is_open,
            only_invited_users_can_edit: self.params.only_invited_users_can_edit,
            tracks,
            users_length: self.users.len(),
            user_related_information,
        }
    }

    /// §4.4: "room open and either not only-invited-can-edit or
    /// user invited".
    fn can_edit(&self, user_id: &UserId) -> bool {
        if !self.params.is_open {
            return false;
        }
        if !self.params.only_invited_users_can_edit {
            return true;
        }
        self.users
            .get(user_id)
            .is_some_and(|user| user.user_has_been_invited)
    }

    /// "currently creator-only" per §4.4.
    fn can_export(&self, user_id: &UserId) -> bool {
        user_id == &self.params.room_creator_user_id
    }

    pub fn apply(&mut self, event: MpeEvent) -> Vec<MpeEffect> {
        let mut effects = Vec::new();

        match event {
            MpeEvent::InitialTracksFetched(tracks) => {
                if self.location != MpeLocation::FetchingInitialTracks {
                    return effects;
                }
                for metadata in tracks {
                    self.tracks.add(metadata);
                }
                self.location = MpeLocation::Ready;
                effects.push(MpeEffect::AcknowledgeRoomCreation(
                    self.export(&self.params.room_creator_user_id.clone()),
                ));
            }

            MpeEvent::AddTracks {
                user_id,
                device_id,
                track_ids,
            } => {
                if self.location != MpeLocation::Ready || !self.can_edit(&user_id) {
                    effects.push(MpeEffect::RejectAddingTracks { user_id, device_id });
                    return effects;
                }

                let remaining: Vec<TrackId> = track_ids
                    .into_iter()
                    .filter(|id| !self.tracks.has(id))
                    .collect();

                if remaining.is_empty() {
                    effects.push(MpeEffect::RejectAddingTracks { user_id, device_id });
                } else {
                    effects.push(MpeEffect::FetchAddedTracks {
                        track_ids: remaining,
                        user_id,
                        device_id,
                    });
                }
            }

            MpeEvent::AddedTracksInformationFetched {
                user_id,
                device_id,
                tracks,
            } => {
                let accepted: Vec<_> = tracks
                    .into_iter()
                    .filter(|track| !self.tracks.has(&track.id))
                    .collect();

                if accepted.is_empty() {
                    effects.push(MpeEffect::RejectAddingTracks { user_id, device_id });
                } else {
                    for track in accepted {
                        self.tracks.add(track);
                    }
                    effects.push(MpeEffect::AcknowledgeAddingTracks(
                        self.export(&Self::no_related_user()),
                    ));
                }
            }

            MpeEvent::ChangeTrackOrder {
                user_id,
                device_id,
                track_id,
                from_index,
                operation,
            } => {
                if self.location != MpeLocation::Ready || !self.can_edit(&user_id) {
                    effects.push(MpeEffect::RejectChangeTrackOrder { user_id, device_id });
                    return effects;
                }

                let current_index = self.tracks.index_of(&track_id);
                let target_index = match operation {
                    ReorderOperation::Up => from_index.checked_sub(1),
                    ReorderOperation::Down => from_index.checked_add(1),
                };

                let valid = current_index == Some(from_index)
                    && target_index.is_some_and(|i| i < self.tracks.len());

                if !valid {
                    effects.push(MpeEffect::RejectChangeTrackOrder { user_id, device_id });
                    return effects;
                }

                self.tracks.swap(from_index, target_index.unwrap());
                effects.push(MpeEffect::AcknowledgeChangeTrackOrder(
                    self.export(&Self::no_related_user()),
                ));
            }

            MpeEvent::DeleteTracks {
                user_id,
                device_id,
                track_ids,
            } => {
                if self.location != MpeLocation::Ready || !self.can_edit(&user_id) {
                    effects.push(MpeEffect::RejectDeleteTracks { user_id, device_id });
                    return effects;
                }
                for id in &track_ids {
                    self.tracks.delete(id);
                }
                effects.push(MpeEffect::AcknowledgeDeleteTracks(
                    self.export(&Self::no_related_user()),
                ));
            }

            MpeEvent::AddUser(user) => {
                let user_id = user.user_id.clone();
                if self.users.add(user) {
                    effects.push(MpeEffect::JoinAcknowledgement {
                        state: self.export(&user_id),
                        user_id,
                    });
                }
            }

            MpeEvent::RemoveUser(user_id) => {
                if self.users.remove(&user_id) {
                    effects.push(MpeEffect::LeaveAcknowledgement(
                        self.export(&Self::no_related_user()),
                    ));
                }
            }

            MpeEvent::ExportToMtvRoom {
                user_id,
                device_id,
                options,
            } => {
                if !self.can_export(&user_id) {
                    tracing::warn!(%user_id, "user is not allowed to export this room to MTV");
                    let _ = device_id;
                    return effects;
                }
                let track_ids = self.tracks.values().iter().map(|t| t.id.clone()).collect();
                effects.push(MpeEffect::SendMtvRoomCreationRequest { track_ids, options });
            }
        }

        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackMetadata;
    use std::time::Duration;

    fn track(id: &str) -> TrackMetadata {
        TrackMetadata {
            id: TrackId::from(id),
            title: id.to_string(),
            artist: "artist".to_string(),
            duration: Duration::from_secs(180),
        }
    }

    fn new_room(only_invited_users_can_edit: bool) -> MpeRoomState {
        let params = MpeRoomParameters {
            room_id: "mpe-room".to_string(),
            room_creator_user_id: UserId::from("creator"),
            room_name: "playlist".to_string(),
            is_open: true,
            only_invited_users_can_edit,
            initial_track_ids: vec![TrackId::from("a"), TrackId::from("b")],
        };
        let creator = MpeUserRecord::new(UserId::from("creator"), true);
        let (mut state, _) = MpeRoomState::new(params, creator);
        state.apply(MpeEvent::InitialTracksFetched(vec![track("a"), track("b")]));
        state
    }

    // S5: MPE reorder guard.
    #[test]
    fn uninvited_user_cannot_reorder_tracks() {
        let mut state = new_room(true);
        state.users.add(MpeUserRecord::new(UserId::from("guest"), false));

        let effects = state.apply(MpeEvent::ChangeTrackOrder {
            user_id: UserId::from("guest"),
            device_id: None,
            track_id: TrackId::from("b"),
            from_index: 1,
            operation: ReorderOperation::Up,
        });

        assert!(matches!(effects.as_slice(), [MpeEffect::RejectChangeTrackOrder { .. }]));
        let ids: Vec<_> = state.tracks.values().iter().map(|t| t.id.0.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn invited_user_can_reorder_tracks() {
        let mut state = new_room(true);
        state.users.add(MpeUserRecord::new(UserId::from("member"), true));

        let effects = state.apply(MpeEvent::ChangeTrackOrder {
            user_id: UserId::from("member"),
            device_id: None,
            track_id: TrackId::from("b"),
            from_index: 1,
            operation: ReorderOperation::Up,
        });

        assert!(matches!(
            effects.as_slice(),
            [MpeEffect::AcknowledgeChangeTrackOrder(_)]
        ));
        let ids: Vec<_> = state.tracks.values().iter().map(|t| t.id.0.clone()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn duplicate_add_tracks_are_rejected() {
        let mut state = new_room(false);
        let effects = state.apply(MpeEvent::AddTracks {
            user_id: UserId::from("creator"),
            device_id: None,
            track_ids: vec![TrackId::from("a")],
        });
        assert!(matches!(effects.as_slice(), [MpeEffect::RejectAddingTracks { .. }]));
    }
}
