//! MPE future coordinator — §4.6, MPE subset (no playback timer
//! or vote debouncer, so the only background tasks are track-metadata
//! fetches).

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::activity::MpeActivities;
use crate::mpe::effect::MpeEffect;
use crate::mpe::event::MpeEvent;
use crate::mpe::signal::{self, MpeInboundSignal};
use crate::mpe::state::MpeRoomState;
use crate::signal::{RoomMessage, RoomReceiver};
use crate::track::TrackMetadata;
use crate::user::UserId;

enum RunnerMsg {
    InitialTracksFetched(Vec<TrackMetadata>),
    AddedTracksFetched {
        user_id: UserId,
        device_id: Option<String>,
        tracks: Vec<TrackMetadata>,
    },
}

pub async fn run<A: MpeActivities + 'static>(
    mut state: MpeRoomState,
    initial_effects: Vec<MpeEffect>,
    activities: Arc<A>,
    mut external_rx: RoomReceiver,
) {
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<RunnerMsg>();

    dispatch(initial_effects, &activities, &internal_tx).await;

    loop {
        let event = tokio::select! {
            signal = external_rx.recv() => {
                match signal {
                    Some(RoomMessage::Signal { route, payload }) => match signal::decode(&route, payload) {
                        MpeInboundSignal::Event(event) => event,
                        MpeInboundSignal::Terminate => {
                            tracing::info!("room terminated");
                            return;
                        }
                        MpeInboundSignal::Dropped => continue,
                        MpeInboundSignal::Fatal(route) => {
                            tracing::error!(route = %route, "unknown MPE signal route, room is fatal");
                            state.fatal_error = true;
                            return;
                        }
                    },
                    Some(RoomMessage::Query { user_id, reply }) => {
                        let exported = state.export(&user_id);
                        let _ = reply.send(serde_json::to_value(exported).unwrap_or(serde_json::Value::Null));
                        continue;
                    }
                    None => {
                        tracing::info!("signal channel closed, shutting room down");
                        return;
                    }
                }
            }
            msg = internal_rx.recv() => {
                match msg {
                    Some(RunnerMsg::InitialTracksFetched(tracks)) => MpeEvent::InitialTracksFetched(tracks),
                    Some(RunnerMsg::AddedTracksFetched { user_id, device_id, tracks }) => {
                        MpeEvent::AddedTracksInformationFetched { user_id, device_id, tracks }
                    }
                    None => unreachable!("internal_tx is never dropped while the loop runs"),
                }
            }
        };

        let effects = state.apply(event);
        dispatch(effects, &activities, &internal_tx).await;
    }
}

async fn dispatch<A: MpeActivities + 'static>(
    effects: Vec<MpeEffect>,
    activities: &Arc<A>,
    internal_tx: &mpsc::UnboundedSender<RunnerMsg>,
) {
    for effect in effects {
        match effect {
            MpeEffect::FetchInitialTracks(track_ids) => {
                let activities = activities.clone();
                let tx = internal_tx.clone();
                tokio::spawn(async move {
                    match activities.fetch_tracks_information(track_ids).await {
                        Ok(tracks) => {
                            let _ = tx.send(RunnerMsg::InitialTracksFetched(tracks));
                        }
                        Err(err) => tracing::error!(error = %err, "fetch initial tracks failed"),
                    }
                });
            }

            // Fire-and-forget, unlike MTV's: nothing awaits this call's result.
            MpeEffect::AcknowledgeRoomCreation(exported) => {
                activities.acknowledge_room_creation(exported).await;
            }

            MpeEffect::FetchAddedTracks {
                track_ids,
                user_id,
                device_id,
            } => {
                let activities = activities.clone();
                let tx = internal_tx.clone();
                tokio::spawn(async move {
                    match activities.fetch_added_tracks_information(track_ids).await {
                        Ok(tracks) => {
                            let _ = tx.send(RunnerMsg::AddedTracksFetched {
                                user_id,
                                device_id,
                                tracks,
                            });
                        }
                        Err(err) => tracing::error!(error = %err, "fetch added tracks failed"),
                    }
                });
            }

            MpeEffect::AcknowledgeAddingTracks(exported) => {
                activities.acknowledge_adding_tracks(exported).await;
            }
            MpeEffect::RejectAddingTracks { user_id, device_id } => {
                activities.reject_adding_tracks(user_id, device_id).await;
            }
            MpeEffect::AcknowledgeChangeTrackOrder(exported) => {
                activities.acknowledge_change_track_order(exported).await;
            }
            MpeEffect::RejectChangeTrackOrder { user_id, device_id } => {
                activities.reject_change_track_order(user_id, device_id).await;
            }
            MpeEffect::AcknowledgeDeleteTracks(exported) => {
                activities.acknowledge_delete_tracks(exported).await;
            }
            MpeEffect::RejectDeleteTracks { user_id, device_id } => {
                // No distinct reject-delete activity is named in the
                // routing table; reuse the add-tracks rejection shape
                // since both just inform the initiator their edit did
                // not apply.
                activities.reject_adding_tracks(user_id, device_id).await;
            }
            MpeEffect::JoinAcknowledgement { state: exported, user_id } => {
                activities.acknowledge_join(exported, user_id).await;
            }
            MpeEffect::LeaveAcknowledgement(exported) => {
                activities.acknowledge_leave(exported).await;
            }
            MpeEffect::SendMtvRoomCreationRequest { track_ids, options } => {
                activities.send_mtv_room_creation_request(track_ids, options).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpe::event::MtvRoomCreationOptions;
    use crate::mpe::params::MpeRoomParameters;
    use crate::mpe::query::MpeExposedState;
    use crate::mpe::user::MpeUserRecord;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::oneshot;

    struct FakeActivities {
        tracks: HashMap<crate::track::TrackId, TrackMetadata>,
    }

    impl FakeActivities {
        fn new(tracks: Vec<TrackMetadata>) -> Self {
            Self {
                tracks: tracks.into_iter().map(|t| (t.id.clone(), t)).collect(),
            }
        }
    }

    #[async_trait]
    impl MpeActivities for FakeActivities {
        async fn fetch_tracks_information(
            &self,
            track_ids: Vec<crate::track::TrackId>,
        ) -> anyhow::Result<Vec<TrackMetadata>> {
            Ok(track_ids
                .iter()
                .filter_map(|id| self.tracks.get(id).cloned())
                .collect())
        }

        async fn fetch_added_tracks_information(
            &self,
            track_ids: Vec<crate::track::TrackId>,
        ) -> anyhow::Result<Vec<TrackMetadata>> {
            self.fetch_tracks_information(track_ids).await
        }

        async fn acknowledge_room_creation(&self, _state: MpeExposedState) {}
        async fn acknowledge_adding_tracks(&self, _state: MpeExposedState) {}
        async fn reject_adding_tracks(&self, _user_id: UserId, _device_id: Option<String>) {}
        async fn acknowledge_change_track_order(&self, _state: MpeExposedState) {}
        async fn reject_change_track_order(&self, _user_id: UserId, _device_id: Option<String>) {}
        async fn acknowledge_delete_tracks(&self, _state: MpeExposedState) {}
        async fn acknowledge_join(&self, _state: MpeExposedState, _user_id: UserId) {}
        async fn acknowledge_leave(&self, _state: MpeExposedState) {}
        async fn send_mtv_room_creation_request(
            &self,
            _track_ids: Vec<crate::track::TrackId>,
            _options: MtvRoomCreationOptions,
        ) {
        }
    }

    fn track(id: &str) -> TrackMetadata {
        TrackMetadata {
            id: crate::track::TrackId::from(id),
            title: id.to_string(),
            artist: "artist".to_string(),
            duration: Duration::from_secs(180),
        }
    }

    fn spawn_room(initial: &[&str]) -> crate::signal::RoomSender {
        let tracks: Vec<_> = initial.iter().map(|id| track(id)).collect();
        let params = MpeRoomParameters {
            room_id: "mpe-room".to_string(),
            room_creator_user_id: UserId::from("creator"),
            room_name: "playlist".to_string(),
            is_open: true,
            only_invited_users_can_edit: false,
            initial_track_ids: initial.iter().map(|id| crate::track::TrackId::from(*id)).collect(),
        };
        let creator = MpeUserRecord::new(UserId::from("creator"), true);
        let (state, effects) = MpeRoomState::new(params, creator);
        let activities = Arc::new(FakeActivities::new(tracks));
        let (tx, rx): (crate::signal::RoomSender, RoomReceiver) = mpsc::unbounded_channel();
        tokio::spawn(run(state, effects, activities, rx));
        tx
    }

    async fn query(tx: &crate::signal::RoomSender) -> serde_json::Value {
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(RoomMessage::Query {
            user_id: UserId::from(crate::user::NO_RELATED_USER_ID),
            reply: reply_tx,
        })
        .unwrap();
        reply_rx.await.unwrap()
    }

    #[tokio::test]
    async fn adding_a_new_track_flows_through_the_dispatch_loop_and_is_queryable() {
        let tx = spawn_room(&["a"]);
        tokio::time::sleep(Duration::from_millis(20)).await;

        tx.send(RoomMessage::Signal {
            route: "ADD_TRACKS".to_string(),
            payload: serde_json::json!({
                "userId": "creator",
                "deviceId": null,
                "tracksIds": ["b"],
            }),
        })
        .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let exported = query(&tx).await;
        let ids: Vec<_> = exported["tracks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn an_unrecognised_route_makes_the_room_fatal_and_it_stops_replying() {
        let tx = spawn_room(&["a"]);
        tokio::time::sleep(Duration::from_millis(20)).await;

        tx.send(RoomMessage::Signal {
            route: "NOT_A_REAL_ROUTE".to_string(),
            payload: serde_json::Value::Null,
        })
        .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let (reply_tx, reply_rx) = oneshot::channel();
        let sent = tx.send(RoomMessage::Query {
            user_id: UserId::from(crate::user::NO_RELATED_USER_ID),
            reply: reply_tx,
        });
        // The runner task has already returned, so either the send itself
        // fails once the receiver drops, or the reply never arrives.
        if sent.is_ok() {
            assert!(reply_rx.await.is_err());
        }
    }
}
