//! MTV future coordinator — §4.6.
//!
//! A room multiplexes a signal channel, the playback timer, the
//! initial-tracks fetch, the vote-debounce timer, and any outstanding
//! suggested-tracks fetches. Each of those is a spawned task that reports
//! back on one internal channel, and the coordinating loop is a single
//! `tokio::select!` between that channel and the external signal channel —
//! one arm fires per iteration, and state mutates only on the task driving
//! this loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::activity::MtvActivities;
use crate::clock::Clock;
use crate::mtv::effect::MtvEffect;
use crate::mtv::event::{ExpiredTimer, MtvEvent, TimerExpiredReason};
use crate::mtv::signal::{self, MtvInboundSignal};
use crate::mtv::state::MtvRoomState;
use crate::signal::{RoomMessage, RoomReceiver};
use crate::track::TrackMetadata;
use crate::user::UserId;

const VOTE_DEBOUNCE_INTERVAL: Duration = Duration::from_millis(2000);

enum RunnerMsg {
    InitialTracksFetched(Vec<TrackMetadata>),
    SuggestedTracksFetched {
        user_id: UserId,
        device_id: Option<String>,
        tracks: Vec<TrackMetadata>,
    },
    TimerExpired {
        reason: TimerExpiredReason,
        timer: ExpiredTimer,
        generation: u64,
    },
    VoteDebounceTick,
}

/// Runs one MTV room to completion. Returns when the room is terminated,
/// hits a fatal error, or its signal channel is dropped.
pub async fn run<A: MtvActivities + 'static, C: Clock + 'static>(
    mut state: MtvRoomState,
    initial_effects: Vec<MtvEffect>,
    activities: Arc<A>,
    clock: Arc<C>,
    mut external_rx: RoomReceiver,
) {
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<RunnerMsg>();
    let mut playback_cancel: Option<oneshot::Sender<()>> = None;
    // Bumped every time a playback timer is armed, so a `TimerExpired` from a
    // timer that has since been superseded (go-to-next-track, a fresh
    // `Play`) is recognised as stale and dropped instead of being applied
    // against the wrong current track.
    let mut playback_generation: u64 = 0;

    if !dispatch(
        initial_effects,
        &activities,
        &internal_tx,
        &mut playback_cancel,
        &mut playback_generation,
    )
    .await
    {
        return;
    }

    loop {
        let event = tokio::select! {
            signal = external_rx.recv() => {
                match signal {
                    Some(RoomMessage::Signal { route, payload }) => match signal::decode(&route, payload) {
                        MtvInboundSignal::Event(event) => event,
                        MtvInboundSignal::Terminate => {
                            tracing::info!("room terminated");
                            return;
                        }
                        MtvInboundSignal::Unsupported | MtvInboundSignal::Dropped => continue,
                    },
                    Some(RoomMessage::Query { user_id, reply }) => {
                        let exported = state.export(&user_id, clock.now());
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
                    Some(RunnerMsg::InitialTracksFetched(tracks)) => MtvEvent::InitialTracksFetched(tracks),
                    Some(RunnerMsg::TimerExpired { reason, timer, generation }) => {
                        if generation != playback_generation {
                            continue;
                        }
                        playback_cancel = None;
                        MtvEvent::TimerExpired { reason, timer, now: clock.now() }
                    }
                    Some(RunnerMsg::VoteDebounceTick) => MtvEvent::VoteDebounceTick,
                    Some(RunnerMsg::SuggestedTracksFetched { user_id, device_id, tracks }) => {
                        MtvEvent::SuggestedTracksFetched { user_id, device_id, tracks }
                    }
                    None => unreachable!("internal_tx is never dropped while the loop runs"),
                }
            }
        };

        let now = clock.now();
        let effects = state.apply(event, now);
        if !dispatch(
            effects,
            &activities,
            &internal_tx,
            &mut playback_cancel,
            &mut playback_generation,
        )
        .await
        {
            return;
        }
    }
}

/// Interprets one batch of effects in dispatch order. Returns `false` if
/// the room hit a fatal error and must stop.
async fn dispatch<A: MtvActivities + 'static>(
    effects: Vec<MtvEffect>,
    activities: &Arc<A>,
    internal_tx: &mpsc::UnboundedSender<RunnerMsg>,
    playback_cancel: &mut Option<oneshot::Sender<()>>,
    playback_generation: &mut u64,
) -> bool {
    for effect in effects {
        match effect {
            MtvEffect::FetchInitialTracks(track_ids) => {
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

            MtvEffect::AcknowledgeRoomCreation(exported) => {
                if let Err(err) = activities.acknowledge_room_creation(exported).await {
                    tracing::error!(error = %err, "room creation acknowledgement failed, room is fatal");
                    return false;
                }
            }

            MtvEffect::Pause(exported) => activities.pause(exported).await,
            MtvEffect::Play(exported) => activities.play(exported).await,

            MtvEffect::JoinAcknowledgement { state: exported, user_id } => {
                activities.join_acknowledgement(exported, user_id).await;
            }

            MtvEffect::UserLengthUpdate(exported) => activities.user_length_update(exported).await,
            MtvEffect::UserVoteAcknowledgement(exported) => {
                activities.user_vote_acknowledgement(exported).await;
            }
            MtvEffect::ChangeUserEmittingDeviceAcknowledgement(exported) => {
                activities
                    .change_user_emitting_device_acknowledgement(exported)
                    .await;
            }

            MtvEffect::FetchSuggestedTracks {
                track_ids,
                user_id,
                device_id,
            } => {
                let activities = activities.clone();
                let tx = internal_tx.clone();
                tokio::spawn(async move {
                    match activities
                        .fetch_tracks_information_and_forward_initiator(
                            track_ids,
                            user_id.clone(),
                            device_id.clone(),
                        )
                        .await
                    {
                        Ok(tracks) => {
                            let _ = tx.send(RunnerMsg::SuggestedTracksFetched {
                                user_id,
                                device_id,
                                tracks,
                            });
                        }
                        Err(err) => tracing::error!(error = %err, "fetch suggested tracks failed"),
                    }
                });
            }

            MtvEffect::NotifySuggestOrVoteUpdate(exported) => {
                activities.notify_suggest_or_vote_update(exported).await;
            }
            MtvEffect::AcknowledgeTracksSuggestion { user_id, device_id } => {
                activities.acknowledge_tracks_suggestion(user_id, device_id).await;
            }

            MtvEffect::ArmPlaybackTimer { duration, created_on } => {
                *playback_generation += 1;
                let generation = *playback_generation;
                let (cancel_tx, cancel_rx) = oneshot::channel();
                *playback_cancel = Some(cancel_tx);
                let tx = internal_tx.clone();
                tokio::spawn(async move {
                    let reason = tokio::select! {
                        _ = tokio::time::sleep(duration) => TimerExpiredReason::Finished,
                        _ = cancel_rx => TimerExpiredReason::Canceled,
                    };
                    let _ = tx.send(RunnerMsg::TimerExpired {
                        reason,
                        timer: ExpiredTimer { duration, created_on },
                        generation,
                    });
                });
            }

            MtvEffect::CancelPlaybackTimer => {
                if let Some(cancel) = playback_cancel.take() {
                    let _ = cancel.send(());
                }
            }

            MtvEffect::ArmVoteDebounceTimer => {
                let tx = internal_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(VOTE_DEBOUNCE_INTERVAL).await;
                    let _ = tx.send(RunnerMsg::VoteDebounceTick);
                });
            }

            MtvEffect::ClearVoteDebounceTimer => {
                // Nothing to cancel: the armed flag in `MtvRoomState` is
                // what stops the next tick from rearming.
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::mtv::params::{MtvRoomParameters, PlayingMode};
    use crate::mtv::query::MtvExposedState;
    use crate::mtv::user::MtvUserRecord;
    use async_trait::async_trait;
    use std::collections::HashMap;

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
    impl MtvActivities for FakeActivities {
        async fn fetch_tracks_information(
            &self,
            track_ids: Vec<crate::track::TrackId>,
        ) -> anyhow::Result<Vec<TrackMetadata>> {
            Ok(track_ids
                .iter()
                .filter_map(|id| self.tracks.get(id).cloned())
                .collect())
        }

        async fn fetch_tracks_information_and_forward_initiator(
            &self,
            track_ids: Vec<crate::track::TrackId>,
            _user_id: UserId,
            _device_id: Option<String>,
        ) -> anyhow::Result<Vec<TrackMetadata>> {
            self.fetch_tracks_information(track_ids).await
        }

        async fn acknowledge_room_creation(&self, _state: MtvExposedState) -> anyhow::Result<()> {
            Ok(())
        }

        async fn pause(&self, _state: MtvExposedState) {}
        async fn play(&self, _state: MtvExposedState) {}
        async fn join_acknowledgement(&self, _state: MtvExposedState, _user_id: UserId) {}
        async fn user_length_update(&self, _state: MtvExposedState) {}
        async fn user_vote_acknowledgement(&self, _state: MtvExposedState) {}
        async fn change_user_emitting_device_acknowledgement(&self, _state: MtvExposedState) {}
        async fn notify_suggest_or_vote_update(&self, _state: MtvExposedState) {}
        async fn acknowledge_tracks_suggestion(&self, _user_id: UserId, _device_id: Option<String>) {}
    }

    fn track(id: &str, millis: u64) -> TrackMetadata {
        TrackMetadata {
            id: crate::track::TrackId::from(id),
            title: id.to_string(),
            artist: "artist".to_string(),
            duration: Duration::from_millis(millis),
        }
    }

    fn params(initial: &[&str]) -> MtvRoomParameters {
        MtvRoomParameters {
            room_id: "room-1".to_string(),
            room_creator_user_id: UserId::from("creator"),
            room_name: "test room".to_string(),
            playing_mode: PlayingMode::Direct,
            is_open: true,
            is_open_only_invited_users_can_vote: false,
            minimum_score_to_be_played: 0,
            has_physical_and_time_constraints: false,
            physical_and_time_constraints: None,
            initial_track_ids: initial.iter().map(|id| crate::track::TrackId::from(*id)).collect(),
        }
    }

    fn spawn_room(
        initial: &[&str],
        durations_millis: u64,
    ) -> crate::signal::RoomSender {
        let tracks: Vec<_> = initial.iter().map(|id| track(id, durations_millis)).collect();
        let creator = MtvUserRecord::new(UserId::from("creator"), None);
        let (state, effects) = MtvRoomState::new(params(initial), creator);
        let activities = Arc::new(FakeActivities::new(tracks));
        let clock = Arc::new(SystemClock);
        let (tx, rx): (crate::signal::RoomSender, RoomReceiver) = mpsc::unbounded_channel();
        tokio::spawn(run(state, effects, activities, clock, rx));
        tx
    }

    fn signal(tx: &crate::signal::RoomSender, route: &str) {
        tx.send(RoomMessage::Signal {
            route: route.to_string(),
            payload: serde_json::Value::Null,
        })
        .unwrap();
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
    async fn go_to_next_track_does_not_let_the_superseded_timer_pause_the_room() {
        let tx = spawn_room(&["a", "b"], 300);
        tokio::time::sleep(Duration::from_millis(20)).await;

        signal(&tx, "play");
        tokio::time::sleep(Duration::from_millis(20)).await;

        signal(&tx, "go-to-next-track");
        // Give the superseded timer's cancellation round-trip time to land
        // on the internal channel well before the 300ms new timer would
        // fire, so a flaky pass can't hide a stale expiry slipping through.
        tokio::time::sleep(Duration::from_millis(60)).await;

        let exported = query(&tx).await;
        assert_eq!(exported["current_track"]["id"], "b");
        assert_eq!(exported["playing"], true);
        let elapsed = exported["current_track"]["elapsed"].as_i64().unwrap();
        assert!(elapsed < 100, "elapsed should only reflect the new track, got {elapsed}");
    }

    #[tokio::test]
    async fn playback_timer_runs_to_completion_and_advances_the_room() {
        let tx = spawn_room(&["a", "b"], 30);
        tokio::time::sleep(Duration::from_millis(20)).await;

        signal(&tx, "play");
        // The first track's 30ms timer should fire on its own and hand the
        // room to the next track with no further signal involved.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let exported = query(&tx).await;
        assert_eq!(exported["current_track"]["id"], "b");
        assert_eq!(exported["playing"], true);
    }
}
