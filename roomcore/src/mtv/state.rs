//! MTV state machine — §4.3.

use std::time::{Duration, SystemTime};

use crate::mtv::effect::MtvEffect;
use crate::mtv::event::{ExpiredTimer, MtvEvent, TimerExpiredReason};
use crate::mtv::params::MtvRoomParameters;
use crate::mtv::query::{ExposedCurrentTrack, ExposedTrack, MtvExposedState};
use crate::mtv::user::MtvUserRecord;
use crate::track::{ScoredTrack, ScoredTrackSet, TrackId, TrackMetadata};
use crate::user::{UserId, UserRegistry, NO_RELATED_USER_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MtvLocation {
    FetchingInitialTracks,
    Paused,
    PlayingLaunchingTimer,
    PlayingWaitingTimerEnd,
    PlayingTimeoutExpired,
}

/// A scored track currently playing, plus how much of it has already
/// played across pause cycles (§3 "Current track").
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentTrack {
    pub track: ScoredTrack,
    pub already_elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackTimerMeta {
    pub duration: Duration,
    pub created_on: SystemTime,
}

pub struct MtvRoomState {
    pub params: MtvRoomParameters,
    pub location: MtvLocation,
    pub users: UserRegistry<MtvUserRecord>,
    pub tracks: ScoredTrackSet,
    pub current_track: Option<CurrentTrack>,
    pub playing: bool,
    pub timer: Option<PlaybackTimerMeta>,
    vote_debounce_snapshot: ScoredTrackSet,
    vote_debounce_armed: bool,
}

impl MtvRoomState {
    /// Starts a new room in `fetching-initial-tracks` and returns the
    /// entry effect for that state (§4.3: "On entry: dispatch
    /// FetchTracksInformation").
    pub fn new(params: MtvRoomParameters, creator: MtvUserRecord) -> (Self, Vec<MtvEffect>) {
        let mut users = UserRegistry::new();
        users.add(creator);

        let initial_track_ids = params.initial_track_ids.clone();
        let state = Self {
            params,
            location: MtvLocation::FetchingInitialTracks,
            users,
            tracks: ScoredTrackSet::new(),
            current_track: None,
            playing: false,
            timer: None,
            vote_debounce_snapshot: ScoredTrackSet::new(),
            vote_debounce_armed: false,
        };

        (state, vec![MtvEffect::FetchInitialTracks(initial_track_ids)])
    }

    /// Read-only projection for the query handler (§4.7). Takes
    /// the wall-clock reading directly: queries never replay, so they are
    /// allowed to bypass the side-effect envelope.
    pub fn export(&self, related_user_id: &UserId, now: SystemTime) -> MtvExposedState {
        let current_track = self.current_track.as_ref().map(|current| {
            let mut elapsed = current.already_elapsed;
            if self.playing {
                if let Some(timer) = self.timer {
                    if let Ok(delta) = now.duration_since(timer.created_on) {
                        elapsed += delta;
                    }
                }
            }

            ExposedCurrentTrack {
                track: ExposedTrack::from(&current.track),
                elapsed: elapsed.as_millis() as i64,
            }
        });

        let tracks = self.tracks.values().iter().map(ExposedTrack::from).collect();

        let user_related_information = MtvExposedState::user_related_information_for(
            related_user_id,
            self.users.get(related_user_id),
        );

        MtvExposedState {
            room_id: self.params.room_id.clone(),
            room_creator_user_id: self.params.room_creator_user_id.0.clone(),
            room_name: self.params.room_name.clone(),
            playing: self.playing,
            current_track,
            tracks,
            users_length: self.users.len(),
            user_related_information,
        }
    }

    fn no_related_user() -> UserId {
        UserId(NO_RELATED_USER_ID.to_string())
    }

    /// True iff either the current track still meets the score threshold,
    /// or the queue head does (§4.3 `canPlayCurrentTrack`).
    fn can_play_current_track(&self) -> bool {
        if let Some(current) = &self.current_track {
            if current.track.is_ready(self.params.minimum_score_to_be_played) {
                return true;
            }
        }
        self.tracks
            .get_by_index(0)
            .is_some_and(|head| head.is_ready(self.params.minimum_score_to_be_played))
    }

    fn has_next_track_to_play(&self) -> bool {
        self.tracks
            .get_by_index(0)
            .is_some_and(|head| head.is_ready(self.params.minimum_score_to_be_played))
    }

    /// Shifts the queue head into `current_track`, resetting elapsed time.
    fn assign_next_track(&mut self) {
        if let Some(next) = self.tracks.shift() {
            self.current_track = Some(CurrentTrack {
                track: next,
                already_elapsed: Duration::ZERO,
            });
        }
    }

    /// Entry action for `launching-timer`: capture `createdOn`, compute the
    /// remaining duration, arm the timer, export with `playing = true` and
    /// dispatch `PlayActivity`.
    fn enter_launching_timer(&mut self, now: SystemTime, effects: &mut Vec<MtvEffect>) {
        self.location = MtvLocation::PlayingLaunchingTimer;

        let Some(current) = &self.current_track else {
            // Nothing to play; stay parked until a track becomes ready.
            self.location = MtvLocation::Paused;
            self.playing = false;
            let exported = self.export(&Self::no_related_user(), now);
            effects.push(MtvEffect::Pause(exported));
            return;
        };

        let duration = current
            .track
            .metadata
            .duration
            .saturating_sub(current.already_elapsed);

        self.timer = Some(PlaybackTimerMeta {
            duration,
            created_on: now,
        });
        self.playing = true;

        effects.push(MtvEffect::ArmPlaybackTimer {
            duration,
            created_on: now,
        });

        let exported = self.export(&Self::no_related_user(), now);
        effects.push(MtvEffect::Play(exported));

        // brainy.Send(MtvRoomTimerLaunchedEvent) — an immediate, guardless
        // transition with no actions of its own.
        self.location = MtvLocation::PlayingWaitingTimerEnd;
    }

    /// Exit action for the compound `playing` state.
    fn exit_playing(&mut self) {
        self.playing = false;
    }

    /// Entry action for `timeout-expired`: immediately raises `GO_TO_PAUSED`.
    fn enter_timeout_expired(&mut self, now: SystemTime, effects: &mut Vec<MtvEffect>) {
        self.location = MtvLocation::PlayingTimeoutExpired;
        self.exit_playing();
        self.location = MtvLocation::Paused;
        self.timer = None;
        let exported = self.export(&Self::no_related_user(), now);
        effects.push(MtvEffect::Pause(exported));
    }

    /// Applies one event to the machine and returns the side effects it
    /// produced, in dispatch order.
    pub fn apply(&mut self, event: MtvEvent, now: SystemTime) -> Vec<MtvEffect> {
        let mut effects = Vec::new();

        match event {
            MtvEvent::InitialTracksFetched(tracks) => {
                if self.location != MtvLocation::FetchingInitialTracks {
                    return effects;
                }
                for metadata in tracks {
                    self.tracks.add(ScoredTrack::new(metadata, 0));
                }
                self.location = MtvLocation::Paused;
                let exported = self.export(&self.params.room_creator_user_id.clone(), now);
                effects.push(MtvEffect::AcknowledgeRoomCreation(exported));
            }

            MtvEvent::Play => {
                if self.location != MtvLocation::Paused {
                    return effects;
                }
                if !self.can_play_current_track() {
                    return effects;
                }
                if self.current_track.is_none() {
                    self.assign_next_track();
                }
                self.enter_launching_timer(now, &mut effects);
            }

            MtvEvent::Pause => {
                if self.location == MtvLocation::PlayingWaitingTimerEnd {
                    effects.push(MtvEffect::CancelPlaybackTimer);
                }
            }

            MtvEvent::TimerExpired { reason, timer, now } => {
                if self.location != MtvLocation::PlayingWaitingTimerEnd {
                    return effects;
                }

                let queue_empty = self.tracks.is_empty();

                if reason == TimerExpiredReason::Finished && queue_empty {
                    if let Some(current) = &mut self.current_track {
                        current.already_elapsed += timer.duration;
                    }
                    self.enter_timeout_expired(now, &mut effects);
                } else if reason == TimerExpiredReason::Finished {
                    self.assign_next_track();
                    self.enter_launching_timer(now, &mut effects);
                } else {
                    if let Some(current) = &mut self.current_track {
                        if let Ok(partial) = now.duration_since(timer.created_on) {
                            current.already_elapsed += partial;
                        }
                    }
                    self.enter_timeout_expired(now, &mut effects);
                }
            }

            MtvEvent::AddUser(user) => {
                let user_id = user.user_id.clone();
                self.users.add(user);
                let exported = self.export(&user_id, now);
                effects.push(MtvEffect::JoinAcknowledgement {
                    state: exported,
                    user_id,
                });
                effects.push(MtvEffect::UserLengthUpdate(
                    self.export(&Self::no_related_user(), now),
                ));
            }

            MtvEvent::RemoveUser(user_id) => {
                if self.users.remove(&user_id) {
                    effects.push(MtvEffect::UserLengthUpdate(
                        self.export(&Self::no_related_user(), now),
                    ));
                }
            }

            MtvEvent::VoteForTrack { user_id, track_id } => {
                if !self.can_vote_for_track(&user_id, &track_id) {
                    return effects;
                }
                if self.record_vote(&user_id, &track_id) {
                    effects.push(MtvEffect::UserVoteAcknowledgement(
                        self.export(&user_id, now),
                    ));
                    if !self.vote_debounce_armed {
                        self.vote_debounce_armed = true;
                        effects.push(MtvEffect::ArmVoteDebounceTimer);
                    }
                }
            }

            MtvEvent::ChangeUserEmittingDevice { user_id, device_id } => {
                if let Some(user) = self.users.get_mut(&user_id) {
                    user.emitting_device_id = Some(device_id);
                }
                effects.push(MtvEffect::ChangeUserEmittingDeviceAcknowledgement(
                    self.export(&user_id, now),
                ));
            }

            MtvEvent::GoToNextTrack => {
                if !self.has_next_track_to_play() {
                    return effects;
                }
                if self.location == MtvLocation::PlayingWaitingTimerEnd {
                    effects.push(MtvEffect::CancelPlaybackTimer);
                }
                self.exit_playing();
                self.timer = None;
                self.assign_next_track();
                self.enter_launching_timer(now, &mut effects);
            }

            MtvEvent::SuggestTracks {
                user_id,
                device_id,
                track_ids,
            } => {
                let mut accepted = Vec::with_capacity(track_ids.len());
                for track_id in track_ids {
                    let is_current = self
                        .current_track
                        .as_ref()
                        .is_some_and(|c| c.track.id() == &track_id);
                    if is_current {
                        continue;
                    }

                    if self.tracks.has(&track_id) {
                        if self.record_vote(&user_id, &track_id) && !self.vote_debounce_armed {
                            self.vote_debounce_armed = true;
                            effects.push(MtvEffect::ArmVoteDebounceTimer);
                        }
                        continue;
                    }

                    accepted.push(track_id);
                }

                if !accepted.is_empty() {
                    effects.push(MtvEffect::FetchSuggestedTracks {
                        track_ids: accepted,
                        user_id,
                        device_id,
                    });
                }
            }

            MtvEvent::SuggestedTracksFetched {
                user_id,
                device_id,
                tracks,
            } => {
                for metadata in tracks {
                    let id = metadata.id.clone();
                    self.tracks.add(ScoredTrack::new(metadata, 0));
                    self.record_vote(&user_id, &id);
                }
                effects.push(MtvEffect::NotifySuggestOrVoteUpdate(
                    self.export(&Self::no_related_user(), now),
                ));
                effects.push(MtvEffect::AcknowledgeTracksSuggestion { user_id, device_id });
            }

            MtvEvent::VoteDebounceTick => {
                if !self.tracks.deep_equal(&self.vote_debounce_snapshot) {
                    effects.push(MtvEffect::NotifySuggestOrVoteUpdate(
                        self.export(&Self::no_related_user(), now),
                    ));
                    self.vote_debounce_snapshot = self.tracks.clone();
                    effects.push(MtvEffect::ArmVoteDebounceTimer);
                } else {
                    self.vote_debounce_armed = false;
                    effects.push(MtvEffect::ClearVoteDebounceTimer);
                }
            }

            MtvEvent::UpdateUserFitsPositionConstraint { user_id, fits } => {
                if let Some(user) = self.users.get_mut(&user_id) {
                    user.user_fits_position_constraint = fits;
                }
            }

            MtvEvent::UpdateControlAndDelegationPermission {
                user_id,
                has_permission,
            } => {
                if let Some(user) = self.users.get_mut(&user_id) {
                    user.has_control_and_delegation_permission = has_permission;
                }
            }
        }

        effects
    }

    /// Guard for `VOTE_FOR_TRACK` — §4.3 "Vote-for-track".
    fn can_vote_for_track(&self, user_id: &UserId, track_id: &TrackId) -> bool {
        let Some(user) = self.users.get(user_id) else {
            return false;
        };
        if user.has_voted_for(track_id) {
            return false;
        }
        if self.params.has_physical_and_time_constraints {
            if user.user_fits_position_constraint != Some(true) {
                return false;
            }
        }
        if self.params.is_open_only_invited_users_can_vote && !user.user_has_been_invited {
            return false;
        }
        self.tracks.has(track_id)
    }

    /// Shared vote-recording primitive reused by both `VOTE_FOR_TRACK` and
    /// the duplicate-suggestion auto-vote path (§4.2, §4.3
    /// "Suggest tracks") — it does not re-run the full vote guard, since
    /// the duplicate-suggestion branch calls it directly once a duplicate
    /// is already confirmed.
    fn record_vote(&mut self, user_id: &UserId, track_id: &TrackId) -> bool {
        let Some(user) = self.users.get_mut(user_id) else {
            return false;
        };
        if user.has_voted_for(track_id) {
            return false;
        }
        user.tracks_voted_for.insert(track_id.clone());
        self.tracks.increment_and_resort(track_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, VirtualClock};
    use crate::mtv::params::PlayingMode;

    fn track(id: &str, millis: u64) -> TrackMetadata {
        TrackMetadata {
            id: TrackId::from(id),
            title: id.to_string(),
            artist: "artist".to_string(),
            duration: Duration::from_millis(millis),
        }
    }

    fn params(minimum_score_to_be_played: u32, initial: &[&str]) -> MtvRoomParameters {
        MtvRoomParameters {
            room_id: "room-1".to_string(),
            room_creator_user_id: UserId::from("creator"),
            room_name: "test room".to_string(),
            playing_mode: PlayingMode::Direct,
            is_open: true,
            is_open_only_invited_users_can_vote: false,
            minimum_score_to_be_played,
            has_physical_and_time_constraints: false,
            physical_and_time_constraints: None,
            initial_track_ids: initial.iter().map(|id| TrackId::from(*id)).collect(),
        }
    }

    fn new_room(minimum_score_to_be_played: u32, initial: &[&str]) -> (MtvRoomState, VirtualClock) {
        let clock = VirtualClock::default();
        let creator = MtvUserRecord::new(UserId::from("creator"), None);
        let (mut state, _) = MtvRoomState::new(params(minimum_score_to_be_played, initial), creator);
        let tracks = initial.iter().map(|id| track(id, 5000)).collect();
        state.apply(MtvEvent::InitialTracksFetched(tracks), clock.now());
        (state, clock)
    }

    // S1: create then play.
    #[test]
    fn create_then_play_requires_a_ready_track() {
        let (mut state, clock) = new_room(1, &["a", "b", "c"]);
        assert_eq!(state.location, MtvLocation::Paused);
        assert!(state.current_track.is_none());

        let effects = state.apply(MtvEvent::Play, clock.now());
        assert!(effects.is_empty());
        assert_eq!(state.location, MtvLocation::Paused);

        state.apply(
            MtvEvent::VoteForTrack {
                user_id: UserId::from("creator"),
                track_id: TrackId::from("a"),
            },
            clock.now(),
        );
        assert_eq!(state.tracks.get_by_index(0).unwrap().score, 1);

        let effects = state.apply(MtvEvent::Play, clock.now());
        assert_eq!(state.location, MtvLocation::PlayingWaitingTimerEnd);
        assert!(state.playing);
        assert_eq!(state.current_track.as_ref().unwrap().track.id(), &TrackId::from("a"));
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, MtvEffect::ArmPlaybackTimer { .. })));
    }

    // S2: track completion chain.
    #[test]
    fn timer_finishing_advances_to_the_next_ready_track() {
        let (mut state, clock) = new_room(1, &["a", "b"]);
        state.apply(
            MtvEvent::VoteForTrack {
                user_id: UserId::from("creator"),
                track_id: TrackId::from("a"),
            },
            clock.now(),
        );
        state.apply(
            MtvEvent::VoteForTrack {
                user_id: UserId::from("creator"),
                track_id: TrackId::from("b"),
            },
            clock.now(),
        );
        state.apply(MtvEvent::Play, clock.now());
        let timer = state.timer.unwrap();

        clock.advance(Duration::from_millis(5000));
        state.apply(
            MtvEvent::TimerExpired {
                reason: TimerExpiredReason::Finished,
                timer: ExpiredTimer {
                    duration: timer.duration,
                    created_on: timer.created_on,
                },
                now: clock.now(),
            },
            clock.now(),
        );

        assert_eq!(state.current_track.as_ref().unwrap().track.id(), &TrackId::from("b"));
        assert_eq!(state.location, MtvLocation::PlayingWaitingTimerEnd);
    }

    // S3: pause preserves elapsed.
    #[test]
    fn pause_preserves_already_elapsed_time() {
        let (mut state, clock) = new_room(1, &["a"]);
        state.apply(
            MtvEvent::VoteForTrack {
                user_id: UserId::from("creator"),
                track_id: TrackId::from("a"),
            },
            clock.now(),
        );
        state.apply(MtvEvent::Play, clock.now());
        let timer = state.timer.unwrap();

        clock.advance(Duration::from_millis(2000));
        let cancel_now = clock.now();
        state.apply(MtvEvent::Pause, cancel_now);
        state.apply(
            MtvEvent::TimerExpired {
                reason: TimerExpiredReason::Canceled,
                timer: ExpiredTimer {
                    duration: timer.duration,
                    created_on: timer.created_on,
                },
                now: cancel_now,
            },
            cancel_now,
        );

        assert_eq!(state.location, MtvLocation::Paused);
        assert_eq!(
            state.current_track.as_ref().unwrap().already_elapsed,
            Duration::from_millis(2000)
        );

        let effects = state.apply(MtvEvent::Play, clock.now());
        let armed = effects.iter().find_map(|effect| match effect {
            MtvEffect::ArmPlaybackTimer { duration, .. } => Some(*duration),
            _ => None,
        });
        assert_eq!(armed, Some(Duration::from_millis(3000)));
    }

    // S4: duplicate suggest becomes a vote.
    #[test]
    fn duplicate_suggestion_is_recorded_as_a_vote() {
        let (mut state, clock) = new_room(1, &["x"]);
        let effects = state.apply(
            MtvEvent::SuggestTracks {
                user_id: UserId::from("creator"),
                device_id: None,
                track_ids: vec![TrackId::from("x"), TrackId::from("y")],
            },
            clock.now(),
        );

        assert_eq!(state.tracks.get_by_index(0).unwrap().score, 1);
        let fetched = effects.iter().find_map(|effect| match effect {
            MtvEffect::FetchSuggestedTracks { track_ids, .. } => Some(track_ids.clone()),
            _ => None,
        });
        assert_eq!(fetched, Some(vec![TrackId::from("y")]));

        state.apply(
            MtvEvent::SuggestedTracksFetched {
                user_id: UserId::from("creator"),
                device_id: None,
                tracks: vec![track("y", 5000)],
            },
            clock.now(),
        );
        let y_score = state
            .tracks
            .values()
            .iter()
            .find(|t| t.id() == &TrackId::from("y"))
            .unwrap()
            .score;
        assert_eq!(y_score, 1);
    }

    // S6: vote debounce coalesces rapid score changes.
    #[test]
    fn vote_debounce_arms_once_and_clears_when_unchanged() {
        let (mut state, clock) = new_room(0, &["a", "b", "c"]);
        let effects = state.apply(
            MtvEvent::VoteForTrack {
                user_id: UserId::from("creator"),
                track_id: TrackId::from("a"),
            },
            clock.now(),
        );
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, MtvEffect::ArmVoteDebounceTimer)));

        let effects = state.apply(
            MtvEvent::VoteForTrack {
                user_id: UserId::from("creator"),
                track_id: TrackId::from("b"),
            },
            clock.now(),
        );
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, MtvEffect::ArmVoteDebounceTimer)));

        let effects = state.apply(MtvEvent::VoteDebounceTick, clock.now());
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, MtvEffect::NotifySuggestOrVoteUpdate(_))));
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, MtvEffect::ArmVoteDebounceTimer)));

        let effects = state.apply(MtvEvent::VoteDebounceTick, clock.now());
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, MtvEffect::ClearVoteDebounceTimer)));
    }
}
