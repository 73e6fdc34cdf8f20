//! Ordered, scored track set — §4.1.
//!
//! The container keeps its tracks sorted by descending score at all times,
//! with ties broken by stable insertion order. `add` appends to the back
//! before the first sort, and every later `sort_by` is stable, so ties
//! never reorder relative to when the tracks were first added — no
//! separate insertion-sequence field is needed.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque track identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl From<String> for TrackId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrack {
    pub metadata: TrackMetadata,
    pub score: u32,
}

impl ScoredTrack {
    pub fn new(metadata: TrackMetadata, score: u32) -> Self {
        Self { metadata, score }
    }

    pub fn id(&self) -> &TrackId {
        &self.metadata.id
    }

    /// True iff the score meets the room's minimum-score-to-be-played
    /// threshold.
    pub fn is_ready(&self, minimum_score_to_be_played: u32) -> bool {
        self.score >= minimum_score_to_be_played
    }
}

/// Unique-by-id, descending-score-ordered set of tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredTrackSet {
    tracks: Vec<ScoredTrack>,
}

impl ScoredTrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn has(&self, id: &TrackId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id() == id)
    }

    pub fn get_by_index(&self, index: usize) -> Option<&ScoredTrack> {
        self.tracks.get(index)
    }

    pub fn values(&self) -> &[ScoredTrack] {
        &self.tracks
    }

    /// Adds a track at score 0 position honoring sort order. No-op on a
    /// duplicate id; returns whether the track was actually added.
    pub fn add(&mut self, track: ScoredTrack) -> bool {
        if self.has(track.id()) {
            return false;
        }
        self.tracks.push(track);
        self.resort();
        true
    }

    /// Removes a track by id. Returns whether it was present.
    pub fn delete(&mut self, id: &TrackId) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id() != id);
        self.tracks.len() != before
    }

    /// Bumps the score of `id` by one and re-sorts. Returns whether the
    /// track was present.
    pub fn increment_and_resort(&mut self, id: &TrackId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.tracks[index].score += 1;
        self.resort();
        true
    }

    /// Removes and returns the head (highest-scored track), since the set
    /// is kept sorted.
    pub fn shift(&mut self) -> Option<ScoredTrack> {
        if self.tracks.is_empty() {
            None
        } else {
            Some(self.tracks.remove(0))
        }
    }

    /// Swaps two tracks by index (used by MPE's manual reorder operation,
    /// which does not go through the score-based sort at all).
    pub fn swap(&mut self, a: usize, b: usize) {
        self.tracks.swap(a, b);
    }

    pub fn deep_equal(&self, other: &ScoredTrackSet) -> bool {
        self == other
    }

    fn resort(&mut self) {
        self.tracks.sort_by(|a, b| b.score.cmp(&a.score));
    }
}

/// Unscored, insertion-ordered track set backing MPE playlists: unique by
/// id, manually reordered by the `CHANGE_TRACK_ORDER` operation rather than
/// by score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSet {
    tracks: Vec<TrackMetadata>,
}

impl TrackSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn has(&self, id: &TrackId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    pub fn values(&self) -> &[TrackMetadata] {
        &self.tracks
    }

    /// Appends a track. No-op on a duplicate id; returns whether it was
    /// added.
    pub fn add(&mut self, track: TrackMetadata) -> bool {
        if self.has(&track.id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Removes a track by id. Missing ids are silently ignored (returns
    /// false).
    pub fn delete(&mut self, id: &TrackId) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| &t.id != id);
        self.tracks.len() != before
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.tracks.swap(a, b);
    }

    pub fn total_duration(&self) -> Duration {
        self.tracks.iter().map(|t| t.duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(id: &str) -> TrackMetadata {
        TrackMetadata {
            id: TrackId::from(id),
            title: id.to_string(),
            artist: "artist".to_string(),
            duration: Duration::from_secs(3),
        }
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut set = ScoredTrackSet::new();
        set.add(ScoredTrack::new(metadata("a"), 0));
        set.add(ScoredTrack::new(metadata("b"), 0));
        set.add(ScoredTrack::new(metadata("c"), 0));

        let ids: Vec<_> = set.values().iter().map(|t| t.id().0.clone()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn increment_and_resort_moves_the_leader_to_the_front() {
        let mut set = ScoredTrackSet::new();
        set.add(ScoredTrack::new(metadata("a"), 0));
        set.add(ScoredTrack::new(metadata("b"), 0));

        assert!(set.increment_and_resort(&TrackId::from("b")));
        let ids: Vec<_> = set.values().iter().map(|t| t.id().0.clone()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        assert!(!set.increment_and_resort(&TrackId::from("missing")));
    }

    #[test]
    fn add_is_a_no_op_on_a_duplicate_id() {
        let mut set = ScoredTrackSet::new();
        assert!(set.add(ScoredTrack::new(metadata("a"), 0)));
        assert!(!set.add(ScoredTrack::new(metadata("a"), 5)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_by_index(0).unwrap().score, 0);
    }

    #[test]
    fn shift_pops_the_highest_scored_head() {
        let mut set = ScoredTrackSet::new();
        set.add(ScoredTrack::new(metadata("a"), 0));
        set.add(ScoredTrack::new(metadata("b"), 3));

        let head = set.shift().unwrap();
        assert_eq!(head.id().0, "b");
        assert_eq!(set.len(), 1);
    }
}
