//! Generic user registry — §4.2.
//!
//! MTV and MPE keep different per-user records (votes vs. invitation
//! state), so the record type is generic; the registry itself only needs
//! to know how to get an id out of a record, the same shape as a plain
//! `HashMap<String, Arc<Playlist>>` keyed map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sentinel used by query callers that are not a member of the room.
pub const NO_RELATED_USER_ID: &str = "NO_RELATED_USER_ID";

pub trait Identified {
    fn user_id(&self) -> &UserId;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRegistry<U> {
    users: HashMap<UserId, U>,
}

impl<U: Identified> UserRegistry<U> {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Idempotent: a user already present keeps their existing record
    /// rather than being overwritten by the fresh one.
    pub fn add(&mut self, user: U) -> bool {
        if self.users.contains_key(user.user_id()) {
            return false;
        }
        self.users.insert(user.user_id().clone(), user);
        true
    }

    pub fn remove(&mut self, id: &UserId) -> bool {
        self.users.remove(id).is_some()
    }

    pub fn get(&self, id: &UserId) -> Option<&U> {
        self.users.get(id)
    }

    pub fn get_mut(&mut self, id: &UserId) -> Option<&mut U> {
        self.users.get_mut(id)
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.users.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &U> {
        self.users.values()
    }
}
