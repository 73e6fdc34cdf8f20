//! MPE per-user record — §3 "User record", MPE subset.

use crate::user::{Identified, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpeUserRecord {
    pub user_id: UserId,
    pub user_has_been_invited: bool,
}

impl MpeUserRecord {
    pub fn new(user_id: UserId, user_has_been_invited: bool) -> Self {
        Self {
            user_id,
            user_has_been_invited,
        }
    }
}

impl Identified for MpeUserRecord {
    fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
