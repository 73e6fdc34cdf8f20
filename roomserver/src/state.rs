//! Gateway application state.
//!
//! Deliberately not a process-global singleton behind a `OnceCell`: this is
//! an explicit `Arc<AppState>` passed through Axum's `State` extractor
//! instead, so the room registry is a constructed dependency, not reachable
//! from anywhere via a bare function call.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use roomcore::RoomSender;

use crate::config::Config;

/// A live room's mailbox plus the run id the gateway hands back to callers.
#[derive(Clone)]
pub struct RoomHandle {
    pub run_id: String,
    pub sender: RoomSender,
}

pub struct AppState {
    pub config: Config,
    pub mtv_rooms: RwLock<HashMap<String, RoomHandle>>,
    pub mpe_rooms: RwLock<HashMap<String, RoomHandle>>,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            mtv_rooms: RwLock::new(HashMap::new()),
            mpe_rooms: RwLock::new(HashMap::new()),
        })
    }
}
