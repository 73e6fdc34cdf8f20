//! Request/response bodies for the gateway — §6.
//!
//! Field names are camelCase on the wire, matching the signal payloads in
//! `roomcore::mtv::signal`/`roomcore::mpe::signal` and the Go source's own
//! JSON tags.

use serde::{Deserialize, Serialize};

use roomcore::mtv::params::PlayingMode;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMtvRoomRequest {
    pub user_id: String,
    pub device_id: Option<String>,
    pub room_name: String,
    pub initial_tracks_ids: Vec<String>,
    #[serde(default)]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub is_open_only_invited_users_can_vote: Option<bool>,
    #[serde(default)]
    pub minimum_score_to_be_played: Option<u32>,
    #[serde(default)]
    pub playing_mode: Option<PlayingMode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMpeRoomRequest {
    pub user_id: String,
    pub room_name: String,
    pub initial_tracks_ids: Vec<String>,
    #[serde(default)]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub only_invited_users_can_edit: Option<bool>,
}

/// Body shared by the bare signal routes (`play`, `pause`, `go-to-next-track`,
/// `terminate`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRefRequest {
    pub workflow_id: String,
    pub run_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub workflow_id: String,
    pub run_id: String,
    pub user_id: String,
    #[serde(default)]
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub workflow_id: String,
    pub run_id: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmittingDeviceRequest {
    pub workflow_id: String,
    pub run_id: String,
    pub user_id: String,
    pub device_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestTracksRequest {
    pub workflow_id: String,
    pub run_id: String,
    pub user_id: String,
    #[serde(default)]
    pub device_id: Option<String>,
    pub tracks_to_suggest: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRequest {
    pub workflow_id: String,
    pub run_id: String,
    pub user_id: String,
}

/// Generic envelope used by the MPE signal routes (`ADD_TRACKS`,
/// `CHANGE_TRACK_ORDER`, ...), which have no dedicated HTTP verb of their
/// own in §6 — the gateway forwards `route`/`payload` verbatim to
/// the room's signal channel, the same shape the room already decodes
/// internally.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MpeSignalRequest {
    pub workflow_id: String,
    pub run_id: String,
    pub route: String,
    #[serde(flatten)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub state: serde_json::Value,
    pub workflow_id: String,
    pub run_id: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: u8,
}

impl Default for OkResponse {
    fn default() -> Self {
        Self { ok: 1 }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
