//! Axum handlers — §6.
//!
//! Every handler that reaches an existing room goes through the same two
//! steps: look the `RoomHandle` up by `workflowID`, then either fire a
//! `RoomMessage::Signal` at it or round-trip a `RoomMessage::Query`. The
//! flat `500 {"message": ...}` error contract is deliberately uniform
//! across every failure mode (missing room, stale `runID`, bad payload)
//! as the literal wire contract, not a default worth refining per-case
//! (see `pmoplaylist::api::map_error` for the richer per-status-code
//! alternative this gateway does *not* copy).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};

use roomcore::mpe::params::MpeRoomParameters;
use roomcore::mpe::state::MpeRoomState;
use roomcore::mpe::user::MpeUserRecord;
use roomcore::mtv::params::{MtvRoomParameters, PlayingMode};
use roomcore::mtv::state::MtvRoomState;
use roomcore::mtv::user::MtvUserRecord;
use roomcore::signal::RoomMessage;
use roomcore::track::TrackId;
use roomcore::user::UserId;
use roomcore::SystemClock;

use crate::activities::LoggingActivities;
use crate::dto::{
    ChangeEmittingDeviceRequest, CreateMpeRoomRequest, CreateMtvRoomRequest, CreateRoomResponse,
    ErrorResponse, JoinRequest, LeaveRequest, MpeSignalRequest, OkResponse, RoomRefRequest,
    StateRequest, SuggestTracksRequest,
};
use crate::state::{AppState, RoomHandle};

fn error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
        .into_response()
}

fn ok() -> Response {
    Json(OkResponse::default()).into_response()
}

async fn mtv_room(state: &AppState, workflow_id: &str, run_id: &str) -> Result<RoomHandle, Response> {
    let rooms = state.mtv_rooms.read().await;
    match rooms.get(workflow_id) {
        Some(handle) if handle.run_id == run_id => Ok(handle.clone()),
        Some(_) => Err(error("runID does not match the room's current run")),
        None => Err(error(format!("mtv room {workflow_id} does not exist"))),
    }
}

async fn mpe_room(state: &AppState, workflow_id: &str, run_id: &str) -> Result<RoomHandle, Response> {
    let rooms = state.mpe_rooms.read().await;
    match rooms.get(workflow_id) {
        Some(handle) if handle.run_id == run_id => Ok(handle.clone()),
        Some(_) => Err(error("runID does not match the room's current run")),
        None => Err(error(format!("mpe room {workflow_id} does not exist"))),
    }
}

fn send_signal(handle: &RoomHandle, route: &str, payload: Value) -> Result<(), Response> {
    handle
        .sender
        .send(RoomMessage::Signal {
            route: route.to_string(),
            payload,
        })
        .map_err(|_| error("room is no longer running"))
}

async fn send_query(handle: &RoomHandle, user_id: String) -> Result<Value, Response> {
    let (reply_tx, reply_rx) = oneshot::channel();
    handle
        .sender
        .send(RoomMessage::Query {
            user_id: UserId(user_id),
            reply: reply_tx,
        })
        .map_err(|_| error("room is no longer running"))?;

    reply_rx
        .await
        .map_err(|_| error("room closed without answering the query"))
}

pub async fn ping() -> Response {
    Json(json!({"status": "ok"})).into_response()
}

pub async fn create_mtv_room(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<String>,
    Json(req): Json<CreateMtvRoomRequest>,
) -> Response {
    if req.room_name.trim().is_empty() || req.initial_tracks_ids.is_empty() {
        return error("roomName and initialTracksIDs are required");
    }

    let params = MtvRoomParameters {
        room_id: workflow_id.clone(),
        room_creator_user_id: UserId(req.user_id.clone()),
        room_name: req.room_name,
        playing_mode: req.playing_mode.unwrap_or(PlayingMode::Broadcast),
        is_open: req.is_open.unwrap_or(true),
        is_open_only_invited_users_can_vote: req
            .is_open_only_invited_users_can_vote
            .unwrap_or(false),
        minimum_score_to_be_played: req.minimum_score_to_be_played.unwrap_or(1),
        has_physical_and_time_constraints: false,
        physical_and_time_constraints: None,
        initial_track_ids: req.initial_tracks_ids.into_iter().map(TrackId).collect(),
    };

    if let Err(message) = params.validate(std::time::SystemTime::now()) {
        return error(message);
    }

    let creator = MtvUserRecord::new(UserId(req.user_id.clone()), req.device_id);
    let (room_state, effects) = MtvRoomState::new(params, creator);
    let exported = room_state.export(&UserId(req.user_id), std::time::SystemTime::now());
    let exported_json = match serde_json::to_value(&exported) {
        Ok(value) => value,
        Err(err) => return error(format!("failed to serialize room state: {err}")),
    };

    let run_id = uuid::Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::unbounded_channel();
    let activities = Arc::new(LoggingActivities::new(state.config.adonis_endpoint.clone()));
    let clock = Arc::new(SystemClock);
    tokio::spawn(roomcore::mtv::runner::run(room_state, effects, activities, clock, rx));

    state.mtv_rooms.write().await.insert(
        workflow_id.clone(),
        RoomHandle {
            run_id: run_id.clone(),
            sender: tx,
        },
    );

    (
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            state: exported_json,
            workflow_id,
            run_id,
        }),
    )
        .into_response()
}

pub async fn mtv_play(State(state): State<Arc<AppState>>, Json(req): Json<RoomRefRequest>) -> Response {
    mtv_bare_signal(&state, &req, "play").await
}

pub async fn mtv_pause(State(state): State<Arc<AppState>>, Json(req): Json<RoomRefRequest>) -> Response {
    mtv_bare_signal(&state, &req, "pause").await
}

pub async fn mtv_go_to_next_track(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RoomRefRequest>,
) -> Response {
    mtv_bare_signal(&state, &req, "go-to-next-track").await
}

pub async fn mtv_terminate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RoomRefRequest>,
) -> Response {
    mtv_bare_signal(&state, &req, "terminate").await
}

async fn mtv_bare_signal(state: &AppState, req: &RoomRefRequest, route: &str) -> Response {
    let handle = match mtv_room(state, &req.workflow_id, &req.run_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    match send_signal(&handle, route, json!({})) {
        Ok(()) => ok(),
        Err(response) => response,
    }
}

pub async fn mtv_join(State(state): State<Arc<AppState>>, Json(req): Json<JoinRequest>) -> Response {
    let handle = match mtv_room(&state, &req.workflow_id, &req.run_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let payload = json!({"userId": req.user_id, "deviceId": req.device_id});
    match send_signal(&handle, "join", payload) {
        Ok(()) => ok(),
        Err(response) => response,
    }
}

pub async fn mtv_leave(State(state): State<Arc<AppState>>, Json(req): Json<LeaveRequest>) -> Response {
    let handle = match mtv_room(&state, &req.workflow_id, &req.run_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    match send_signal(&handle, "leave", json!({"userId": req.user_id})) {
        Ok(()) => ok(),
        Err(response) => response,
    }
}

pub async fn mtv_change_user_emitting_device(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChangeEmittingDeviceRequest>,
) -> Response {
    let handle = match mtv_room(&state, &req.workflow_id, &req.run_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let payload = json!({"userId": req.user_id, "deviceId": req.device_id});
    match send_signal(&handle, "change-user-emitting-device", payload) {
        Ok(()) => ok(),
        Err(response) => response,
    }
}

pub async fn mtv_suggest_tracks(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SuggestTracksRequest>,
) -> Response {
    let handle = match mtv_room(&state, &req.workflow_id, &req.run_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    let payload = json!({
        "userId": req.user_id,
        "deviceId": req.device_id,
        "tracksToSuggest": req.tracks_to_suggest,
    });
    match send_signal(&handle, "suggest-tracks", payload) {
        Ok(()) => ok(),
        Err(response) => response,
    }
}

pub async fn mtv_state(State(state): State<Arc<AppState>>, Json(req): Json<StateRequest>) -> Response {
    let handle = match mtv_room(&state, &req.workflow_id, &req.run_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    match send_query(&handle, req.user_id).await {
        Ok(value) => Json(value).into_response(),
        Err(response) => response,
    }
}

/// MPE has no dedicated HTTP surface in §6 (only its signal
/// route names appear, in §6's wire-form table); these three endpoints
/// mirror the MTV ones closely enough to exercise
/// `roomcore::mpe::runner::run` end to end without inventing a second
/// endpoint per MPE route.
pub async fn create_mpe_room(
    State(state): State<Arc<AppState>>,
    Path(workflow_id): Path<String>,
    Json(req): Json<CreateMpeRoomRequest>,
) -> Response {
    if req.room_name.trim().is_empty() || req.initial_tracks_ids.is_empty() {
        return error("roomName and initialTracksIDs are required");
    }

    let params = MpeRoomParameters {
        room_id: workflow_id.clone(),
        room_creator_user_id: UserId(req.user_id.clone()),
        room_name: req.room_name,
        is_open: req.is_open.unwrap_or(true),
        only_invited_users_can_edit: req.only_invited_users_can_edit.unwrap_or(false),
        initial_track_ids: req.initial_tracks_ids.into_iter().map(TrackId).collect(),
    };

    if let Err(message) = params.validate() {
        return error(message);
    }

    let creator = MpeUserRecord::new(UserId(req.user_id.clone()), true);
    let (room_state, effects) = MpeRoomState::new(params, creator);
    let exported = room_state.export(&UserId(req.user_id));
    let exported_json = match serde_json::to_value(&exported) {
        Ok(value) => value,
        Err(err) => return error(format!("failed to serialize room state: {err}")),
    };

    let run_id = uuid::Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::unbounded_channel();
    let activities = Arc::new(LoggingActivities::new(state.config.adonis_endpoint.clone()));
    tokio::spawn(roomcore::mpe::runner::run(room_state, effects, activities, rx));

    state.mpe_rooms.write().await.insert(
        workflow_id.clone(),
        RoomHandle {
            run_id: run_id.clone(),
            sender: tx,
        },
    );

    (
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            state: exported_json,
            workflow_id,
            run_id,
        }),
    )
        .into_response()
}

pub async fn mpe_signal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MpeSignalRequest>,
) -> Response {
    let handle = match mpe_room(&state, &req.workflow_id, &req.run_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    match send_signal(&handle, &req.route, req.payload) {
        Ok(()) => ok(),
        Err(response) => response,
    }
}

pub async fn mpe_state(State(state): State<Arc<AppState>>, Json(req): Json<StateRequest>) -> Response {
    let handle = match mpe_room(&state, &req.workflow_id, &req.run_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };
    match send_query(&handle, req.user_id).await {
        Ok(value) => Json(value).into_response(),
        Err(response) => response,
    }
}
