//! MPE signal route table — §4.5, §6.
//!
//! An unrecognised route is fatal here, unlike MTV's router: the runner
//! sets its fatal flag and the room's loop exits at the next boundary
//! rather than unwinding the host process.

use serde::Deserialize;
use serde_json::Value;

use crate::mpe::event::{MpeEvent, MtvRoomCreationOptions, ReorderOperation};
use crate::mpe::user::MpeUserRecord;
use crate::signal::parse_uuid_field;
use crate::track::TrackId;
use crate::user::UserId;

pub enum MpeInboundSignal {
    Event(MpeEvent),
    Terminate,
    /// Validation failure: logged and dropped, never fatal.
    Dropped,
    /// Unrecognised route: fatal for MPE.
    Fatal(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddTracksPayload {
    user_id: String,
    device_id: Option<String>,
    tracks_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeTrackOrderPayload {
    user_id: String,
    device_id: Option<String>,
    track_id: String,
    from_index: usize,
    operation: ReorderOperation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteTracksPayload {
    user_id: String,
    device_id: Option<String>,
    tracks_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddUserPayload {
    user_id: String,
    #[serde(default)]
    user_has_been_invited: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveUserPayload {
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportToMtvRoomPayload {
    user_id: String,
    device_id: Option<String>,
    options: MtvRoomCreationOptions,
}

pub fn decode(route: &str, payload: Value) -> MpeInboundSignal {
    match route {
        "terminate" => MpeInboundSignal::Terminate,
        "ADD_TRACKS" => decode_add_tracks(payload),
        "CHANGE_TRACK_ORDER" => decode_change_track_order(payload),
        "DELETE_TRACKS" => decode_delete_tracks(payload),
        "ADD_USER" => decode_add_user(payload),
        "REMOVE_USER" => decode_remove_user(payload),
        "EXPORT_TO_MTV_ROOM" => decode_export_to_mtv_room(payload),
        other => MpeInboundSignal::Fatal(other.to_string()),
    }
}

fn decode_add_tracks(payload: Value) -> MpeInboundSignal {
    let Ok(fields) = serde_json::from_value::<AddTracksPayload>(payload) else {
        tracing::warn!("malformed ADD_TRACKS payload, dropping");
        return MpeInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) || fields.tracks_ids.is_empty() {
        tracing::warn!("ADD_TRACKS payload failed validation, dropping");
        return MpeInboundSignal::Dropped;
    }
    MpeInboundSignal::Event(MpeEvent::AddTracks {
        user_id: UserId(fields.user_id),
        device_id: fields.device_id,
        track_ids: fields.tracks_ids.into_iter().map(TrackId).collect(),
    })
}

fn decode_change_track_order(payload: Value) -> MpeInboundSignal {
    let Ok(fields) = serde_json::from_value::<ChangeTrackOrderPayload>(payload) else {
        tracing::warn!("malformed CHANGE_TRACK_ORDER payload, dropping");
        return MpeInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) {
        tracing::warn!("CHANGE_TRACK_ORDER payload has a non-UUID userID, dropping");
        return MpeInboundSignal::Dropped;
    }
    MpeInboundSignal::Event(MpeEvent::ChangeTrackOrder {
        user_id: UserId(fields.user_id),
        device_id: fields.device_id,
        track_id: TrackId(fields.track_id),
        from_index: fields.from_index,
        operation: fields.operation,
    })
}

fn decode_delete_tracks(payload: Value) -> MpeInboundSignal {
    let Ok(fields) = serde_json::from_value::<DeleteTracksPayload>(payload) else {
        tracing::warn!("malformed DELETE_TRACKS payload, dropping");
        return MpeInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) || fields.tracks_ids.is_empty() {
        tracing::warn!("DELETE_TRACKS payload failed validation, dropping");
        return MpeInboundSignal::Dropped;
    }
    MpeInboundSignal::Event(MpeEvent::DeleteTracks {
        user_id: UserId(fields.user_id),
        device_id: fields.device_id,
        track_ids: fields.tracks_ids.into_iter().map(TrackId).collect(),
    })
}

fn decode_add_user(payload: Value) -> MpeInboundSignal {
    let Ok(fields) = serde_json::from_value::<AddUserPayload>(payload) else {
        tracing::warn!("malformed ADD_USER payload, dropping");
        return MpeInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) {
        tracing::warn!("ADD_USER payload has a non-UUID userID, dropping");
        return MpeInboundSignal::Dropped;
    }
    MpeInboundSignal::Event(MpeEvent::AddUser(MpeUserRecord::new(
        UserId(fields.user_id),
        fields.user_has_been_invited,
    )))
}

fn decode_remove_user(payload: Value) -> MpeInboundSignal {
    let Ok(fields) = serde_json::from_value::<RemoveUserPayload>(payload) else {
        tracing::warn!("malformed REMOVE_USER payload, dropping");
        return MpeInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) {
        tracing::warn!("REMOVE_USER payload has a non-UUID userID, dropping");
        return MpeInboundSignal::Dropped;
    }
    MpeInboundSignal::Event(MpeEvent::RemoveUser(UserId(fields.user_id)))
}

fn decode_export_to_mtv_room(payload: Value) -> MpeInboundSignal {
    let Ok(fields) = serde_json::from_value::<ExportToMtvRoomPayload>(payload) else {
        tracing::warn!("malformed EXPORT_TO_MTV_ROOM payload, dropping");
        return MpeInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) {
        tracing::warn!("EXPORT_TO_MTV_ROOM payload has a non-UUID userID, dropping");
        return MpeInboundSignal::Dropped;
    }
    MpeInboundSignal::Event(MpeEvent::ExportToMtvRoom {
        user_id: UserId(fields.user_id),
        device_id: fields.device_id,
        options: fields.options,
    })
}
