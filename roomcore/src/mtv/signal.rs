//! MTV signal route table — §4.5, §6.
//!
//! Malformed payloads and unrecognised routes are logged and dropped,
//! never fatal: MTV's router, unlike MPE's, treats an unknown route as
//! silently ignorable (§4.5, the divergence flagged in §9).

use serde::Deserialize;
use serde_json::Value;

use crate::mtv::event::MtvEvent;
use crate::mtv::user::MtvUserRecord;
use crate::signal::parse_uuid_field;
use crate::track::TrackId;
use crate::user::UserId;

/// What a decoded signal should do to the room, once the router has
/// classified it. `Terminate` is not an `MtvEvent`: it is handled by the
/// runner itself, which sets its shutdown flag at the next selector
/// boundary (§5 "Cancellation semantics").
pub enum MtvInboundSignal {
    Event(MtvEvent),
    Terminate,
    /// Decoded and recognised, but carries no FSM effect (the
    /// `update-delegation-owner` route: §6 lists it, but §3's
    /// data model has no delegation-owner field to update).
    Unsupported,
    /// Failed validation or an unknown route; the caller logs and drops.
    Dropped,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinPayload {
    user_id: String,
    device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeavePayload {
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeDevicePayload {
    user_id: String,
    device_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestTracksPayload {
    user_id: String,
    device_id: Option<String>,
    tracks_to_suggest: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteForTrackPayload {
    user_id: String,
    track_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FitsConstraintPayload {
    user_id: String,
    user_fits_position_constraint: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ControlPermissionPayload {
    user_id: String,
    has_control_and_delegation_permission: bool,
}

/// Decodes one route's payload into an inbound signal. `route` is the tag
/// already peeled off the `RoomMessage::Signal` the gateway sent.
pub fn decode(route: &str, payload: Value) -> MtvInboundSignal {
    match route {
        "play" => MtvInboundSignal::Event(MtvEvent::Play),
        "pause" => MtvInboundSignal::Event(MtvEvent::Pause),
        "go-to-next-track" => MtvInboundSignal::Event(MtvEvent::GoToNextTrack),
        "terminate" => MtvInboundSignal::Terminate,
        "join" => decode_join(payload),
        "leave" => decode_leave(payload),
        "change-user-emitting-device" => decode_change_device(payload),
        "suggest-tracks" => decode_suggest_tracks(payload),
        "vote-for-track" => decode_vote(payload),
        "update-user-fits-position-constraint" => decode_fits_constraint(payload),
        "update-control-and-delegation-permision" => decode_control_permission(payload),
        "update-delegation-owner" => {
            tracing::warn!("update-delegation-owner signal accepted but has no modeled effect");
            MtvInboundSignal::Unsupported
        }
        other => {
            tracing::warn!(route = other, "unknown MTV signal route, dropping");
            MtvInboundSignal::Dropped
        }
    }
}

fn decode_join(payload: Value) -> MtvInboundSignal {
    let Ok(fields) = serde_json::from_value::<JoinPayload>(payload) else {
        tracing::warn!("malformed join payload, dropping");
        return MtvInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) {
        tracing::warn!("join payload has a non-UUID userID, dropping");
        return MtvInboundSignal::Dropped;
    }
    let user = MtvUserRecord::new(UserId(fields.user_id), fields.device_id);
    MtvInboundSignal::Event(MtvEvent::AddUser(user))
}

fn decode_leave(payload: Value) -> MtvInboundSignal {
    let Ok(fields) = serde_json::from_value::<LeavePayload>(payload) else {
        tracing::warn!("malformed leave payload, dropping");
        return MtvInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) {
        tracing::warn!("leave payload has a non-UUID userID, dropping");
        return MtvInboundSignal::Dropped;
    }
    MtvInboundSignal::Event(MtvEvent::RemoveUser(UserId(fields.user_id)))
}

fn decode_change_device(payload: Value) -> MtvInboundSignal {
    let Ok(fields) = serde_json::from_value::<ChangeDevicePayload>(payload) else {
        tracing::warn!("malformed change-user-emitting-device payload, dropping");
        return MtvInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) {
        tracing::warn!("change-user-emitting-device payload has a non-UUID userID, dropping");
        return MtvInboundSignal::Dropped;
    }
    MtvInboundSignal::Event(MtvEvent::ChangeUserEmittingDevice {
        user_id: UserId(fields.user_id),
        device_id: fields.device_id,
    })
}

fn decode_suggest_tracks(payload: Value) -> MtvInboundSignal {
    let Ok(fields) = serde_json::from_value::<SuggestTracksPayload>(payload) else {
        tracing::warn!("malformed suggest-tracks payload, dropping");
        return MtvInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) || fields.tracks_to_suggest.is_empty() {
        tracing::warn!("suggest-tracks payload failed validation, dropping");
        return MtvInboundSignal::Dropped;
    }
    MtvInboundSignal::Event(MtvEvent::SuggestTracks {
        user_id: UserId(fields.user_id),
        device_id: fields.device_id,
        track_ids: fields.tracks_to_suggest.into_iter().map(TrackId).collect(),
    })
}

fn decode_vote(payload: Value) -> MtvInboundSignal {
    let Ok(fields) = serde_json::from_value::<VoteForTrackPayload>(payload) else {
        tracing::warn!("malformed vote-for-track payload, dropping");
        return MtvInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) {
        tracing::warn!("vote-for-track payload has a non-UUID userID, dropping");
        return MtvInboundSignal::Dropped;
    }
    MtvInboundSignal::Event(MtvEvent::VoteForTrack {
        user_id: UserId(fields.user_id),
        track_id: TrackId(fields.track_id),
    })
}

fn decode_fits_constraint(payload: Value) -> MtvInboundSignal {
    let Ok(fields) = serde_json::from_value::<FitsConstraintPayload>(payload) else {
        tracing::warn!("malformed update-user-fits-position-constraint payload, dropping");
        return MtvInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) {
        tracing::warn!("update-user-fits-position-constraint payload has a non-UUID userID, dropping");
        return MtvInboundSignal::Dropped;
    }
    MtvInboundSignal::Event(MtvEvent::UpdateUserFitsPositionConstraint {
        user_id: UserId(fields.user_id),
        fits: fields.user_fits_position_constraint,
    })
}

fn decode_control_permission(payload: Value) -> MtvInboundSignal {
    let Ok(fields) = serde_json::from_value::<ControlPermissionPayload>(payload) else {
        tracing::warn!("malformed update-control-and-delegation-permision payload, dropping");
        return MtvInboundSignal::Dropped;
    };
    if !parse_uuid_field(&fields.user_id) {
        tracing::warn!(
            "update-control-and-delegation-permision payload has a non-UUID userID, dropping"
        );
        return MtvInboundSignal::Dropped;
    }
    MtvInboundSignal::Event(MtvEvent::UpdateControlAndDelegationPermission {
        user_id: UserId(fields.user_id),
        has_permission: fields.has_control_and_delegation_permission,
    })
}
