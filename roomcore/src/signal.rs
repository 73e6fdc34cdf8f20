//! Shared inbound signal message type — §4.5.
//!
//! The wire form is `{ "route": "<name>", ...fields }`. The gateway parses
//! that shape itself (via each endpoint's typed request body) and hands
//! `route`/`payload` to a room as a `RoomMessage::Signal`; both MTV and
//! MPE routers then peel the `route` tag off their own route table.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::user::UserId;

/// One entry on a room's inbound channel: either a signal to route into
/// the FSM, or a query (§4.7) asking for a state snapshot. A
/// query never mutates, so it carries its own reply channel rather than
/// producing an `MtvEvent`/`MpeEvent`.
pub enum RoomMessage {
    Signal { route: String, payload: Value },
    Query {
        user_id: UserId,
        reply: oneshot::Sender<Value>,
    },
}

pub type RoomSender = mpsc::UnboundedSender<RoomMessage>;
pub type RoomReceiver = mpsc::UnboundedReceiver<RoomMessage>;

/// Parses a required UUID-shaped string field. Validation failures are
/// reported by the caller as a dropped signal (§7 "Validation").
pub fn parse_uuid_field(value: &str) -> bool {
    uuid::Uuid::parse_str(value).is_ok()
}
