//! Durable room engine core for MTV (Music Track Vote) and MPE (Music
//! Playlist Editor) rooms: state machines, signal routing, the playback
//! timer and vote debouncer. No network I/O happens in this crate —
//! that is `roomserver`'s job, reached only through the [`activity`]
//! trait boundary.

pub mod activity;
pub mod clock;
pub mod error;
pub mod mpe;
pub mod mtv;
pub mod signal;
pub mod track;
pub mod user;

pub use clock::{Clock, SystemClock};
pub use error::{Result, RoomError};
pub use signal::{RoomMessage, RoomReceiver, RoomSender};
