//! Music Track Vote room — §3, §4.3.

pub mod effect;
pub mod event;
pub mod params;
pub mod query;
pub mod runner;
pub mod signal;
pub mod state;
pub mod user;

pub use effect::MtvEffect;
pub use event::{ExpiredTimer, MtvEvent, TimerExpiredReason};
pub use params::{MtvRoomParameters, PhysicalAndTimeConstraints, PlayingMode};
pub use query::MtvExposedState;
pub use state::{CurrentTrack, MtvLocation, MtvRoomState, PlaybackTimerMeta};
pub use user::MtvUserRecord;
