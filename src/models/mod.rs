//! Data models for records, events, and presence.

pub mod event;
pub mod presence;
pub mod record;

pub use event::*;
pub use presence::*;
pub use record::*;
