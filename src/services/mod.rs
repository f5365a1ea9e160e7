//! Core logic: presence table, session coordinator, record retention.

pub mod presence;
pub mod retention;
pub mod session;

pub use presence::PresenceTable;
pub use session::{ConnectionState, JoinOutcome, SessionCoordinator};
