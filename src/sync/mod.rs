//! Server-authoritative synchronization.
//!
//! - [`protocol`] - Wire messages and inbound validation
//! - [`router`] - Delivery scope for each outbound event
//! - [`engine`] - Applies intents to the board and produces outbound events

pub mod engine;
pub mod protocol;
pub mod router;

pub use engine::{BoardStats, SyncEngine, UNKNOWN_USER};
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use router::{BroadcastRouter, Delivery, Outbound, Outcome};
