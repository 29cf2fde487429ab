//! In-memory board state.
//!
//! The board is the full set of live notes plus the identities of every
//! connected client. Nothing here is persisted; state lives for the lifetime
//! of the process.
//!
//! - [`presence`] - Identity registry (connection -> display name)
//! - [`store`] - Authoritative note collection
//! - [`zorder`] - Stacking-order allocator
//! - [`locks`] - Advisory per-note edit locks

pub mod locks;
pub mod presence;
pub mod store;
pub mod zorder;

pub use locks::{EditLockManager, LockOutcome};
pub use presence::{ConnectionId, IdentityRegistry};
pub use store::BoardStore;
pub use zorder::ZOrderAllocator;
