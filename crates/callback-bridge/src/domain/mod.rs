//! Domain types for the callback bridge.
//!
//! Pure data and bookkeeping. No knowledge of which collaborator or sink is wired in.

pub mod config;
pub mod operation;
pub mod pending;
pub mod result;
pub mod token;

// Re-exports for convenience
pub use config::{BridgeConfig, TokenConfig, TokenStrategy};
pub use operation::{CallMode, Operation, OperationDescriptor, ResultShape};
pub use pending::{PendingCall, PendingRegistry, PendingStats, Reply, StatsSnapshot};
pub use result::{CallStatus, CallbackResult, Completion};
pub use token::{CallbackToken, TokenGenerator};
