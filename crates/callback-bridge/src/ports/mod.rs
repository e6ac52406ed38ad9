//! Ports (trait seams) of the callback bridge.

pub mod inbound;
pub mod outbound;

pub use inbound::BridgeApi;
pub use outbound::{Completer, CompletionTarget, ManagedSink, NativeCall, NativeCollaborator};
