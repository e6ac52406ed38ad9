//! Adapters - concrete implementations of the bridge's ports.
//!
//! - `envelope`: JSON completion envelopes exchanged with the native side
//! - `sinks`: managed-side result receivers
//! - `collaborators`: native collaborators for unsupported platforms, tests and demos

pub mod collaborators;
pub mod envelope;
pub mod sinks;

pub use collaborators::{ManualCollaborator, ScriptedCollaborator, UnsupportedPlatform};
pub use envelope::{decode_envelope, deliver_envelope, encode_envelope};
pub use sinks::{ChannelSink, MessageDispatchSink, MessageDispatcher};
