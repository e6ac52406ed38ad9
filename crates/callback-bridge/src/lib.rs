//! # Callback Bridge
//!
//! Correlates asynchronous native completions back to the managed caller that
//! started them, using an opaque string token as the only shared key.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): tokens, operation catalog, pending registry,
//!   callback results, configuration
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `BridgeApi`: Driving port used by managed callers
//!   - `NativeCollaborator`: Driven port implemented by the native SDK layer
//!   - `ManagedSink`: Driven port receiving results for the managed side
//! - **Service Layer** (`service/`): `CallbackBridge` implements `BridgeApi`
//! - **Adapters Layer** (`adapters/`): completion envelope codec, sinks, and
//!   collaborators for unsupported platforms and tests
//!
//! ## Correlation Flow
//!
//! ```text
//!  managed caller                 CallbackBridge                 native collaborator
//!  ──────────────                 ──────────────                 ───────────────────
//!  invoke(op, payload, tok) ───→  register PendingCall(tok)
//!                                 begin(call, completer) ──────→ (async work...)
//!        ← returns immediately
//!                                                         ←───── completer.complete(..)
//!                                 take PendingCall(tok)            or deliver(tok, ..)
//!  ManagedSink::on_result  ←────  CallbackResult{tok, ..}
//! ```
//!
//! ## Invariants
//!
//! - A token is unique among pending calls; a colliding `invoke` is rejected
//! - Each pending call is delivered at most once, then forgotten
//! - Delivery for an unknown token is a silent no-op
//! - `invoke_sync` never touches the registry
//!
//! ## Usage Example
//!
//! ```ignore
//! use callback_bridge::{BridgeApi, BridgeConfig, CallbackBridge, ChannelSink, UnsupportedPlatform};
//! use std::sync::Arc;
//!
//! let (sink, mut results) = ChannelSink::new();
//! let bridge = CallbackBridge::new(
//!     BridgeConfig::default(),
//!     Arc::new(UnsupportedPlatform::new()),
//!     Arc::new(sink),
//! )?;
//!
//! let token = bridge.next_token();
//! bridge.invoke("initSession".into(), String::new(), token)?;
//! let result = results.recv().await;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{
    decode_envelope, deliver_envelope, encode_envelope, ChannelSink, ManualCollaborator,
    MessageDispatchSink, MessageDispatcher, ScriptedCollaborator, UnsupportedPlatform,
};
pub use domain::{
    BridgeConfig, CallMode, CallStatus, CallbackResult, CallbackToken, Completion, Operation,
    OperationDescriptor, PendingCall, PendingRegistry, ResultShape, StatsSnapshot, TokenConfig,
    TokenGenerator, TokenStrategy,
};
pub use error::{BridgeError, ConfigError, EnvelopeError, NativeError};
pub use ports::{BridgeApi, Completer, CompletionTarget, ManagedSink, NativeCall, NativeCollaborator};
pub use service::CallbackBridge;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Failure description used when the native SDK is absent on this platform.
pub const NOT_IMPLEMENTED_MESSAGE: &str = "Not implemented on this platform";
