//! Error types for the callback bridge

use thiserror::Error;

use crate::domain::{CallMode, CallbackToken, Operation};

/// Errors returned synchronously by bridge operations
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Duplicate token: {0} is already pending")]
    DuplicateToken(CallbackToken),

    #[error("Token must not be empty")]
    EmptyToken,

    #[error("Native operation failed: {0}")]
    NativeOperation(#[from] NativeError),

    #[error("Pending call capacity exceeded: {max}")]
    CapacityExceeded { max: usize },

    #[error("Unknown operation: {0}")]
    UnknownOperation(Operation),

    #[error("Operation {operation} must be called in {expected:?} mode")]
    CallModeMismatch {
        operation: Operation,
        expected: CallMode,
    },

    #[error("Bridge has been shut down")]
    ShutDown,

    #[error("Pending call {0} was discarded before completion")]
    Cancelled(CallbackToken),
}

/// Failures reported by the native collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    /// The collaborator's own failure description, passed through unchanged.
    #[error("{0}")]
    Failed(String),

    #[error("{operation}: {message}")]
    Unsupported { operation: Operation, message: String },

    #[error("No async runtime available to start {0}")]
    NoRuntime(Operation),
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_pending cannot be 0")]
    ZeroCapacity,

    #[error("Token prefix is invalid: {0}")]
    InvalidPrefix(String),
}

/// Errors decoding a completion envelope received from the native side
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Envelope has no callbackId")]
    MissingToken,
}
