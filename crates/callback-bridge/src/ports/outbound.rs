//! Outbound Ports (Driven Ports)
//!
//! What the bridge needs from its surroundings: a native collaborator that
//! performs operations, and a managed sink that receives results.

use std::fmt;
use std::sync::Weak;
use tracing::debug;

use crate::domain::{CallbackResult, CallbackToken, Completion, Operation};
use crate::error::NativeError;

/// An asynchronous call handed to the native collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCall {
    pub token: CallbackToken,
    pub operation: Operation,
    /// Serialized request, passed through uninterpreted
    pub payload: String,
}

/// Native SDK layer (Driven Port)
///
/// Implementations own all networking, retry and timeout behavior; the bridge
/// only correlates.
pub trait NativeCollaborator: Send + Sync {
    /// Start an asynchronous operation. Must not block.
    ///
    /// The operation finishes by calling [`Completer::complete`], from any
    /// thread, possibly before `begin` returns. An `Err` means the operation
    /// was never started; the bridge turns it into a failed result.
    fn begin(&self, call: NativeCall, completer: Completer) -> Result<(), NativeError>;

    /// Perform a synchronous operation and return its serialized result
    fn call_sync(&self, operation: &Operation, payload: &str) -> Result<String, NativeError>;
}

/// Receives completions for pending tokens. Implemented by the bridge.
pub trait CompletionTarget: Send + Sync {
    fn complete(&self, token: &CallbackToken, completion: Completion);
}

/// Single-use handle the collaborator uses to finish one call.
///
/// Holds the bridge weakly: completing after the bridge is gone is a no-op.
pub struct Completer {
    token: CallbackToken,
    target: Weak<dyn CompletionTarget>,
}

impl Completer {
    pub fn new(token: CallbackToken, target: Weak<dyn CompletionTarget>) -> Self {
        Self { token, target }
    }

    pub fn token(&self) -> &CallbackToken {
        &self.token
    }

    pub fn complete(self, completion: Completion) {
        match self.target.upgrade() {
            Some(target) => target.complete(&self.token, completion),
            None => debug!(token = %self.token, "Bridge dropped, discarding completion"),
        }
    }

    pub fn fail(self, description: impl Into<String>) {
        self.complete(Completion::failure(description));
    }
}

impl fmt::Debug for Completer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("token", &self.token)
            .field("attached", &(self.target.strong_count() > 0))
            .finish()
    }
}

/// Managed-side result receiver (Driven Port)
///
/// Called from whichever thread delivered the completion. Must return promptly.
pub trait ManagedSink: Send + Sync {
    fn on_result(&self, result: CallbackResult);
}

impl<F> ManagedSink for F
where
    F: Fn(CallbackResult) + Send + Sync,
{
    fn on_result(&self, result: CallbackResult) {
        self(result)
    }
}
