//! Inbound Ports (Driving Ports)
//!
//! The API managed callers and native completion paths use to drive the bridge.

use async_trait::async_trait;

use crate::domain::{CallbackResult, CallbackToken, Completion, Operation};
use crate::error::BridgeError;

/// Primary bridge API (Driving Port)
#[async_trait]
pub trait BridgeApi: Send + Sync {
    /// Start an asynchronous native operation correlated by `token`.
    ///
    /// Returns as soon as the call is registered and handed to the
    /// collaborator. The result arrives later through the managed sink.
    ///
    /// # Errors
    /// - `EmptyToken` / `DuplicateToken` if the token is unusable
    /// - `CapacityExceeded` if too many calls are pending
    /// - `ShutDown` after teardown
    fn invoke(
        &self,
        operation: Operation,
        payload: String,
        token: CallbackToken,
    ) -> Result<(), BridgeError>;

    /// Pass a synchronous call straight through to the collaborator.
    ///
    /// Never registers a pending call.
    fn invoke_sync(&self, operation: &Operation, payload: &str) -> Result<String, BridgeError>;

    /// Route a completion to the caller that issued `token`.
    ///
    /// Unknown, late and duplicate completions are ignored.
    fn deliver(&self, token: &CallbackToken, completion: Completion);

    /// Start an asynchronous operation and await its result directly.
    ///
    /// Uses a bridge-issued token; the result bypasses the managed sink.
    async fn call(
        &self,
        operation: Operation,
        payload: String,
    ) -> Result<CallbackResult, BridgeError>;
}
