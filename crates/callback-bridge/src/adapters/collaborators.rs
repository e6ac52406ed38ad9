//! Native collaborators that ship with the bridge.
//!
//! - [`UnsupportedPlatform`]: stand-in where no native SDK exists
//! - [`ManualCollaborator`]: holds completers until a test completes them
//! - [`ScriptedCollaborator`]: completes from canned responses on the tokio runtime

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::domain::{CallMode, CallbackToken, Completion, Operation, ResultShape};
use crate::error::NativeError;
use crate::ports::{Completer, NativeCall, NativeCollaborator};
use crate::NOT_IMPLEMENTED_MESSAGE;

/// Collaborator for platforms without the native SDK.
///
/// Every asynchronous call fails immediately with "Not implemented on this
/// platform". Sync reads return neutral values so callers keep working.
#[derive(Debug, Default)]
pub struct UnsupportedPlatform;

impl UnsupportedPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl NativeCollaborator for UnsupportedPlatform {
    fn begin(&self, call: NativeCall, completer: Completer) -> Result<(), NativeError> {
        debug!(operation = %call.operation, "Native SDK unavailable");
        completer.fail(NOT_IMPLEMENTED_MESSAGE);
        Ok(())
    }

    fn call_sync(&self, operation: &Operation, _payload: &str) -> Result<String, NativeError> {
        match operation.descriptor() {
            Some(d) if d.mode == CallMode::Sync && d.shape == ResultShape::Value => {
                if d.name.starts_with("getCredits") {
                    Ok("0".to_string())
                } else {
                    Ok("{}".to_string())
                }
            }
            Some(d) if d.mode == CallMode::Sync => Ok(String::new()),
            _ => Err(NativeError::Unsupported {
                operation: operation.clone(),
                message: NOT_IMPLEMENTED_MESSAGE.to_string(),
            }),
        }
    }
}

/// Collaborator driven by hand.
///
/// Records every started call and keeps its completer until
/// [`ManualCollaborator::complete`] is called, so tests control completion
/// order and thread.
#[derive(Debug, Default)]
pub struct ManualCollaborator {
    started: Mutex<Vec<NativeCall>>,
    completers: Mutex<HashMap<CallbackToken, Completer>>,
    start_errors: Mutex<HashMap<String, String>>,
    sync_responses: Mutex<HashMap<String, Result<String, String>>>,
}

impl ManualCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls started so far, in order
    pub fn started(&self) -> Vec<NativeCall> {
        self.started.lock().clone()
    }

    /// Tokens whose completers are still held
    pub fn outstanding(&self) -> Vec<CallbackToken> {
        self.completers.lock().keys().cloned().collect()
    }

    /// Complete the call for `token`. Returns false if no completer is held.
    pub fn complete(&self, token: &CallbackToken, completion: Completion) -> bool {
        let completer = self.completers.lock().remove(token);
        match completer {
            Some(completer) => {
                completer.complete(completion);
                true
            }
            None => false,
        }
    }

    /// Make `begin` refuse to start `operation`
    pub fn refuse(&self, operation: &str, message: &str) {
        self.start_errors
            .lock()
            .insert(operation.to_string(), message.to_string());
    }

    pub fn set_sync_value(&self, operation: &str, value: &str) {
        self.sync_responses
            .lock()
            .insert(operation.to_string(), Ok(value.to_string()));
    }

    pub fn set_sync_error(&self, operation: &str, message: &str) {
        self.sync_responses
            .lock()
            .insert(operation.to_string(), Err(message.to_string()));
    }
}

impl NativeCollaborator for ManualCollaborator {
    fn begin(&self, call: NativeCall, completer: Completer) -> Result<(), NativeError> {
        let refusal = self.start_errors.lock().get(call.operation.as_str()).cloned();
        self.started.lock().push(call);

        if let Some(message) = refusal {
            return Err(NativeError::Failed(message));
        }

        self.completers
            .lock()
            .insert(completer.token().clone(), completer);
        Ok(())
    }

    fn call_sync(&self, operation: &Operation, _payload: &str) -> Result<String, NativeError> {
        match self.sync_responses.lock().get(operation.as_str()) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(NativeError::Failed(message.clone())),
            None => Err(NativeError::Unsupported {
                operation: operation.clone(),
                message: "no scripted value".to_string(),
            }),
        }
    }
}

/// Collaborator answering from canned responses after a delay.
///
/// Completion runs on a spawned tokio task, so `begin` requires a runtime.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCollaborator {
    responses: HashMap<String, Completion>,
    sync_values: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
}

impl ScriptedCollaborator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, operation: &str, completion: Completion) -> Self {
        self.responses.insert(operation.to_string(), completion);
        self
    }

    pub fn with_sync_value(mut self, operation: &str, value: &str) -> Self {
        self.sync_values
            .insert(operation.to_string(), value.to_string());
        self
    }

    pub fn with_delay(mut self, operation: &str, delay: Duration) -> Self {
        self.delays.insert(operation.to_string(), delay);
        self
    }

    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }
}

impl NativeCollaborator for ScriptedCollaborator {
    fn begin(&self, call: NativeCall, completer: Completer) -> Result<(), NativeError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| NativeError::NoRuntime(call.operation.clone()))?;

        let op = call.operation.as_str();
        let completion = self.responses.get(op).cloned().unwrap_or_else(|| {
            Completion::failure(format!("no scripted response for {op}"))
        });
        let delay = self.delays.get(op).copied().unwrap_or(self.default_delay);

        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            completer.complete(completion);
        });
        Ok(())
    }

    fn call_sync(&self, operation: &Operation, _payload: &str) -> Result<String, NativeError> {
        self.sync_values
            .get(operation.as_str())
            .cloned()
            .ok_or_else(|| NativeError::Failed(format!("no scripted value for {operation}")))
    }
}
