//! Callback bridge service.
//!
//! Implements [`BridgeApi`] on top of the [`PendingRegistry`].

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use crate::domain::pending::Reply;
use crate::domain::{
    BridgeConfig, CallMode, CallStatus, CallbackResult, CallbackToken, Completion, Operation,
    PendingCall, PendingRegistry, PendingStats, StatsSnapshot, TokenGenerator,
};
use crate::error::{BridgeError, ConfigError};
use crate::ports::{
    BridgeApi, Completer, CompletionTarget, ManagedSink, NativeCall, NativeCollaborator,
};

/// The callback correlation bridge.
///
/// One instance per boundary-crossing session. Cheap to clone; clones share
/// the same registry. Teardown happens through [`CallbackBridge::shutdown`],
/// or implicitly when the last clone is dropped.
#[derive(Clone)]
pub struct CallbackBridge {
    core: Arc<BridgeCore>,
}

struct BridgeCore {
    config: BridgeConfig,
    registry: PendingRegistry,
    tokens: TokenGenerator,
    collaborator: Arc<dyn NativeCollaborator>,
    sink: Arc<dyn ManagedSink>,
    closed: AtomicBool,
}

impl CallbackBridge {
    /// Create a bridge over `collaborator`, delivering results into `sink`.
    pub fn new(
        config: BridgeConfig,
        collaborator: Arc<dyn NativeCollaborator>,
        sink: Arc<dyn ManagedSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        info!(
            max_pending = config.max_pending,
            token_strategy = ?config.tokens.strategy,
            strict_operations = config.strict_operations,
            "Callback bridge initialized"
        );

        Ok(Self {
            core: Arc::new(BridgeCore {
                registry: PendingRegistry::new(config.max_pending),
                tokens: TokenGenerator::new(&config.tokens),
                config,
                collaborator,
                sink,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Issue a fresh token for callers that do not generate their own
    pub fn next_token(&self) -> CallbackToken {
        self.core.tokens.next_token()
    }

    /// Tear the bridge down.
    ///
    /// Every pending call is discarded without delivery; awaiting callers see
    /// `Cancelled`. Later `invoke` calls fail with `ShutDown`, later
    /// completions are ignored. Returns the number of calls discarded.
    pub fn shutdown(&self) -> usize {
        if self.core.closed.swap(true, Ordering::AcqRel) {
            return 0;
        }
        let discarded = self.core.registry.drain();
        info!(discarded, "Callback bridge shut down");
        discarded
    }

    pub fn is_shut_down(&self) -> bool {
        self.core.closed.load(Ordering::Acquire)
    }

    pub fn is_pending(&self, token: &CallbackToken) -> bool {
        self.core.registry.is_pending(token)
    }

    pub fn pending_count(&self) -> usize {
        self.core.registry.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.core.registry.snapshot()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.core.config
    }

    fn ensure_open(&self) -> Result<(), BridgeError> {
        if self.is_shut_down() {
            return Err(BridgeError::ShutDown);
        }
        Ok(())
    }

    fn check_mode(&self, operation: &Operation, mode: CallMode) -> Result<(), BridgeError> {
        if !self.core.config.strict_operations {
            return Ok(());
        }
        match operation.descriptor() {
            None => Err(BridgeError::UnknownOperation(operation.clone())),
            Some(d) if d.mode != mode => Err(BridgeError::CallModeMismatch {
                operation: operation.clone(),
                expected: d.mode,
            }),
            Some(_) => Ok(()),
        }
    }

    /// Register `pending` and hand it to the collaborator
    fn start(&self, pending: PendingCall) -> Result<(), BridgeError> {
        self.ensure_open()?;

        let call = NativeCall {
            token: pending.token.clone(),
            operation: pending.operation.clone(),
            payload: pending.request_payload.clone(),
        };
        if self.core.config.log_payloads {
            debug!(token = %call.token, operation = %call.operation, payload = %call.payload, "Invoke");
        }

        self.core.registry.register(pending)?;

        // A shutdown racing with registration may have drained before our insert
        if self.is_shut_down() {
            self.core.registry.withdraw(&call.token);
            return Err(BridgeError::ShutDown);
        }

        let weak = Arc::downgrade(&self.core);
        let target: Weak<dyn CompletionTarget> = weak;
        let completer = Completer::new(call.token.clone(), target);
        let token = call.token.clone();
        let operation = call.operation.clone();

        if let Err(err) = self.core.collaborator.begin(call, completer) {
            warn!(token = %token, operation = %operation, error = %err, "Native operation refused to start");
            self.core.complete(&token, Completion::failure(err.to_string()));
        }

        Ok(())
    }
}

impl CompletionTarget for BridgeCore {
    fn complete(&self, token: &CallbackToken, completion: Completion) {
        let Some(pending) = self.registry.take(token) else {
            debug!(token = %token, "Ignoring completion for unknown token");
            return;
        };

        if completion.status == CallStatus::Failure {
            PendingStats::bump(&self.registry.stats().native_failures);
        }

        let (result, reply) = pending.resolve(completion);
        debug!(
            token = %result.token,
            operation = %result.operation,
            status = ?result.status,
            elapsed_ms = result.elapsed.as_millis(),
            "Delivering result"
        );

        match reply {
            Reply::Sink => {
                self.sink.on_result(result);
                PendingStats::bump(&self.registry.stats().delivered);
            }
            Reply::Awaiting(tx) => {
                let token = result.token.clone();
                if tx.send(result).is_ok() {
                    PendingStats::bump(&self.registry.stats().delivered);
                } else {
                    PendingStats::bump(&self.registry.stats().discarded);
                    debug!(token = %token, "Awaiting caller went away");
                }
            }
        }
    }
}

#[async_trait]
impl BridgeApi for CallbackBridge {
    fn invoke(
        &self,
        operation: Operation,
        payload: String,
        token: CallbackToken,
    ) -> Result<(), BridgeError> {
        if token.is_empty() {
            return Err(BridgeError::EmptyToken);
        }
        self.check_mode(&operation, CallMode::Async)?;
        self.start(PendingCall::new(token, operation, payload))
    }

    fn invoke_sync(&self, operation: &Operation, payload: &str) -> Result<String, BridgeError> {
        self.ensure_open()?;
        self.check_mode(operation, CallMode::Sync)?;

        let stats = self.core.registry.stats();
        PendingStats::bump(&stats.sync_calls);

        self.core
            .collaborator
            .call_sync(operation, payload)
            .map_err(|err| {
                PendingStats::bump(&stats.native_failures);
                warn!(operation = %operation, error = %err, "Synchronous native call failed");
                BridgeError::NativeOperation(err)
            })
    }

    fn deliver(&self, token: &CallbackToken, completion: Completion) {
        self.core.complete(token, completion);
    }

    async fn call(
        &self,
        operation: Operation,
        payload: String,
    ) -> Result<CallbackResult, BridgeError> {
        self.check_mode(&operation, CallMode::Async)?;

        let token = self.next_token();
        let (pending, rx) = PendingCall::awaiting(token.clone(), operation, payload);
        self.start(pending)?;

        rx.await.map_err(|_| BridgeError::Cancelled(token))
    }
}
