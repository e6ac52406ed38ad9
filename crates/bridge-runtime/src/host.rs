//! # Bridge Host
//!
//! Owns one [`CallbackBridge`] and the managed end of its sink. Results are
//! dispatched as named messages, the way a scripting engine receives them, and
//! queued here for the host loop to drain.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use callback_bridge::{
    decode_envelope, BridgeApi, BridgeError, CallbackBridge, CallbackToken, Completion,
    ConfigError, MessageDispatchSink,
    MessageDispatcher, NativeCollaborator, ScriptedCollaborator, StatsSnapshot,
    UnsupportedPlatform,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{NativeBackend, RuntimeConfig};

/// Host errors.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Timed out with {outstanding} results outstanding")]
    Timeout { outstanding: usize },

    #[error("Message channel closed with {outstanding} results outstanding")]
    ChannelClosed { outstanding: usize },
}

/// A named message delivered to the managed side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedMessage {
    pub target: String,
    pub method: String,
    /// Completion envelope (JSON)
    pub message: String,
}

struct QueueDispatcher {
    tx: mpsc::UnboundedSender<DispatchedMessage>,
}

impl MessageDispatcher for QueueDispatcher {
    fn send_message(&self, target: &str, method: &str, message: &str) {
        let dispatched = DispatchedMessage {
            target: target.to_string(),
            method: method.to_string(),
            message: message.to_string(),
        };
        if self.tx.send(dispatched).is_err() {
            debug!(method, "Host loop gone, dropping message");
        }
    }
}

/// Outcome of one session.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    /// Messages received for asynchronous calls, in arrival order.
    pub dispatched: Vec<DispatchedMessage>,
    /// Synchronous reads: operation and value, or error description.
    pub reads: Vec<(String, Result<String, String>)>,
    /// Bridge statistics at the end of the session.
    pub stats: StatsSnapshot,
}

/// Runtime host for one bridge session.
pub struct BridgeHost {
    bridge: CallbackBridge,
    messages: mpsc::UnboundedReceiver<DispatchedMessage>,
}

impl BridgeHost {
    /// Build a host using the collaborator selected in `config`.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, HostError> {
        let collaborator: Arc<dyn NativeCollaborator> = match config.native {
            NativeBackend::Scripted => Arc::new(demo_collaborator()),
            NativeBackend::Unsupported => Arc::new(UnsupportedPlatform::new()),
        };
        Self::new(config, collaborator)
    }

    /// Build a host over an explicit collaborator.
    pub fn new(
        config: &RuntimeConfig,
        collaborator: Arc<dyn NativeCollaborator>,
    ) -> Result<Self, HostError> {
        let (tx, messages) = mpsc::unbounded_channel();
        let sink = MessageDispatchSink::new(config.target_object.clone(), QueueDispatcher { tx });
        let bridge = CallbackBridge::new(config.bridge.clone(), collaborator, Arc::new(sink))?;

        Ok(Self { bridge, messages })
    }

    /// The bridge, for injection into callers.
    pub fn bridge(&self) -> &CallbackBridge {
        &self.bridge
    }

    /// Wait for the next dispatched message.
    pub async fn next_message(&mut self) -> Option<DispatchedMessage> {
        self.messages.recv().await
    }

    /// Issue `calls` asynchronously and `reads` synchronously, then wait up to
    /// `wait` for every asynchronous result.
    ///
    /// Messages are matched to this session by `callbackId`; anything else in
    /// the queue (late results of an earlier session, calls made through
    /// [`BridgeHost::bridge`]) is skipped. Sync read failures are recorded in
    /// the report rather than aborting.
    pub async fn run_session(
        &mut self,
        calls: &[(&str, &str)],
        reads: &[(&str, &str)],
        wait: Duration,
    ) -> Result<SessionReport, HostError> {
        let mut report = SessionReport::default();
        let mut issued: HashSet<CallbackToken> = HashSet::with_capacity(calls.len());

        for (operation, payload) in calls {
            let token = self.bridge.next_token();
            info!(token = %token, operation, "Invoking");
            self.bridge
                .invoke((*operation).into(), (*payload).to_string(), token.clone())?;
            issued.insert(token);
        }

        for (operation, payload) in reads {
            let value = self
                .bridge
                .invoke_sync(&(*operation).into(), payload)
                .map_err(|e| e.to_string());
            info!(operation, ?value, "Read");
            report.reads.push((operation.to_string(), value));
        }

        let deadline = tokio::time::Instant::now() + wait;
        while !issued.is_empty() {
            let outstanding = issued.len();
            match tokio::time::timeout_at(deadline, self.messages.recv()).await {
                Ok(Some(message)) => {
                    let token = match decode_envelope(&message.message) {
                        Ok((token, _)) => token,
                        Err(e) => {
                            warn!(error = %e, "Skipping unreadable dispatched message");
                            continue;
                        }
                    };
                    if !issued.remove(&token) {
                        debug!(token = %token, "Skipping result from outside this session");
                        continue;
                    }
                    info!(method = %message.method, message = %message.message, "Dispatched");
                    report.dispatched.push(message);
                }
                Ok(None) => return Err(HostError::ChannelClosed { outstanding }),
                Err(_) => {
                    warn!(outstanding, "Session timed out");
                    return Err(HostError::Timeout { outstanding });
                }
            }
        }

        report.stats = self.bridge.stats();
        Ok(report)
    }

    /// Tear the bridge down. Returns how many pending calls were discarded.
    pub fn shutdown(self) -> usize {
        self.bridge.shutdown()
    }
}

/// Collaborator answering the well-known operations with canned data.
pub fn demo_collaborator() -> ScriptedCollaborator {
    ScriptedCollaborator::new()
        .with_default_delay(Duration::from_millis(20))
        .with_response(
            "initSession",
            Completion::success(r#"{"+clicked_link":false,"+is_first_session":true}"#),
        )
        .with_response("setIdentity", Completion::success(r#"{"identity":"demo-user"}"#))
        .with_response("fetchRewards", Completion::success("true"))
        .with_response(
            "getCreditHistory",
            Completion::success(r#"[{"transaction":{"amount":5,"bucket":"default"}}]"#),
        )
        .with_response("getShortUrl", Completion::success("https://link.example/abc123"))
        .with_response("shareLink", Completion::failure("Sharing is unavailable"))
        // Completes last so results arrive out of request order
        .with_delay("initSession", Duration::from_millis(60))
        .with_sync_value("getCredits", "42")
        .with_sync_value("getCreditsForBucket", "7")
        .with_sync_value("logout", "")
}
