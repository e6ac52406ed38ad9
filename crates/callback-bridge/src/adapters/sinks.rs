//! Managed-side sinks.

use tokio::sync::mpsc;
use tracing::debug;

use crate::adapters::envelope::encode_envelope;
use crate::domain::CallbackResult;
use crate::ports::ManagedSink;

/// Forwards results into an unbounded channel.
///
/// Unbounded so `on_result` never blocks the completing thread; the managed
/// runtime loop drains the receiver at its own pace.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<CallbackResult>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CallbackResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ManagedSink for ChannelSink {
    fn on_result(&self, result: CallbackResult) {
        if let Err(mpsc::error::SendError(result)) = self.tx.send(result) {
            debug!(token = %result.token, "Result receiver closed, dropping result");
        }
    }
}

/// Named-message transport of the managed environment.
///
/// Mirrors engines that deliver script messages as
/// `(target object, method name, string argument)`.
pub trait MessageDispatcher: Send + Sync {
    fn send_message(&self, target: &str, method: &str, message: &str);
}

impl<F> MessageDispatcher for F
where
    F: Fn(&str, &str, &str) + Send + Sync,
{
    fn send_message(&self, target: &str, method: &str, message: &str) {
        self(target, method, message)
    }
}

/// Encodes results as completion envelopes and dispatches them by name.
///
/// The method is chosen from the originating operation's result shape.
pub struct MessageDispatchSink<D> {
    target_object: String,
    dispatcher: D,
}

impl<D: MessageDispatcher> MessageDispatchSink<D> {
    pub fn new(target_object: impl Into<String>, dispatcher: D) -> Self {
        Self {
            target_object: target_object.into(),
            dispatcher,
        }
    }

    pub fn target_object(&self) -> &str {
        &self.target_object
    }
}

impl<D: MessageDispatcher> ManagedSink for MessageDispatchSink<D> {
    fn on_result(&self, result: CallbackResult) {
        let method = result.operation.result_shape().dispatch_method();
        let message = encode_envelope(&result);
        self.dispatcher
            .send_message(&self.target_object, method, &message);
    }
}
