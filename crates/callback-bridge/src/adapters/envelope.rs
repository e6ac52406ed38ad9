//! Completion envelope codec.
//!
//! Completions cross the boundary as a single JSON object:
//!
//! ```text
//! {"callbackId": "CallbackId7", "url": "https://...", "error": null}
//! {"callbackId": "CallbackId8", "error": "Not implemented on this platform"}
//! ```
//!
//! The data field is named after the result shape: `params`, `status`, `list`
//! or `url`.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::domain::{CallStatus, CallbackResult, CallbackToken, Completion, ResultShape};
use crate::error::EnvelopeError;
use crate::ports::BridgeApi;

/// Data fields checked when decoding, in priority order
const DATA_KEYS: [&str; 4] = ["params", "status", "list", "url"];

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "callbackId", default)]
    callback_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    body: Map<String, Value>,
}

/// Decode a completion envelope into its token and completion
pub fn decode_envelope(raw: &str) -> Result<(CallbackToken, Completion), EnvelopeError> {
    let envelope: RawEnvelope = serde_json::from_str(raw)?;

    let token = envelope
        .callback_id
        .filter(|id| !id.is_empty())
        .map(CallbackToken::new)
        .ok_or(EnvelopeError::MissingToken)?;

    if let Some(error) = envelope.error {
        return Ok((token, Completion::failure(error)));
    }

    let payload = DATA_KEYS
        .iter()
        .find_map(|key| envelope.body.get(*key))
        .map(value_to_payload)
        .unwrap_or_default();

    Ok((token, Completion::success(payload)))
}

/// Encode a result as the envelope the managed side expects
pub fn encode_envelope(result: &CallbackResult) -> String {
    let mut envelope = json!({
        "callbackId": result.token.as_str(),
        "error": Value::Null,
    });

    match result.status {
        CallStatus::Failure => {
            envelope["error"] = Value::String(result.payload.clone());
        }
        CallStatus::Success => {
            let shape = result.operation.result_shape();
            if let Some(key) = shape.envelope_key() {
                envelope[key] = payload_to_value(shape, &result.payload);
            }
        }
    }

    envelope.to_string()
}

/// Decode `raw` and deliver it through `bridge`. Returns the completed token.
///
/// Unknown tokens are still a silent no-op; only unreadable envelopes error.
pub fn deliver_envelope<B>(bridge: &B, raw: &str) -> Result<CallbackToken, EnvelopeError>
where
    B: BridgeApi + ?Sized,
{
    let (token, completion) = decode_envelope(raw).map_err(|err| {
        warn!(error = %err, "Dropping unreadable completion envelope");
        err
    })?;
    bridge.deliver(&token, completion);
    Ok(token)
}

fn value_to_payload(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn payload_to_value(shape: ResultShape, payload: &str) -> Value {
    if payload.is_empty() {
        return Value::Null;
    }
    match shape {
        ResultShape::Url => Value::String(payload.to_string()),
        _ => serde_json::from_str(payload).unwrap_or_else(|_| Value::String(payload.to_string())),
    }
}
