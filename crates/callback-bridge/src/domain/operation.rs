//! Operation identifiers and the catalog of well-known native calls.
//!
//! Operations are open strings: anything the managed side names is forwarded.
//! The catalog only adds knowledge of call mode and result shape for the calls
//! the native SDK is known to expose.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which native capability a call targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Operation(String);

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Catalog entry for this operation, if it is a well-known one
    pub fn descriptor(&self) -> Option<&'static OperationDescriptor> {
        lookup(&self.0)
    }

    /// Result shape used to marshal completions; unknown operations carry params
    pub fn result_shape(&self) -> ResultShape {
        self.descriptor()
            .map(|d| d.shape)
            .unwrap_or(ResultShape::Params)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Operation {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Operation {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Whether an operation completes through `deliver` or returns directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallMode {
    Async,
    Sync,
}

/// What an operation's result looks like on the managed side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultShape {
    /// Key/value object
    Params,
    /// Boolean "changed" flag
    Status,
    /// Array of entries
    List,
    /// Generated link
    Url,
    /// `{universalObject, linkProperties}` pair
    UniversalObject,
    /// Raw value returned by a sync read
    Value,
    /// Fire-and-forget; the result is empty
    None,
}

impl ResultShape {
    /// Envelope field carrying the result data
    pub fn envelope_key(self) -> Option<&'static str> {
        match self {
            Self::Params | Self::UniversalObject => Some("params"),
            Self::Status => Some("status"),
            Self::List => Some("list"),
            Self::Url => Some("url"),
            Self::Value | Self::None => None,
        }
    }

    /// Managed-side method receiving completions of this shape
    pub fn dispatch_method(self) -> &'static str {
        match self {
            Self::Status => "asyncCallbackWithStatus",
            Self::List => "asyncCallbackWithList",
            Self::Url => "asyncCallbackWithUrl",
            Self::UniversalObject => "asyncCallbackWithUniversalObject",
            Self::Params | Self::Value | Self::None => "asyncCallbackWithParams",
        }
    }
}

/// Catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub mode: CallMode,
    pub shape: ResultShape,
}

const fn op(name: &'static str, mode: CallMode, shape: ResultShape) -> OperationDescriptor {
    OperationDescriptor { name, mode, shape }
}

pub const INIT_SESSION: &str = "initSession";
pub const INIT_SESSION_WITH_UNIVERSAL_OBJECT: &str = "initSessionWithUniversalObject";
pub const SET_IDENTITY: &str = "setIdentity";
pub const FETCH_REWARDS: &str = "fetchRewards";
pub const GET_CREDIT_HISTORY: &str = "getCreditHistory";
pub const GET_SHORT_URL: &str = "getShortUrl";
pub const SHARE_LINK: &str = "shareLink";
pub const GET_CREDITS: &str = "getCredits";
pub const GET_CREDITS_FOR_BUCKET: &str = "getCreditsForBucket";
pub const REDEEM_REWARDS: &str = "redeemRewards";

/// Well-known native operations
pub static CATALOG: &[OperationDescriptor] = &[
    // Async, completed through deliver
    op(INIT_SESSION, CallMode::Async, ResultShape::Params),
    op(INIT_SESSION_WITH_UNIVERSAL_OBJECT, CallMode::Async, ResultShape::UniversalObject),
    op(SET_IDENTITY, CallMode::Async, ResultShape::Params),
    op(FETCH_REWARDS, CallMode::Async, ResultShape::Status),
    op(GET_CREDIT_HISTORY, CallMode::Async, ResultShape::List),
    op(GET_SHORT_URL, CallMode::Async, ResultShape::Url),
    // Reports the shared link and channel as params
    op(SHARE_LINK, CallMode::Async, ResultShape::Params),
    // Sync reads
    op("getFirstReferringUniversalObject", CallMode::Sync, ResultShape::Value),
    op("getFirstReferringLinkProperties", CallMode::Sync, ResultShape::Value),
    op("getLatestReferringUniversalObject", CallMode::Sync, ResultShape::Value),
    op("getLatestReferringLinkProperties", CallMode::Sync, ResultShape::Value),
    op(GET_CREDITS, CallMode::Sync, ResultShape::Value),
    op(GET_CREDITS_FOR_BUCKET, CallMode::Sync, ResultShape::Value),
    // Sync fire-and-forget
    op("setKey", CallMode::Sync, ResultShape::None),
    op("resetUserSession", CallMode::Sync, ResultShape::None),
    op("logout", CallMode::Sync, ResultShape::None),
    op("setDebug", CallMode::Sync, ResultShape::None),
    op("setRetryInterval", CallMode::Sync, ResultShape::None),
    op("setMaxRetries", CallMode::Sync, ResultShape::None),
    op("setNetworkTimeout", CallMode::Sync, ResultShape::None),
    op("registerView", CallMode::Sync, ResultShape::None),
    op("listOnSpotlight", CallMode::Sync, ResultShape::None),
    op("setRequestMetadata", CallMode::Sync, ResultShape::None),
    op("setTrackingDisabled", CallMode::Sync, ResultShape::None),
    op("userCompletedAction", CallMode::Sync, ResultShape::None),
    op("sendEvent", CallMode::Sync, ResultShape::None),
    op(REDEEM_REWARDS, CallMode::Sync, ResultShape::None),
];

/// Find a catalog entry by name
pub fn lookup(name: &str) -> Option<&'static OperationDescriptor> {
    CATALOG.iter().find(|d| d.name == name)
}
