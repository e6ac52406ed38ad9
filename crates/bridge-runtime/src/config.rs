//! # Runtime Configuration
//!
//! Bridge configuration with environment overrides.
//!
//! | variable | field |
//! |---|---|
//! | `BRIDGE_TOKEN_STRATEGY` | `tokens.strategy` (`sequential` / `random`) |
//! | `BRIDGE_TOKEN_PREFIX` | `tokens.prefix` |
//! | `BRIDGE_MAX_PENDING` | `max_pending` |
//! | `BRIDGE_STRICT_OPERATIONS` | `strict_operations` |
//! | `BRIDGE_LOG_PAYLOADS` | `log_payloads` |
//! | `BRIDGE_TARGET_OBJECT` | managed object receiving dispatched results |
//! | `BRIDGE_NATIVE` | native backend (`scripted` / `unsupported`) |
//!
//! Malformed values are logged and ignored.

use callback_bridge::{BridgeConfig, TokenStrategy};
use tracing::{info, warn};

/// Default managed object name for dispatched results
pub const DEFAULT_TARGET_OBJECT: &str = "BridgeHost";

/// Which native collaborator the host wires in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeBackend {
    /// Canned responses completed on the tokio runtime
    Scripted,
    /// No native SDK; async calls fail, sync reads return neutral values
    Unsupported,
}

impl std::str::FromStr for NativeBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scripted" => Ok(Self::Scripted),
            "unsupported" => Ok(Self::Unsupported),
            other => Err(format!("unknown native backend: {other}")),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Bridge configuration.
    pub bridge: BridgeConfig,
    /// Managed object that receives dispatched completion envelopes.
    pub target_object: String,
    /// Native collaborator backend.
    pub native: NativeBackend,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            target_object: DEFAULT_TARGET_OBJECT.to_string(),
            native: NativeBackend::Scripted,
        }
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> RuntimeConfig {
    load_config_with(|key| std::env::var(key).ok())
}

/// Load configuration using `lookup` to read variables.
pub fn load_config_with<F>(lookup: F) -> RuntimeConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = RuntimeConfig::default();

    if let Some(value) = lookup("BRIDGE_TOKEN_STRATEGY") {
        match value.parse::<TokenStrategy>() {
            Ok(strategy) => config.bridge.tokens.strategy = strategy,
            Err(e) => warn!("BRIDGE_TOKEN_STRATEGY ignored: {}", e),
        }
    }

    if let Some(prefix) = lookup("BRIDGE_TOKEN_PREFIX") {
        config.bridge.tokens.prefix = prefix;
    }

    if let Some(value) = lookup("BRIDGE_MAX_PENDING") {
        match value.trim().parse() {
            Ok(max) => config.bridge.max_pending = max,
            Err(_) => warn!("BRIDGE_MAX_PENDING must be a positive integer, got {:?}", value),
        }
    }

    if let Some(value) = lookup("BRIDGE_STRICT_OPERATIONS") {
        match parse_flag(&value) {
            Some(flag) => config.bridge.strict_operations = flag,
            None => warn!("BRIDGE_STRICT_OPERATIONS must be a boolean, got {:?}", value),
        }
    }

    if let Some(value) = lookup("BRIDGE_LOG_PAYLOADS") {
        match parse_flag(&value) {
            Some(flag) => config.bridge.log_payloads = flag,
            None => warn!("BRIDGE_LOG_PAYLOADS must be a boolean, got {:?}", value),
        }
    }

    if let Some(target) = lookup("BRIDGE_TARGET_OBJECT").filter(|t| !t.is_empty()) {
        config.target_object = target;
    }

    if let Some(value) = lookup("BRIDGE_NATIVE") {
        match value.parse::<NativeBackend>() {
            Ok(native) => config.native = native,
            Err(e) => warn!("BRIDGE_NATIVE ignored: {}", e),
        }
    }

    info!(
        native = ?config.native,
        strategy = ?config.bridge.tokens.strategy,
        max_pending = config.bridge.max_pending,
        "Loaded bridge configuration"
    );

    config
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
