//! Bridge configuration with validation.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default capacity of the pending call registry
pub const DEFAULT_MAX_PENDING: usize = 1024;

/// Default prefix for bridge-issued tokens
pub const DEFAULT_TOKEN_PREFIX: &str = "CallbackId";

/// Main bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Token issuing configuration
    pub tokens: TokenConfig,
    /// Maximum number of simultaneously pending calls
    pub max_pending: usize,
    /// Reject operations missing from the catalog or called in the wrong mode
    pub strict_operations: bool,
    /// Include request payloads in debug logs
    pub log_payloads: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tokens: TokenConfig::default(),
            max_pending: DEFAULT_MAX_PENDING,
            strict_operations: false,
            log_payloads: false,
        }
    }
}

impl BridgeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pending == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        if self.tokens.prefix.chars().any(char::is_control) {
            return Err(ConfigError::InvalidPrefix(
                "prefix cannot contain control characters".into(),
            ));
        }

        // Random tokens are unique on their own; sequential ones still need a
        // non-empty prefix so they cannot collide with bare numeric caller tokens.
        if self.tokens.strategy == TokenStrategy::Sequential && self.tokens.prefix.is_empty() {
            return Err(ConfigError::InvalidPrefix(
                "sequential tokens require a prefix".into(),
            ));
        }

        Ok(())
    }
}

/// How the bridge issues tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStrategy {
    /// `<prefix><n>`, counting from 1
    Sequential,
    /// `<prefix><uuid-v4>`
    Random,
}

impl std::str::FromStr for TokenStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "random" => Ok(Self::Random),
            other => Err(format!("unknown token strategy: {other}")),
        }
    }
}

/// Token issuing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub strategy: TokenStrategy,
    pub prefix: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            strategy: TokenStrategy::Sequential,
            prefix: DEFAULT_TOKEN_PREFIX.to_string(),
        }
    }
}
