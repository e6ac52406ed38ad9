//! Callback tokens for request/completion matching.
//!
//! Tokens cross the language boundary as plain strings, so they stay opaque
//! here: the bridge compares them, never parses them.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::domain::config::{TokenConfig, TokenStrategy};

/// Opaque token correlating a request with its eventual completion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackToken(String);

impl CallbackToken {
    /// Wrap a caller-supplied token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CallbackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallbackToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CallbackToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for CallbackToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CallbackToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Issues tokens for callers that do not bring their own.
///
/// Sequential tokens are `<prefix><n>` with `n` starting at 1; random tokens
/// are `<prefix><uuid-v4>` in simple (hyphenless) form.
#[derive(Debug)]
pub struct TokenGenerator {
    strategy: TokenStrategy,
    prefix: String,
    counter: AtomicU64,
}

impl TokenGenerator {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            strategy: config.strategy,
            prefix: config.prefix.clone(),
            counter: AtomicU64::new(0),
        }
    }

    /// Produce the next token
    pub fn next_token(&self) -> CallbackToken {
        match self.strategy {
            TokenStrategy::Sequential => {
                let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
                CallbackToken(format!("{}{}", self.prefix, n))
            }
            TokenStrategy::Random => {
                CallbackToken(format!("{}{}", self.prefix, Uuid::new_v4().simple()))
            }
        }
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(&TokenConfig::default())
    }
}
