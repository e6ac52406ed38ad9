//! Completion signals and the results delivered to the managed side.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::operation::Operation;
use crate::domain::token::CallbackToken;

/// Outcome status of an asynchronous call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Success,
    Failure,
}

/// Completion signal raised by the native collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub status: CallStatus,
    /// Serialized result on success, error description on failure
    pub payload: String,
}

impl Completion {
    pub fn success(payload: impl Into<String>) -> Self {
        Self {
            status: CallStatus::Success,
            payload: payload.into(),
        }
    }

    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            status: CallStatus::Failure,
            payload: description.into(),
        }
    }
}

/// Result handed to the managed caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackResult {
    /// Token of the originating call
    pub token: CallbackToken,
    /// Operation of the originating call
    pub operation: Operation,
    pub status: CallStatus,
    pub payload: String,
    /// Time the call spent pending
    pub elapsed: Duration,
}

impl CallbackResult {
    pub fn is_success(&self) -> bool {
        self.status == CallStatus::Success
    }

    /// The error description, for failed calls
    pub fn error(&self) -> Option<&str> {
        match self.status {
            CallStatus::Failure => Some(&self.payload),
            CallStatus::Success => None,
        }
    }
}
