//! Pending call registry - the token-keyed half of the async bridge.
//!
//! Maps callback tokens to in-flight native calls until their completion
//! arrives. The registry is the only shared mutable state of the bridge.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::domain::operation::Operation;
use crate::domain::result::{CallbackResult, Completion};
use crate::domain::token::CallbackToken;
use crate::error::BridgeError;

/// Where a completed call's result goes
#[derive(Debug)]
pub enum Reply {
    /// The bridge's registered managed sink
    Sink,
    /// A one-shot slot awaited by an async Rust caller
    Awaiting(oneshot::Sender<CallbackResult>),
}

/// One in-flight cross-boundary request
#[derive(Debug)]
pub struct PendingCall {
    pub token: CallbackToken,
    pub operation: Operation,
    pub request_payload: String,
    created_at: Instant,
    reply: Reply,
}

impl PendingCall {
    /// A call whose result is forwarded to the managed sink
    pub fn new(token: CallbackToken, operation: Operation, request_payload: String) -> Self {
        Self {
            token,
            operation,
            request_payload,
            created_at: Instant::now(),
            reply: Reply::Sink,
        }
    }

    /// A call whose result is sent to the returned receiver instead of the sink
    pub fn awaiting(
        token: CallbackToken,
        operation: Operation,
        request_payload: String,
    ) -> (Self, oneshot::Receiver<CallbackResult>) {
        let (tx, rx) = oneshot::channel();
        let call = Self {
            reply: Reply::Awaiting(tx),
            ..Self::new(token, operation, request_payload)
        };
        (call, rx)
    }

    pub fn elapsed(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Consume the record, pairing the completion with the originating call
    pub fn resolve(self, completion: Completion) -> (CallbackResult, Reply) {
        let result = CallbackResult {
            elapsed: self.created_at.elapsed(),
            token: self.token,
            operation: self.operation,
            status: completion.status,
            payload: completion.payload,
        };
        (result, self.reply)
    }
}

/// Counters for registry activity
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Calls registered
    pub registered: AtomicU64,
    /// Results handed to a sink or awaiting caller
    pub delivered: AtomicU64,
    /// Completions for tokens with no pending call
    pub unknown_deliveries: AtomicU64,
    /// Registrations refused because the token was already pending
    pub duplicate_rejections: AtomicU64,
    /// Pending calls dropped at teardown, or whose awaiting caller went away
    pub discarded: AtomicU64,
    /// Synchronous pass-through calls
    pub sync_calls: AtomicU64,
    /// Native failures (sync errors and failed completions)
    pub native_failures: AtomicU64,
}

impl PendingStats {
    pub fn snapshot(&self, pending: usize) -> StatsSnapshot {
        StatsSnapshot {
            pending,
            registered: self.registered.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            unknown_deliveries: self.unknown_deliveries.load(Ordering::Relaxed),
            duplicate_rejections: self.duplicate_rejections.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            sync_calls: self.sync_calls.load(Ordering::Relaxed),
            native_failures: self.native_failures.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`PendingStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pending: usize,
    pub registered: u64,
    pub delivered: u64,
    pub unknown_deliveries: u64,
    pub duplicate_rejections: u64,
    pub discarded: u64,
    pub sync_calls: u64,
    pub native_failures: u64,
}

/// Token-keyed registry of pending calls.
///
/// Flow:
/// 1. Caller supplies a token, `register()` stores the call
/// 2. Native collaborator starts the operation
/// 3. Completion arrives, `take()` removes the call exactly once
/// 4. Any later completion for the same token finds nothing
pub struct PendingRegistry {
    pending: DashMap<CallbackToken, PendingCall>,
    /// Slots held by registered calls; reserved before insert
    occupied: AtomicUsize,
    max_pending: usize,
    stats: PendingStats,
}

impl PendingRegistry {
    pub fn new(max_pending: usize) -> Self {
        Self {
            pending: DashMap::new(),
            occupied: AtomicUsize::new(0),
            max_pending,
            stats: PendingStats::default(),
        }
    }

    /// Register a pending call.
    ///
    /// Check-and-insert happens under the entry lock for the token's shard, so
    /// two racing registrations of one token cannot both succeed. A pending
    /// token is reported as a duplicate even when the registry is full.
    pub fn register(&self, call: PendingCall) -> Result<(), BridgeError> {
        match self.pending.entry(call.token.clone()) {
            Entry::Occupied(existing) => {
                PendingStats::bump(&self.stats.duplicate_rejections);
                warn!(
                    token = %call.token,
                    operation = %call.operation,
                    pending_operation = %existing.get().operation,
                    "Rejected duplicate token"
                );
                Err(BridgeError::DuplicateToken(call.token))
            }
            Entry::Vacant(slot) => {
                if !self.reserve() {
                    return Err(BridgeError::CapacityExceeded {
                        max: self.max_pending,
                    });
                }
                debug!(
                    token = %call.token,
                    operation = %call.operation,
                    "Registered pending call"
                );
                slot.insert(call);
                PendingStats::bump(&self.stats.registered);
                Ok(())
            }
        }
    }

    /// Claim a slot, failing if all `max_pending` are held
    fn reserve(&self) -> bool {
        self.occupied
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |held| {
                (held < self.max_pending).then_some(held + 1)
            })
            .is_ok()
    }

    fn release(&self, count: usize) {
        self.occupied.fetch_sub(count, Ordering::AcqRel);
    }

    /// Remove and return the pending call for `token`, if any
    pub fn take(&self, token: &CallbackToken) -> Option<PendingCall> {
        match self.pending.remove(token) {
            Some((_, call)) => {
                self.release(1);
                Some(call)
            }
            None => {
                PendingStats::bump(&self.stats.unknown_deliveries);
                None
            }
        }
    }

    /// Remove a call that was registered but never started
    pub fn withdraw(&self, token: &CallbackToken) -> bool {
        let removed = self.pending.remove(token).is_some();
        if removed {
            self.release(1);
        }
        removed
    }

    /// Discard every pending call without delivering. Returns how many were dropped.
    pub fn drain(&self) -> usize {
        let mut removed = 0;
        self.pending.retain(|token, call| {
            debug!(
                token = %token,
                operation = %call.operation,
                elapsed_ms = call.elapsed().as_millis(),
                "Discarding pending call"
            );
            removed += 1;
            false
        });
        self.release(removed);
        self.stats
            .discarded
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    pub fn is_pending(&self, token: &CallbackToken) -> bool {
        self.pending.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot(self.len())
    }
}
