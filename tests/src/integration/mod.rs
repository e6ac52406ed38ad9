//! Integration tests across `callback-bridge` and `bridge-runtime`.

pub mod correlation;
pub mod envelopes;
pub mod teardown;
