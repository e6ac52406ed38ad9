//! # Callback Bridge Test Suite
//!
//! Cross-crate tests for the bridge and its host runtime.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── correlation.rs   # Token matching, ordering, duplicates
//!     ├── concurrency.rs   # Multi-threaded invoke/deliver
//!     ├── envelopes.rs     # Managed dispatch round trips
//!     └── teardown.rs      # Shutdown and late completions
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bridge-tests
//! cargo test -p bridge-tests integration::concurrency::
//! ```

#![allow(dead_code)]

pub mod integration;
