//! # Bridge Runtime
//!
//! Hosts a [`callback_bridge::CallbackBridge`] the way an embedding engine
//! would: one bridge per session, constructed at startup, injected into the
//! code that issues calls, and torn down at exit.
//!
//! ## Modules
//!
//! - `config` - Environment-driven configuration loading
//! - `host` - Wiring of collaborator, sink and bridge; the demo session
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then environment overrides)
//! 2. Validate configuration
//! 3. Build the bridge over the chosen collaborator
//! 4. Run the session, draining results from the managed sink
//! 5. Shut the bridge down, discarding anything still pending

pub mod config;
pub mod host;

pub use config::{load_config, load_config_with, NativeBackend, RuntimeConfig};
pub use host::{demo_collaborator, BridgeHost, DispatchedMessage, HostError, SessionReport};
