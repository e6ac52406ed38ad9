//! Service layer - orchestration of registry, collaborator and sink.

mod bridge;

pub use bridge::CallbackBridge;
