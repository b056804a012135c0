//! crates/storybook_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the generation
//! backend or the storage layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Story, StoryRequest};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., storage, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Produces a complete story for a submitted request.
///
/// Implemented by the HTTP adapter for the real backend and by the local
/// mock generator used as the fallback.
#[async_trait]
pub trait StoryGenerationService: Send + Sync {
    async fn generate_story(&self, request: &StoryRequest) -> PortResult<Story>;
}

/// A session-scoped key-value store holding JSON-serialized blobs.
///
/// Backed by per-key files in production and by an in-memory map in tests.
/// Values do not survive past the session boundary; the owner is responsible
/// for clearing its keys when the session ends.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> PortResult<()>;
    async fn remove(&self, key: &str) -> PortResult<()>;
}

/// The application's source of wall-clock time. Injected so that expiry and
/// timestamping are deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The application's source of fresh story identifiers.
pub trait IdProvider: Send + Sync {
    fn new_id(&self) -> String;
}
