//! Persisted client session.
//!
//! Exactly two fields survive a restart: the bearer credential and the
//! serialized owner identity. They are written and removed together; the
//! durable copy is a mirror of the auth controller's in-memory session,
//! never a second source of truth.

pub mod store;

pub use store::{PersistedSession, SessionStore};
