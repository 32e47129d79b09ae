//! Gateway to the drop-off backend.
//!
//! All backend traffic funnels through [`client::ApiClient`]: it attaches
//! the current persisted credential, normalizes every failure into a
//! displayable [`error::ApiError`], and reports upload progress through a
//! caller-supplied callback.

pub mod client;
pub mod error;
pub mod progress;
pub mod types;

pub use client::{ApiClient, UploadRequest};
pub use error::ApiError;
pub use progress::ProgressFn;
