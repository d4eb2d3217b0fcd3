//! Shared helpers for integration tests.
//!
//! - `fixtures`: fixture loaders and bridge reply builders
//! - `logger`: structured per-test logging
//! - `portal`: a wiremock stand-in for the portal

pub mod fixtures;
pub mod logger;
pub mod portal;
