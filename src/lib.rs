//! play24 - Play prepaid account report
//!
//! Signs in to the Play24 customer portal, fetches the account balance and
//! active services, and turns the portal markup into typed values.

// Note: deny (not forbid) to allow #[allow(unsafe_code)] in test helpers for env var manipulation
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod core;
pub mod error;
pub mod render;
pub mod storage;
pub mod util;

pub use error::{ExitCode, Play24Error, Result};
