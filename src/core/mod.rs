//! Portal access, extraction and parsing.

pub mod bridge;
#[cfg(feature = "browser")]
pub mod browser;
pub mod extract;
pub mod filter;
pub mod http;
pub mod labels;
pub mod logging;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod profile;
pub mod redirect;
pub mod session;

pub use extract::{ExtractionRule, RawKey, RawMap, extract};
pub use filter::{filter_output, filter_report};
pub use labels::{LabelEntry, dispatch};
pub use models::{BalanceValue, Report, ValueMap};
pub use parsers::ValueParser;
pub use pipeline::{AcquisitionMode, Fragments, RunOptions, build_report, run};
pub use profile::{BridgeMethod, PortalProfile, PortalVersion};
pub use session::{Credentials, Portal, Session};
