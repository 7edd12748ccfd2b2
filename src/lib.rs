// Library surface for the binary, headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod catalog;
pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod factors;
pub mod grouping;
pub mod insights;
pub mod logging;
pub mod patterns;
pub mod report;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod store;
pub mod util;

pub use error::{Error, Result};
