//! FPD Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging setup for the FPD workspace.
//!
//! # Overview
//!
//! This crate provides the functionality used across all FPD workspace
//! members:
//!
//! - **Error Handling**: the [`FpdError`] type and [`Result`] alias
//! - **Logging**: tracing subscriber initialization driven by [`logging::LogConfig`]
//!
//! # Example
//!
//! ```no_run
//! use fpd_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> fpd_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{FpdError, Result};
