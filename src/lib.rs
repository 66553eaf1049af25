//! Client for the Veria address-screening API.
//!
//! A [`VeriaClient`] sends one bounded request per [`VeriaClient::screen`] call and turns the
//! answer into either a [`ScreeningResult`] or a [`ScreeningError`]. The block decision is a
//! pure function over the result, see [`should_block`].
//!
//! ```no_run
//! use veria_rs::{ClientConfig, VeriaClient};
//!
//! # async fn run() -> Result<(), veria_rs::ScreeningError> {
//! let client = VeriaClient::new(ClientConfig::new("vk_live_..."))?;
//! let result = client.screen("vitalik.eth").await?;
//! if result.should_block() {
//!     println!("blocked: {} ({})", result.resolved_address, result.risk_level);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod decision;
pub mod error;
pub mod types;

pub use client::{Screener, VeriaClient};
pub use config::{ClientConfig, ConfigError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
pub use decision::{decide, should_block, ScreeningDecision};
pub use error::{Result, ScreeningError};
pub use types::{RiskLevel, ScreeningDetails, ScreeningResult};
