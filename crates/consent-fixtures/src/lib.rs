//! # consent-fixtures
//!
//! A fixture-driven regression harness for a cookie-notice and
//! scroll-blocking detection engine.
//!
//! The engine is external: it loads a page in a real browser, applies adblock
//! lists and reports whether it found a cookie notice and whether the page
//! blocks scrolling. This crate owns everything around it: the catalog of
//! static HTML fixtures, a one-time profile preparation step, bounded
//! concurrent dispatch of page checks, and the oracle that compares results
//! against recorded expectations.
//!
//! ## Architecture
//!
//! - **catalog**: the static `TestCase` registry and fixture URL resolution
//! - **config**: check configuration and figment-layered harness settings
//! - **engine**: the `DetectionEngine` contract and `CheckResult`
//! - **command**: `CommandEngine`, a subprocess bridge to the real engine
//! - **signature**: SHA-256/base64 content signatures of notice markup
//! - **oracle**: tri-state verdicts and per-fixture reports
//! - **runner**: profile preparation followed by semaphore-bounded checks
//!
//! ## Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use consent_fixtures::{CATALOG, CommandEngine, HarnessConfig, Runner};
//!
//! #[tokio::main]
//! async fn main() -> consent_fixtures::Result<()> {
//!     let config = HarnessConfig::load(None)?;
//!     let engine = Arc::new(CommandEngine::from_config(&config));
//!     let runner = Runner::from_config(engine, &config)?;
//!
//!     let report = runner.run(CATALOG).await?;
//!     assert!(report.is_success(), "{} fixture(s) failed", report.failed());
//!     Ok(())
//! }
//! ```
//!
//! ## Testing Strategy
//!
//! 1. **Unit tests**: canonicalization, oracle rules, config layering
//! 2. **Runner tests**: a scripted in-process engine checks ordering,
//!    isolation and the concurrency ceiling
//! 3. **End-to-end**: the full catalog against a real engine bridge and
//!    browser (`cargo test -- --ignored`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod runner;
pub mod signature;

// Re-export main types for convenience
pub use catalog::{CATALOG, ExpectedNotice, TestCase};
pub use command::CommandEngine;
pub use config::{AdblockLists, BaseConfiguration, CheckConfiguration, HarnessConfig};
pub use engine::{CheckResult, DetectedNotice, Detection, DetectionEngine};
pub use error::{HarnessError, Result};
pub use oracle::{FixtureReport, FixtureState, Outcome, Verdict};
pub use runner::{RunReport, Runner, default_worker_budget, worker_budget};
pub use signature::{CanonicalResult, ContentSignature, canonicalize};
