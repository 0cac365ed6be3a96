//! Drover Acceptance Harness Core
//!
//! This crate provides a Gherkin-driven browser acceptance harness that:
//! - Parses `.feature` files and compiles them into runnable pickles
//! - Drives real browsers through a Playwright sidecar process
//! - Executes registered step definitions against a per-scenario world
//! - Captures traces, screenshots, and videos for failed scenarios
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Runner (Rust)                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  FeatureIndex ── compile ──> Pickles ── filter_by_tag        │
//! │                                 │                            │
//! │                          per scenario:                       │
//! │    ScenarioManager::provision()                              │
//! │      browser -> context (video) -> tracing -> page           │
//! │    StepRegistry::resolve(text) -> handler(world, args)       │
//! │    ScenarioManager::teardown()                               │
//! │      trace zip, screenshot + video on failure, close all     │
//! │                                 │                            │
//! │  RunnerEvent stream ──> ProgressFormatter and observers      │
//! │  ScenarioReports ──> RunReport ──> <artifacts>/report.json   │
//! ├──────────────────────────────────────────────────────────────┤
//! │           Node.js sidecar (JSON lines over stdio)            │
//! │           launch / newContext / tracing / page ops           │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod artifacts;
pub mod browser;
pub mod config;
pub mod error;
pub mod events;
pub mod formatter;
pub mod gherkin;
pub mod lifecycle;
pub mod pickle;
pub mod playwright;
pub mod registry;
pub mod report;
pub mod runner;
pub mod world;

pub use browser::{BrowserEngine, BrowserKind, Page, Viewport};
pub use config::{FileConfig, HarnessConfig, RunOverrides};
pub use error::{HarnessError, HarnessResult};
pub use events::{EventObserver, RunnerEvent, StepStatus};
pub use formatter::ProgressFormatter;
pub use gherkin::FeatureIndex;
pub use playwright::PlaywrightEngine;
pub use registry::{StepArgs, StepRegistry};
pub use report::RunReport;
pub use runner::Runner;
pub use world::ScenarioWorld;

/// Harness version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
