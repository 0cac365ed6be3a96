//! Acceptance suite for the OrangeHRM demo site
//!
//! Step definitions live under [`steps`]; the `suite` test binary wires
//! them to the harness runner, so `cargo test -p drover-suite --test suite`
//! drives a real browser against the deployed demo instance.

pub mod steps;

pub use steps::register_all;
