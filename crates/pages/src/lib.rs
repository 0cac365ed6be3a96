//! Page objects for the OrangeHRM demo application
//!
//! Thin wrappers over [`drover_core::browser::Page`] that name each
//! screen's selectors once. Construct them per use; they borrow the
//! scenario's live page and hold no state of their own.

use std::time::Duration;

pub mod claim;
pub mod dashboard;
pub mod login;
pub mod side_panel;

pub use claim::ClaimPage;
pub use dashboard::DashboardPage;
pub use login::LoginPage;
pub use side_panel::SidePanel;

/// Slow-render allowance for the hosted demo instance
pub const VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);
