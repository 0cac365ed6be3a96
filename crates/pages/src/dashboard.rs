//! Dashboard landing page

use drover_core::browser::Page;
use drover_core::error::HarnessResult;

use crate::VISIBILITY_TIMEOUT;

const DASHBOARD_HEADING: &str = "role=heading[name=\"Dashboard\"]";

pub struct DashboardPage<'a> {
    page: &'a Page,
}

impl<'a> DashboardPage<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }

    /// Block until the dashboard heading renders
    pub async fn wait_until_displayed(&self) -> HarnessResult<()> {
        self.page
            .wait_for_visible(DASHBOARD_HEADING, VISIBILITY_TIMEOUT)
            .await
    }

    pub async fn is_displayed(&self) -> HarnessResult<bool> {
        self.page.is_visible(DASHBOARD_HEADING).await
    }
}
