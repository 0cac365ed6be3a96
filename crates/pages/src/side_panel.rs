//! Side navigation panel and shared page chrome (headings, toasts)

use drover_core::browser::Page;
use drover_core::error::HarnessResult;

use crate::VISIBILITY_TIMEOUT;

const PAGE_HEADING: &str = "//h6";
const TOAST_TITLE: &str = ".oxd-text--toast-title";
const TOAST_MESSAGE: &str = ".oxd-text--toast-message";

pub struct SidePanel<'a> {
    page: &'a Page,
}

impl<'a> SidePanel<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }

    /// Selector for one module entry in the side menu
    pub fn module_locator(module_name: &str) -> String {
        format!("//li//span[text()=\"{module_name}\"]")
    }

    /// Click a module in the side menu
    pub async fn click_module(&self, module_name: &str) -> HarnessResult<()> {
        self.page.click(&Self::module_locator(module_name)).await
    }

    /// Current page heading text, empty when the heading is absent
    pub async fn page_heading(&self) -> HarnessResult<String> {
        Ok(self
            .page
            .text_content(PAGE_HEADING)
            .await?
            .unwrap_or_default())
    }

    pub async fn is_on_page(&self, page_name: &str) -> HarnessResult<bool> {
        Ok(self.page_heading().await?.contains(page_name))
    }

    /// Wait for the toast notification to show the given title and message
    pub async fn expect_toast(&self, title: &str, message: &str) -> HarnessResult<()> {
        self.page
            .wait_for_text(TOAST_TITLE, title, VISIBILITY_TIMEOUT)
            .await?;
        self.page
            .wait_for_text(TOAST_MESSAGE, message, VISIBILITY_TIMEOUT)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_locator_embeds_the_name() {
        assert_eq!(
            SidePanel::module_locator("Claim"),
            "//li//span[text()=\"Claim\"]"
        );
    }
}
