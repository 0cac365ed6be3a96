//! Claim module: landing view, configuration menu, event records

use drover_core::browser::Page;
use drover_core::error::HarnessResult;

use crate::VISIBILITY_TIMEOUT;

const CLAIM_HEADING: &str = "//h6[text()=\"Claim\"]";
const CONFIGURATION_TAB: &str = "//nav//span[text()=\"Configuration\"]";
const EVENTS_MENU_ITEM: &str =
    "//ul[contains(@class, \"oxd-dropdown-menu\")]//a[text()=\"Events\"]";
const ADD_EVENT_BUTTON: &str = "//button[normalize-space()=\"+ Add\"]";
const ADD_EVENT_HEADING: &str = "//h6[text()=\"Add Event\"]";
const EVENT_NAME_INPUT: &str =
    "//label[text()=\"Event Name\"]/parent::div/following-sibling::div//input";
const DESCRIPTION_INPUT: &str =
    "//label[text()=\"Description\"]/parent::div/following-sibling::div//textarea";
const ACTIVE_SWITCH: &str = "//span[contains(@class, \"oxd-switch-input\")]";
const SAVE_BUTTON: &str = "//button[normalize-space()=\"Save\"]";
const RECORDS_GRID: &str = ".oxd-table-body";

pub struct ClaimPage<'a> {
    page: &'a Page,
}

impl<'a> ClaimPage<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }

    /// Block until the Claim heading renders
    pub async fn wait_until_displayed(&self) -> HarnessResult<()> {
        self.page
            .wait_for_visible(CLAIM_HEADING, VISIBILITY_TIMEOUT)
            .await
    }

    pub async fn is_on_claim_page(&self) -> HarnessResult<bool> {
        self.page.is_visible(CLAIM_HEADING).await
    }

    /// Open the Configuration dropdown in the module top bar
    pub async fn click_configuration(&self) -> HarnessResult<()> {
        self.page.click(CONFIGURATION_TAB).await
    }

    pub async fn click_events_menu_item(&self) -> HarnessResult<()> {
        self.page.click(EVENTS_MENU_ITEM).await
    }

    pub async fn click_add_event_button(&self) -> HarnessResult<()> {
        self.page.click(ADD_EVENT_BUTTON).await
    }

    pub async fn is_on_add_event_page(&self) -> HarnessResult<bool> {
        self.page.is_visible(ADD_EVENT_HEADING).await
    }

    pub async fn enter_event_name(&self, name: &str) -> HarnessResult<()> {
        self.page.fill(EVENT_NAME_INPUT, name).await
    }

    pub async fn enter_description(&self, description: &str) -> HarnessResult<()> {
        self.page.fill(DESCRIPTION_INPUT, description).await
    }

    /// Toggle the Active switch on the add-event form
    pub async fn set_switch_event_active(&self) -> HarnessResult<()> {
        self.page.click(ACTIVE_SWITCH).await
    }

    pub async fn click_save_event_record_button(&self) -> HarnessResult<()> {
        self.page.click(SAVE_BUTTON).await
    }

    /// Wait for the saved records grid to render
    pub async fn wait_for_records_grid(&self) -> HarnessResult<()> {
        self.page
            .wait_for_visible(RECORDS_GRID, VISIBILITY_TIMEOUT)
            .await
    }
}
