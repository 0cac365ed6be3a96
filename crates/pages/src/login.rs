//! Login page

use drover_core::browser::Page;
use drover_core::error::HarnessResult;

const USERNAME_INPUT: &str = "role=textbox[name=\"Username\"]";
const PASSWORD_INPUT: &str = "role=textbox[name=\"Password\"]";
const LOGIN_BUTTON: &str = "role=button[name=\"Login\"]";

pub struct LoginPage<'a> {
    page: &'a Page,
}

impl<'a> LoginPage<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }

    /// Navigate to the login screen
    pub async fn goto(&self) -> HarnessResult<()> {
        self.page.goto("/web/index.php/auth/login").await
    }

    pub async fn enter_username(&self, username: &str) -> HarnessResult<()> {
        self.page.fill(USERNAME_INPUT, username).await
    }

    pub async fn enter_password(&self, password: &str) -> HarnessResult<()> {
        self.page.fill(PASSWORD_INPUT, password).await
    }

    pub async fn click_login(&self) -> HarnessResult<()> {
        self.page.click(LOGIN_BUTTON).await
    }

    /// Fill both credential fields and submit
    pub async fn login(&self, username: &str, password: &str) -> HarnessResult<()> {
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_login().await
    }
}
