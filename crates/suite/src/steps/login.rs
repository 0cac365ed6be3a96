//! Login and landing-page steps

use drover_core::error::{HarnessError, HarnessResult};
use drover_core::registry::{StepArgs, StepRegistry};
use drover_core::world::ScenarioWorld;
use drover_pages::{ClaimPage, DashboardPage, LoginPage};
use futures::future::BoxFuture;

pub fn register(registry: &mut StepRegistry) -> HarnessResult<()> {
    registry.given("the admin user login to Orangehrm site", admin_login)?;
    registry.then("the {string} page is displayed", page_is_displayed)?;
    Ok(())
}

fn admin_login<'a>(
    world: &'a mut ScenarioWorld,
    _args: StepArgs<'a>,
) -> BoxFuture<'a, HarnessResult<()>> {
    Box::pin(async move {
        let page = world.page()?;
        let login = LoginPage::new(page);
        login.goto().await?;
        login
            .login(&world.config.admin_username, &world.config.admin_password)
            .await?;
        DashboardPage::new(page).wait_until_displayed().await
    })
}

fn page_is_displayed<'a>(
    world: &'a mut ScenarioWorld,
    args: StepArgs<'a>,
) -> BoxFuture<'a, HarnessResult<()>> {
    Box::pin(async move {
        let name = args.string(0)?.to_ascii_lowercase();
        let page = world.page()?;
        match name.as_str() {
            "dashboard" => DashboardPage::new(page).wait_until_displayed().await,
            "claim" => ClaimPage::new(page).wait_until_displayed().await,
            _ => Err(HarnessError::AssertionFailed(
                "The module name provided is not yet handled.".to_string(),
            )),
        }
    })
}
