//! Side panel navigation steps

use drover_core::error::HarnessResult;
use drover_core::registry::{StepArgs, StepRegistry};
use drover_core::world::ScenarioWorld;
use drover_pages::SidePanel;
use futures::future::BoxFuture;

pub fn register(registry: &mut StepRegistry) -> HarnessResult<()> {
    registry.given("the user views the {string} Module", views_module)
}

fn views_module<'a>(
    world: &'a mut ScenarioWorld,
    args: StepArgs<'a>,
) -> BoxFuture<'a, HarnessResult<()>> {
    Box::pin(async move {
        let module = args.string(0)?;
        SidePanel::new(world.page()?).click_module(module).await
    })
}
