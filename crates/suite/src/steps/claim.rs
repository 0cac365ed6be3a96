//! Claim event record steps

use drover_core::error::{HarnessError, HarnessResult};
use drover_core::registry::{StepArgs, StepRegistry};
use drover_core::world::ScenarioWorld;
use drover_pages::{ClaimPage, SidePanel};
use futures::future::BoxFuture;
use serde_json::json;
use tracing::debug;

pub fn register(registry: &mut StepRegistry) -> HarnessResult<()> {
    registry.given("the user views the Events type records", views_event_records)?;
    registry.when(
        "the user adds new event type record with the following details",
        adds_event_record,
    )?;
    registry.then("the event record is added successfully", event_record_added)?;
    Ok(())
}

fn views_event_records<'a>(
    world: &'a mut ScenarioWorld,
    _args: StepArgs<'a>,
) -> BoxFuture<'a, HarnessResult<()>> {
    Box::pin(async move {
        let claim = ClaimPage::new(world.page()?);
        claim.click_configuration().await?;
        claim.click_events_menu_item().await?;
        claim.click_add_event_button().await?;
        if !claim.is_on_add_event_page().await? {
            return Err(HarnessError::AssertionFailed(
                "The Add Event page did not open".to_string(),
            ));
        }
        Ok(())
    })
}

fn adds_event_record<'a>(
    world: &'a mut ScenarioWorld,
    args: StepArgs<'a>,
) -> BoxFuture<'a, HarnessResult<()>> {
    Box::pin(async move {
        let details = args.table()?.rows_hash()?;
        let mut record = serde_json::Map::new();

        {
            let claim = ClaimPage::new(world.page()?);
            if let Some(name) = details.get("Event Name") {
                claim.enter_event_name(name).await?;
                record.insert("Event Name".to_string(), json!(name));
            }
            if let Some(description) = details.get("Description") {
                claim.enter_description(description).await?;
                record.insert("Description".to_string(), json!(description));
            }
            if let Some(active) = details.get("isActive") {
                // the switch starts on, so only a "false" row needs a toggle
                if active == "false" {
                    claim.set_switch_event_active().await?;
                }
                record.insert("isActive".to_string(), json!(active));
            }
            claim.click_save_event_record_button().await?;
        }

        world
            .session_data
            .set("eventData", serde_json::Value::Object(record));
        Ok(())
    })
}

fn event_record_added<'a>(
    world: &'a mut ScenarioWorld,
    _args: StepArgs<'a>,
) -> BoxFuture<'a, HarnessResult<()>> {
    Box::pin(async move {
        let page = world.page()?;
        SidePanel::new(page)
            .expect_toast("Success", "Successfully Saved")
            .await?;

        match world.session_data.get("eventData") {
            Some(record) => debug!("Saved event record: {record}"),
            None => {
                return Err(HarnessError::AssertionFailed(
                    "No event record was captured for this scenario".to_string(),
                ))
            }
        }

        ClaimPage::new(page).wait_for_records_grid().await
    })
}
