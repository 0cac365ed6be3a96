//! Step definitions for the acceptance features
//!
//! Each submodule registers the steps for one area of the application.
//! [`register_all`] is the single entry point the test binary calls.

mod claim;
mod login;
mod side_panel;

use drover_core::error::HarnessResult;
use drover_core::registry::StepRegistry;

/// Register every step definition the feature files use
pub fn register_all(registry: &mut StepRegistry) -> HarnessResult<()> {
    login::register(registry)?;
    side_panel::register(registry)?;
    claim::register(registry)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drover_core::gherkin::FeatureIndex;
    use drover_core::pickle;
    use std::path::Path;

    /// Every step in the shipped feature files must have a definition,
    /// otherwise the run would report undefined scenarios.
    #[test]
    fn every_feature_step_has_a_definition() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("features");
        let index = FeatureIndex::load(&dir).unwrap();
        assert!(!index.is_empty(), "no feature files found under {dir:?}");

        let mut registry = StepRegistry::new();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.len(), 6);

        for pickle in pickle::compile_all(&index) {
            for step in &pickle.steps {
                assert!(
                    registry.resolve(&step.text).is_some(),
                    "no step definition matches \"{}\" ({})",
                    step.text,
                    pickle.uri
                );
            }
        }
    }
}
