//! Compilation of feature documents into runnable pickles
//!
//! A pickle is a self-contained scenario: background steps are prepended
//! (feature-level first, rule-level second) and tags are inherited from
//! every enclosing scope.

use uuid::Uuid;

use crate::gherkin::{DataTable, Feature, FeatureChild, FeatureIndex, Scenario, Step};

/// A compiled scenario ready for execution
#[derive(Debug, Clone)]
pub struct Pickle {
    pub id: Uuid,
    pub name: String,
    pub uri: String,
    pub tags: Vec<String>,
    pub steps: Vec<PickleStep>,
}

#[derive(Debug, Clone)]
pub struct PickleStep {
    pub id: Uuid,
    pub text: String,
    pub table: Option<DataTable>,
    /// Id of the originating document step
    pub ast_node_id: Uuid,
}

/// Compile one feature document
pub fn compile(feature: &Feature) -> Vec<Pickle> {
    let feature_bg: &[Step] = feature
        .background
        .as_ref()
        .map(|b| b.steps.as_slice())
        .unwrap_or(&[]);

    let mut pickles = Vec::new();
    for child in &feature.children {
        match child {
            FeatureChild::Scenario(scenario) => {
                pickles.push(build(feature, &feature.tags, &[], feature_bg, &[], scenario));
            }
            FeatureChild::Rule(rule) => {
                let rule_bg: &[Step] = rule
                    .background
                    .as_ref()
                    .map(|b| b.steps.as_slice())
                    .unwrap_or(&[]);
                for scenario in &rule.scenarios {
                    pickles.push(build(
                        feature,
                        &feature.tags,
                        &rule.tags,
                        feature_bg,
                        rule_bg,
                        scenario,
                    ));
                }
            }
        }
    }
    pickles
}

/// Compile every document in the index, in load order
pub fn compile_all(index: &FeatureIndex) -> Vec<Pickle> {
    index.features().flat_map(compile).collect()
}

/// Keep only pickles carrying the given tag (leading `@` optional)
pub fn filter_by_tag(pickles: Vec<Pickle>, tag: &str) -> Vec<Pickle> {
    let want = tag.trim().trim_start_matches('@');
    pickles
        .into_iter()
        .filter(|p| p.tags.iter().any(|t| t.trim_start_matches('@') == want))
        .collect()
}

fn build(
    feature: &Feature,
    feature_tags: &[String],
    rule_tags: &[String],
    feature_bg: &[Step],
    rule_bg: &[Step],
    scenario: &Scenario,
) -> Pickle {
    let mut tags = Vec::new();
    tags.extend_from_slice(feature_tags);
    tags.extend_from_slice(rule_tags);
    tags.extend_from_slice(&scenario.tags);

    let steps = feature_bg
        .iter()
        .chain(rule_bg)
        .chain(&scenario.steps)
        .map(|step| PickleStep {
            id: Uuid::new_v4(),
            text: step.text.clone(),
            table: step.table.clone(),
            ast_node_id: step.id,
        })
        .collect();

    Pickle {
        id: Uuid::new_v4(),
        name: scenario.name.clone(),
        uri: feature.uri.clone(),
        tags,
        steps,
    }
}
