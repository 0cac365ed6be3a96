//! Gherkin feature documents: model, parser, and index
//!
//! The parser covers the dialect the suite actually writes: features,
//! backgrounds, rules, scenarios, steps, tags, comments, and data tables.
//! Scenario outlines and doc strings are rejected with a parse error
//! instead of being silently misread.

use std::collections::HashMap;
use std::path::Path;

use uuid::Uuid;

use crate::error::{HarnessError, HarnessResult};
use crate::pickle::{Pickle, PickleStep};

/// A parsed feature document
#[derive(Debug, Clone)]
pub struct Feature {
    /// Source path, used to resolve keywords for compiled steps
    pub uri: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub background: Option<Background>,
    pub children: Vec<FeatureChild>,
}

#[derive(Debug, Clone)]
pub enum FeatureChild {
    Scenario(Scenario),
    Rule(Rule),
}

#[derive(Debug, Clone, Default)]
pub struct Background {
    pub name: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub tags: Vec<String>,
    pub background: Option<Background>,
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub tags: Vec<String>,
    pub steps: Vec<Step>,
}

/// A source step with its keyword kept verbatim (trailing space included)
#[derive(Debug, Clone)]
pub struct Step {
    pub id: Uuid,
    pub keyword: String,
    pub text: String,
    pub table: Option<DataTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTable {
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Two-column table as a key/value map, first column keying the second
    pub fn rows_hash(&self) -> HarnessResult<HashMap<String, String>> {
        let mut map = HashMap::new();
        for row in &self.rows {
            if row.len() != 2 {
                return Err(HarnessError::DataTableShape(row.len()));
            }
            map.insert(row[0].clone(), row[1].clone());
        }
        Ok(map)
    }
}

const STEP_KEYWORDS: &[&str] = &["Given ", "When ", "Then ", "And ", "But ", "* "];

impl Feature {
    pub fn parse(source: &str, uri: &str) -> HarnessResult<Self> {
        let mut feature: Option<Feature> = None;
        let mut pending_tags: Vec<String> = Vec::new();
        let mut rule: Option<Rule> = None;
        let mut background: Option<Background> = None;
        let mut scenario: Option<Scenario> = None;
        let mut description: Vec<String> = Vec::new();
        let mut saw_body = false;

        for (idx, raw) in source.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('@') {
                for tag in line.split_whitespace() {
                    if !tag.starts_with('@') {
                        return Err(parse_err(uri, line_no, format!("Malformed tag line: {line}")));
                    }
                    pending_tags.push(tag.to_string());
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix("Feature:") {
                if feature.is_some() {
                    return Err(parse_err(uri, line_no, "Duplicate Feature declaration"));
                }
                feature = Some(Feature {
                    uri: uri.to_string(),
                    name: rest.trim().to_string(),
                    description: String::new(),
                    tags: std::mem::take(&mut pending_tags),
                    background: None,
                    children: Vec::new(),
                });
                continue;
            }

            let Some(feat) = feature.as_mut() else {
                return Err(parse_err(uri, line_no, "Content before Feature declaration"));
            };

            if line.starts_with("Scenario Outline:") || line.starts_with("Scenario Template:") {
                return Err(parse_err(uri, line_no, "Scenario Outline is not supported"));
            }
            if line.starts_with("\"\"\"") || line.starts_with("```") {
                return Err(parse_err(uri, line_no, "Doc strings are not supported"));
            }

            if let Some(rest) = line.strip_prefix("Rule:") {
                flush_background(&mut background, &mut rule, feat);
                flush_scenario(&mut scenario, &mut rule, feat);
                if let Some(done) = rule.take() {
                    feat.children.push(FeatureChild::Rule(done));
                }
                rule = Some(Rule {
                    name: rest.trim().to_string(),
                    tags: std::mem::take(&mut pending_tags),
                    background: None,
                    scenarios: Vec::new(),
                });
                saw_body = true;
                continue;
            }

            if let Some(rest) = line.strip_prefix("Background:") {
                if !pending_tags.is_empty() {
                    return Err(parse_err(uri, line_no, "Tags are not allowed on a Background"));
                }
                flush_scenario(&mut scenario, &mut rule, feat);
                let scope_has_background = match &rule {
                    Some(r) => r.background.is_some(),
                    None => feat.background.is_some(),
                };
                if background.is_some() || scope_has_background {
                    return Err(parse_err(uri, line_no, "Duplicate Background in this scope"));
                }
                background = Some(Background {
                    name: rest.trim().to_string(),
                    steps: Vec::new(),
                });
                saw_body = true;
                continue;
            }

            if let Some(rest) = line
                .strip_prefix("Scenario:")
                .or_else(|| line.strip_prefix("Example:"))
            {
                flush_background(&mut background, &mut rule, feat);
                flush_scenario(&mut scenario, &mut rule, feat);
                scenario = Some(Scenario {
                    name: rest.trim().to_string(),
                    tags: std::mem::take(&mut pending_tags),
                    steps: Vec::new(),
                });
                saw_body = true;
                continue;
            }

            if let Some((keyword, text)) = split_step_keyword(line) {
                let step = Step {
                    id: Uuid::new_v4(),
                    keyword,
                    text,
                    table: None,
                };
                if let Some(sc) = scenario.as_mut() {
                    sc.steps.push(step);
                } else if let Some(bg) = background.as_mut() {
                    bg.steps.push(step);
                } else {
                    return Err(parse_err(uri, line_no, "Step outside a Scenario or Background"));
                }
                continue;
            }

            if line.starts_with('|') {
                let cells = parse_table_row(line);
                let steps = if let Some(sc) = scenario.as_mut() {
                    &mut sc.steps
                } else if let Some(bg) = background.as_mut() {
                    &mut bg.steps
                } else {
                    return Err(parse_err(uri, line_no, "Table row outside a Scenario or Background"));
                };
                let Some(last) = steps.last_mut() else {
                    return Err(parse_err(uri, line_no, "Table row without a preceding step"));
                };
                last.table.get_or_insert_with(DataTable::default).rows.push(cells);
                continue;
            }

            // free text is description; only the feature-level block is kept
            if !saw_body {
                description.push(line.to_string());
            }
        }

        let mut feat =
            feature.ok_or_else(|| parse_err(uri, 1, "No Feature declaration found"))?;
        flush_background(&mut background, &mut rule, &mut feat);
        flush_scenario(&mut scenario, &mut rule, &mut feat);
        if let Some(done) = rule.take() {
            feat.children.push(FeatureChild::Rule(done));
        }
        feat.description = description.join("\n");
        Ok(feat)
    }

    pub fn parse_file(path: &Path) -> HarnessResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source, &path.display().to_string())
    }

    /// Locate a source step anywhere in the document by its id
    pub fn step_by_id(&self, id: Uuid) -> Option<&Step> {
        if let Some(bg) = &self.background {
            if let Some(step) = bg.steps.iter().find(|s| s.id == id) {
                return Some(step);
            }
        }
        for child in &self.children {
            match child {
                FeatureChild::Scenario(sc) => {
                    if let Some(step) = sc.steps.iter().find(|s| s.id == id) {
                        return Some(step);
                    }
                }
                FeatureChild::Rule(rule) => {
                    if let Some(bg) = &rule.background {
                        if let Some(step) = bg.steps.iter().find(|s| s.id == id) {
                            return Some(step);
                        }
                    }
                    for sc in &rule.scenarios {
                        if let Some(step) = sc.steps.iter().find(|s| s.id == id) {
                            return Some(step);
                        }
                    }
                }
            }
        }
        None
    }
}

fn flush_scenario(scenario: &mut Option<Scenario>, rule: &mut Option<Rule>, feat: &mut Feature) {
    if let Some(sc) = scenario.take() {
        match rule.as_mut() {
            Some(r) => r.scenarios.push(sc),
            None => feat.children.push(FeatureChild::Scenario(sc)),
        }
    }
}

fn flush_background(background: &mut Option<Background>, rule: &mut Option<Rule>, feat: &mut Feature) {
    if let Some(bg) = background.take() {
        match rule.as_mut() {
            Some(r) => r.background = Some(bg),
            None => feat.background = Some(bg),
        }
    }
}

fn split_step_keyword(line: &str) -> Option<(String, String)> {
    for keyword in STEP_KEYWORDS {
        if let Some(rest) = line.strip_prefix(keyword) {
            return Some((keyword.to_string(), rest.trim().to_string()));
        }
    }
    None
}

fn parse_table_row(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn parse_err(uri: &str, line: usize, message: impl Into<String>) -> HarnessError {
    HarnessError::FeatureParse {
        uri: uri.to_string(),
        line,
        message: message.into(),
    }
}

/// Load every `.feature` file under a directory
pub fn load_features(dir: &Path) -> HarnessResult<Vec<Feature>> {
    let mut features = Vec::new();

    for entry in walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "feature")
                .unwrap_or(false)
        })
    {
        features.push(Feature::parse_file(entry.path())?);
    }

    Ok(features)
}

/// Parsed documents keyed by uri, shared between the runner and observers
#[derive(Debug, Default)]
pub struct FeatureIndex {
    by_uri: HashMap<String, Feature>,
    order: Vec<String>,
}

impl FeatureIndex {
    pub fn new(features: Vec<Feature>) -> Self {
        let mut by_uri = HashMap::new();
        let mut order = Vec::new();
        for feature in features {
            order.push(feature.uri.clone());
            by_uri.insert(feature.uri.clone(), feature);
        }
        Self { by_uri, order }
    }

    pub fn load(dir: &Path) -> HarnessResult<Self> {
        Ok(Self::new(load_features(dir)?))
    }

    pub fn feature(&self, uri: &str) -> Option<&Feature> {
        self.by_uri.get(uri)
    }

    /// Documents in load order
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.order.iter().filter_map(|uri| self.by_uri.get(uri))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Verbatim keyword of the source step behind a compiled step
    pub fn keyword_for(&self, pickle: &Pickle, step: &PickleStep) -> Option<&str> {
        self.feature(&pickle.uri)?
            .step_by_id(step.ast_node_id)
            .map(|s| s.keyword.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"
@regression
Feature: Claim configuration
  Event types are maintained by the admin.

  Background:
    Given the admin user login to Orangehrm site

  @smoke
  Scenario: Open the claim module
    When the user views the "Claim" Module
    Then the "Claim" page is displayed

  Rule: Event records
    Background:
      Given the user views the Events type records

    Scenario: Add an event
      When the user adds new event type record with the following details
        | Event Name  | Offsite |
        | Description | Annual  |
      Then the event record is added successfully
      But the record count stays visible
"#;

    #[test]
    fn parses_full_document_shape() {
        let feature = Feature::parse(DOCUMENT, "claim.feature").unwrap();
        assert_eq!(feature.name, "Claim configuration");
        assert_eq!(feature.tags, vec!["@regression"]);
        assert_eq!(feature.description, "Event types are maintained by the admin.");

        let bg = feature.background.as_ref().unwrap();
        assert_eq!(bg.steps.len(), 1);
        assert_eq!(bg.steps[0].keyword, "Given ");

        assert_eq!(feature.children.len(), 2);
        let FeatureChild::Scenario(first) = &feature.children[0] else {
            panic!("expected scenario first");
        };
        assert_eq!(first.name, "Open the claim module");
        assert_eq!(first.tags, vec!["@smoke"]);
        assert_eq!(first.steps[1].keyword, "Then ");

        let FeatureChild::Rule(rule) = &feature.children[1] else {
            panic!("expected rule second");
        };
        assert_eq!(rule.name, "Event records");
        assert!(rule.background.is_some());
        assert_eq!(rule.scenarios.len(), 1);
        assert_eq!(rule.scenarios[0].steps[2].keyword, "But ");
    }

    #[test]
    fn attaches_data_table_to_preceding_step() {
        let feature = Feature::parse(DOCUMENT, "claim.feature").unwrap();
        let FeatureChild::Rule(rule) = &feature.children[1] else {
            panic!("expected rule");
        };
        let table = rule.scenarios[0].steps[0].table.as_ref().unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Event Name", "Offsite"]);

        let hash = table.rows_hash().unwrap();
        assert_eq!(hash.get("Description").map(String::as_str), Some("Annual"));
    }

    #[test]
    fn rows_hash_rejects_wide_rows() {
        let table = DataTable {
            rows: vec![vec!["a".into(), "b".into(), "c".into()]],
        };
        assert!(matches!(
            table.rows_hash(),
            Err(HarnessError::DataTableShape(3))
        ));
    }

    #[test]
    fn step_by_id_reaches_rule_nested_steps() {
        let feature = Feature::parse(DOCUMENT, "claim.feature").unwrap();
        let FeatureChild::Rule(rule) = &feature.children[1] else {
            panic!("expected rule");
        };
        let id = rule.background.as_ref().unwrap().steps[0].id;
        assert_eq!(feature.step_by_id(id).unwrap().text, "the user views the Events type records");
    }

    #[test]
    fn rejects_scenario_outline() {
        let source = "Feature: x\n  Scenario Outline: y\n    Given a <thing>\n";
        let err = Feature::parse(source, "x.feature").unwrap_err();
        assert!(err.to_string().contains("Scenario Outline"));
    }

    #[test]
    fn rejects_step_before_any_container() {
        let source = "Feature: x\n  Given a step\n";
        assert!(Feature::parse(source, "x.feature").is_err());
    }

    #[test]
    fn rejects_content_before_feature() {
        let source = "Scenario: orphan\n  Given a step\n";
        assert!(Feature::parse(source, "x.feature").is_err());
    }

    #[test]
    fn rejects_duplicate_background() {
        let source = "Feature: x\n  Background:\n    Given a\n  Background:\n    Given b\n";
        let err = Feature::parse(source, "x.feature").unwrap_err();
        assert!(err.to_string().contains("Duplicate Background"));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let source = "# top comment\nFeature: x\n\n  Scenario: s\n    # inline comment\n    Given a step\n";
        let feature = Feature::parse(source, "x.feature").unwrap();
        let FeatureChild::Scenario(sc) = &feature.children[0] else {
            panic!("expected scenario");
        };
        assert_eq!(sc.steps.len(), 1);
    }

    #[test]
    fn index_finds_features_by_uri() {
        let feature = Feature::parse(DOCUMENT, "claim.feature").unwrap();
        let index = FeatureIndex::new(vec![feature]);
        assert_eq!(index.len(), 1);
        assert!(index.feature("claim.feature").is_some());
        assert!(index.feature("missing.feature").is_none());
    }
}
