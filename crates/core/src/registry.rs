//! Step definitions and pattern matching
//!
//! Patterns are cucumber expressions: literal text plus `{string}`,
//! `{int}`, and `{word}` parameters, compiled to anchored regexes at
//! registration time. The typed `given`/`when`/`then` adapters all funnel
//! into one registration path; matching considers every entry regardless
//! of kind, as cucumber does.

use futures::future::BoxFuture;
use regex::Regex;

use crate::error::{HarnessError, HarnessResult};
use crate::gherkin::DataTable;
use crate::world::ScenarioWorld;

/// Handler signature for step definitions
pub type StepFn =
    for<'a> fn(&'a mut ScenarioWorld, StepArgs<'a>) -> BoxFuture<'a, HarnessResult<()>>;

/// Arguments captured for one step invocation
pub struct StepArgs<'a> {
    captures: Vec<String>,
    table: Option<&'a DataTable>,
}

impl<'a> StepArgs<'a> {
    pub fn new(captures: Vec<String>, table: Option<&'a DataTable>) -> Self {
        Self { captures, table }
    }

    /// Capture at `index` as text
    pub fn string(&self, index: usize) -> HarnessResult<&str> {
        self.captures
            .get(index)
            .map(String::as_str)
            .ok_or(HarnessError::StepArgument { index, expected: "string" })
    }

    /// Capture at `index` as a signed integer
    pub fn int(&self, index: usize) -> HarnessResult<i64> {
        let raw = self
            .captures
            .get(index)
            .ok_or(HarnessError::StepArgument { index, expected: "integer" })?;
        raw.parse()
            .map_err(|_| HarnessError::StepArgument { index, expected: "integer" })
    }

    /// The step's data table
    pub fn table(&self) -> HarnessResult<&DataTable> {
        self.table.ok_or(HarnessError::MissingDataTable)
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Given,
    When,
    Then,
}

struct StepEntry {
    kind: StepKind,
    pattern: String,
    regex: Regex,
    handler: StepFn,
}

/// A definition matched against a concrete step text
pub struct ResolvedStep {
    pub handler: StepFn,
    pub captures: Vec<String>,
}

/// All registered step definitions
#[derive(Default)]
pub struct StepRegistry {
    entries: Vec<StepEntry>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn given(&mut self, pattern: &str, handler: StepFn) -> HarnessResult<()> {
        self.register(StepKind::Given, pattern, handler)
    }

    pub fn when(&mut self, pattern: &str, handler: StepFn) -> HarnessResult<()> {
        self.register(StepKind::When, pattern, handler)
    }

    pub fn then(&mut self, pattern: &str, handler: StepFn) -> HarnessResult<()> {
        self.register(StepKind::Then, pattern, handler)
    }

    pub fn register(
        &mut self,
        kind: StepKind,
        pattern: &str,
        handler: StepFn,
    ) -> HarnessResult<()> {
        let regex = compile_expression(pattern)?;
        self.entries.push(StepEntry {
            kind,
            pattern: pattern.to_string(),
            regex,
            handler,
        });
        Ok(())
    }

    /// First registered definition whose pattern matches the text
    pub fn resolve(&self, text: &str) -> Option<ResolvedStep> {
        for entry in &self.entries {
            if let Some(caps) = entry.regex.captures(text) {
                let captures = caps
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str().to_string())
                    .collect();
                return Some(ResolvedStep { handler: entry.handler, captures });
            }
        }
        None
    }

    /// Registered patterns with their kinds, in registration order
    pub fn patterns(&self) -> impl Iterator<Item = (StepKind, &str)> {
        self.entries.iter().map(|e| (e.kind, e.pattern.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compile a cucumber expression into an anchored regex
fn compile_expression(pattern: &str) -> HarnessResult<Regex> {
    let mut source = String::from("^");
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        let (literal, after) = rest.split_at(open);
        source.push_str(&regex::escape(literal));

        let Some(close) = after.find('}') else {
            return Err(HarnessError::StepPattern {
                pattern: pattern.to_string(),
                message: "Unclosed parameter".to_string(),
            });
        };
        let group = match &after[1..close] {
            "string" => r#""([^"]*)""#,
            "int" => r"(-?\d+)",
            "word" => r"(\S+)",
            other => {
                return Err(HarnessError::StepPattern {
                    pattern: pattern.to_string(),
                    message: format!("Unknown parameter type {{{other}}}"),
                })
            }
        };
        source.push_str(group);
        rest = &after[close + 1..];
    }
    source.push_str(&regex::escape(rest));
    source.push('$');

    Regex::new(&source).map_err(|e| HarnessError::StepPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}
