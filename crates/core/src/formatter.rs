//! Live progress output
//!
//! One line per step, colorized by keyword, rewritten in place once the
//! step finishes (`\r` plus clear-line), followed by a run summary. The
//! sink is injectable; production writes to stdout.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use colored::{ColoredString, Colorize};
use uuid::Uuid;

use crate::events::{EventObserver, RunnerEvent, StepStatus};
use crate::gherkin::FeatureIndex;
use crate::pickle::Pickle;

/// Running totals across the whole run
///
/// Undefined steps raise the totals but land in no bucket, so the bucket
/// counts always sum to at most the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounters {
    pub scenarios_total: usize,
    pub scenarios_passed: usize,
    pub scenarios_failed: usize,
    pub scenarios_skipped: usize,
    pub steps_total: usize,
    pub steps_passed: usize,
    pub steps_failed: usize,
    pub steps_skipped: usize,
}

impl ProgressCounters {
    fn record_step(&mut self, status: StepStatus) {
        self.steps_total += 1;
        match status {
            StepStatus::Passed => self.steps_passed += 1,
            StepStatus::Failed => self.steps_failed += 1,
            StepStatus::Skipped => self.steps_skipped += 1,
            StepStatus::Undefined => {}
        }
    }

    fn record_scenario(&mut self, status: StepStatus) {
        self.scenarios_total += 1;
        match status {
            StepStatus::Passed => self.scenarios_passed += 1,
            StepStatus::Failed => self.scenarios_failed += 1,
            StepStatus::Skipped => self.scenarios_skipped += 1,
            StepStatus::Undefined => {}
        }
    }
}

/// Streams step-by-step progress to a sink as runner events arrive
pub struct ProgressFormatter {
    out: Box<dyn Write + Send>,
    index: Arc<FeatureIndex>,
    active: HashMap<Uuid, Arc<Pickle>>,
    counters: ProgressCounters,
    started: Option<Instant>,
}

impl ProgressFormatter {
    pub fn stdout(index: Arc<FeatureIndex>) -> Self {
        Self::with_sink(index, Box::new(io::stdout()))
    }

    pub fn with_sink(index: Arc<FeatureIndex>, out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            index,
            active: HashMap::new(),
            counters: ProgressCounters::default(),
            started: None,
        }
    }

    pub fn counters(&self) -> ProgressCounters {
        self.counters
    }

    /// Keyword (normalized to one trailing space) and text of a step
    fn step_parts(&self, case_id: Uuid, step_id: Uuid) -> Option<(String, String)> {
        let pickle = self.active.get(&case_id)?;
        let step = pickle.steps.iter().find(|s| s.id == step_id)?;
        let keyword = self
            .index
            .keyword_for(pickle, step)
            .map(|k| format!("{} ", k.trim()))
            .unwrap_or_default();
        Some((keyword, step.text.clone()))
    }

    fn write_case_started(&mut self, name: &str) {
        let _ = write!(self.out, "\n▶️  Running: {name}\n");
        let _ = self.out.flush();
    }

    fn write_step_started(&mut self, case_id: Uuid, step_id: Uuid) {
        let Some((keyword, text)) = self.step_parts(case_id, step_id) else {
            return;
        };
        // no newline: the finished line replaces this one
        let _ = write!(self.out, "  ⏳ {}{}", paint_keyword(&keyword), text.bright_black());
        let _ = self.out.flush();
    }

    fn write_step_finished(&mut self, case_id: Uuid, step_id: Uuid, status: StepStatus) {
        self.counters.record_step(status);
        let Some((keyword, text)) = self.step_parts(case_id, step_id) else {
            return;
        };
        let _ = write!(
            self.out,
            "\r\x1b[K  {} {}{}\n",
            status_icon(status),
            paint_keyword(&keyword),
            text
        );
        let _ = self.out.flush();
    }

    fn write_run_finished(&mut self) {
        let elapsed = self
            .started
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let summary = render_summary(&self.counters, elapsed);
        let _ = self.out.write_all(summary.as_bytes());
        let _ = self.out.flush();
    }
}

#[async_trait]
impl EventObserver for ProgressFormatter {
    async fn on_event(&mut self, event: &RunnerEvent) {
        match event {
            RunnerEvent::RunStarted => {
                self.started = Some(Instant::now());
            }
            RunnerEvent::CaseStarted { case_id, pickle } => {
                self.active.insert(*case_id, pickle.clone());
                self.write_case_started(&pickle.name);
            }
            RunnerEvent::StepStarted { case_id, step_id } => {
                self.write_step_started(*case_id, *step_id);
            }
            RunnerEvent::StepFinished { case_id, step_id, status } => {
                self.write_step_finished(*case_id, *step_id, *status);
            }
            RunnerEvent::CaseFinished { case_id, status } => {
                self.counters.record_scenario(*status);
                self.active.remove(case_id);
            }
            RunnerEvent::RunFinished => {
                self.write_run_finished();
            }
        }
    }
}

fn status_icon(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Passed => "✅",
        StepStatus::Failed => "❌",
        StepStatus::Skipped => "⊘",
        StepStatus::Undefined => "⚠️",
    }
}

/// Keyword coloring: Given blue, When yellow, Then green, And cyan,
/// But magenta, anything else plain bold
fn paint_keyword(keyword: &str) -> ColoredString {
    match keyword.trim().to_ascii_lowercase().as_str() {
        "given" => keyword.blue().bold(),
        "when" => keyword.yellow().bold(),
        "then" => keyword.green().bold(),
        "and" => keyword.cyan().bold(),
        "but" => keyword.magenta().bold(),
        _ => keyword.bold(),
    }
}

fn bucket_line(total: usize, noun: &str, passed: usize, failed: usize, skipped: usize) -> String {
    let mut line = format!("{total} {noun} ({passed} passed");
    if failed > 0 {
        line.push_str(&format!(", {failed} failed"));
    }
    if skipped > 0 {
        line.push_str(&format!(", {skipped} skipped"));
    }
    line.push(')');
    line
}

fn render_summary(counters: &ProgressCounters, elapsed_secs: f64) -> String {
    format!(
        "\nTest Execution Summary:\n{}\n{}\n{:.3}s\n",
        bucket_line(
            counters.scenarios_total,
            "scenarios",
            counters.scenarios_passed,
            counters.scenarios_failed,
            counters.scenarios_skipped,
        ),
        bucket_line(
            counters.steps_total,
            "steps",
            counters.steps_passed,
            counters.steps_failed,
            counters.steps_skipped,
        ),
        elapsed_secs
    )
}
