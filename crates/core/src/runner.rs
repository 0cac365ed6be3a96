//! Sequential scenario execution
//!
//! The runner owns the whole run: compile pickles, filter by tag, then for
//! each pickle provision a browser session, execute its steps against the
//! registry, tear the session down, and accumulate the run report. Steps
//! after a non-passing step are skipped. Every state change is emitted to
//! the registered observers.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::browser::BrowserEngine;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::events::{EventObserver, RunnerEvent, StepStatus};
use crate::gherkin::FeatureIndex;
use crate::lifecycle::ScenarioManager;
use crate::pickle::{self, Pickle, PickleStep};
use crate::registry::{StepArgs, StepRegistry};
use crate::report::{RunReport, RunSummary, ScenarioReport, StepRecord};
use crate::world::ScenarioWorld;

pub struct Runner {
    config: Arc<HarnessConfig>,
    index: Arc<FeatureIndex>,
    manager: ScenarioManager,
    registry: StepRegistry,
    observers: Vec<Box<dyn EventObserver>>,
}

impl Runner {
    pub fn new(
        config: Arc<HarnessConfig>,
        index: Arc<FeatureIndex>,
        engine: Arc<dyn BrowserEngine>,
        registry: StepRegistry,
    ) -> Self {
        let manager = ScenarioManager::new(engine, config.clone());
        Self {
            config,
            index,
            manager,
            registry,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn EventObserver>) {
        self.observers.push(observer);
    }

    async fn emit(&mut self, event: RunnerEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event).await;
        }
    }

    /// Execute every selected scenario and write the run report
    pub async fn run(&mut self) -> HarnessResult<RunReport> {
        self.manager.artifact_paths().ensure_dirs()?;

        let mut pickles = pickle::compile_all(&self.index);
        if let Some(tag) = self.config.tags.clone() {
            pickles = pickle::filter_by_tag(pickles, &tag);
        }
        info!(scenarios = pickles.len(), "Starting test run");

        let started_at = Utc::now();
        let start = Instant::now();
        self.emit(RunnerEvent::RunStarted).await;

        let mut scenarios = Vec::with_capacity(pickles.len());
        for pickle in pickles {
            scenarios.push(self.run_pickle(Arc::new(pickle)).await);
        }

        self.emit(RunnerEvent::RunFinished).await;
        let finished_at = Utc::now();

        let summary = RunSummary::from_scenarios(&scenarios, start.elapsed().as_millis() as u64);
        let report = RunReport {
            started_at,
            finished_at,
            summary,
            scenarios,
        };

        let report_path = self.manager.artifact_paths().report_file();
        report.write(&report_path)?;
        info!(path = %report_path.display(), "Wrote run report");

        Ok(report)
    }

    async fn run_pickle(&mut self, pickle: Arc<Pickle>) -> ScenarioReport {
        let case_id = Uuid::new_v4();
        self.emit(RunnerEvent::CaseStarted {
            case_id,
            pickle: pickle.clone(),
        })
        .await;

        let mut report = ScenarioReport::new(case_id, &pickle);
        let mut world = ScenarioWorld::new(self.config.clone());
        let case_start = Instant::now();

        // A provisioning failure fails the scenario without running a step
        let provision_error = match self.manager.provision(&pickle).await {
            Ok(session) => {
                world.attach_session(session);
                None
            }
            Err(e) => {
                error!(scenario = %pickle.name, "Failed to provision browser session: {e}");
                Some(e.to_string())
            }
        };

        let mut halted = provision_error.is_some();
        let mut statuses = Vec::with_capacity(pickle.steps.len());

        for step in &pickle.steps {
            self.emit(RunnerEvent::StepStarted {
                case_id,
                step_id: step.id,
            })
            .await;
            let step_start = Instant::now();

            let (status, step_error) = if halted {
                (StepStatus::Skipped, None)
            } else {
                self.execute_step(&mut world, step).await
            };

            if !status.is_passed() {
                halted = true;
            }
            statuses.push(status);

            let keyword = self
                .index
                .keyword_for(&pickle, step)
                .map(|k| k.trim_end().to_string())
                .unwrap_or_default();
            report.steps.push(StepRecord {
                keyword,
                text: step.text.clone(),
                status,
                duration_ms: step_start.elapsed().as_millis() as u64,
                error: step_error,
            });

            self.emit(RunnerEvent::StepFinished {
                case_id,
                step_id: step.id,
                status,
            })
            .await;
        }

        let mut status = StepStatus::worst(statuses);
        if provision_error.is_some() {
            status = StepStatus::Failed;
        }
        report.status = status;
        report.error = provision_error;

        if let Some(session) = world.take_session() {
            self.manager
                .teardown(session, &pickle, status, &mut report)
                .await;
        }

        report.duration_ms = case_start.elapsed().as_millis() as u64;
        self.emit(RunnerEvent::CaseFinished { case_id, status }).await;
        debug!(scenario = %pickle.name, status = %status, "Scenario finished");

        report
    }

    async fn execute_step(
        &self,
        world: &mut ScenarioWorld,
        step: &PickleStep,
    ) -> (StepStatus, Option<String>) {
        let Some(resolved) = self.registry.resolve(&step.text) else {
            return (
                StepStatus::Undefined,
                Some(format!("No step definition matches \"{}\"", step.text)),
            );
        };

        let args = StepArgs::new(resolved.captures, step.table.as_ref());
        let fut = (resolved.handler)(world, args);
        match tokio::time::timeout(self.config.step_timeout, fut).await {
            Ok(Ok(())) => (StepStatus::Passed, None),
            Ok(Err(e)) => (StepStatus::Failed, Some(e.to_string())),
            Err(_) => {
                let timeout = HarnessError::Timeout {
                    seconds: self.config.step_timeout.as_secs(),
                };
                (StepStatus::Failed, Some(timeout.to_string()))
            }
        }
    }
}
