//! Execution event stream shared by the runner and its observers

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pickle::Pickle;

/// Outcome of one executed (or skipped) step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    Skipped,
    Undefined,
}

impl StepStatus {
    /// Severity for worst-result classification: failed > undefined > skipped > passed
    pub fn severity(self) -> u8 {
        match self {
            StepStatus::Passed => 0,
            StepStatus::Skipped => 1,
            StepStatus::Undefined => 2,
            StepStatus::Failed => 3,
        }
    }

    /// Worst status of a sequence; an empty sequence counts as passed
    pub fn worst(statuses: impl IntoIterator<Item = StepStatus>) -> StepStatus {
        statuses
            .into_iter()
            .max_by_key(|s| s.severity())
            .unwrap_or(StepStatus::Passed)
    }

    pub fn is_passed(self) -> bool {
        matches!(self, StepStatus::Passed)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepStatus::Passed => "passed",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
            StepStatus::Undefined => "undefined",
        };
        f.write_str(name)
    }
}

/// Events emitted while a run progresses
///
/// `case_id` identifies one execution of a pickle, so observers can track
/// concurrent bookkeeping without assuming pickle ids are unique per run.
#[derive(Debug, Clone)]
pub enum RunnerEvent {
    RunStarted,
    CaseStarted { case_id: Uuid, pickle: Arc<Pickle> },
    StepStarted { case_id: Uuid, step_id: Uuid },
    StepFinished {
        case_id: Uuid,
        step_id: Uuid,
        status: StepStatus,
    },
    CaseFinished { case_id: Uuid, status: StepStatus },
    RunFinished,
}

/// Consumers of the event stream (progress output, report sinks)
#[async_trait]
pub trait EventObserver: Send {
    async fn on_event(&mut self, event: &RunnerEvent);
}
