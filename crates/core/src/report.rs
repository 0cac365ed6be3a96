//! Run and scenario reports
//!
//! Attachments follow the legacy suite's protocol: a body plus a media
//! type. Binary bodies are stored base64-encoded so the whole report
//! serializes to a single JSON document.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HarnessResult;
use crate::events::StepStatus;
use crate::pickle::Pickle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub media_type: String,
    #[serde(flatten)]
    pub body: AttachmentBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "body", rename_all = "snake_case")]
pub enum AttachmentBody {
    Text(String),
    Base64(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub keyword: String,
    pub text: String,
    pub status: StepStatus,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything recorded about one executed scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub case_id: Uuid,
    pub name: String,
    pub uri: String,
    pub status: StepStatus,
    pub duration_ms: u64,
    pub steps: Vec<StepRecord>,
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioReport {
    pub fn new(case_id: Uuid, pickle: &Pickle) -> Self {
        Self {
            case_id,
            name: pickle.name.clone(),
            uri: pickle.uri.clone(),
            status: StepStatus::Passed,
            duration_ms: 0,
            steps: Vec::new(),
            attachments: Vec::new(),
            error: None,
        }
    }

    /// Attach a binary artifact
    pub fn attach_bytes(&mut self, bytes: &[u8], media_type: &str) {
        self.attachments.push(Attachment {
            media_type: media_type.to_string(),
            body: AttachmentBody::Base64(STANDARD.encode(bytes)),
        });
    }

    /// Attach a textual artifact
    pub fn attach_text(&mut self, text: &str, media_type: &str) {
        self.attachments.push(Attachment {
            media_type: media_type.to_string(),
            body: AttachmentBody::Text(text.to_string()),
        });
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub scenarios_total: usize,
    pub scenarios_passed: usize,
    pub scenarios_failed: usize,
    pub scenarios_skipped: usize,
    pub steps_total: usize,
    pub steps_passed: usize,
    pub steps_failed: usize,
    pub steps_skipped: usize,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn from_scenarios(scenarios: &[ScenarioReport], duration_ms: u64) -> Self {
        let mut summary = Self {
            scenarios_total: scenarios.len(),
            duration_ms,
            ..Default::default()
        };
        for scenario in scenarios {
            match scenario.status {
                StepStatus::Passed => summary.scenarios_passed += 1,
                StepStatus::Failed => summary.scenarios_failed += 1,
                StepStatus::Skipped => summary.scenarios_skipped += 1,
                StepStatus::Undefined => {}
            }
            for step in &scenario.steps {
                summary.steps_total += 1;
                match step.status {
                    StepStatus::Passed => summary.steps_passed += 1,
                    StepStatus::Failed => summary.steps_failed += 1,
                    StepStatus::Skipped => summary.steps_skipped += 1,
                    StepStatus::Undefined => {}
                }
            }
        }
        summary
    }
}

/// The whole run, written to `test-results/report.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn write(&self, path: &Path) -> HarnessResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pickle() -> Pickle {
        Pickle {
            id: Uuid::new_v4(),
            name: "Login: valid admin".to_string(),
            uri: "login.feature".to_string(),
            tags: vec![],
            steps: vec![],
        }
    }

    #[test]
    fn binary_attachments_are_base64_encoded() {
        let mut report = ScenarioReport::new(Uuid::new_v4(), &sample_pickle());
        report.attach_bytes(b"\x89PNG", "image/png");
        report.attach_text("<a href=\"x\">trace</a>", "text/html");

        assert_eq!(report.attachments.len(), 2);
        match &report.attachments[0].body {
            AttachmentBody::Base64(data) => assert_eq!(data, &STANDARD.encode(b"\x89PNG")),
            other => panic!("expected base64 body, got {other:?}"),
        }
        assert_eq!(report.attachments[1].media_type, "text/html");
    }

    #[test]
    fn summary_counts_scenarios_and_steps() {
        let mut passed = ScenarioReport::new(Uuid::new_v4(), &sample_pickle());
        passed.status = StepStatus::Passed;
        passed.steps.push(StepRecord {
            keyword: "Given".to_string(),
            text: "a".to_string(),
            status: StepStatus::Passed,
            duration_ms: 10,
            error: None,
        });

        let mut failed = ScenarioReport::new(Uuid::new_v4(), &sample_pickle());
        failed.status = StepStatus::Failed;
        for status in [StepStatus::Failed, StepStatus::Skipped, StepStatus::Undefined] {
            failed.steps.push(StepRecord {
                keyword: "When".to_string(),
                text: "b".to_string(),
                status,
                duration_ms: 0,
                error: None,
            });
        }

        let summary = RunSummary::from_scenarios(&[passed, failed], 1234);
        assert_eq!(summary.scenarios_total, 2);
        assert_eq!(summary.scenarios_passed, 1);
        assert_eq!(summary.scenarios_failed, 1);
        assert_eq!(summary.steps_total, 4);
        assert_eq!(summary.steps_passed, 1);
        assert_eq!(summary.steps_failed, 1);
        assert_eq!(summary.steps_skipped, 1);
        assert_eq!(summary.duration_ms, 1234);
    }

    #[test]
    fn report_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("report.json");

        let report = RunReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            summary: RunSummary::default(),
            scenarios: vec![],
        };
        report.write(&path).unwrap();

        let loaded = RunReport::load(&path).unwrap();
        assert_eq!(loaded.summary.scenarios_total, 0);
    }
}
