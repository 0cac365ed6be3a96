//! Per-scenario execution context and the session data store

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::browser::Page;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::lifecycle::ScenarioSession;

/// Scratch values shared between the steps of one scenario
///
/// Every scenario starts with an empty store; nothing leaks between
/// scenarios. Writes are visible to all later steps of the same scenario.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    values: HashMap<String, Value>,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Execution context handed to every step of a scenario
pub struct ScenarioWorld {
    pub config: Arc<HarnessConfig>,
    pub session_data: SessionData,
    session: Option<ScenarioSession>,
}

impl ScenarioWorld {
    pub fn new(config: Arc<HarnessConfig>) -> Self {
        Self {
            config,
            session_data: SessionData::new(),
            session: None,
        }
    }

    /// The live page for this scenario
    ///
    /// Fails when the browser session was never provisioned or was already
    /// torn down, so steps never operate on a dangling page.
    pub fn page(&self) -> HarnessResult<&Page> {
        self.session
            .as_ref()
            .and_then(ScenarioSession::page)
            .ok_or(HarnessError::PageNotInitialized)
    }

    pub fn attach_session(&mut self, session: ScenarioSession) {
        self.session = Some(session);
    }

    pub fn take_session(&mut self) -> Option<ScenarioSession> {
        self.session.take()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }
}
