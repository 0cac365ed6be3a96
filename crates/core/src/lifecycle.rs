//! Per-scenario browser session lifecycle
//!
//! Each scenario gets its own browser, context, tracing span, and page.
//! Teardown stops tracing, captures failure diagnostics, and releases
//! everything in page, context, browser order. Capture problems are
//! logged and swallowed; they never replace the scenario's own result,
//! and resource release always runs.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::artifacts::ArtifactPaths;
use crate::browser::{BrowserEngine, BrowserHandle, ContextHandle, ContextOptions, Page};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::events::StepStatus;
use crate::pickle::Pickle;
use crate::report::ScenarioReport;

/// Live browser resources owned by one running scenario
pub struct ScenarioSession {
    browser: Box<dyn BrowserHandle>,
    context: Box<dyn ContextHandle>,
    page: Option<Page>,
}

impl ScenarioSession {
    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }
}

/// Provisions and tears down the browser session around each scenario
pub struct ScenarioManager {
    engine: Arc<dyn BrowserEngine>,
    config: Arc<HarnessConfig>,
    paths: ArtifactPaths,
}

impl ScenarioManager {
    pub fn new(engine: Arc<dyn BrowserEngine>, config: Arc<HarnessConfig>) -> Self {
        let paths = ArtifactPaths::new(&config.artifact_root);
        Self { engine, config, paths }
    }

    pub fn artifact_paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Launch the browser, open a recording context, start tracing, open a page
    pub async fn provision(&self, pickle: &Pickle) -> HarnessResult<ScenarioSession> {
        debug!(scenario = %pickle.name, browser = %self.config.browser, "Provisioning browser session");

        let browser = self
            .engine
            .launch(self.config.browser, self.config.headless)
            .await?;
        let context = browser
            .new_context(ContextOptions {
                base_url: self.config.base_url.clone(),
                viewport: self.config.viewport,
                record_video_dir: Some(self.paths.videos_dir()),
            })
            .await?;
        context
            .tracing_start(&format!("{}-{}", pickle.name, pickle.id), &pickle.name)
            .await?;
        let page = context.new_page().await?;

        Ok(ScenarioSession {
            browser,
            context,
            page: Some(Page::new(page)),
        })
    }

    /// Stop tracing, capture failure diagnostics, release all resources
    pub async fn teardown(
        &self,
        mut session: ScenarioSession,
        pickle: &Pickle,
        status: StepStatus,
        report: &mut ScenarioReport,
    ) {
        let trace_path = self.paths.trace_file(&pickle.id.to_string());
        let traced = match session.context.tracing_stop(&trace_path).await {
            Ok(()) => true,
            Err(e) => {
                warn!(scenario = %pickle.name, "Failed to stop tracing: {e}");
                false
            }
        };

        let mut page_closed = false;
        if status == StepStatus::Failed {
            if let Some(page) = session.page.as_ref() {
                self.attach_screenshot(page, pickle, report).await;
                if self.config.headless {
                    page_closed = self.attach_video(page, pickle, report).await;
                } else {
                    debug!(scenario = %pickle.name, "Skipping video capture in headed mode");
                }
            }
            if traced {
                report.attach_text(
                    &format!(
                        "<a href=\"https://trace.playwright.dev/\">Open trace file: {}</a>",
                        trace_path.display()
                    ),
                    "text/html",
                );
            }
        }

        if !page_closed {
            if let Some(page) = session.page.take() {
                if let Err(e) = page.close().await {
                    warn!(scenario = %pickle.name, "Failed to close page: {e}");
                }
            }
        }
        if let Err(e) = session.context.close().await {
            warn!(scenario = %pickle.name, "Failed to close context: {e}");
        }
        if let Err(e) = session.browser.close().await {
            warn!(scenario = %pickle.name, "Failed to close browser: {e}");
        }
    }

    async fn attach_screenshot(&self, page: &Page, pickle: &Pickle, report: &mut ScenarioReport) {
        let path = self
            .paths
            .screenshot_file(&pickle.name, &pickle.id.to_string());
        match page.screenshot(&path, true).await {
            Ok(bytes) => report.attach_bytes(&bytes, "image/png"),
            Err(e) => warn!(scenario = %pickle.name, "Failed to capture screenshot: {e}"),
        }
    }

    /// Returns true when the page was closed to finalize the recording
    async fn attach_video(&self, page: &Page, pickle: &Pickle, report: &mut ScenarioReport) -> bool {
        // the video file is only finalized once the page closes
        let captured: HarnessResult<Vec<u8>> = async {
            page.close().await?;
            let path = page
                .video_path()
                .await?
                .ok_or_else(|| HarnessError::Driver("No video was recorded".to_string()))?;
            Ok(tokio::fs::read(&path).await?)
        }
        .await;

        match captured {
            Ok(bytes) => {
                report.attach_bytes(&bytes, "video/webm");
                true
            }
            Err(e) => {
                warn!(scenario = %pickle.name, "Failed to attach video: {e}");
                false
            }
        }
    }
}
