//! Recording browser doubles shared by the integration tests

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use drover_core::browser::{
    BrowserEngine, BrowserHandle, BrowserKind, ContextHandle, ContextOptions, PageHandle,
};
use drover_core::config::HarnessConfig;
use drover_core::error::{HarnessError, HarnessResult};

/// Ordered log of every driver operation the harness issued
pub type OpLog = Arc<Mutex<Vec<String>>>;

pub fn new_ops() -> OpLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn log(ops: &OpLog, entry: impl Into<String>) {
    ops.lock().unwrap().push(entry.into());
}

pub fn entries(ops: &OpLog) -> Vec<String> {
    ops.lock().unwrap().clone()
}

/// Switches that make individual driver operations fail
#[derive(Debug, Clone, Copy, Default)]
pub struct FailPoints {
    pub launch: bool,
    pub tracing_stop: bool,
    pub screenshot: bool,
    pub video: bool,
}

pub struct MockEngine {
    pub ops: OpLog,
    pub video_file: Option<PathBuf>,
    pub fail: FailPoints,
}

impl MockEngine {
    pub fn new(ops: OpLog) -> Self {
        Self { ops, video_file: None, fail: FailPoints::default() }
    }

    pub fn with_video(mut self, path: PathBuf) -> Self {
        self.video_file = Some(path);
        self
    }

    pub fn with_fail(mut self, fail: FailPoints) -> Self {
        self.fail = fail;
        self
    }
}

#[async_trait]
impl BrowserEngine for MockEngine {
    async fn launch(
        &self,
        kind: BrowserKind,
        headless: bool,
    ) -> HarnessResult<Box<dyn BrowserHandle>> {
        log(&self.ops, format!("launch {kind} headless={headless}"));
        if self.fail.launch {
            return Err(HarnessError::Driver("launch refused".to_string()));
        }
        Ok(Box::new(MockBrowser {
            ops: self.ops.clone(),
            video_file: self.video_file.clone(),
            fail: self.fail,
        }))
    }
}

struct MockBrowser {
    ops: OpLog,
    video_file: Option<PathBuf>,
    fail: FailPoints,
}

#[async_trait]
impl BrowserHandle for MockBrowser {
    async fn new_context(&self, options: ContextOptions) -> HarnessResult<Box<dyn ContextHandle>> {
        log(
            &self.ops,
            format!("newContext video={}", options.record_video_dir.is_some()),
        );
        Ok(Box::new(MockContext {
            ops: self.ops.clone(),
            video_file: self.video_file.clone(),
            fail: self.fail,
        }))
    }

    async fn close(&self) -> HarnessResult<()> {
        log(&self.ops, "closeBrowser");
        Ok(())
    }
}

struct MockContext {
    ops: OpLog,
    video_file: Option<PathBuf>,
    fail: FailPoints,
}

#[async_trait]
impl ContextHandle for MockContext {
    async fn new_page(&self) -> HarnessResult<Box<dyn PageHandle>> {
        log(&self.ops, "newPage");
        Ok(Box::new(MockPage {
            ops: self.ops.clone(),
            video_file: self.video_file.clone(),
            fail: self.fail,
        }))
    }

    async fn tracing_start(&self, name: &str, _title: &str) -> HarnessResult<()> {
        log(&self.ops, format!("tracingStart {name}"));
        Ok(())
    }

    async fn tracing_stop(&self, path: &Path) -> HarnessResult<()> {
        log(&self.ops, format!("tracingStop {}", path.display()));
        if self.fail.tracing_stop {
            return Err(HarnessError::Driver("tracing refused".to_string()));
        }
        Ok(())
    }

    async fn close(&self) -> HarnessResult<()> {
        log(&self.ops, "closeContext");
        Ok(())
    }
}

struct MockPage {
    ops: OpLog,
    video_file: Option<PathBuf>,
    fail: FailPoints,
}

#[async_trait]
impl PageHandle for MockPage {
    async fn goto(&self, url: &str) -> HarnessResult<()> {
        log(&self.ops, format!("goto {url}"));
        Ok(())
    }

    async fn click(&self, selector: &str, _timeout: Duration) -> HarnessResult<()> {
        log(&self.ops, format!("click {selector}"));
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str, _timeout: Duration) -> HarnessResult<()> {
        log(&self.ops, format!("fill {selector}={value}"));
        Ok(())
    }

    async fn text_content(&self, selector: &str) -> HarnessResult<Option<String>> {
        log(&self.ops, format!("textContent {selector}"));
        Ok(Some(String::new()))
    }

    async fn is_visible(&self, selector: &str) -> HarnessResult<bool> {
        log(&self.ops, format!("isVisible {selector}"));
        Ok(true)
    }

    async fn wait_for_visible(&self, selector: &str, _timeout: Duration) -> HarnessResult<()> {
        log(&self.ops, format!("waitForVisible {selector}"));
        Ok(())
    }

    async fn wait_for_text(
        &self,
        selector: &str,
        text: &str,
        _timeout: Duration,
    ) -> HarnessResult<()> {
        log(&self.ops, format!("waitForText {selector}={text}"));
        Ok(())
    }

    async fn screenshot(&self, _path: &Path, full_page: bool) -> HarnessResult<Vec<u8>> {
        log(&self.ops, format!("screenshot fullPage={full_page}"));
        if self.fail.screenshot {
            return Err(HarnessError::Driver("screenshot refused".to_string()));
        }
        Ok(b"PNGDATA".to_vec())
    }

    async fn video_path(&self) -> HarnessResult<Option<PathBuf>> {
        log(&self.ops, "videoPath");
        if self.fail.video {
            return Err(HarnessError::Driver("video refused".to_string()));
        }
        Ok(self.video_file.clone())
    }

    async fn close(&self) -> HarnessResult<()> {
        log(&self.ops, "closePage");
        Ok(())
    }
}

/// Config pointing all artifacts at `root`, with short timeouts
pub fn test_config(root: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.base_url = "http://orangehrm.test".to_string();
    config.admin_username = "Admin".to_string();
    config.admin_password = "admin123".to_string();
    config.artifact_root = root.to_path_buf();
    config.step_timeout = Duration::from_secs(5);
    config
}

/// A fake finished recording the video attach path can read back
pub fn write_video_file(dir: &Path) -> PathBuf {
    let path = dir.join("recording.webm");
    std::fs::write(&path, b"WEBMDATA").unwrap();
    path
}
