//! Browser capability surface consumed by the harness
//!
//! The lifecycle manager and page objects only ever talk to these traits.
//! Production uses the Playwright sidecar in [`crate::playwright`]; tests
//! substitute recording doubles.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HarnessResult;

/// Default timeout for single page interactions (clicks, fills)
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chromium" => Some(BrowserKind::Chromium),
            "firefox" => Some(BrowserKind::Firefox),
            "webkit" => Some(BrowserKind::Webkit),
            _ => None,
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1920, height: 1080 }
    }
}

/// Options for a fresh browser context
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Base URL that relative navigations resolve against
    pub base_url: String,
    pub viewport: Viewport,
    /// Directory for video recording; `None` disables recording
    pub record_video_dir: Option<PathBuf>,
}

/// Launches browser instances
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    async fn launch(
        &self,
        kind: BrowserKind,
        headless: bool,
    ) -> HarnessResult<Box<dyn BrowserHandle>>;
}

/// A launched browser instance
#[async_trait]
pub trait BrowserHandle: Send + Sync {
    async fn new_context(&self, options: ContextOptions) -> HarnessResult<Box<dyn ContextHandle>>;
    async fn close(&self) -> HarnessResult<()>;
}

/// An isolated browser context with its own storage and tracing
#[async_trait]
pub trait ContextHandle: Send + Sync {
    async fn new_page(&self) -> HarnessResult<Box<dyn PageHandle>>;
    async fn tracing_start(&self, name: &str, title: &str) -> HarnessResult<()>;
    async fn tracing_stop(&self, path: &Path) -> HarnessResult<()>;
    async fn close(&self) -> HarnessResult<()>;
}

/// A single page (tab) inside a context
#[async_trait]
pub trait PageHandle: Send + Sync {
    async fn goto(&self, url: &str) -> HarnessResult<()>;
    async fn click(&self, selector: &str, timeout: Duration) -> HarnessResult<()>;
    async fn fill(&self, selector: &str, value: &str, timeout: Duration) -> HarnessResult<()>;
    async fn text_content(&self, selector: &str) -> HarnessResult<Option<String>>;
    async fn is_visible(&self, selector: &str) -> HarnessResult<bool>;
    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> HarnessResult<()>;
    async fn wait_for_text(&self, selector: &str, text: &str, timeout: Duration)
        -> HarnessResult<()>;
    /// Full rendered screenshot; also written to `path`
    async fn screenshot(&self, path: &Path, full_page: bool) -> HarnessResult<Vec<u8>>;
    /// Path of the recorded video. Only resolves after the page closes.
    async fn video_path(&self) -> HarnessResult<Option<PathBuf>>;
    async fn close(&self) -> HarnessResult<()>;
}

/// Concrete page wrapper handed to page objects and steps
pub struct Page {
    handle: Box<dyn PageHandle>,
}

impl Page {
    pub fn new(handle: Box<dyn PageHandle>) -> Self {
        Self { handle }
    }

    pub async fn goto(&self, url: &str) -> HarnessResult<()> {
        self.handle.goto(url).await
    }

    pub async fn click(&self, selector: &str) -> HarnessResult<()> {
        self.handle.click(selector, DEFAULT_ACTION_TIMEOUT).await
    }

    pub async fn fill(&self, selector: &str, value: &str) -> HarnessResult<()> {
        self.handle.fill(selector, value, DEFAULT_ACTION_TIMEOUT).await
    }

    pub async fn text_content(&self, selector: &str) -> HarnessResult<Option<String>> {
        self.handle.text_content(selector).await
    }

    pub async fn is_visible(&self, selector: &str) -> HarnessResult<bool> {
        self.handle.is_visible(selector).await
    }

    pub async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> HarnessResult<()> {
        self.handle.wait_for_visible(selector, timeout).await
    }

    pub async fn wait_for_text(
        &self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> HarnessResult<()> {
        self.handle.wait_for_text(selector, text, timeout).await
    }

    pub async fn screenshot(&self, path: &Path, full_page: bool) -> HarnessResult<Vec<u8>> {
        self.handle.screenshot(path, full_page).await
    }

    pub async fn video_path(&self) -> HarnessResult<Option<PathBuf>> {
        self.handle.video_path().await
    }

    pub async fn close(&self) -> HarnessResult<()> {
        self.handle.close().await
    }
}
