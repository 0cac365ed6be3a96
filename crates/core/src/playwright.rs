//! Playwright browser automation
//!
//! Browsers are driven through a small Node.js sidecar speaking
//! newline-delimited JSON over stdio. The sidecar script is embedded in
//! this crate and written to a temp directory on first use; it requires
//! the `playwright` package from the surrounding environment. One driver
//! process serves every browser, context, and page for the whole run,
//! addressing them by id.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tracing::debug;

use crate::browser::{
    BrowserEngine, BrowserHandle, BrowserKind, ContextHandle, ContextOptions, PageHandle,
};
use crate::error::{HarnessError, HarnessResult};

/// Ceiling on a single driver round trip. Must exceed every in-page
/// timeout the driver enforces on our behalf.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Browser engine backed by the Node.js Playwright sidecar
pub struct PlaywrightEngine {
    script_path: PathBuf,
    _driver_dir: TempDir,
    request_timeout: Duration,
    conn: Mutex<Option<DriverConn>>,
}

impl PlaywrightEngine {
    pub fn new() -> HarnessResult<Self> {
        Self::with_request_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_request_timeout(request_timeout: Duration) -> HarnessResult<Self> {
        check_node_available()?;

        let driver_dir = tempfile::tempdir()?;
        let script_path = driver_dir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_SOURCE)?;

        Ok(Self {
            script_path,
            _driver_dir: driver_dir,
            request_timeout,
            conn: Mutex::new(None),
        })
    }

    /// Connection to the sidecar, spawning it on first use
    async fn conn(&self) -> HarnessResult<DriverConn> {
        let mut slot = self.conn.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }
        let conn = DriverConn::spawn(&self.script_path, self.request_timeout)?;
        debug!("playwright driver started");
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Ask the sidecar to close everything and exit
    pub async fn shutdown(&self) -> HarnessResult<()> {
        let slot = self.conn.lock().await;
        if let Some(conn) = slot.as_ref() {
            conn.request("shutdown", json!({})).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserEngine for PlaywrightEngine {
    async fn launch(
        &self,
        kind: BrowserKind,
        headless: bool,
    ) -> HarnessResult<Box<dyn BrowserHandle>> {
        let conn = self.conn().await?;
        let value = match conn
            .request("launch", json!({ "kind": kind.as_str(), "headless": headless }))
            .await
        {
            Err(HarnessError::Driver(message)) if message.contains("Cannot find module") => {
                return Err(HarnessError::DriverUnavailable(message))
            }
            other => other?,
        };
        let reply: LaunchReply = parse_reply(value)?;
        debug!(browser = kind.as_str(), headless, id = %reply.browser_id, "launched browser");
        Ok(Box::new(PwBrowser { conn, id: reply.browser_id }))
    }
}

fn check_node_available() -> HarnessResult<()> {
    let status = std::process::Command::new("node")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(HarnessError::DriverUnavailable(
            "node executable not found on PATH".to_string(),
        )),
    }
}

struct DriverIo {
    _child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

/// Serialized request/reply channel to the sidecar
#[derive(Clone)]
struct DriverConn {
    io: Arc<Mutex<DriverIo>>,
    next_id: Arc<AtomicU64>,
    request_timeout: Duration,
}

impl DriverConn {
    fn spawn(script: &Path, request_timeout: Duration) -> HarnessResult<Self> {
        let mut child = TokioCommand::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HarnessError::Driver(format!("failed to spawn driver process: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HarnessError::Driver("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HarnessError::Driver("driver stdout unavailable".to_string()))?;

        Ok(Self {
            io: Arc::new(Mutex::new(DriverIo {
                _child: child,
                stdin,
                lines: BufReader::new(stdout).lines(),
            })),
            next_id: Arc::new(AtomicU64::new(1)),
            request_timeout,
        })
    }

    async fn request(&self, method: &str, params: Value) -> HarnessResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = serde_json::to_string(&json!({
            "id": id,
            "method": method,
            "params": params,
        }))?;

        let mut io = self.io.lock().await;
        io.stdin
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| HarnessError::Driver(format!("write to driver failed: {e}")))?;
        io.stdin
            .write_all(b"\n")
            .await
            .map_err(|e| HarnessError::Driver(format!("write to driver failed: {e}")))?;
        io.stdin
            .flush()
            .await
            .map_err(|e| HarnessError::Driver(format!("write to driver failed: {e}")))?;

        let line = tokio::time::timeout(self.request_timeout, io.lines.next_line())
            .await
            .map_err(|_| {
                HarnessError::Driver(format!(
                    "driver did not answer `{method}` within {}s",
                    self.request_timeout.as_secs()
                ))
            })?
            .map_err(|e| HarnessError::Driver(format!("read from driver failed: {e}")))?
            .ok_or_else(|| HarnessError::Driver("driver closed its stdout".to_string()))?;

        let reply: DriverReply = serde_json::from_str(&line)
            .map_err(|e| HarnessError::Protocol(format!("malformed driver reply: {e}")))?;
        if reply.id != id {
            return Err(HarnessError::Protocol(format!(
                "expected reply {id}, got {}",
                reply.id
            )));
        }
        if reply.ok {
            Ok(reply.result)
        } else {
            Err(HarnessError::Driver(
                reply.error.unwrap_or_else(|| "driver reported an unnamed error".to_string()),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct DriverReply {
    id: u64,
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LaunchReply {
    browser_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContextReply {
    context_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageReply {
    page_id: String,
}

#[derive(Debug, Deserialize)]
struct TextReply {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VisibleReply {
    visible: bool,
}

#[derive(Debug, Deserialize)]
struct ScreenshotReply {
    data: String,
}

#[derive(Debug, Deserialize)]
struct VideoPathReply {
    path: Option<String>,
}

fn parse_reply<T: DeserializeOwned>(value: Value) -> HarnessResult<T> {
    serde_json::from_value(value)
        .map_err(|e| HarnessError::Protocol(format!("malformed driver reply: {e}")))
}

fn millis(timeout: Duration) -> u64 {
    timeout.as_millis() as u64
}

struct PwBrowser {
    conn: DriverConn,
    id: String,
}

#[async_trait]
impl BrowserHandle for PwBrowser {
    async fn new_context(&self, options: ContextOptions) -> HarnessResult<Box<dyn ContextHandle>> {
        let record_dir = options
            .record_video_dir
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());
        let value = self
            .conn
            .request(
                "newContext",
                json!({
                    "browserId": self.id,
                    "baseUrl": options.base_url,
                    "width": options.viewport.width,
                    "height": options.viewport.height,
                    "recordVideoDir": record_dir,
                }),
            )
            .await?;
        let reply: ContextReply = parse_reply(value)?;
        Ok(Box::new(PwContext { conn: self.conn.clone(), id: reply.context_id }))
    }

    async fn close(&self) -> HarnessResult<()> {
        self.conn
            .request("closeBrowser", json!({ "browserId": self.id }))
            .await?;
        Ok(())
    }
}

struct PwContext {
    conn: DriverConn,
    id: String,
}

#[async_trait]
impl ContextHandle for PwContext {
    async fn new_page(&self) -> HarnessResult<Box<dyn PageHandle>> {
        let value = self
            .conn
            .request("newPage", json!({ "contextId": self.id }))
            .await?;
        let reply: PageReply = parse_reply(value)?;
        Ok(Box::new(PwPage { conn: self.conn.clone(), id: reply.page_id }))
    }

    async fn tracing_start(&self, name: &str, title: &str) -> HarnessResult<()> {
        self.conn
            .request(
                "tracingStart",
                json!({ "contextId": self.id, "name": name, "title": title }),
            )
            .await?;
        Ok(())
    }

    async fn tracing_stop(&self, path: &Path) -> HarnessResult<()> {
        self.conn
            .request(
                "tracingStop",
                json!({ "contextId": self.id, "path": path.to_string_lossy() }),
            )
            .await?;
        Ok(())
    }

    async fn close(&self) -> HarnessResult<()> {
        self.conn
            .request("closeContext", json!({ "contextId": self.id }))
            .await?;
        Ok(())
    }
}

struct PwPage {
    conn: DriverConn,
    id: String,
}

#[async_trait]
impl PageHandle for PwPage {
    async fn goto(&self, url: &str) -> HarnessResult<()> {
        self.conn
            .request("goto", json!({ "pageId": self.id, "url": url }))
            .await?;
        Ok(())
    }

    async fn click(&self, selector: &str, timeout: Duration) -> HarnessResult<()> {
        self.conn
            .request(
                "click",
                json!({ "pageId": self.id, "selector": selector, "timeoutMs": millis(timeout) }),
            )
            .await?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str, timeout: Duration) -> HarnessResult<()> {
        self.conn
            .request(
                "fill",
                json!({
                    "pageId": self.id,
                    "selector": selector,
                    "value": value,
                    "timeoutMs": millis(timeout),
                }),
            )
            .await?;
        Ok(())
    }

    async fn text_content(&self, selector: &str) -> HarnessResult<Option<String>> {
        let value = self
            .conn
            .request("textContent", json!({ "pageId": self.id, "selector": selector }))
            .await?;
        let reply: TextReply = parse_reply(value)?;
        Ok(reply.text)
    }

    async fn is_visible(&self, selector: &str) -> HarnessResult<bool> {
        let value = self
            .conn
            .request("isVisible", json!({ "pageId": self.id, "selector": selector }))
            .await?;
        let reply: VisibleReply = parse_reply(value)?;
        Ok(reply.visible)
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> HarnessResult<()> {
        self.conn
            .request(
                "waitForVisible",
                json!({ "pageId": self.id, "selector": selector, "timeoutMs": millis(timeout) }),
            )
            .await?;
        Ok(())
    }

    async fn wait_for_text(
        &self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> HarnessResult<()> {
        self.conn
            .request(
                "waitForText",
                json!({
                    "pageId": self.id,
                    "selector": selector,
                    "text": text,
                    "timeoutMs": millis(timeout),
                }),
            )
            .await?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> HarnessResult<Vec<u8>> {
        let value = self
            .conn
            .request(
                "screenshot",
                json!({
                    "pageId": self.id,
                    "path": path.to_string_lossy(),
                    "fullPage": full_page,
                }),
            )
            .await?;
        let reply: ScreenshotReply = parse_reply(value)?;
        BASE64
            .decode(reply.data)
            .map_err(|e| HarnessError::Protocol(format!("driver sent invalid screenshot payload: {e}")))
    }

    async fn video_path(&self) -> HarnessResult<Option<PathBuf>> {
        let value = self
            .conn
            .request("videoPath", json!({ "pageId": self.id }))
            .await?;
        let reply: VideoPathReply = parse_reply(value)?;
        Ok(reply.path.map(PathBuf::from))
    }

    async fn close(&self) -> HarnessResult<()> {
        self.conn
            .request("closePage", json!({ "pageId": self.id }))
            .await?;
        Ok(())
    }
}

/// Sidecar source, written verbatim to `driver.js`
const DRIVER_SOURCE: &str = r##"// Playwright driver: newline-delimited JSON requests over stdio.
'use strict';

const readline = require('readline');

let playwright = null;
function pw() {
  if (!playwright) {
    playwright = require('playwright');
  }
  return playwright;
}

let serial = 0;
const browsers = new Map();
const contexts = new Map();
const pages = new Map();

function put(map, prefix, entry) {
  serial += 1;
  const id = `${prefix}-${serial}`;
  map.set(id, entry);
  return id;
}

function get(map, id, what) {
  const entry = map.get(id);
  if (!entry) {
    throw new Error(`unknown ${what}: ${id}`);
  }
  return entry;
}

const handlers = {
  async launch(params) {
    const type = pw()[params.kind];
    if (!type) {
      throw new Error(`unsupported browser kind: ${params.kind}`);
    }
    const browser = await type.launch({ headless: params.headless });
    return { browserId: put(browsers, 'browser', { browser }) };
  },

  async newContext(params) {
    const { browser } = get(browsers, params.browserId, 'browser');
    const options = {
      baseURL: params.baseUrl,
      viewport: { width: params.width, height: params.height },
    };
    if (params.recordVideoDir) {
      options.recordVideo = { dir: params.recordVideoDir };
    }
    const context = await browser.newContext(options);
    return { contextId: put(contexts, 'context', { context, browserId: params.browserId }) };
  },

  async tracingStart(params) {
    const { context } = get(contexts, params.contextId, 'context');
    await context.tracing.start({
      name: params.name,
      title: params.title,
      screenshots: true,
      snapshots: true,
      sources: true,
    });
    return {};
  },

  async tracingStop(params) {
    const { context } = get(contexts, params.contextId, 'context');
    await context.tracing.stop({ path: params.path });
    return {};
  },

  async newPage(params) {
    const { context } = get(contexts, params.contextId, 'context');
    const page = await context.newPage();
    return { pageId: put(pages, 'page', { page, contextId: params.contextId }) };
  },

  async goto(params) {
    const { page } = get(pages, params.pageId, 'page');
    await page.goto(params.url);
    return {};
  },

  async click(params) {
    const { page } = get(pages, params.pageId, 'page');
    await page.click(params.selector, { timeout: params.timeoutMs });
    return {};
  },

  async fill(params) {
    const { page } = get(pages, params.pageId, 'page');
    await page.fill(params.selector, params.value, { timeout: params.timeoutMs });
    return {};
  },

  async textContent(params) {
    const { page } = get(pages, params.pageId, 'page');
    return { text: await page.textContent(params.selector) };
  },

  async isVisible(params) {
    const { page } = get(pages, params.pageId, 'page');
    return { visible: await page.isVisible(params.selector) };
  },

  async waitForVisible(params) {
    const { page } = get(pages, params.pageId, 'page');
    await page.waitForSelector(params.selector, { state: 'visible', timeout: params.timeoutMs });
    return {};
  },

  async waitForText(params) {
    const { page } = get(pages, params.pageId, 'page');
    const deadline = Date.now() + params.timeoutMs;
    for (;;) {
      const text = await page.textContent(params.selector, { timeout: 250 }).catch(() => null);
      if (text !== null && text.includes(params.text)) {
        return {};
      }
      if (Date.now() > deadline) {
        throw new Error(`timed out waiting for "${params.text}" in ${params.selector}`);
      }
      await new Promise((resolve) => setTimeout(resolve, 100));
    }
  },

  async screenshot(params) {
    const { page } = get(pages, params.pageId, 'page');
    const buffer = await page.screenshot({ path: params.path, fullPage: params.fullPage });
    return { data: buffer.toString('base64') };
  },

  async videoPath(params) {
    const { page } = get(pages, params.pageId, 'page');
    const video = page.video();
    return { path: video ? await video.path() : null };
  },

  async closePage(params) {
    const { page } = get(pages, params.pageId, 'page');
    if (!page.isClosed()) {
      await page.close();
    }
    return {};
  },

  async closeContext(params) {
    const { context } = get(contexts, params.contextId, 'context');
    await context.close();
    contexts.delete(params.contextId);
    for (const [id, entry] of pages) {
      if (entry.contextId === params.contextId) {
        pages.delete(id);
      }
    }
    return {};
  },

  async closeBrowser(params) {
    const { browser } = get(browsers, params.browserId, 'browser');
    await browser.close();
    browsers.delete(params.browserId);
    for (const [id, entry] of contexts) {
      if (entry.browserId === params.browserId) {
        contexts.delete(id);
      }
    }
    return {};
  },

  async shutdown() {
    for (const { browser } of browsers.values()) {
      await browser.close().catch(() => {});
    }
    return { done: true };
  },
};

async function main() {
  const rl = readline.createInterface({ input: process.stdin, terminal: false });
  for await (const line of rl) {
    if (!line.trim()) {
      continue;
    }
    let request;
    try {
      request = JSON.parse(line);
    } catch (error) {
      process.stdout.write(JSON.stringify({ id: 0, ok: false, error: `bad request: ${error.message}` }) + '\n');
      continue;
    }
    const handler = handlers[request.method];
    let reply;
    if (!handler) {
      reply = { id: request.id, ok: false, error: `unknown method: ${request.method}` };
    } else {
      try {
        const result = await handler(request.params || {});
        reply = { id: request.id, ok: true, result };
      } catch (error) {
        reply = { id: request.id, ok: false, error: error.message || String(error) };
      }
    }
    process.stdout.write(JSON.stringify(reply) + '\n');
    if (request.method === 'shutdown') {
      process.exit(0);
    }
  }
}

main();
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_source_defines_every_method_we_call() {
        let methods = [
            "launch",
            "newContext",
            "tracingStart",
            "tracingStop",
            "newPage",
            "goto",
            "click",
            "fill",
            "textContent",
            "isVisible",
            "waitForVisible",
            "waitForText",
            "screenshot",
            "videoPath",
            "closePage",
            "closeContext",
            "closeBrowser",
            "shutdown",
        ];
        for method in methods {
            assert!(
                DRIVER_SOURCE.contains(&format!("async {method}(")),
                "driver is missing a handler for {method}"
            );
        }
    }

    #[test]
    fn replies_deserialize_in_both_shapes() {
        let ok: DriverReply =
            serde_json::from_str(r#"{"id":7,"ok":true,"result":{"browserId":"browser-1"}}"#)
                .unwrap();
        assert!(ok.ok);
        let launch: LaunchReply = parse_reply(ok.result).unwrap();
        assert_eq!(launch.browser_id, "browser-1");

        let err: DriverReply =
            serde_json::from_str(r#"{"id":8,"ok":false,"error":"unknown page: page-9"}"#).unwrap();
        assert!(!err.ok);
        assert_eq!(err.error.as_deref(), Some("unknown page: page-9"));
    }

    #[test]
    fn trace_options_capture_sources_and_snapshots() {
        assert!(DRIVER_SOURCE.contains("screenshots: true"));
        assert!(DRIVER_SOURCE.contains("snapshots: true"));
        assert!(DRIVER_SOURCE.contains("sources: true"));
    }
}
