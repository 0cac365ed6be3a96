//! Runtime configuration
//!
//! Resolution order for most settings: environment variable, then per-run
//! override, then the optional `drover.toml` file, then the built-in
//! default. Two deliberate exceptions carried over from the legacy suite:
//! the `BROWSER` variable beats the per-run browser parameter, while a
//! per-run `--tags` beats the `TAGS` variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::browser::{BrowserKind, Viewport};
use crate::error::{HarnessError, HarnessResult};

/// Variables that must be present before any scenario runs
pub const REQUIRED_VARS: &[&str] = &["BASE_URL", "ADMIN_USERNAME", "ADMIN_PASSWORD"];

/// Default timeout applied to every step and lifecycle hook
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 60;

/// Fully resolved harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Root URL of the application under test
    pub base_url: String,
    pub admin_username: String,
    pub admin_password: String,
    pub browser: BrowserKind,
    pub headless: bool,
    /// Only scenarios carrying this tag run; `None` runs everything
    pub tags: Option<String>,
    pub viewport: Viewport,
    pub step_timeout: Duration,
    pub artifact_root: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            admin_username: String::new(),
            admin_password: String::new(),
            browser: BrowserKind::default(),
            headless: true,
            tags: None,
            viewport: Viewport::default(),
            step_timeout: Duration::from_secs(DEFAULT_STEP_TIMEOUT_SECS),
            artifact_root: PathBuf::from("test-results"),
        }
    }
}

/// Optional settings file, lowest precedence
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub browser: Option<String>,
    pub headless: Option<bool>,
    pub tags: Option<String>,
    pub step_timeout_secs: Option<u64>,
    pub artifact_root: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the file if it exists; a missing file is not an error
    pub fn load_if_present(path: &Path) -> HarnessResult<Option<Self>> {
        if path.exists() {
            Ok(Some(Self::load(path)?))
        } else {
            Ok(None)
        }
    }
}

/// Per-run parameters, usually from CLI flags
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub browser: Option<BrowserKind>,
    pub headless: Option<bool>,
    pub tags: Option<String>,
    pub artifact_root: Option<PathBuf>,
}

impl HarnessConfig {
    /// Resolve from the process environment
    pub fn resolve(file: Option<&FileConfig>, overrides: &RunOverrides) -> HarnessResult<Self> {
        Self::resolve_with(|name| std::env::var(name).ok(), file, overrides)
    }

    /// Resolve against an explicit variable lookup
    pub fn resolve_with(
        env: impl Fn(&str) -> Option<String>,
        file: Option<&FileConfig>,
        overrides: &RunOverrides,
    ) -> HarnessResult<Self> {
        let file = file.cloned().unwrap_or_default();

        let base_url = env("BASE_URL").or(file.base_url);
        let admin_username = env("ADMIN_USERNAME").or(file.admin_username);
        let admin_password = env("ADMIN_PASSWORD").or(file.admin_password);

        let missing: Vec<&str> = [
            ("BASE_URL", base_url.is_none()),
            ("ADMIN_USERNAME", admin_username.is_none()),
            ("ADMIN_PASSWORD", admin_password.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect();
        if !missing.is_empty() {
            return Err(HarnessError::MissingEnv(missing.join(", ")));
        }

        let browser = match env("BROWSER") {
            Some(value) => parse_browser(&value)?,
            None => match (overrides.browser, file.browser) {
                (Some(kind), _) => kind,
                (None, Some(value)) => parse_browser(&value)?,
                (None, None) => BrowserKind::default(),
            },
        };

        // Anything except the literal string "false" keeps headless on
        let headless = match env("HEADLESS") {
            Some(value) => value != "false",
            None => overrides.headless.or(file.headless).unwrap_or(true),
        };

        let tags = overrides.tags.clone().or_else(|| env("TAGS")).or(file.tags);

        Ok(Self {
            base_url: base_url.unwrap_or_default(),
            admin_username: admin_username.unwrap_or_default(),
            admin_password: admin_password.unwrap_or_default(),
            browser,
            headless,
            tags,
            viewport: Viewport::default(),
            step_timeout: Duration::from_secs(
                file.step_timeout_secs.unwrap_or(DEFAULT_STEP_TIMEOUT_SECS),
            ),
            artifact_root: overrides
                .artifact_root
                .clone()
                .or(file.artifact_root)
                .unwrap_or_else(|| PathBuf::from("test-results")),
        })
    }
}

fn parse_browser(value: &str) -> HarnessResult<BrowserKind> {
    BrowserKind::parse(value).ok_or_else(|| {
        HarnessError::InvalidConfig(format!(
            "Unknown browser '{value}', expected chromium, firefox or webkit"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("BASE_URL", "https://opensource-demo.orangehrmlive.com"),
            ("ADMIN_USERNAME", "Admin"),
            ("ADMIN_PASSWORD", "admin123"),
        ]
    }

    #[test]
    fn missing_vars_are_reported_together() {
        let err = HarnessConfig::resolve_with(
            env_of(&[("ADMIN_USERNAME", "Admin")]),
            None,
            &RunOverrides::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required env vars: BASE_URL, ADMIN_PASSWORD"
        );
    }

    #[test]
    fn browser_env_beats_run_override() {
        let mut pairs = required();
        pairs.push(("BROWSER", "firefox"));
        let overrides = RunOverrides {
            browser: Some(BrowserKind::Webkit),
            ..Default::default()
        };
        let config = HarnessConfig::resolve_with(env_of(&pairs), None, &overrides).unwrap();
        assert_eq!(config.browser, BrowserKind::Firefox);
    }

    #[test]
    fn run_override_beats_file_browser() {
        let file = FileConfig {
            browser: Some("webkit".to_string()),
            ..Default::default()
        };
        let overrides = RunOverrides {
            browser: Some(BrowserKind::Firefox),
            ..Default::default()
        };
        let config =
            HarnessConfig::resolve_with(env_of(&required()), Some(&file), &overrides).unwrap();
        assert_eq!(config.browser, BrowserKind::Firefox);
    }

    #[test]
    fn browser_defaults_to_chromium() {
        let config =
            HarnessConfig::resolve_with(env_of(&required()), None, &RunOverrides::default())
                .unwrap();
        assert_eq!(config.browser, BrowserKind::Chromium);
    }

    #[test]
    fn unknown_browser_is_rejected() {
        let mut pairs = required();
        pairs.push(("BROWSER", "netscape"));
        let err =
            HarnessConfig::resolve_with(env_of(&pairs), None, &RunOverrides::default())
                .unwrap_err();
        assert!(matches!(err, HarnessError::InvalidConfig(_)));
    }

    #[test]
    fn headless_is_on_unless_literal_false() {
        for (value, expected) in [("false", false), ("true", true), ("0", true), ("no", true)] {
            let mut pairs = required();
            pairs.push(("HEADLESS", value));
            let config =
                HarnessConfig::resolve_with(env_of(&pairs), None, &RunOverrides::default())
                    .unwrap();
            assert_eq!(config.headless, expected, "HEADLESS={value}");
        }
    }

    #[test]
    fn cli_tags_beat_env_tags() {
        let mut pairs = required();
        pairs.push(("TAGS", "@smoke"));
        let overrides = RunOverrides {
            tags: Some("@claim".to_string()),
            ..Default::default()
        };
        let config = HarnessConfig::resolve_with(env_of(&pairs), None, &overrides).unwrap();
        assert_eq!(config.tags.as_deref(), Some("@claim"));
    }

    #[test]
    fn env_tags_apply_without_override() {
        let mut pairs = required();
        pairs.push(("TAGS", "@smoke"));
        let config =
            HarnessConfig::resolve_with(env_of(&pairs), None, &RunOverrides::default()).unwrap();
        assert_eq!(config.tags.as_deref(), Some("@smoke"));
    }

    #[test]
    fn file_supplies_fallback_values() {
        let file = FileConfig {
            base_url: Some("http://localhost:8080".to_string()),
            admin_username: Some("Admin".to_string()),
            admin_password: Some("admin123".to_string()),
            step_timeout_secs: Some(90),
            ..Default::default()
        };
        let config =
            HarnessConfig::resolve_with(|_| None, Some(&file), &RunOverrides::default()).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.step_timeout, Duration::from_secs(90));
    }

    #[test]
    fn file_config_parses_toml() {
        let parsed: FileConfig = toml::from_str(
            r#"
base_url = "http://localhost:8080"
browser = "firefox"
headless = false
artifact_root = "out"
"#,
        )
        .unwrap();
        assert_eq!(parsed.browser.as_deref(), Some("firefox"));
        assert_eq!(parsed.headless, Some(false));
        assert_eq!(parsed.artifact_root, Some(PathBuf::from("out")));
    }
}
