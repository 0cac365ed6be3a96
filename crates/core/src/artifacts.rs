//! Artifact path layout under the test-results root

use std::path::{Path, PathBuf};

use crate::error::{HarnessError, HarnessResult};

/// Builders for every artifact path the harness writes
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    root: PathBuf,
}

impl ArtifactPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join("videos")
    }

    pub fn traces_dir(&self) -> PathBuf {
        self.root.join("traces")
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.root.join("screenshots")
    }

    /// `traces/<scenario id>.zip`
    pub fn trace_file(&self, id: &str) -> PathBuf {
        self.traces_dir().join(format!("{id}.zip"))
    }

    /// `screenshots/<sanitized scenario name>-<scenario id>.png`
    pub fn screenshot_file(&self, scenario_name: &str, id: &str) -> PathBuf {
        self.screenshots_dir()
            .join(format!("{}-{}.png", sanitize_name(scenario_name), id))
    }

    pub fn report_file(&self) -> PathBuf {
        self.root.join("report.json")
    }

    /// Create the artifact tree. Must succeed before any scenario runs.
    pub fn ensure_dirs(&self) -> HarnessResult<()> {
        for dir in [self.videos_dir(), self.traces_dir(), self.screenshots_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| HarnessError::ArtifactDir { path: dir.clone(), source })?;
        }
        Ok(())
    }
}

/// Replace every character outside `[A-Za-z0-9]` with an underscore
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Login: valid admin", "Login__valid_admin"; "punctuation and spaces")]
    #[test_case("plain", "plain"; "already clean")]
    #[test_case("Añejo café", "A_ejo_caf_"; "non-ascii letters")]
    #[test_case("a-b_c.d", "a_b_c_d"; "dashes dots underscores")]
    fn sanitizes_names(input: &str, expected: &str) {
        assert_eq!(sanitize_name(input), expected);
    }

    #[test]
    fn builds_expected_artifact_paths() {
        let paths = ArtifactPaths::new("test-results");
        assert_eq!(
            paths.screenshot_file("Login: valid admin", "abc123"),
            PathBuf::from("test-results/screenshots/Login__valid_admin-abc123.png")
        );
        assert_eq!(
            paths.trace_file("abc123"),
            PathBuf::from("test-results/traces/abc123.zip")
        );
        assert_eq!(paths.report_file(), PathBuf::from("test-results/report.json"));
    }

    #[test]
    fn ensure_dirs_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(tmp.path().join("test-results"));

        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();

        assert!(paths.videos_dir().is_dir());
        assert!(paths.traces_dir().is_dir());
        assert!(paths.screenshots_dir().is_dir());
    }
}
