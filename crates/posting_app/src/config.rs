use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use posting_engine::{HarvestSettings, SiteProfile, TermPlan};
use serde::Deserialize;

const DEFAULT_SETTLE_DELAY_MS: u64 = 5_000;

/// A harvest run, read from a RON file.
///
/// ```ron
/// (
///     output_dir: "data",
///     credentials: Some("linkedin_credentials.json"),
///     searches: [
///         (search_term: "Data Scientist", max_pages: 5),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchConfig {
    pub output_dir: PathBuf,
    /// JSON file with `Username` and `Password`; searches run signed out without it.
    #[serde(default)]
    pub credentials: Option<PathBuf>,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Overrides the built-in site layout.
    #[serde(default)]
    pub profile: Option<SiteProfile>,
    pub searches: Vec<TermPlan>,
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

impl BatchConfig {
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading batch config {}", path.display()))?;
        let config = Self::from_ron(&text)
            .with_context(|| format!("parsing batch config {}", path.display()))?;
        Ok(config.resolve_paths(path.parent().unwrap_or(Path::new(""))))
    }

    /// Relative paths in a config file are taken from the file's directory.
    fn resolve_paths(mut self, base: &Path) -> Self {
        self.output_dir = base.join(&self.output_dir);
        self.credentials = self.credentials.map(|path| base.join(path));
        self
    }

    pub fn harvest_settings(&self) -> HarvestSettings {
        HarvestSettings {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }

    pub fn site_profile(&self) -> SiteProfile {
        self.profile.clone().unwrap_or_default()
    }
}
