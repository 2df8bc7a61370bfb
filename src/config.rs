// ⚙️ Detector Configuration - tunable thresholds, loadable from JSON
// Every field has a default so a partial file only overrides what it names.

use crate::similarity::{SimilarityPolicy, DEFAULT_HONORIFICS};
use crate::validation::MAX_AGE_YEARS;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Days before an order's date that still count as a recent duplicate (default: 30)
    pub order_window_days: i64,

    /// Minimum similarity score for a provider name warning (default: 0.92)
    pub name_similarity_threshold: f64,

    /// Scoring function for provider names (default: jaro_winkler)
    pub name_similarity: SimilarityPolicy,

    /// Oldest accepted patient age in whole years (default: 120)
    pub max_age_years: u32,

    /// Tokens dropped from provider names before comparison
    pub honorifics: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            order_window_days: 30,
            name_similarity_threshold: 0.92,
            name_similarity: SimilarityPolicy::default(),
            max_age_years: MAX_AGE_YEARS,
            honorifics: DEFAULT_HONORIFICS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl DetectorConfig {
    /// Load configuration from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: DetectorConfig =
            serde_json::from_str(&content).context("Failed to parse detector config JSON")?;

        config.validate()?;
        tracing::debug!(?config, "Loaded detector config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.order_window_days < 1 {
            bail!(
                "order_window_days must be at least 1, got {}",
                self.order_window_days
            );
        }
        if !(self.name_similarity_threshold > 0.0 && self.name_similarity_threshold <= 1.0) {
            bail!(
                "name_similarity_threshold must be in (0.0, 1.0], got {}",
                self.name_similarity_threshold
            );
        }
        Ok(())
    }
}
