use serde::{Deserialize, Serialize};

// ── Pagination ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when the caller sends none (or zero).
    pub default_limit: u64,
    /// Upper clamp for any requested page size.
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

// ── Batch generation ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Largest batch a single allocation may reserve.
    pub max_batch: u64,
    pub emp_number_prefix: String,
    /// Minimum digit count of the numeric suffix (zero padded).
    pub emp_number_width: usize,
    /// Generated hire dates fall within this many years before today.
    pub hire_window_years: u32,
    /// Generated engagement scores are drawn from [0, max_engagement_score].
    pub max_engagement_score: u32,
    /// Domain of generated email addresses.
    pub email_domain: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_batch: 1_000,
            emp_number_prefix: "EMP".into(),
            emp_number_width: 3,
            hire_window_years: 5,
            max_engagement_score: 100,
            email_domain: "example.com".into(),
        }
    }
}

// ── Reports ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportConfig {
    /// Truncate each skill's employee list in the difficulty ranking.
    /// `None` keeps every holder.
    #[serde(default)]
    pub difficulty_top_k: Option<usize>,
    /// Size of the top-engaged roster when the caller gives none.
    #[serde(default = "default_top_engaged")]
    pub top_engaged_default: usize,
}

fn default_top_engaged() -> usize {
    5
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            difficulty_top_k: None,
            top_engaged_default: default_top_engaged(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkforceConfig {
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub reports: ReportConfig,
}

impl WorkforceConfig {
    /// Load from the data/ directory.
    /// In tests, use WorkforceConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: WorkforceConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self::default()
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.pagination.max_limit == 0 {
            anyhow::bail!("pagination.max_limit must be at least 1");
        }
        if self.pagination.default_limit == 0
            || self.pagination.default_limit > self.pagination.max_limit
        {
            anyhow::bail!(
                "pagination.default_limit must be in [1, {}]",
                self.pagination.max_limit
            );
        }
        if self.generation.max_batch == 0 {
            anyhow::bail!("generation.max_batch must be at least 1");
        }
        if self.generation.emp_number_prefix.is_empty() {
            anyhow::bail!("generation.emp_number_prefix must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: WorkforceConfig =
            serde_json::from_str(r#"{ "pagination": { "default_limit": 20, "max_limit": 50 } }"#)
                .unwrap();
        assert_eq!(config.pagination.default_limit, 20);
        assert_eq!(config.generation.max_batch, 1_000);
        assert_eq!(config.reports.top_engaged_default, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_limit_above_max_is_rejected() {
        let mut config = WorkforceConfig::default_test();
        config.pagination.default_limit = 500;
        assert!(config.validate().is_err());
    }
}
