use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::classify::TypeCategory;
use crate::error::YtdError;

/// Env var naming a YAML config file.
pub const CONFIG_ENV: &str = "YTD_CONFIG";
/// Env var pinning "today" (YYYY-MM-DD), for reproducible runs.
pub const TODAY_ENV: &str = "YTD_TODAY";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "ytd.yaml";

/// Everything a run depends on besides the input data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Primary input paths, first existing one wins.
    pub input_candidates: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// IANA timezone the award dates and "today" are read in.
    pub timezone: String,
    pub earlier_year: i32,
    pub later_year: i32,
    /// Award types kept in the output.
    pub type_allowlist: Vec<TypeCategory>,
    /// Fixed "today"; the current date in `timezone` when unset.
    pub today: Option<NaiveDate>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let reporter = PathBuf::from("pages").join("data").join("reporter");
        Self {
            input_candidates: vec![
                reporter.join("nih_awards_all.csv.zst"),
                reporter.join("nih_awards_all.csv"),
            ],
            output_dir: PathBuf::from("pages").join("data"),
            timezone: "America/New_York".into(),
            earlier_year: 2024,
            later_year: 2025,
            type_allowlist: vec![
                TypeCategory::New,
                TypeCategory::CompetingRenewal,
                TypeCategory::Supplement,
            ],
            today: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults, overlaid by `$YTD_CONFIG` (or `./ytd.yaml` when it exists),
    /// then by `$YTD_TODAY`. The result is validated.
    pub fn load() -> Result<Self> {
        let file = match env::var_os(CONFIG_ENV) {
            Some(p) => Some(PathBuf::from(p)),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
        };
        let config = match file {
            Some(path) => {
                info!(path = %path.display(), "loading config");
                Self::from_yaml_file(&path)?
            }
            None => Self::default(),
        };
        let config = config.with_today_override(env::var(TODAY_ENV).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| YtdError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| YtdError::Config(e.to_string()).into())
    }

    /// Apply a raw `YTD_TODAY` value, if any.
    pub fn with_today_override(mut self, raw: Option<String>) -> Result<Self> {
        if let Some(raw) = raw.filter(|s| !s.trim().is_empty()) {
            let today = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                YtdError::Config(format!("{}={:?} is not a YYYY-MM-DD date: {}", TODAY_ENV, raw, e))
            })?;
            self.today = Some(today);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.earlier_year >= self.later_year {
            return Err(YtdError::Config(format!(
                "earlier_year ({}) must be before later_year ({})",
                self.earlier_year, self.later_year
            ))
            .into());
        }
        if self.type_allowlist.is_empty() {
            return Err(YtdError::Config("type_allowlist is empty".into()).into());
        }
        if self.input_candidates.is_empty() {
            return Err(YtdError::Config("input_candidates is empty".into()).into());
        }
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| YtdError::Config(format!("timezone {:?}: {}", self.timezone, e)).into())
    }

    /// The configured "today", or the current date in the configured zone.
    pub fn today(&self) -> Result<NaiveDate> {
        match self.today {
            Some(d) => Ok(d),
            None => Ok(Utc::now().with_timezone(&self.tz()?).date_naive()),
        }
    }

    /// First input candidate that exists on disk.
    pub fn locate_input(&self) -> Result<PathBuf> {
        self.input_candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| {
                YtdError::MissingInput {
                    tried: self.input_candidates.clone(),
                }
                .into()
            })
    }

    pub fn aggregate_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("ytd_{}_{}.json", self.earlier_year, self.later_year))
    }

    pub fn picklists_path(&self) -> PathBuf {
        self.output_dir.join("picklists.json")
    }
}
