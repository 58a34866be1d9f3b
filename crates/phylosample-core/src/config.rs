//! Configuration types for phylosample.
//!
//! [`Settings::load`] layers an optional user file and `PHYLOSAMPLE__*`
//! environment variables on top of the embedded defaults, then validates the
//! result. [`Settings::defaults`] returns the same defaults without touching
//! the filesystem (useful in tests).

use crate::collection::HeaderFields;
use crate::dates::DateNormalizer;
use crate::error::{PipelineError, Result};
use crate::subsample::{
    attribute_priority, date_category, random_priority, trait_category, CategoryKey,
    SubsampleConfig, DEFAULT_THRESHOLD,
};
use crate::types::STRAIN;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

// `header.fields` is not listed here: tables merge across layers, so a user
// file could never remove a default field index.
const DEFAULT_CONFIG: &str = r#"
segment = "genome"

[header]
separator = "|"

[dates]
formats = ["%Y-%m-%d"]
prune   = true

[subsample]
threshold = 5
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_segment")]
    pub segment: String,
    #[serde(default)]
    pub header: HeaderSettings,
    #[serde(default)]
    pub dates: DateSettings,
    #[serde(default)]
    pub subsample: SubsampleSettings,
}

/// `[header]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderSettings {
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Word index (as a string key) to attribute name.
    #[serde(default = "default_header_fields")]
    pub fields: BTreeMap<String, String>,
}

/// `[dates]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DateSettings {
    #[serde(default = "default_date_formats")]
    pub formats: Vec<String>,
    #[serde(default = "default_prune")]
    pub prune: bool,
}

/// `[subsample]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SubsampleSettings {
    #[serde(default = "default_threshold")]
    pub threshold: i64,
    /// Attribute names forming the category key. Absent: year/month of date.
    #[serde(default)]
    pub category: Option<Vec<String>>,
    /// Numeric attribute used as priority. Absent: random.
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_segment() -> String { "genome".to_string() }
fn default_separator() -> String { "|".to_string() }
fn default_header_fields() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("0".to_string(), STRAIN.to_string()),
        ("1".to_string(), "date".to_string()),
    ])
}
fn default_date_formats() -> Vec<String> { vec!["%Y-%m-%d".to_string()] }
fn default_prune() -> bool { true }
fn default_threshold() -> i64 { DEFAULT_THRESHOLD }

impl Default for HeaderSettings {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            fields: default_header_fields(),
        }
    }
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            formats: default_date_formats(),
            prune: default_prune(),
        }
    }
}

impl Default for SubsampleSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            category: None,
            priority: None,
            seed: None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Settings {
    /// Load `path` (or the per-user config file when `path` is `None`) on top
    /// of the built-in defaults, then apply `PHYLOSAMPLE__SECTION__KEY`
    /// environment overrides. An explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(default_config_path().as_path()).required(false),
        };

        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("PHYLOSAMPLE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Check everything that can be checked before records are touched.
    pub fn validate(&self) -> Result<()> {
        self.header_fields()?;
        if self.header.separator.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "header.separator must not be empty".into(),
            ));
        }
        if self.dates.formats.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "dates.formats must list at least one format".into(),
            ));
        }
        if let Some(bad) = self.dates.formats.iter().find(|f| !f.contains('%')) {
            return Err(PipelineError::InvalidConfig(format!(
                "date format {bad:?} has no % directive"
            )));
        }
        if matches!(&self.subsample.category, Some(fields) if fields.is_empty()) {
            return Err(PipelineError::InvalidConfig(
                "subsample.category must name at least one attribute".into(),
            ));
        }
        Ok(())
    }

    /// Header field mapping with numeric indices. Must contain `strain`.
    pub fn header_fields(&self) -> Result<HeaderFields> {
        let fields = self
            .header
            .fields
            .iter()
            .map(|(index, name)| {
                index
                    .trim()
                    .parse::<usize>()
                    .map(|i| (i, name.clone()))
                    .map_err(|_| {
                        PipelineError::InvalidConfig(format!(
                            "header field index {index:?} is not a number"
                        ))
                    })
            })
            .collect::<Result<HeaderFields>>()?;

        if !fields.values().any(|name| name == STRAIN) {
            return Err(PipelineError::MissingStrainField);
        }
        Ok(fields)
    }

    pub fn date_normalizer(&self) -> DateNormalizer {
        DateNormalizer::from_patterns(self.dates.formats.iter().cloned())
    }

    /// Strategy bundle described by `[subsample]`.
    pub fn subsample_config(&self) -> SubsampleConfig<CategoryKey> {
        let s = &self.subsample;
        let config = match &s.category {
            Some(fields) => SubsampleConfig::new(trait_category(fields.clone())),
            None => SubsampleConfig::new(date_category),
        };
        let config = match &s.priority {
            Some(field) => config.with_priority(attribute_priority(field.clone())),
            None => config.with_priority(random_priority(s.seed)),
        };
        config.with_threshold(s.threshold)
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `$XDG_CONFIG_HOME/phylosample/config.toml`, falling back to `~/.config`.
pub fn default_config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("phylosample")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
