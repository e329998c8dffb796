use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::DatasetStorage;

pub const DEFAULT_CONFIG_PATH: &str = "conf/pipeline.json";

/// Which query front-end evaluates the trend join.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Lazy,
    Sql,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String, // "pretty" or "json"
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub engine: Engine,
    pub logging: LoggingSettings,
    pub catalog: BTreeMap<String, DatasetStorage>,
}

impl Settings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str::<Self>(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Compression, Format};

    #[test]
    fn parses_full_settings() -> Result<()> {
        let settings = Settings::from_json(
            r#"{
                "engine": "sql",
                "logging": {"level": "debug", "format": "json"},
                "catalog": {
                    "international_top_terms": {"path": "data/01_raw/top_terms.parquet", "format": "parquet"},
                    "preprocessed_data": {"path": "data/02_intermediate/out.csv", "format": "csv", "compression": "zstd"}
                }
            }"#,
        )?;
        assert_eq!(settings.engine, Engine::Sql);
        assert_eq!(settings.logging.format, "json");
        assert_eq!(settings.catalog.len(), 2);
        let out = &settings.catalog["preprocessed_data"];
        assert_eq!(out.format, Format::Csv);
        assert_eq!(out.compression, Some(Compression::Zstd));
        Ok(())
    }

    #[test]
    fn empty_object_uses_defaults() -> Result<()> {
        let settings = Settings::from_json("{}")?;
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.engine, Engine::Lazy);
        assert_eq!(settings.logging.level, "info");
        Ok(())
    }

    #[test]
    fn rejects_unknown_format() {
        let err = Settings::from_json(r#"{"catalog": {"a": {"path": "a.xlsx", "format": "excel"}}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn ships_sample_config() -> Result<()> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let settings = Settings::from_file(path)?;
        assert!(settings.catalog.contains_key("international_top_terms"));
        assert!(settings.catalog.contains_key("international_top_rising_terms"));
        assert!(settings.catalog.contains_key("preprocessed_data"));
        Ok(())
    }
}
