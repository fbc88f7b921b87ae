use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::analysis::cv_extractor::{CvAnalysisOptions, OverlapPolicy};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Root of the flat-file document store.
    pub data_dir: PathBuf,
    pub experience_overlap: OverlapPolicy,
    /// Seeds variant generation; unset means every section is modified.
    pub variant_seed: Option<u64>,
    pub variant_modify_probability: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            data_dir: PathBuf::from("./data"),
            experience_overlap: OverlapPolicy::Sum,
            variant_seed: None,
            variant_modify_probability: 0.7,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let variant_modify_probability: f64 =
            parse_env("VARIANT_MODIFY_PROBABILITY")?.unwrap_or(defaults.variant_modify_probability);
        if !(0.0..=1.0).contains(&variant_modify_probability) {
            anyhow::bail!(
                "VARIANT_MODIFY_PROBABILITY must be within [0, 1], got {variant_modify_probability}"
            );
        }

        Ok(Config {
            port: parse_env("PORT")?.unwrap_or(defaults.port),
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            experience_overlap: match std::env::var("EXPERIENCE_OVERLAP") {
                Ok(raw) => raw.parse::<OverlapPolicy>().map_err(anyhow::Error::msg)?,
                Err(_) => defaults.experience_overlap,
            },
            variant_seed: parse_env("VARIANT_SEED")?,
            variant_modify_probability,
        })
    }

    pub fn cv_options(&self) -> CvAnalysisOptions {
        CvAnalysisOptions {
            overlap_policy: self.experience_overlap,
            current_year: None,
        }
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(None),
    }
}
