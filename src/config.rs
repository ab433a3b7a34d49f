use crate::error::GachaError;
use log::warn;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

// --- Configuration (Data-Driven) ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Banner mode at startup and after a reset.
    pub pick_up: bool,
    pub stone_name: String,
    /// "en" or "ja"; falls back to `LANG` when unset.
    pub language: Option<String>,
    /// Stones bought by a bare `c`.
    pub default_purchase: u32,
    /// Summons drawn by a bare `g` or an empty line.
    pub default_trials: u32,
    pub max_trials: u32,
    /// Largest stone count a single `c` may buy.
    pub max_purchase: u32,
    pub worker_max_threads: usize,
    pub worker_reserve_cores: usize,
    pub worker_stack_size_mb: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pick_up: true,
            stone_name: "Saint Quartz".to_string(),
            language: None,
            default_purchase: 167,
            default_trials: 10,
            max_trials: 100_000,
            max_purchase: 100_000,
            worker_max_threads: 0,
            worker_reserve_cores: 1,
            worker_stack_size_mb: 4,
        }
    }
}

impl Config {
    pub fn from_json(contents: &str) -> Result<Self, GachaError> {
        serde_json::from_str(contents).map_err(|e| GachaError::Config {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    /// Loads `path`, then `../../path` (running from `target/<profile>/`).
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: &str) -> Result<Self, GachaError> {
        let candidates = [path.to_string(), format!("../../{}", path)];
        for candidate in &candidates {
            match fs::read_to_string(Path::new(candidate)) {
                Ok(contents) => {
                    return serde_json::from_str(&contents).map_err(|e| GachaError::Config {
                        path: candidate.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(GachaError::Config {
                        path: candidate.clone(),
                        reason: e.to_string(),
                    })
                }
            }
        }
        warn!("Config not found at '{}', using defaults", path);
        Ok(Config::default())
    }
}
