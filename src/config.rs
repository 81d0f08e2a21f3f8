use std::path::PathBuf;

use crate::adaptive::config::AdaptiveConfig;

pub const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `focusflow_adaptive=debug`.
    pub level: String,
    /// Directory for rolled log files; `None` keeps logging on stderr only.
    pub file_dir: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            file_dir: file_dir_from(
                std::env::var("ENABLE_FILE_LOGS").ok().as_deref(),
                std::env::var("LOG_DIR").ok(),
            ),
        }
    }
}

fn file_dir_from(enabled: Option<&str>, dir: Option<String>) -> Option<PathBuf> {
    let enabled = enabled.is_some_and(|v| matches!(v.trim(), "true" | "1"));
    if !enabled {
        return None;
    }
    let dir = dir.filter(|d| !d.trim().is_empty());
    Some(PathBuf::from(dir.unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub logging: LogSettings,
    pub adaptive: AdaptiveConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            logging: LogSettings::from_env(),
            adaptive: AdaptiveConfig::from_env(),
        }
    }
}
