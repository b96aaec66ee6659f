use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use evidence_deck_application::{
    PersistencePolicy, DEFAULT_PERSISTENCE_ATTEMPTS, DEFAULT_PERSISTENCE_TIMEOUT,
};

pub const DEFAULT_DATABASE_PATH: &str = "evidence-deck.sqlite3";
pub const DEFAULT_SETTINGS_PATH: &str = "report-settings.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub settings_path: PathBuf,
    pub persistence: PersistencePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            settings_path: PathBuf::from(DEFAULT_SETTINGS_PATH),
            persistence: PersistencePolicy::default(),
        }
    }
}

/// Global flags shared by every subcommand. Unset flags fall back to the
/// environment, then to the defaults above.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Photo database file
    #[arg(long, global = true, env = "EVIDENCE_DECK_DB")]
    pub db: Option<PathBuf>,
    /// Report settings file
    #[arg(long, global = true, env = "EVIDENCE_DECK_SETTINGS")]
    pub settings_file: Option<PathBuf>,
    /// Per-call persistence timeout in milliseconds
    #[arg(long, global = true, env = "EVIDENCE_DECK_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
    /// Attempts per persistence call
    #[arg(long, global = true, env = "EVIDENCE_DECK_ATTEMPTS")]
    pub attempts: Option<u32>,
}

impl AppConfig {
    pub fn from_args(args: &ConfigArgs) -> Self {
        let defaults = Self::default();
        Self {
            database_path: args.db.clone().unwrap_or(defaults.database_path),
            settings_path: args
                .settings_file
                .clone()
                .unwrap_or(defaults.settings_path),
            persistence: PersistencePolicy {
                timeout: args
                    .timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_PERSISTENCE_TIMEOUT),
                attempts: args.attempts.unwrap_or(DEFAULT_PERSISTENCE_ATTEMPTS),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_args_use_defaults() {
        assert_eq!(AppConfig::from_args(&ConfigArgs::default()), AppConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let args = ConfigArgs {
            db: Some(PathBuf::from("/tmp/case.sqlite3")),
            timeout_ms: Some(250),
            attempts: Some(4),
            ..ConfigArgs::default()
        };
        let config = AppConfig::from_args(&args);
        assert_eq!(config.database_path, PathBuf::from("/tmp/case.sqlite3"));
        assert_eq!(config.settings_path, PathBuf::from(DEFAULT_SETTINGS_PATH));
        assert_eq!(config.persistence.timeout, Duration::from_millis(250));
        assert_eq!(config.persistence.attempts, 4);
    }
}
