use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::core::{Assigner, DEFAULT_MAX_STEPS};
use crate::models::{ForbiddenPair, HardRules, PenaltyWeights};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerSettings,
    #[serde(default)]
    #[validate(nested)]
    pub roster: RosterSettings,
    #[serde(default)]
    #[validate(nested)]
    pub export: ExportSettings,
    #[serde(default)]
    #[validate(nested)]
    pub penalties: PenaltySettings,
    #[serde(default)]
    pub rules: RuleSettings,
    #[serde(default)]
    #[validate(nested)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RosterSettings {
    #[serde(default = "default_roster_path")]
    #[validate(length(min = 1))]
    pub path: String,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self { path: default_roster_path() }
    }
}

fn default_roster_path() -> String { "config/roster.toml".to_string() }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExportSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_export_path")]
    #[validate(length(min = 1))]
    pub path: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_export_path(),
        }
    }
}

fn default_true() -> bool { true }
fn default_export_path() -> String { "Secret_Santa_Result.xlsx".to_string() }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PenaltySettings {
    #[serde(default = "default_max_ideal_gifts")]
    #[validate(range(min = 1))]
    pub max_ideal_gifts: u32,
    #[serde(default = "default_parent_child")]
    pub parent_child: i32,
    #[serde(default = "default_grandparent_grandchild")]
    pub grandparent_grandchild: i32,
    #[serde(default = "default_shared_grandparents")]
    pub shared_grandparents: i32,
    #[serde(default = "default_grandparent_to_grandparent")]
    pub grandparent_to_grandparent: i32,
    #[serde(default = "default_too_many_gifts")]
    pub too_many_gifts: i32,
    #[serde(default = "default_first_gift_bonus")]
    pub first_gift_bonus: i32,
    #[serde(default = "default_two_adults")]
    pub two_adults: i32,
    #[serde(default = "default_two_children")]
    pub two_children: i32,
    #[serde(default = "default_mixed_bonus")]
    pub mixed_bonus: i32,
}

impl Default for PenaltySettings {
    fn default() -> Self {
        Self {
            max_ideal_gifts: default_max_ideal_gifts(),
            parent_child: default_parent_child(),
            grandparent_grandchild: default_grandparent_grandchild(),
            shared_grandparents: default_shared_grandparents(),
            grandparent_to_grandparent: default_grandparent_to_grandparent(),
            too_many_gifts: default_too_many_gifts(),
            first_gift_bonus: default_first_gift_bonus(),
            two_adults: default_two_adults(),
            two_children: default_two_children(),
            mixed_bonus: default_mixed_bonus(),
        }
    }
}

fn default_max_ideal_gifts() -> u32 { 2 }
fn default_parent_child() -> i32 { 25 }
fn default_grandparent_grandchild() -> i32 { 25 }
fn default_shared_grandparents() -> i32 { 20 }
fn default_grandparent_to_grandparent() -> i32 { 15 }
fn default_too_many_gifts() -> i32 { 40 }
fn default_first_gift_bonus() -> i32 { -5 }
fn default_two_adults() -> i32 { 100 }
fn default_two_children() -> i32 { 10 }
fn default_mixed_bonus() -> i32 { -5 }

impl From<&PenaltySettings> for PenaltyWeights {
    fn from(settings: &PenaltySettings) -> Self {
        Self {
            max_ideal_gifts: settings.max_ideal_gifts,
            parent_child: settings.parent_child,
            grandparent_grandchild: settings.grandparent_grandchild,
            shared_grandparents: settings.shared_grandparents,
            grandparent_to_grandparent: settings.grandparent_to_grandparent,
            too_many_gifts: settings.too_many_gifts,
            first_gift_bonus: settings.first_gift_bonus,
            two_adults: settings.two_adults,
            two_children: settings.two_children,
            mixed_bonus: settings.mixed_bonus,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleSettings {
    #[serde(default)]
    pub forbid_parent_child: bool,
    #[serde(default)]
    pub forbidden_pairs: Vec<ForbiddenPairSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForbiddenPairSettings {
    pub giver: String,
    pub receiver: String,
}

impl From<&RuleSettings> for HardRules {
    fn from(settings: &RuleSettings) -> Self {
        Self {
            forbid_parent_child: settings.forbid_parent_child,
            forbidden_pairs: settings
                .forbidden_pairs
                .iter()
                .map(|pair| ForbiddenPair {
                    giver: pair.giver.clone(),
                    receiver: pair.receiver.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchSettings {
    /// Commits a single search may make before giving up
    #[serde(default = "default_max_steps")]
    #[validate(range(min = 1))]
    pub max_steps: usize,
    /// Largest roster accepted over HTTP, counted in listed names
    #[serde(default = "default_max_participants")]
    #[validate(range(min = 1))]
    pub max_participants: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            max_participants: default_max_participants(),
        }
    }
}

fn default_max_steps() -> usize { DEFAULT_MAX_STEPS }
fn default_max_participants() -> usize { 500 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

/// Errors raised while loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SANTA_)
    pub fn load() -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SANTA__EXPORT__PATH -> export.path
            .add_source(env_source())
            .build()?;

        Self::finish(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        Self::finish(settings)
    }

    fn finish(config: Config) -> Result<Self, SettingsError> {
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn weights(&self) -> PenaltyWeights {
        PenaltyWeights::from(&self.penalties)
    }

    pub fn hard_rules(&self) -> HardRules {
        HardRules::from(&self.rules)
    }

    /// Assigner carrying the configured weights, rules and search budget
    pub fn assigner(&self) -> Assigner {
        Assigner::new(self.weights(), self.hard_rules()).with_max_steps(self.search.max_steps)
    }

    pub fn roster_path(&self) -> PathBuf {
        PathBuf::from(&self.roster.path)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("SANTA")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_penalties_match_weights() {
        let settings = PenaltySettings::default();
        assert_eq!(PenaltyWeights::from(&settings), PenaltyWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "compact");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [roster]
            path = "family.json"

            [penalties]
            two_adults = 50

            [rules]
            forbid_parent_child = true
            forbidden_pairs = [{{ giver = "Lea", receiver = "Dov" }}]
            "#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();

        assert_eq!(settings.roster.path, "family.json");
        assert_eq!(settings.weights().two_adults, 50);
        assert_eq!(settings.weights().parent_child, 25);
        assert_eq!(settings.server.port, 8080);
        assert!(settings.export.enabled);
        assert_eq!(settings.search.max_participants, 500);
        assert_eq!(settings.assigner().max_steps(), DEFAULT_MAX_STEPS);

        let rules = settings.hard_rules();
        assert!(rules.forbid_parent_child);
        assert_eq!(rules.forbidden_pairs[0].giver, "Lea");
    }

    #[test]
    fn test_rejects_zero_gift_limit() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[penalties]\nmax_ideal_gifts = 0").unwrap();

        let err = Settings::load_from(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_search_limits_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\nmax_steps = 5000\nmax_participants = 40").unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.assigner().max_steps(), 5000);
        assert_eq!(settings.search.max_participants, 40);
    }

    #[test]
    fn test_rejects_zero_search_budget() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[search]\nmax_steps = 0").unwrap();

        let err = Settings::load_from(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }
}
