//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "app": { "owner": "local" },
//!   "categories": { "income": ["Salário", ...], "expense": ["Aluguel", ...] },
//!   "periodShifts": { "income": { "AC-4": 2 }, "expense": {} }
//! }
//! ```
//! Keys this crate does not manage are preserved when saving.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::result::Result;
use crate::domain::{CategoryRegistry, PeriodShifts};

pub const SETTINGS_FILE: &str = "settings.json";

/// Environment variable overriding the configured owner
pub const OWNER_ENV: &str = "COMPETENCIA_OWNER";

pub const DEFAULT_OWNER: &str = "local";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    categories: Option<CategoryRegistry>,
    #[serde(default)]
    period_shifts: Option<PeriodShifts>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Store partition the CLI reads and writes
    pub owner: String,
    pub categories: CategoryRegistry,
    pub period_shifts: PeriodShifts,
    /// Owner taken from `COMPETENCIA_OWNER`; never written back to the file
    env_owner: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            categories: CategoryRegistry::default(),
            period_shifts: PeriodShifts::default(),
            env_owner: None,
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing or unparsable file yields the defaults. `COMPETENCIA_OWNER`
    /// overrides the stored owner.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let env_owner = std::env::var(OWNER_ENV).ok();
        Self::load_with_owner(data_dir, env_owner.as_deref())
    }

    /// Load config, letting `owner_override` replace the stored owner for this run
    pub fn load_with_owner(data_dir: &Path, owner_override: Option<&str>) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        let env_owner = owner_override
            .map(str::trim)
            .filter(|owner| !owner.is_empty())
            .map(str::to_string);

        let owner = match &env_owner {
            Some(owner) => owner.clone(),
            None => raw
                .app
                .owner
                .clone()
                .unwrap_or_else(|| DEFAULT_OWNER.to_string()),
        };

        Ok(Self {
            owner,
            categories: raw.categories.unwrap_or_default(),
            period_shifts: raw.period_shifts.unwrap_or_default(),
            env_owner,
        })
    }

    /// Save config to the data directory, preserving settings we don't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        // An overridden owner stays out of the file
        if self.env_owner.as_ref() != Some(&self.owner) {
            settings.app.owner = Some(self.owner.clone());
        }
        settings.categories = Some(self.categories.clone());
        settings.period_shifts = Some(self.period_shifts.clone());

        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }

    let content = std::fs::read_to_string(&settings_path)?;
    match serde_json::from_str(&content) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            warn!(path = %settings_path.display(), error = %e, "ignoring unreadable settings");
            Ok(SettingsFile::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionKind;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.categories, CategoryRegistry::default());
        assert_eq!(config.period_shifts.get(TransactionKind::Income, "AC-4"), 2);
    }

    #[test]
    fn test_unparsable_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.period_shifts, PeriodShifts::default());
    }

    #[test]
    fn test_save_persists_categories_and_shifts() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load(dir.path()).unwrap();
        config.categories.add(TransactionKind::Expense, "Academia").unwrap();
        config.period_shifts.set(TransactionKind::Income, "Salário", 1);
        config.save(dir.path()).unwrap();

        let reloaded = Config::load(dir.path()).unwrap();
        assert!(reloaded.categories.is_allowed(TransactionKind::Expense, "Academia"));
        assert_eq!(reloaded.period_shifts.get(TransactionKind::Income, "Salário"), 1);
        assert_eq!(reloaded.period_shifts.get(TransactionKind::Income, "AC-4"), 2);
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"app":{"theme":"dark"},"dashboard":{"chart":"pie"}}"#,
        )
        .unwrap();

        Config::load(dir.path()).unwrap().save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["app"]["theme"], "dark");
        assert_eq!(value["dashboard"]["chart"], "pie");
        assert_eq!(value["periodShifts"]["income"]["AC-4"], 2);
    }

    #[test]
    fn test_owner_override_is_not_saved() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{"app":{"owner":"ana"}}"#).unwrap();

        let mut config = Config::load_with_owner(dir.path(), Some("bruno")).unwrap();
        assert_eq!(config.owner, "bruno");
        config.categories.add(TransactionKind::Expense, "Academia").unwrap();
        config.save(dir.path()).unwrap();

        let reloaded = Config::load_with_owner(dir.path(), None).unwrap();
        assert_eq!(reloaded.owner, "ana");
        assert!(reloaded.categories.is_allowed(TransactionKind::Expense, "Academia"));
    }

    #[test]
    fn test_blank_override_keeps_stored_owner() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{"app":{"owner":"ana"}}"#).unwrap();
        let config = Config::load_with_owner(dir.path(), Some("  ")).unwrap();
        assert_eq!(config.owner, "ana");
    }
}
