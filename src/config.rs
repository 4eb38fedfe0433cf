//! Configuration loading and management
//!
//! Handles parsing of `.habitviz.toml` configuration files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calendar::WeekMode;

pub const CONFIG_FILE_NAME: &str = ".habitviz.toml";
const MAX_WEEKS: u32 = 520;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the history payloads come from
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Remote export credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// Ingestion configuration
    #[serde(default)]
    pub aggregate: AggregateConfig,

    /// Grid configuration
    #[serde(default)]
    pub grid: GridConfig,
}

/// History source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Local archive in export format; relative paths resolve against the
    /// config file's directory
    #[serde(default = "default_archive")]
    pub archive: PathBuf,

    /// Remote export endpoint
    #[serde(default = "default_remote_url")]
    pub remote_url: String,

    /// Fetch the remote export at all
    #[serde(default = "default_true")]
    pub remote_enabled: bool,

    /// Remote request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_archive() -> PathBuf {
    PathBuf::from("data/habitica_tasks_history.csv")
}

fn default_remote_url() -> String {
    "https://habitica.com/export/history.csv".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            archive: default_archive(),
            remote_url: default_remote_url(),
            remote_enabled: default_true(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// API credentials for the remote export.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub api_key: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            api_key: api_key.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.api_key.trim().is_empty()
    }

    /// Replace fields with non-empty overrides (flags or environment).
    pub fn overridden(mut self, user_id: Option<&str>, api_key: Option<&str>) -> Self {
        if let Some(user_id) = user_id.filter(|value| !value.trim().is_empty()) {
            self.user_id = user_id.to_string();
        }
        if let Some(api_key) = api_key.filter(|value| !value.trim().is_empty()) {
            self.api_key = api_key.to_string();
        }
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.api_key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("api_key", &key)
            .finish()
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateConfig {
    /// Task names that never count as completions
    #[serde(default)]
    pub excluded_tasks: Vec<String>,
}

/// Grid configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of weeks shown
    #[serde(default = "default_weeks")]
    pub weeks: u32,

    /// Week arithmetic for grid columns
    #[serde(default)]
    pub week_mode: WeekMode,
}

fn default_weeks() -> u32 {
    40
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            weeks: default_weeks(),
            week_mode: WeekMode::default(),
        }
    }
}

impl Config {
    /// Load configuration from a `.habitviz.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.validate()?;
        if config.sources.archive.is_relative() {
            if let Some(dir) = path.parent() {
                config.sources.archive = dir.join(&config.sources.archive);
            }
        }
        Ok(config)
    }

    /// Resolve the config file to use: an explicit path must exist, then
    /// `.habitviz.toml` in `dir`, then the user config directory.
    pub fn locate(explicit: Option<&Path>, dir: &Path) -> crate::error::Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path.to_path_buf()));
        }

        let local = dir.join(CONFIG_FILE_NAME);
        if local.exists() {
            return Ok(Some(local));
        }

        Ok(user_config_path().filter(|path| path.exists()))
    }

    /// Load the located config, or defaults when there is none
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> crate::error::Result<Self> {
        match Self::locate(explicit, dir)? {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.sources.validate()?;
        self.aggregate.validate()?;
        self.grid.validate()?;
        Ok(())
    }
}

/// `habitviz/config.toml` under the platform config directory.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "habitviz")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

impl SourcesConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.timeout_secs == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "sources.timeout_secs must be > 0".to_string(),
            ));
        }
        if !self.remote_enabled {
            return Ok(());
        }
        let url = self.remote_url.trim();
        if url.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "sources.remote_url cannot be empty when the remote is enabled".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(crate::error::Error::InvalidConfig(format!(
                "sources.remote_url must be an http(s) URL, got '{url}'"
            )));
        }
        Ok(())
    }
}

impl AggregateConfig {
    fn validate(&self) -> crate::error::Result<()> {
        if self.excluded_tasks.iter().any(|name| name.is_empty()) {
            return Err(crate::error::Error::InvalidConfig(
                "aggregate.excluded_tasks cannot include empty entries".to_string(),
            ));
        }
        Ok(())
    }
}

impl GridConfig {
    fn validate(&self) -> crate::error::Result<()> {
        validate_weeks(self.weeks, "grid.weeks")
    }
}

pub fn validate_weeks(weeks: u32, field: &str) -> crate::error::Result<()> {
    if weeks == 0 || weeks > MAX_WEEKS {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field} must be between 1 and {MAX_WEEKS}, got {weeks}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(
            cfg.sources.archive,
            PathBuf::from("data/habitica_tasks_history.csv")
        );
        assert_eq!(cfg.sources.remote_url, "https://habitica.com/export/history.csv");
        assert!(cfg.sources.remote_enabled);
        assert_eq!(cfg.sources.timeout_secs, 30);
        assert!(!cfg.credentials.is_complete());
        assert!(cfg.aggregate.excluded_tasks.is_empty());
        assert_eq!(cfg.grid.weeks, 40);
        assert_eq!(cfg.grid.week_mode, WeekMode::Continuous);
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        let content = r#"
[sources]
archive = "history.csv"
remote_url = "http://localhost:8080/history.csv"
remote_enabled = false
timeout_secs = 5

[credentials]
user_id = "user-1"
api_key = "secret"

[aggregate]
excluded_tasks = ["Smoke"]

[grid]
weeks = 12
week_mode = "iso-week-delta"
"#;
        fs::write(&path, content.trim()).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.sources.archive, dir.path().join("history.csv"));
        assert_eq!(cfg.sources.remote_url, "http://localhost:8080/history.csv");
        assert!(!cfg.sources.remote_enabled);
        assert_eq!(cfg.sources.timeout_secs, 5);
        assert!(cfg.credentials.is_complete());
        assert_eq!(cfg.aggregate.excluded_tasks, vec!["Smoke".to_string()]);
        assert_eq!(cfg.grid.weeks, 12);
        assert_eq!(cfg.grid.week_mode, WeekMode::IsoWeekDelta);
    }

    #[test]
    fn invalid_weeks_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[grid]\nweeks = 0").expect("write config");

        let err = Config::load(&path).expect_err("invalid config");
        match err {
            crate::error::Error::InvalidConfig(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_remote_url_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[sources]\nremote_url = \"ftp://example\"").expect("write config");
        assert!(Config::load(&path).is_err());

        fs::write(
            &path,
            "[sources]\nremote_url = \"\"\nremote_enabled = false",
        )
        .expect("write config");
        assert!(Config::load(&path).is_ok());
    }

    #[test]
    fn unknown_week_mode_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[grid]\nweek_mode = \"lunar\"").expect("write config");
        assert!(matches!(
            Config::load(&path),
            Err(crate::error::Error::TomlParse(_))
        ));
    }

    #[test]
    fn locate_prefers_explicit_then_local() {
        let dir = tempfile::tempdir().expect("tempdir");
        let explicit = dir.path().join("custom.toml");
        assert!(Config::locate(Some(explicit.as_path()), dir.path()).is_err());

        fs::write(&explicit, "").expect("write config");
        assert_eq!(
            Config::locate(Some(explicit.as_path()), dir.path()).expect("locate"),
            Some(explicit.clone())
        );

        let local = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&local, "").expect("write config");
        assert_eq!(Config::locate(None, dir.path()).expect("locate"), Some(local));
    }

    #[test]
    fn credentials_debug_redacts_key() {
        let creds = Credentials::new("user-1", "secret");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("user-1"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn credential_overrides_skip_empty_values() {
        let creds = Credentials::new("user-1", "key-1").overridden(Some(""), Some("key-2"));
        assert_eq!(creds.user_id, "user-1");
        assert_eq!(creds.api_key, "key-2");
    }

    #[test]
    fn save_writes_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.toml");
        Config::default().save(&path).expect("save config");

        let written = fs::read_to_string(&path).expect("read config");
        assert!(written.contains("weeks = 40"));
        assert!(written.contains("week_mode = \"continuous\""));
    }
}
