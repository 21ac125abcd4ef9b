//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Moodle portal access
    #[serde(default)]
    pub portal: PortalConfig,

    /// Scrape timer settings
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Discord destination
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Local document archive
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Class/year to role id mappings
    #[serde(default)]
    pub roles: Vec<RoleMapping>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load a base file with an optional override file merged on top.
    ///
    /// Tables merge key by key; any other value in the override replaces the
    /// base value. A missing override file is not an error.
    pub fn load_layered(base: impl AsRef<Path>, overlay: impl AsRef<Path>) -> Result<Self> {
        let mut merged: toml::Value = toml::from_str(&fs::read_to_string(base)?)?;

        let overlay = overlay.as_ref();
        if overlay.exists() {
            let patch: toml::Value = toml::from_str(&fs::read_to_string(overlay)?)?;
            merge_values(&mut merged, patch);
        }

        Ok(merged.try_into()?)
    }

    /// Load layered configuration or return default if loading fails.
    pub fn load_or_default(base: impl AsRef<Path>, overlay: impl AsRef<Path>) -> Self {
        Self::load_layered(&base, &overlay).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                base.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("portal.login_url", &self.portal.login_url),
            ("portal.course_url", &self.portal.course_url),
            ("portal.username", &self.portal.username),
            ("portal.password", &self.portal.password),
            ("portal.table_name", &self.portal.table_name),
            ("portal.login_success", &self.portal.login_success),
            ("portal.login_info_selector", &self.portal.login_info_selector),
            ("http.user_agent", &self.http.user_agent),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
        }
        if self.schedule.interval_secs == 0 {
            return Err(AppError::validation("schedule.interval_secs must be > 0"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if let Some(role) = self.roles.iter().find(|r| r.role_id.trim().is_empty()) {
            return Err(AppError::validation(format!(
                "role mapping for year '{}' has an empty role_id",
                role.year
            )));
        }
        Ok(())
    }

    /// Validate the parts needed to post into Discord.
    pub fn validate_discord(&self) -> Result<()> {
        if self.discord.token.trim().is_empty() {
            return Err(AppError::validation("discord.token is empty"));
        }
        if self.discord.channel_id.trim().is_empty() {
            return Err(AppError::validation("discord.channel_id is empty"));
        }
        Ok(())
    }
}

fn merge_values(base: &mut toml::Value, patch: toml::Value) {
    match (base, patch) {
        (toml::Value::Table(base), toml::Value::Table(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Moodle portal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Login form target
    #[serde(default = "defaults::login_url")]
    pub login_url: String,

    /// Course page listing the plan document
    #[serde(default = "defaults::course_url")]
    pub course_url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Label text of the download link
    #[serde(default = "defaults::table_name")]
    pub table_name: String,

    /// Lowercase text expected in the login info box after a successful login
    #[serde(default = "defaults::login_success")]
    pub login_success: String,

    /// Element holding the login info text
    #[serde(default = "defaults::login_info_selector")]
    pub login_info_selector: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: defaults::login_url(),
            course_url: defaults::course_url(),
            username: String::new(),
            password: String::new(),
            table_name: defaults::table_name(),
            login_success: defaults::login_success(),
            login_info_selector: defaults::login_info_selector(),
        }
    }
}

/// Scrape timer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between the end of one cycle and the start of the next
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Discord destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub token: String,

    /// Channel receiving the plan; empty disables posting
    #[serde(default)]
    pub channel_id: String,

    #[serde(default = "defaults::api_base")]
    pub api_base: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channel_id: String::new(),
            api_base: defaults::api_base(),
        }
    }
}

/// Downloaded document archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "defaults::archive_enabled")]
    pub enabled: bool,

    #[serde(default = "defaults::archive_dir")]
    pub dir: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::archive_enabled(),
            dir: defaults::archive_dir(),
        }
    }
}

/// Role pinged for a year, or for one class of a year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleMapping {
    /// Year part of the class name, e.g. "8" or "11.1"
    pub year: String,

    /// Class letter, absent for year-wide roles
    #[serde(default)]
    pub class: Option<String>,

    pub role_id: String,
}

mod defaults {
    pub fn login_url() -> String {
        "https://moodle.example.org/login/index.php".into()
    }
    pub fn course_url() -> String {
        "https://moodle.example.org/course/view.php?id=1".into()
    }
    pub fn table_name() -> String {
        "Vertretungsplan".into()
    }
    pub fn login_success() -> String {
        "sie sind angemeldet als".into()
    }
    pub fn login_info_selector() -> String {
        ".logininfo".into()
    }

    pub fn interval() -> u64 {
        300
    }

    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; substitution-relay/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    pub fn api_base() -> String {
        "https://discord.com/api/v10".into()
    }

    pub fn archive_enabled() -> bool {
        true
    }
    pub fn archive_dir() -> String {
        "moodle-pdfs".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.portal.username = "student".into();
        config.portal.password = "secret".into();
        config
    }

    #[test]
    fn validate_filled_config_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_credentials() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = valid_config();
        config.schedule.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_discord_requires_token_and_channel() {
        let mut config = valid_config();
        assert!(config.validate_discord().is_err());
        config.discord.token = "abc".into();
        config.discord.channel_id = "42".into();
        assert!(config.validate_discord().is_ok());
    }

    #[test]
    fn override_file_merges_over_base() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("config.toml");
        let overlay = tmp.path().join("config.override.toml");
        fs::write(
            &base,
            r#"
[portal]
username = "student"
password = "public"
table_name = "Vertretungsplan"

[schedule]
interval_secs = 60

[[roles]]
year = "8"
class = "B"
role_id = "100"
"#,
        )
        .unwrap();
        fs::write(&overlay, "[portal]\npassword = \"secret\"\n").unwrap();

        let config = Config::load_layered(&base, &overlay).unwrap();
        assert_eq!(config.portal.username, "student");
        assert_eq!(config.portal.password, "secret");
        assert_eq!(config.schedule.interval_secs, 60);
        assert_eq!(config.roles.len(), 1);
        assert_eq!(config.roles[0].class.as_deref(), Some("B"));
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn missing_override_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("config.toml");
        fs::write(&base, "[schedule]\ninterval_secs = 90\n").unwrap();

        let config = Config::load_layered(&base, tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.schedule.interval_secs, 90);
        assert_eq!(config.archive.dir, "moodle-pdfs");
    }
}
