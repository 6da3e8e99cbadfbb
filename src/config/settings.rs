use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::notify::Channel;

fn default_city() -> String {
    "Bad Kissingen".to_string()
}
fn default_country() -> String {
    "Germany".to_string()
}
fn default_method() -> u8 {
    2
}
fn default_channel() -> Channel {
    Channel::WhatsApp
}
fn default_lead_minutes() -> u32 {
    10
}
fn default_workout_days() -> Vec<String> {
    vec!["monday".into(), "thursday".into(), "sunday".into()]
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
    /// Aladhan calculation method id (2 = ISNA).
    #[serde(default = "default_method")]
    pub method: u8,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            country: default_country(),
            method: default_method(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Destination number, E.164-like ("+491701234567").
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_channel")]
    pub channel: Channel,
    /// Minutes before a prayer's start that the watch daemon fires.
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            phone: String::new(),
            channel: default_channel(),
            lead_minutes: default_lead_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutConfig {
    /// Lowercase English weekday names.
    #[serde(default = "default_workout_days")]
    pub days: Vec<String>,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            days: default_workout_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HijriConfig {
    /// Days to add/subtract for local moon sighting.
    #[serde(default)]
    pub offset_days: i32,
}

/// On-disk configuration. Secrets (CRON_SECRET, TWILIO_*, SUPERCHAT_API_KEY)
/// come from the environment and are never written here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub workout: WorkoutConfig,
    #[serde(default)]
    pub hijri: HijriConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "mizan").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("mizan.db"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(&path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_full_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.location.city, "Bad Kissingen");
        assert_eq!(config.location.method, 2);
        assert_eq!(config.reminders.lead_minutes, 10);
        assert_eq!(config.reminders.channel, Channel::WhatsApp);
        assert!(config.reminders.enabled);
        assert_eq!(config.workout.days.len(), 3);
        assert_eq!(config.hijri.offset_days, 0);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [location]
            city = "Berlin"

            [reminders]
            phone = "+491701234567"
            channel = "sms"
            "#,
        )
        .unwrap();
        assert_eq!(config.location.city, "Berlin");
        assert_eq!(config.location.country, "Germany");
        assert_eq!(config.reminders.phone, "+491701234567");
        assert_eq!(config.reminders.channel, Channel::Sms);
        assert_eq!(config.reminders.lead_minutes, 10);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = AppConfig::default();
        config.location.city = "Islamabad".into();
        config.location.country = "Pakistan".into();
        config.reminders.phone = "+923001234567".into();
        config.hijri.offset_days = -1;

        let text = toml::to_string_pretty(&config).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.location.city, "Islamabad");
        assert_eq!(back.reminders.phone, "+923001234567");
        assert_eq!(back.hijri.offset_days, -1);
    }
}
