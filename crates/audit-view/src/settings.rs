//! Configuration from the environment and the editable settings page.

use crate::{ViewError, DEFAULT_NOTIFY_TTL};
use audit_types::ExportFormat;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const ALERT_DAYS: RangeInclusive<u32> = 1..=365;

/// Startup configuration.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub api_url: String,
    pub notify_ttl: Duration,
    pub alert_days: u32,
    pub export_format: ExportFormat,
    pub download_dir: PathBuf,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3001".to_string(),
            notify_ttl: DEFAULT_NOTIFY_TTL,
            alert_days: 30,
            export_format: ExportFormat::Csv,
            download_dir: PathBuf::from("."),
        }
    }
}

impl ViewConfig {
    /// Read `AUDIT_API_URL`, `AUDIT_NOTIFY_TTL_MS`, `AUDIT_ALERT_DAYS`, `AUDIT_EXPORT_FORMAT`
    /// and `AUDIT_DOWNLOAD_DIR`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ViewError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ViewError> {
        let mut config = Self::default();
        if let Some(url) = lookup("AUDIT_API_URL") {
            config.api_url = url;
        }
        if let Some(ms) = lookup("AUDIT_NOTIFY_TTL_MS") {
            let ms = match ms.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(ViewError::Validation(format!("AUDIT_NOTIFY_TTL_MS: {ms:?}")));
                }
            };
            config.notify_ttl = Duration::from_millis(ms);
        }
        if let Some(days) = lookup("AUDIT_ALERT_DAYS") {
            config.alert_days = parse_alert_days(&days)?;
        }
        if let Some(format) = lookup("AUDIT_EXPORT_FORMAT") {
            config.export_format = format
                .trim()
                .parse()
                .map_err(|e| ViewError::Validation(format!("AUDIT_EXPORT_FORMAT: {e}")))?;
        }
        if let Some(dir) = lookup("AUDIT_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }
        Ok(config)
    }
}

fn parse_alert_days(raw: &str) -> Result<u32, ViewError> {
    let days: u32 = raw
        .trim()
        .parse()
        .map_err(|_| ViewError::Validation(format!("alert days: {raw:?}")))?;
    check_alert_days(days)
}

fn check_alert_days(days: u32) -> Result<u32, ViewError> {
    if !ALERT_DAYS.contains(&days) {
        return Err(ViewError::Validation(format!(
            "alert days must be within {}..={}, got {days}",
            ALERT_DAYS.start(),
            ALERT_DAYS.end()
        )));
    }
    Ok(days)
}

/// What the settings page shows and edits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub api_url: String,
    pub alert_days: u32,
    pub notifications_enabled: bool,
    pub export_format: ExportFormat,
    pub version: &'static str,
}

impl Settings {
    pub fn from_config(config: &ViewConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            alert_days: config.alert_days,
            notifications_enabled: true,
            export_format: config.export_format,
            version: APP_VERSION,
        }
    }

    /// Validate the whole patch, then apply it. Nothing changes on error.
    pub fn apply(&mut self, patch: SettingsPatch) -> Result<(), ViewError> {
        if let Some(days) = patch.alert_days {
            check_alert_days(days)?;
        }
        if let Some(days) = patch.alert_days {
            self.alert_days = days;
        }
        if let Some(enabled) = patch.notifications_enabled {
            self.notifications_enabled = enabled;
        }
        if let Some(format) = patch.export_format {
            self.export_format = format;
        }
        Ok(())
    }
}

/// Partial update from the settings form. The API URL is fixed at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub alert_days: Option<u32>,
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
    #[serde(default)]
    pub export_format: Option<ExportFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ViewConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, "http://localhost:3001");
        assert_eq!(config.notify_ttl, Duration::from_secs(3));
        assert_eq!(config.alert_days, 30);
        assert_eq!(config.export_format, ExportFormat::Csv);
    }

    #[test]
    fn reads_overrides() {
        let config = ViewConfig::from_lookup(lookup(&[
            ("AUDIT_API_URL", "http://backend:3001"),
            ("AUDIT_NOTIFY_TTL_MS", "500"),
            ("AUDIT_ALERT_DAYS", "14"),
            ("AUDIT_EXPORT_FORMAT", "xlsx"),
            ("AUDIT_DOWNLOAD_DIR", "/tmp/exports"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://backend:3001");
        assert_eq!(config.notify_ttl, Duration::from_millis(500));
        assert_eq!(config.alert_days, 14);
        assert_eq!(config.export_format, ExportFormat::Xlsx);
        assert_eq!(config.download_dir, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ViewConfig::from_lookup(lookup(&[("AUDIT_ALERT_DAYS", "0")])).is_err());
        assert!(ViewConfig::from_lookup(lookup(&[("AUDIT_EXPORT_FORMAT", "pdf")])).is_err());
        assert!(ViewConfig::from_lookup(lookup(&[("AUDIT_NOTIFY_TTL_MS", "soon")])).is_err());
        assert!(ViewConfig::from_lookup(lookup(&[("AUDIT_NOTIFY_TTL_MS", "0")])).is_err());
    }

    #[test]
    fn invalid_patch_changes_nothing() {
        let mut settings = Settings::from_config(&ViewConfig::default());
        let before = settings.clone();
        let err = settings.apply(SettingsPatch {
            alert_days: Some(400),
            notifications_enabled: Some(false),
            export_format: Some(ExportFormat::Json),
        });
        assert!(err.is_err());
        assert_eq!(settings, before);

        settings
            .apply(SettingsPatch {
                alert_days: Some(7),
                ..SettingsPatch::default()
            })
            .unwrap();
        assert_eq!(settings.alert_days, 7);
        assert!(settings.notifications_enabled);
    }
}
