use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::log_warn;

const ENABLE_LOGS: bool = true;

pub const DEFAULT_AD_SPEED: f64 = 4.0;

/// Viewer preferences, stored under the keys the options form writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdSettings {
    pub ad_speed: f64,
    pub auto_skip: bool,
    pub use_max_ad_speed: bool,
}

impl Default for AdSettings {
    fn default() -> Self {
        Self {
            ad_speed: DEFAULT_AD_SPEED,
            auto_skip: true,
            use_max_ad_speed: true,
        }
    }
}

impl AdSettings {
    /// Per-key lenient read: anything missing or malformed keeps its default.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(map) = value.as_object() else {
            return defaults;
        };
        Self {
            ad_speed: parse_speed(map.get("adSpeed")).unwrap_or(defaults.ad_speed),
            auto_skip: bool_key(map, "autoSkip").unwrap_or(defaults.auto_skip),
            use_max_ad_speed: bool_key(map, "useMaxAdSpeed").unwrap_or(defaults.use_max_ad_speed),
        }
    }

    /// Same rule the options form applies on save.
    pub fn normalized(mut self) -> Self {
        if !(self.ad_speed.is_finite() && self.ad_speed > 0.0) {
            self.ad_speed = DEFAULT_AD_SPEED;
        }
        self
    }
}

fn bool_key(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

/// Numbers, or strings with a leading float (`"2.5x"` reads as 2.5).
fn parse_speed(value: Option<&Value>) -> Option<f64> {
    let speed = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => leading_float(s)?,
        _ => return None,
    };
    (speed.is_finite() && speed > 0.0).then_some(speed)
}

fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mut seen_dot = false;
    let mut seen_digit = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }

    // An exponent counts only when a digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let digits = bytes[exp..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 {
            end = exp + digits;
        }
    }
    s[..end].parse().ok()
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("adquick").join("settings.json"))
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AdSettings>,
}

impl SettingsStore {
    /// Never fails on content: an unreadable or malformed file yields
    /// defaults so startup is not blocked.
    pub fn new(path: PathBuf) -> Self {
        let data = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str::<Value>(&contents) {
                    Ok(value) => AdSettings::from_value(&value),
                    Err(err) => {
                        log_warn!("settings at {} are not JSON ({err}); using defaults", path.display());
                        AdSettings::default()
                    }
                },
                Err(err) => {
                    log_warn!("failed to read settings from {}: {err}; using defaults", path.display());
                    AdSettings::default()
                }
            }
        } else {
            log_warn!("no settings at {}; using defaults", path.display());
            AdSettings::default()
        };

        Self {
            path,
            data: RwLock::new(data),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn ad_settings(&self) -> AdSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Used by the settings command only; the monitor never writes.
    pub fn update(&self, settings: AdSettings) -> Result<AdSettings> {
        let settings = settings.normalized();
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.persist(&settings)?;
        *guard = settings.clone();
        Ok(settings)
    }

    fn persist(&self, data: &AdSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("adquick-settings-{}-{name}", std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn empty_store_reads_defaults() {
        let settings = AdSettings::from_value(&json!({}));
        assert_eq!(settings, AdSettings::default());
        assert_eq!(settings.ad_speed, 4.0);
        assert!(settings.auto_skip);
        assert!(settings.use_max_ad_speed);
    }

    #[test]
    fn keys_are_read_independently() {
        let settings = AdSettings::from_value(&json!({
            "adSpeed": -2,
            "autoSkip": false,
            "useMaxAdSpeed": "no"
        }));
        assert_eq!(settings.ad_speed, 4.0);
        assert!(!settings.auto_skip);
        assert!(settings.use_max_ad_speed);
    }

    #[test]
    fn speed_accepts_numeric_strings() {
        assert_eq!(parse_speed(Some(&json!("2.5"))), Some(2.5));
        assert_eq!(parse_speed(Some(&json!(" 3x"))), Some(3.0));
        assert_eq!(parse_speed(Some(&json!("fast"))), None);
        assert_eq!(parse_speed(Some(&json!("0"))), None);
        assert_eq!(parse_speed(Some(&json!(true))), None);
        assert_eq!(parse_speed(None), None);
    }

    #[test]
    fn speed_strings_take_exponents() {
        assert_eq!(parse_speed(Some(&json!("1e1"))), Some(10.0));
        assert_eq!(parse_speed(Some(&json!("2.5E-1x"))), Some(0.25));
        assert_eq!(parse_speed(Some(&json!("3e"))), Some(3.0));
        assert_eq!(parse_speed(Some(&json!("4e+x"))), Some(4.0));
        assert_eq!(parse_speed(Some(&json!("+.5"))), Some(0.5));
        assert_eq!(parse_speed(Some(&json!("e5"))), None);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = temp_path("missing");
        let _ = fs::remove_dir_all(path.parent().unwrap());

        let store = SettingsStore::new(path.clone());
        assert_eq!(store.ad_settings(), AdSettings::default());
        assert!(!path.exists());
    }

    #[test]
    fn non_object_falls_back() {
        assert_eq!(AdSettings::from_value(&json!([1, 2])), AdSettings::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let path = temp_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let store = SettingsStore::new(path.clone());
        assert_eq!(store.ad_settings(), AdSettings::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn update_normalizes_and_persists() {
        let path = temp_path("update");
        let store = SettingsStore::new(path.clone());
        let saved = store
            .update(AdSettings {
                ad_speed: f64::NAN,
                auto_skip: false,
                use_max_ad_speed: false,
            })
            .unwrap();
        assert_eq!(saved.ad_speed, 4.0);

        let reopened = SettingsStore::new(path.clone());
        assert_eq!(reopened.ad_settings(), saved);
        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["useMaxAdSpeed"], json!(false));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
