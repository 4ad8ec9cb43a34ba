// src/config.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub const SETTINGS_FILE: &str = "settings.json";

const KEY_SHEETS_URL: &str = "sheets-url";
const KEY_REFRESH_INTERVAL: &str = "refresh-interval";
const KEY_SHOW_LIVE_DATA: &str = "show-live-data";
const KEY_MAX_RESPONSES: &str = "max-responses";
const KEY_THEME: &str = "theme";
const KEY_COOKIE_ACCEPTED: &str = "cookieAccepted";
const KEY_WELCOME_SHOWN: &str = "welcomeMessageShown";
const KEY_ADMIN_ACCESS: &str = "admin-access";
const KEY_COOKIE_PREFERENCES: &str = "cookiePreferences";

pub const DEFAULT_REFRESH_INTERVAL: u32 = 5;
pub const DEFAULT_MAX_RESPONSES: usize = 10;

/// Settings for the live data preview. Loaded wholesale at startup and
/// replaced wholesale on save or reset, never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    pub sheets_url: String,
    pub refresh_interval_minutes: u32,
    pub show_live_data: bool,
    pub max_responses: usize,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        SheetsConfig {
            sheets_url: String::new(),
            refresh_interval_minutes: DEFAULT_REFRESH_INTERVAL,
            show_live_data: true,
            max_responses: DEFAULT_MAX_RESPONSES,
        }
    }
}

impl SheetsConfig {
    /// A preview is only live when a URL is set and live data is enabled.
    pub fn is_configured(&self) -> bool {
        !self.sheets_url.is_empty() && self.show_live_data
    }
}

/// String key/value store persisted as JSON next to the process working
/// directory. Values are string-encoded, booleans as "true"/"false".
pub struct Store {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl Store {
    pub fn new() -> Self {
        Self::at(SETTINGS_FILE)
    }

    /// Missing or unreadable files start an empty store.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        Store { path, values }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
        self.persist();
    }

    fn persist(&self) {
        let json = match serde_json::to_string_pretty(&self.values) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("could not encode settings: {err}");
                return;
            }
        };
        // Write the whole map through a temp file so a save is all-or-nothing.
        let tmp = self.path.with_extension("tmp");
        if let Err(err) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, &self.path)) {
            log::warn!("could not persist settings to {}: {err}", self.path.display());
        }
    }

    pub fn sheets_config(&self) -> SheetsConfig {
        SheetsConfig {
            sheets_url: self.get(KEY_SHEETS_URL).unwrap_or_default().to_string(),
            refresh_interval_minutes: self
                .get(KEY_REFRESH_INTERVAL)
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REFRESH_INTERVAL),
            show_live_data: self.get(KEY_SHOW_LIVE_DATA) != Some("false"),
            max_responses: self
                .get(KEY_MAX_RESPONSES)
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_RESPONSES),
        }
    }

    pub fn save_sheets_config(&mut self, config: &SheetsConfig) {
        self.values
            .insert(KEY_SHEETS_URL.into(), config.sheets_url.clone());
        self.values.insert(
            KEY_REFRESH_INTERVAL.into(),
            config.refresh_interval_minutes.to_string(),
        );
        self.values
            .insert(KEY_SHOW_LIVE_DATA.into(), config.show_live_data.to_string());
        self.values
            .insert(KEY_MAX_RESPONSES.into(), config.max_responses.to_string());
        self.persist();
    }

    pub fn reset_sheets_config(&mut self) {
        self.values.remove(KEY_SHEETS_URL);
        self.values.remove(KEY_REFRESH_INTERVAL);
        self.values.remove(KEY_SHOW_LIVE_DATA);
        self.values.remove(KEY_MAX_RESPONSES);
        self.persist();
    }

    pub fn theme(&self) -> Option<&str> {
        self.get(KEY_THEME)
    }

    pub fn set_theme(&mut self, theme: &str) {
        self.set(KEY_THEME, theme.to_string());
    }

    pub fn cookie_accepted(&self) -> bool {
        self.get(KEY_COOKIE_ACCEPTED) == Some("true")
    }

    pub fn set_cookie_accepted(&mut self) {
        self.set(KEY_COOKIE_ACCEPTED, "true".into());
    }

    pub fn welcome_shown(&self) -> bool {
        self.get(KEY_WELCOME_SHOWN) == Some("true")
    }

    pub fn set_welcome_shown(&mut self) {
        self.set(KEY_WELCOME_SHOWN, "true".into());
    }

    pub fn admin_access(&self) -> bool {
        self.get(KEY_ADMIN_ACCESS) == Some("true")
    }

    pub fn set_admin_access(&mut self) {
        self.set(KEY_ADMIN_ACCESS, "true".into());
    }

    /// Consent categories, stored as a JSON-encoded map under one key.
    pub fn cookie_preferences(&self) -> BTreeMap<String, bool> {
        self.get(KEY_COOKIE_PREFERENCES)
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default()
    }

    pub fn set_cookie_preferences(&mut self, preferences: &BTreeMap<String, bool>) {
        match serde_json::to_string(preferences) {
            Ok(json) => self.set(KEY_COOKIE_PREFERENCES, json),
            Err(err) => log::warn!("could not encode consent preferences: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(dir: &tempfile::TempDir) -> Store {
        Store::at(dir.path().join("settings.json"))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        assert_eq!(store.sheets_config(), SheetsConfig::default());
        assert!(!store.cookie_accepted());
        assert!(!store.admin_access());
        assert!(store.theme().is_none());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();
        let store = Store::at(&path);
        assert_eq!(store.sheets_config(), SheetsConfig::default());
    }

    #[test]
    fn sheets_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = temp_store(&dir);
        let config = SheetsConfig {
            sheets_url: "https://docs.google.com/spreadsheets/d/abc123/edit".into(),
            refresh_interval_minutes: 2,
            show_live_data: false,
            max_responses: 25,
        };
        store.save_sheets_config(&config);

        let reloaded = temp_store(&dir);
        assert_eq!(reloaded.sheets_config(), config);
    }

    #[test]
    fn reset_clears_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = temp_store(&dir);
        store.save_sheets_config(&SheetsConfig {
            sheets_url: "https://docs.google.com/spreadsheets/d/abc123/edit".into(),
            refresh_interval_minutes: 1,
            show_live_data: false,
            max_responses: 3,
        });
        store.reset_sheets_config();
        assert_eq!(store.sheets_config(), SheetsConfig::default());
        assert_eq!(temp_store(&dir).sheets_config(), SheetsConfig::default());
    }

    #[test]
    fn flags_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = temp_store(&dir);
        store.set_cookie_accepted();
        store.set_admin_access();
        store.set_welcome_shown();
        store.set_theme("light");

        let reloaded = temp_store(&dir);
        assert!(reloaded.cookie_accepted());
        assert!(reloaded.admin_access());
        assert!(reloaded.welcome_shown());
        assert_eq!(reloaded.theme(), Some("light"));
    }

    #[test]
    fn cookie_preferences_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = temp_store(&dir);
        let mut preferences = BTreeMap::new();
        preferences.insert("Essential Cookies".to_string(), true);
        preferences.insert("Analytics Cookies".to_string(), false);
        store.set_cookie_preferences(&preferences);

        assert_eq!(temp_store(&dir).cookie_preferences(), preferences);
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"refresh-interval": "soon", "max-responses": "-4"}"#,
        )
        .unwrap();
        let config = Store::at(&path).sheets_config();
        assert_eq!(config.refresh_interval_minutes, DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.max_responses, DEFAULT_MAX_RESPONSES);
    }
}
