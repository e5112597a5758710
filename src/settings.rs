use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_language() -> String {
    String::from("en-US")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppSettings {
    pub tmdb_api_key: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub identity_api_key: String,
    #[serde(default)]
    pub identity_project: String,
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("marquee")
                .join("config.json")
        })
    }

    pub fn load() -> Option<Self> {
        let path = Self::config_path()?;
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path().ok_or("Could not determine config path")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())
    }

    pub fn is_valid(&self) -> bool {
        !self.tmdb_api_key.trim().is_empty()
    }

    pub fn language_or_default(&self) -> String {
        if self.language.trim().is_empty() {
            default_language()
        } else {
            self.language.trim().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"tmdb_api_key":"abc123"}"#).expect("valid settings json");
        assert_eq!(settings.language, "en-US");
        assert!(settings.identity_api_key.is_empty());
        assert!(settings.is_valid());
    }

    #[test]
    fn blank_api_key_is_invalid() {
        let settings = AppSettings {
            tmdb_api_key: String::from("   "),
            ..AppSettings::default()
        };
        assert!(!settings.is_valid());
    }

    #[test]
    fn blank_language_falls_back() {
        let settings = AppSettings::default();
        assert_eq!(settings.language_or_default(), "en-US");
    }
}
