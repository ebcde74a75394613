use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use covermap::overlay::{Overlay, OverlayState};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "covermap";

pub const VALID_KEYS: &str =
    "defaults.theme, defaults.overlays, defaults.start_fullscreen, defaults.zones";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Overlays visible at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlays: Option<Vec<Overlay>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_fullscreen: Option<bool>,

    /// Zone file loaded when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<PathBuf>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `covermap config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# covermap configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn theme(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("dark")
    }

    pub fn overlays(&self) -> OverlayState {
        self.defaults
            .as_ref()
            .and_then(|d| d.overlays.as_deref())
            .map(OverlayState::from_visible)
            .unwrap_or_default()
    }

    pub fn start_fullscreen(&self) -> bool {
        self.defaults
            .as_ref()
            .and_then(|d| d.start_fullscreen)
            .unwrap_or(false)
    }

    pub fn zones(&self) -> Option<&Path> {
        self.defaults.as_ref().and_then(|d| d.zones.as_deref())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.overlays" => {
                let names: Vec<&str> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
                let visible = OverlayState::from_names(&names)?.visible();
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .overlays = Some(visible);
            }
            "defaults.start_fullscreen" => {
                let flag = match value {
                    "true" | "yes" | "on" => true,
                    "false" | "no" | "off" => false,
                    _ => anyhow::bail!(
                        "Invalid start_fullscreen: {value}. Must be 'true' or 'false'."
                    ),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .start_fullscreen = Some(flag);
            }
            "defaults.zones" => {
                let defaults = self.defaults.get_or_insert_with(DefaultsConfig::default);
                defaults.zones = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {VALID_KEYS}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = Config::default();
        assert_eq!(config.theme(), "dark");
        assert_eq!(config.overlays(), OverlayState::default());
        assert!(!config.start_fullscreen());
        assert!(config.zones().is_none());
    }

    #[test]
    fn test_set_theme() {
        let mut config = Config::default();
        config.set("defaults.theme", "light").unwrap();
        assert_eq!(config.theme(), "light");
        assert!(config.set("defaults.theme", "neon").is_err());
    }

    #[test]
    fn test_set_overlays_comma_list() {
        let mut config = Config::default();
        config.set("defaults.overlays", "fov, queue").unwrap();
        let overlays = config.overlays();
        assert!(overlays.is_visible(Overlay::Fov));
        assert!(overlays.is_visible(Overlay::Queues));
        assert!(!overlays.is_visible(Overlay::Alerts));
        assert!(!overlays.is_visible(Overlay::Patrols));
    }

    #[test]
    fn test_set_overlays_rejects_unknown() {
        let mut config = Config::default();
        let err = config.set("defaults.overlays", "fov,heatmap").unwrap_err();
        assert!(err.to_string().contains("heatmap"));
        assert!(config.defaults.is_none());
    }

    #[test]
    fn test_set_overlays_empty_hides_everything() {
        let mut config = Config::default();
        config.set("defaults.overlays", "").unwrap();
        assert!(config.overlays().visible().is_empty());
    }

    #[test]
    fn test_set_start_fullscreen() {
        let mut config = Config::default();
        config.set("defaults.start_fullscreen", "yes").unwrap();
        assert!(config.start_fullscreen());
        assert!(config.set("defaults.start_fullscreen", "maybe").is_err());
    }

    #[test]
    fn test_set_zones_and_clear() {
        let mut config = Config::default();
        config.set("defaults.zones", "/tmp/store.yaml").unwrap();
        assert_eq!(config.zones(), Some(Path::new("/tmp/store.yaml")));
        config.set("defaults.zones", "").unwrap();
        assert!(config.zones().is_none());
    }

    #[test]
    fn test_unknown_key() {
        let mut config = Config::default();
        let err = config.set("defaults.aspect", "16:9").unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(FILENAME);

        let mut config = Config::default();
        config.set("defaults.theme", "light").unwrap();
        config.set("defaults.overlays", "alerts,patrols").unwrap();
        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# covermap configuration"));
        assert!(contents.contains("- alerts"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.theme(), "light");
        assert_eq!(
            loaded.overlays().visible(),
            vec![Overlay::Alerts, Overlay::Patrols]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("No config found"));
    }
}
