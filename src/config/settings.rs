use crate::models::RedSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the tool settings.
pub const SETTINGS_FILENAME: &str = "red-settings.yaml";

/// Loads and saves [`RedSettings`] as YAML.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl SettingsStore {
    /// Create a new SettingsStore for the specified directory.
    ///
    /// # Arguments
    /// * `settings_dir` - Directory holding `red-settings.yaml`; created when missing
    pub fn new<P: AsRef<Utf8Path>>(settings_dir: P) -> Result<Self> {
        let settings_dir = settings_dir.as_ref().to_path_buf();

        if !settings_dir.exists() {
            fs::create_dir_all(&settings_dir).with_context(|| {
                format!("Failed to create settings directory: {}", settings_dir)
            })?;
        }

        Ok(Self {
            settings_path: settings_dir.join(SETTINGS_FILENAME),
            settings_dir,
        })
    }

    /// Load the settings file.
    ///
    /// # Returns
    /// The loaded settings, or defaults if the file doesn't exist
    pub fn load(&self) -> Result<RedSettings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
            return Ok(RedSettings::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: RedSettings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(settings)
    }

    pub fn save(&self, settings: &RedSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    pub fn settings_dir(&self) -> &Utf8Path {
        &self.settings_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (SettingsStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().join("nested")).unwrap();
        let store = SettingsStore::new(&dir).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_creates_directory() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.settings_dir().is_dir());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (store, _temp_dir) = create_test_store();
        let settings = store.load().unwrap();
        assert_eq!(settings.red_settings.indent_width, 4);
    }

    #[test]
    fn test_load_save() {
        let (store, _temp_dir) = create_test_store();

        let mut settings = RedSettings::default();
        settings.red_settings.workspace_root = "/ws".to_string();
        settings.logging.debug_mode = true;
        store.save(&settings).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.workspace_root(), Some("/ws"));
        assert!(loaded.logging.debug_mode);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let (store, _temp_dir) = create_test_store();
        fs::write(store.settings_path(), "RED_Settings: [unclosed").unwrap();

        let error = store.load().unwrap_err();
        assert!(error.to_string().contains("Failed to parse settings"));
    }
}
