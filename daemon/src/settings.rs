use anyhow::{Context, Result};
use log::error;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use wellspring_usb::BringUpConfig;

#[derive(Clone)]
pub struct SettingsHandle {
    path: PathBuf,
    settings: Arc<RwLock<Settings>>,
}

impl SettingsHandle {
    pub async fn load(path: PathBuf) -> Result<SettingsHandle> {
        let settings = Settings::read(&path)?;
        let handle = SettingsHandle {
            path,
            settings: Arc::new(RwLock::new(settings)),
        };
        handle.save().await;
        Ok(handle)
    }

    pub async fn save(&self) {
        let settings = self.settings.write().await;
        if let Err(e) = settings.write(&self.path) {
            error!(
                "Couldn't save settings to {}: {}",
                self.path.to_string_lossy(),
                e
            );
        }
    }

    pub async fn bring_up_config(&self) -> BringUpConfig {
        let settings = self.settings.read().await;
        BringUpConfig {
            wellspring_mode: settings.wellspring_mode,
            restore_mode_on_release: settings.restore_mode_on_release,
            power_policy: true,
        }
    }

    pub async fn control_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.read().await.control_timeout_ms)
    }

    pub async fn detection_interval(&self) -> Duration {
        Duration::from_millis(self.settings.read().await.detection_interval_ms)
    }

    /// Runtime override, this isn't written back to disk.
    pub async fn disable_wellspring_mode(&self) {
        self.settings.write().await.wellspring_mode = false;
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub wellspring_mode: bool,
    pub restore_mode_on_release: bool,
    pub control_timeout_ms: u64,
    pub detection_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wellspring_mode: true,
            restore_mode_on_release: true,
            control_timeout_ms: 1000,
            detection_interval_ms: 1000,
        }
    }
}

impl Settings {
    pub fn read(path: &Path) -> Result<Settings> {
        match File::open(path) {
            Ok(reader) => serde_json::from_reader(reader).context(format!(
                "Could not parse daemon settings file at {}",
                path.to_string_lossy()
            )),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Settings::default()),
            Err(error) => Err(error).context(format!(
                "Could not open daemon settings file for reading at {}",
                path.to_string_lossy()
            )),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if let Err(e) = create_dir_all(parent) {
                if e.kind() != ErrorKind::AlreadyExists {
                    return Err(e).context(format!(
                        "Could not create settings directory at {}",
                        parent.to_string_lossy()
                    ))?;
                }
            }
        }
        let writer = File::create(path).context(format!(
            "Could not open daemon settings file for writing at {}",
            path.to_string_lossy()
        ))?;
        serde_json::to_writer_pretty(writer, self).context(format!(
            "Could not write to daemon settings file at {}",
            path.to_string_lossy()
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::read(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "wellspring_mode": false }"#).unwrap();

        let settings = Settings::read(&path).unwrap();
        assert!(!settings.wellspring_mode);
        assert!(settings.restore_mode_on_release);
        assert_eq!(settings.control_timeout_ms, 1000);
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(Settings::read(&path).is_err());
    }

    #[test]
    fn written_settings_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            control_timeout_ms: 250,
            ..Settings::default()
        };

        settings.write(&path).unwrap();
        assert_eq!(Settings::read(&path).unwrap(), settings);
    }

    #[tokio::test]
    async fn handle_builds_bring_up_config() {
        let dir = tempfile::tempdir().unwrap();
        let handle = SettingsHandle::load(dir.path().join("settings.json"))
            .await
            .unwrap();

        assert_eq!(handle.bring_up_config().await, BringUpConfig::default());

        handle.disable_wellspring_mode().await;
        let config = handle.bring_up_config().await;
        assert!(!config.wellspring_mode);
        assert!(config.restore_mode_on_release);
    }
}
