use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use evidence_deck_application::{ApplicationError, SettingsStore};
use evidence_deck_domain::ReportSettings;

/// Report details kept as a small JSON document next to the photo database.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<ReportSettings, ApplicationError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Ok(ReportSettings::default())
            }
            Err(error) => return Err(ApplicationError::Io(error.to_string())),
        };
        serde_json::from_str(&raw).map_err(|error| ApplicationError::Decode(error.to_string()))
    }

    fn save(&self, settings: &ReportSettings) -> Result<(), ApplicationError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Io(error.to_string()))?;
            }
        }
        let raw = serde_json::to_string_pretty(settings)
            .map_err(|error| ApplicationError::Decode(error.to_string()))?;
        fs::write(&self.path, raw).map_err(|error| ApplicationError::Io(error.to_string()))
    }

    fn clear(&self) -> Result<(), ApplicationError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(ApplicationError::Io(error.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_deck_domain::{ReportMetadata, ReportType};
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonSettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.load().expect("load"), ReportSettings::default());
    }

    #[test]
    fn save_load_and_clear() {
        let dir = TempDir::new().expect("tempdir");
        let store = JsonSettingsStore::new(dir.path().join("conf").join("settings.json"));
        let settings = ReportSettings {
            metadata: ReportMetadata {
                incident_number: "20240101/0001".to_string(),
                location: "Block 5".to_string(),
                postal_code: "123456".to_string(),
                evidence_bag_number: "EB-9".to_string(),
                report_type: ReportType::C1Accidental,
            },
            page_size: 25,
        };

        store.save(&settings).expect("save");
        assert_eq!(store.load().expect("load"), settings);

        store.clear().expect("clear");
        store.clear().expect("clearing twice is fine");
        assert_eq!(store.load().expect("load"), ReportSettings::default());
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").expect("write");
        let store = JsonSettingsStore::new(path);
        assert!(matches!(store.load(), Err(ApplicationError::Decode(_))));
    }
}
