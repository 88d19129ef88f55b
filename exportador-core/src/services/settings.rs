//! Destination directory and archive name, persisted as `settings.json`.

use super::ExportSettingsRepository;
use crate::error::ExportError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, error, warn};

/// File name of the persisted settings inside the storage directory.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Archive name used until the operator picks one.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "novo_arquivo_export";

const DEFAULT_FOLDER_NAME: &str = "Exportador";

/// Where and under which name the next archive is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory receiving the archive
    pub destination_directory: PathBuf,
    /// Archive name without the `.zip` extension
    pub output_file_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            destination_directory: documents_dir().join(DEFAULT_FOLDER_NAME),
            output_file_name: DEFAULT_OUTPUT_FILE_NAME.to_string(),
        }
    }
}

/// Documents directory, falling back to home, then the working directory.
fn documents_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Settings repository over a JSON file.
///
/// A missing or unreadable file yields the defaults; blank stored values
/// are replaced by their defaults as well.
#[derive(Debug)]
pub struct JsonExportSettingsRepository {
    file_path: PathBuf,
    current: RwLock<ExportSettings>,
}

impl JsonExportSettingsRepository {
    /// Loads `<storage_dir>/settings.json`, or starts from defaults.
    pub fn load(storage_dir: &Path) -> Self {
        let file_path = storage_dir.join(SETTINGS_FILE_NAME);
        let mut settings = match std::fs::read_to_string(&file_path) {
            Ok(json) => serde_json::from_str::<ExportSettings>(&json).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), "Ignoring unreadable settings file: {e}");
                ExportSettings::default()
            }),
            Err(_) => ExportSettings::default(),
        };

        let defaults = ExportSettings::default();
        if settings.destination_directory.as_os_str().is_empty() {
            settings.destination_directory = defaults.destination_directory;
        }
        if settings.output_file_name.trim().is_empty() {
            settings.output_file_name = defaults.output_file_name;
        }

        Self {
            file_path,
            current: RwLock::new(settings),
        }
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> ExportSettings {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, apply: impl FnOnce(&mut ExportSettings)) -> crate::Result<()> {
        let snapshot = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            apply(&mut current);
            current.clone()
        };
        self.persist(&snapshot)
    }

    fn persist(&self, settings: &ExportSettings) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| ExportError::serialization("Failed to serialize settings", e))?;

        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ExportError::io(format!("Failed to create '{}'", parent.display()), e)
            })?;
        }
        std::fs::write(&self.file_path, json).map_err(|e| {
            ExportError::io(format!("Failed to write '{}'", self.file_path.display()), e)
        })?;
        debug!(path = %self.file_path.display(), "Settings saved");
        Ok(())
    }
}

impl ExportSettingsRepository for JsonExportSettingsRepository {
    fn destination_directory(&self) -> PathBuf {
        let path = self.settings().destination_directory;
        if path.is_dir() {
            return path;
        }

        match std::fs::create_dir_all(&path) {
            Ok(()) => path,
            Err(e) => {
                error!(path = %path.display(), "Failed to create destination directory: {e}");
                let fallback = documents_dir();
                if let Err(e) = std::fs::create_dir_all(&fallback) {
                    warn!(path = %fallback.display(), "Failed to create fallback directory: {e}");
                }
                if let Err(e) = self.update(|s| s.destination_directory.clone_from(&fallback)) {
                    warn!("Failed to persist fallback destination: {e}");
                }
                fallback
            }
        }
    }

    fn set_destination_directory(&self, path: &Path) -> crate::Result<()> {
        self.update(|s| s.destination_directory = path.to_path_buf())
    }

    fn output_file_name(&self) -> String {
        self.settings().output_file_name
    }

    fn set_output_file_name(&self, file_name: &str) -> crate::Result<()> {
        if file_name.trim().is_empty() {
            return Err(ExportError::configuration("Output file name cannot be empty."));
        }
        // The archive must land directly inside the destination directory.
        if file_name.contains(['/', '\\'])
            || Path::new(file_name).file_name() != Some(std::ffi::OsStr::new(file_name))
        {
            return Err(ExportError::configuration(format!(
                "Output file name '{file_name}' must not contain path separators."
            )));
        }
        self.update(|s| s.output_file_name = file_name.to_string())
    }
}
