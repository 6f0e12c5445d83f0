//! Persisted viewer preferences in ~/.config/postgrid/preferences.toml.
//!
//! Only the theme is stored. The file is rewritten through a temp file and a
//! rename so a crash never leaves it half-written.
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::theme::ThemeVariant;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Failed to access preferences file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid preferences file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
}

/// File-backed theme preference.
///
/// A missing file, or an unrecognised stored value, reads as "no preference".
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    theme: Option<ThemeVariant>,
}

impl PreferenceStore {
    /// Load from `path`. A missing file is not an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No preferences file, starting fresh");
                return Ok(Self { path, theme: None });
            }
            Err(source) => return Err(PreferencesError::Io { path, source }),
        };

        let stored: StoredPreferences = toml::from_str(&content)?;
        let theme = stored.theme.as_deref().and_then(|name| {
            let parsed = ThemeVariant::from_str_name(name);
            if parsed.is_none() {
                tracing::warn!(theme = %name, "Ignoring unknown stored theme");
            }
            parsed
        });

        Ok(Self { path, theme })
    }

    /// A store that starts empty and writes to `path` on the first save.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            theme: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored theme, if one was ever saved.
    pub fn theme(&self) -> Option<ThemeVariant> {
        self.theme
    }

    /// Remember `theme` and write the file.
    pub fn set_theme(&mut self, theme: ThemeVariant) -> Result<(), PreferencesError> {
        self.theme = Some(theme);
        self.save()
    }

    fn save(&self) -> Result<(), PreferencesError> {
        let stored = StoredPreferences {
            theme: self.theme.map(|t| t.as_pref_value().to_string()),
        };
        let content = toml::to_string(&stored)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PreferencesError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        atomic_write(&self.path, content.as_bytes()).map_err(|source| PreferencesError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "Saved preferences");
        Ok(())
    }
}

/// Write `content` to a uniquely named sibling file, then rename it over `dst`.
fn atomic_write(dst: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let result = (|| {
        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        temp_file.write_all(content)?;
        temp_file.sync_all()?;
        drop(temp_file);

        // Windows refuses to rename over an existing file
        #[cfg(windows)]
        if dst.exists() {
            std::fs::remove_file(dst)?;
        }

        std::fs::rename(&temp_path, dst)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("postgrid_prefs_test_{name}"));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_has_no_theme() {
        let dir = temp_dir("missing");
        let store = PreferenceStore::load(dir.join("preferences.toml")).unwrap();
        assert_eq!(store.theme(), None);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_set_theme_round_trips_through_file() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("preferences.toml");

        let mut store = PreferenceStore::load(&path).unwrap();
        store.set_theme(ThemeVariant::Dark).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("theme = \"dark\""));

        let reloaded = PreferenceStore::load(&path).unwrap();
        assert_eq!(reloaded.theme(), Some(ThemeVariant::Dark));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = temp_dir("nested");
        let path = dir.join("a").join("b").join("preferences.toml");
        let mut store = PreferenceStore::empty(&path);
        store.set_theme(ThemeVariant::Light).unwrap();
        assert!(path.exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = temp_dir("no_temp");
        let path = dir.join("preferences.toml");
        let mut store = PreferenceStore::empty(&path);
        store.set_theme(ThemeVariant::Dark).unwrap();
        store.set_theme(ThemeVariant::Light).unwrap();

        let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_stored_theme_is_ignored() {
        let dir = temp_dir("unknown");
        let path = dir.join("preferences.toml");
        std::fs::write(&path, "theme = \"solarized\"\n").unwrap();

        let store = PreferenceStore::load(&path).unwrap();
        assert_eq!(store.theme(), None);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = temp_dir("malformed");
        let path = dir.join("preferences.toml");
        std::fs::write(&path, "theme = [").unwrap();

        let err = PreferenceStore::load(&path).unwrap_err();
        assert!(matches!(err, PreferencesError::Parse(_)));
        std::fs::remove_dir_all(&dir).ok();
    }
}
