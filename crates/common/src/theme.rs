//! Process-wide theme preference.
//!
//! Advisory UI state behind the theme switch on fixture pages. The stored
//! value is read lazily on first access, written through on every change,
//! and never torn down.

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Storage key shared with the page script's `localStorage` entry.
pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(Error::UnknownTheme(other.to_string())),
        }
    }
}

/// What the page shows: the document attribute and the switch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeView {
    pub theme: Theme,
    pub toggle_checked: bool,
}

impl From<Theme> for ThemeView {
    fn from(theme: Theme) -> Self {
        Self {
            theme,
            toggle_checked: theme == Theme::Dark,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredTheme {
    theme: Theme,
}

/// Theme preference with optional file persistence
#[derive(Debug)]
pub struct ThemeStore {
    path: Option<PathBuf>,
    current: Mutex<Option<Theme>>,
}

impl ThemeStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            current: Mutex::new(None),
        }
    }

    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    /// Current preference, initializing from storage on first call.
    pub fn load(&self) -> ThemeView {
        let mut current = self.current.lock();
        let theme = *current.get_or_insert_with(|| self.read_stored());
        ThemeView::from(theme)
    }

    /// Flip light/dark and persist.
    pub fn switch(&self) -> Result<ThemeView> {
        let mut current = self.current.lock();
        let next = current.unwrap_or_else(|| self.read_stored()).toggled();
        self.write_stored(next)?;
        *current = Some(next);
        Ok(ThemeView::from(next))
    }

    fn read_stored(&self) -> Theme {
        let Some(path) = &self.path else {
            return Theme::default();
        };
        if !path.exists() {
            return Theme::default();
        }
        match std::fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|s| serde_json::from_str::<StoredTheme>(&s).map_err(Error::from))
        {
            Ok(stored) => {
                debug!("Loaded theme {} from {}", stored.theme.as_str(), path.display());
                stored.theme
            }
            Err(e) => {
                warn!("Ignoring unreadable theme file {}: {}", path.display(), e);
                Theme::default()
            }
        }
    }

    fn write_stored(&self, theme: Theme) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(&StoredTheme { theme })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

static GLOBAL_THEME: OnceCell<ThemeStore> = OnceCell::new();

/// Install the process-wide store. Returns false if one was already set.
pub fn init_global(path: Option<PathBuf>) -> bool {
    GLOBAL_THEME.set(ThemeStore::new(path)).is_ok()
}

/// The process-wide store; in-memory if [`init_global`] was never called.
pub fn global() -> &'static ThemeStore {
    GLOBAL_THEME.get_or_init(ThemeStore::in_memory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_preference_is_dark_and_checked() {
        let store = ThemeStore::in_memory();
        let view = store.load();
        assert_eq!(view.theme, Theme::Dark);
        assert!(view.toggle_checked);
    }

    #[test]
    fn test_switch_flips_and_unchecks() {
        let store = ThemeStore::in_memory();
        let view = store.switch().unwrap();
        assert_eq!(view.theme, Theme::Light);
        assert!(!view.toggle_checked);
        assert_eq!(store.switch().unwrap().theme, Theme::Dark);
    }

    #[test]
    fn test_switch_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");

        let store = ThemeStore::new(Some(path.clone()));
        store.switch().unwrap();

        let reopened = ThemeStore::new(Some(path));
        assert_eq!(reopened.load().theme, Theme::Light);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_dark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        std::fs::write(&path, "not json").unwrap();

        let store = ThemeStore::new(Some(path));
        assert_eq!(store.load().theme, Theme::Dark);
    }

    #[test]
    fn test_parse_theme() {
        assert_eq!("light".parse::<Theme>().unwrap(), Theme::Light);
        assert!(matches!("blue".parse::<Theme>(), Err(Error::UnknownTheme(_))));
    }
}
