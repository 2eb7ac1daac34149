//! Light/dark theme preference.
//!
//! The preference is persisted under [`THEME_STORAGE_KEY`]. While
//! `is_system_theme` is set the store follows the system preference reported
//! by a [`SystemThemeProbe`]; an explicit toggle or set pins the choice.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::storage::{SharedStore, THEME_STORAGE_KEY, load_json, save_json};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme `{other}` (expected light or dark)")),
        }
    }
}

/// Source of the operating environment's preferred theme.
pub trait SystemThemeProbe: Send + Sync {
    fn system_theme(&self) -> Theme;
}

impl<F> SystemThemeProbe for F
where
    F: Fn() -> Theme + Send + Sync,
{
    fn system_theme(&self) -> Theme {
        self()
    }
}

/// Terminal probe based on the `COLORFGBG` convention (`"fg;bg"`): a dark
/// background colour index means a dark terminal.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalThemeProbe;

impl SystemThemeProbe for TerminalThemeProbe {
    fn system_theme(&self) -> Theme {
        std::env::var("COLORFGBG").ok().as_deref().map_or(Theme::Light, theme_from_colorfgbg)
    }
}

/// Interpret a `COLORFGBG` value. Unparsable values read as light.
#[must_use]
pub fn theme_from_colorfgbg(raw: &str) -> Theme {
    match raw.rsplit(';').next().and_then(|bg| bg.trim().parse::<u8>().ok()) {
        Some(0..=6 | 8) => Theme::Dark,
        _ => Theme::Light,
    }
}

/// Current preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub theme: Theme,
    pub is_system_theme: bool,
}

/// Persisted theme preference with subscribe/notify.
#[derive(Clone)]
pub struct ThemeStore {
    tx: Arc<watch::Sender<ThemeState>>,
    storage: SharedStore,
    probe: Arc<dyn SystemThemeProbe>,
}

impl ThemeStore {
    /// Restore the saved preference, defaulting to following the system.
    #[must_use]
    pub fn restore(storage: SharedStore, probe: Arc<dyn SystemThemeProbe>) -> Self {
        let initial = match load_json::<ThemeState>(storage.as_ref(), THEME_STORAGE_KEY) {
            Ok(Some(saved)) => saved,
            Ok(None) => ThemeState { theme: probe.system_theme(), is_system_theme: true },
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable theme preference");
                ThemeState { theme: probe.system_theme(), is_system_theme: true }
            }
        };
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx), storage, probe }
    }

    #[must_use]
    pub fn state(&self) -> ThemeState {
        *self.tx.borrow()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.tx.borrow().theme
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.tx.subscribe()
    }

    /// Flip light/dark and stop following the system.
    pub fn toggle(&self) -> Theme {
        let next = self.theme().flipped();
        self.set(next);
        next
    }

    /// Pin an explicit theme.
    pub fn set(&self, theme: Theme) {
        self.update(ThemeState { theme, is_system_theme: false });
    }

    /// Follow the system preference from now on.
    pub fn use_system_theme(&self) -> Theme {
        let theme = self.probe.system_theme();
        self.update(ThemeState { theme, is_system_theme: true });
        theme
    }

    /// Re-read the system preference if following it. Call on start-up.
    pub fn init(&self) -> Theme {
        if self.state().is_system_theme {
            self.use_system_theme()
        } else {
            self.theme()
        }
    }

    /// React to a system preference change. Ignored when a theme is pinned.
    pub fn system_changed(&self, theme: Theme) {
        if self.state().is_system_theme {
            self.update(ThemeState { theme, is_system_theme: true });
        }
    }

    fn update(&self, next: ThemeState) {
        self.tx.send_replace(next);
        if let Err(e) = save_json(self.storage.as_ref(), THEME_STORAGE_KEY, &next) {
            tracing::warn!(error = %e, "failed to persist theme preference");
        }
    }
}
