//! Persisted light/dark theme and the toggle controls that mirror it.
//!
//! SYSTEM CONTEXT
//! ==============
//! `ThemeToggle` owns the one authoritative [`Theme`] value. The `<html>`
//! marker and every toggle control are bindings re-derived from it after
//! each change, so duplicate controls (desktop and mobile nav) never drift.
//!
//! TRADE-OFFS
//! ==========
//! Persistence is best-effort. When storage is unavailable the preference
//! reads as light and writes are dropped; toggling still works for the
//! current page.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::cell::Cell;
use std::fmt;

use crate::error::PageError;

/// Display mode persisted across page loads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Storage and attribute value for this theme.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Interpret a stored value. Only the literal `"dark"` selects dark.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual state of one toggle control, derived from a theme.
///
/// `action_label` names the mode the control switches *into*; the browser
/// binding writes it to both `aria-label` and `title`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlState {
    pub icon: &'static str,
    pub label: &'static str,
    pub active: bool,
    pub mode: &'static str,
    pub action_label: &'static str,
}

impl ControlState {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                icon: "🌜",
                label: "Dark",
                active: true,
                mode: Theme::Dark.as_str(),
                action_label: "Switch to light mode",
            },
            Theme::Light => Self {
                icon: "🌞",
                label: "Light",
                active: false,
                mode: Theme::Light.as_str(),
                action_label: "Switch to dark mode",
            },
        }
    }
}

/// Persistent string slot for the preference (`localStorage` in the browser).
pub trait ThemeStorage {
    /// Read the stored value, `Ok(None)` when nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage backend cannot be reached.
    fn load(&self) -> Result<Option<String>, PageError>;

    /// Persist `value`.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage backend rejects the write.
    fn store(&self, value: &str) -> Result<(), PageError>;
}

/// Document root carrying the theme marker.
pub trait ThemeRoot {
    /// Mark the root dark, or clear the marker for light.
    fn apply(&self, theme: Theme);
}

/// One presentation binding of the theme.
pub trait ToggleControl {
    fn render(&self, state: &ControlState);
}

/// Read the stored preference, degrading to light on any storage failure.
pub fn read_preference(storage: &impl ThemeStorage) -> Theme {
    match storage.load() {
        Ok(value) => Theme::from_stored(value.as_deref()),
        Err(e) => {
            log::warn!("theme: preference unreadable, using light: {e}");
            Theme::Light
        }
    }
}

/// Authoritative theme value plus its N bindings.
pub struct ThemeToggle<S, R, C> {
    current: Cell<Theme>,
    storage: S,
    root: R,
    controls: Vec<C>,
}

impl<S, R, C> ThemeToggle<S, R, C>
where
    S: ThemeStorage,
    R: ThemeRoot,
    C: ToggleControl,
{
    /// Apply the persisted preference to the root, then sync every control.
    ///
    /// The root is only touched for dark so a light page stays unmarked.
    pub fn init(storage: S, root: R, controls: Vec<C>) -> Self {
        let theme = read_preference(&storage);
        if theme.is_dark() {
            root.apply(theme);
        }
        let toggle = Self {
            current: Cell::new(theme),
            storage,
            root,
            controls,
        };
        toggle.sync_controls();
        log::debug!(
            "theme: initialized {theme} with {} control(s)",
            toggle.controls.len()
        );
        toggle
    }

    pub fn theme(&self) -> Theme {
        self.current.get()
    }

    pub fn controls(&self) -> &[C] {
        &self.controls
    }

    /// Flip the theme, persist it, mark the root, and re-render all controls.
    pub fn toggle(&self) -> Theme {
        let next = self.current.get().inverted();
        if let Err(e) = self.storage.store(next.as_str()) {
            log::warn!("theme: could not persist {next}: {e}");
        }
        self.root.apply(next);
        self.current.set(next);
        self.sync_controls();
        next
    }

    fn sync_controls(&self) {
        let state = ControlState::for_theme(self.current.get());
        for control in &self.controls {
            control.render(&state);
        }
    }
}
