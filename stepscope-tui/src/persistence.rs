//! App state persistence: JSON save/load across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::{AppState, Overlay};
use crate::widgets::zoom_control::snap_zoom;

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub zoom_size: Option<u16>,
    pub drawer_open: Option<bool>,
    pub slider_value: Option<String>,
    pub welcome_dismissed: bool,
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt state file");
            PersistedState::default()
        }),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &AppState) -> PersistedState {
    let slider_value = app.step_slider.current_value();
    PersistedState {
        zoom_size: Some(app.zoom.size()),
        drawer_open: Some(app.drawer_open),
        slider_value: (!slider_value.is_empty()).then(|| slider_value.to_string()),
        welcome_dismissed: app.overlay != Overlay::Welcome,
    }
}

/// Apply persisted state to AppState. Call before the first scan so the
/// remembered step is kept when it still exists.
pub fn apply(app: &mut AppState, state: PersistedState) {
    if let Some(size) = state.zoom_size {
        app.zoom.set_size(snap_zoom(size));
    }
    if let Some(open) = state.drawer_open {
        app.drawer_open = open;
    }
    if let Some(value) = state.slider_value {
        app.step_slider.set_current_value(value);
    }
    if !state.welcome_dismissed {
        app.overlay = Overlay::Welcome;
    }
}
