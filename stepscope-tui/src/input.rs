//! Keyboard input dispatch, in order: overlays, global keys, focused widget.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Focus, Overlay};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    let drawer_focused = app.drawer_open && app.focus == Focus::Drawer;

    // 2. Global keys.
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        // `q` closes the drawer while it has focus.
        KeyCode::Char('q') if !drawer_focused => {
            app.running = false;
            return;
        }
        KeyCode::Tab => {
            app.focus = app.focus.next(app.drawer_open);
            return;
        }
        KeyCode::BackTab => {
            app.focus = app.focus.prev(app.drawer_open);
            return;
        }
        KeyCode::Char('m') => {
            app.toggle_drawer();
            return;
        }
        KeyCode::Char('r') => {
            app.rescan();
            return;
        }
        KeyCode::Char('e') => {
            app.overlay = Overlay::ErrorHistory;
            app.error_scroll = 0;
            return;
        }
        _ => {}
    }

    // 3. Focused widget.
    match app.focus {
        Focus::Slider => {
            if let Some(event) = app.step_slider.handle_key(key) {
                app.apply_slider_event(event);
            }
        }
        Focus::Zoom => {
            if let Some(event) = app.zoom.handle_key(key) {
                app.apply_zoom_event(event);
            }
        }
        Focus::Drawer if app.drawer_open => {
            if let Some(action) = app.panel.handle_key(key) {
                app.apply_panel_action(action);
            }
        }
        Focus::Drawer => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}
