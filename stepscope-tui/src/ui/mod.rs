//! Top-level UI layout: widgets on the left, drawer on the right, status bar.

pub mod overlays;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, Focus, Overlay};

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    let (content_area, drawer_area) = if app.drawer_open {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(app.drawer_width())])
            .split(main_area);
        (cols[0], Some(cols[1]))
    } else {
        (main_area, None)
    };

    draw_content(f, content_area, app);
    if let Some(area) = drawer_area {
        let focused = app.focus == Focus::Drawer;
        f.render_widget(app.panel.widget(&app.theme, focused), area);
    }

    status_bar::render(f, status_area, app);

    // Draw overlays on top.
    match app.overlay {
        Overlay::Welcome => overlays::render_welcome(f, main_area, app),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::None => {}
    }
}

fn draw_content(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    f.render_widget(
        app.step_slider.widget(&app.theme, app.focus == Focus::Slider),
        rows[0],
    );
    f.render_widget(app.zoom.widget(&app.theme, app.focus == Focus::Zoom), rows[1]);
    draw_samples(f, rows[2], app);
}

fn draw_samples(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border(false))
        .title(format!(" Samples ({}) ", app.samples.len()))
        .title_style(app.theme.title(false));

    let lines: Vec<Line> = if app.samples.is_empty() {
        vec![Line::from(Span::styled(
            "No sample images for this step.",
            app.theme.hint(),
        ))]
    } else {
        app.samples
            .iter()
            .map(|p| {
                let name = p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| p.display().to_string());
                Line::from(Span::styled(name, app.theme.text()))
            })
            .collect()
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
