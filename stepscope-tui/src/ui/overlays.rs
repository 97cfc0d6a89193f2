//! Overlay widgets: welcome and error history.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::AppState;
use crate::ui::centered_rect;

/// First-run welcome overlay.
pub fn render_welcome(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let popup = centered_rect(60, 50, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border(true))
        .title(" Welcome to stepscope ")
        .title_style(theme.accent_bold());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Getting started:", theme.accent_bold())),
        Line::from(""),
        Line::from(Span::styled(
            format!("  Browsing {}", app.checkpoint_dir.display()),
            theme.hint(),
        )),
        Line::from(Span::styled("  Tab cycles focus: step, zoom, drawer", theme.hint())),
        Line::from(Span::styled("  Arrows adjust the focused slider", theme.hint())),
        Line::from(Span::styled("  In the drawer: j/k move, Enter selects, Esc closes", theme.hint())),
        Line::from(Span::styled("  m toggles the drawer, r rescans, e shows errors", theme.hint())),
        Line::from(""),
        Line::from(Span::styled("Press any key to dismiss...", theme.title(false))),
    ];

    let para = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup);
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.alert())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme.alert());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme.hint()));
        f.render_widget(text, inner);
        return;
    }

    let visible_height = inner.height as usize;
    let start = app.error_scroll;
    let end = (start + visible_height).min(app.error_history.len());

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app.error_history.iter().enumerate().take(end).skip(start) {
        let style = if i == app.error_scroll {
            theme.alert().add_modifier(Modifier::BOLD)
        } else {
            theme.hint()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", err.timestamp.format("%H:%M:%S")), theme.secondary()),
            Span::styled(format!("[{}] ", err.code), theme.pending()),
            Span::styled(err.message.as_str(), style),
        ]));
        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme.hint()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}
