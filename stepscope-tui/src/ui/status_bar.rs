//! Bottom status bar: key hints and the last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, Focus, StatusLevel};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let mut spans: Vec<Span> = Vec::new();

    let hints = match app.focus {
        Focus::Drawer if app.drawer_open => " [j/k]move [Enter]select [Esc]close",
        _ => " [Tab]focus [←/→]adjust [m]drawer [r]escan [e]rrors [q]uit",
    };
    spans.push(Span::styled(hints, theme.hint()));
    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme.title(true),
            StatusLevel::Warning => theme.pending(),
            StatusLevel::Error => theme.alert(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
