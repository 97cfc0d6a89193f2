//! Checkpoint list drawer with per-selection metadata fetch.
//!
//! State machine: `Idle -> Loading -> (Loaded | Failed)`, re-entering
//! `Loading` on every selection. Each selection bumps a generation token;
//! a fetch result is applied only while its token is still the active one,
//! so a slow answer for an older selection can never overwrite a newer one.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap};

use stepscope_core::{sort_by_step_desc, CheckpointDescriptor, CheckpointMetadata, FetchError, MetadataEntry};

use crate::theme::Theme;

pub const PANEL_TITLE: &str = "Checkpoints";
pub const EMPTY_MESSAGE: &str = "No training metadata found";
pub const LOADING_MESSAGE: &str = "Loading metadata...";
pub const IDLE_MESSAGE: &str = "No checkpoints";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Loaded(Vec<MetadataEntry>),
    Failed(String),
}

/// One metadata fetch the host must run and later hand back to
/// [`CheckpointMetadataPanel::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub token: u64,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEvent {
    Close,
}

/// Outcome of a key press in the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    Fetch(FetchRequest),
    Event(PanelEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub filename: String,
    pub step_number: u64,
    pub has_samples: bool,
    pub selected: bool,
    pub cursor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelBody {
    Idle,
    Loading,
    Empty,
    Table(Vec<MetadataEntry>),
    Alert(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub title: &'static str,
    pub items: Vec<ItemView>,
    pub body: PanelBody,
}

#[derive(Debug, Clone)]
pub struct CheckpointMetadataPanel {
    /// Display order: descending by step.
    checkpoints: Vec<CheckpointDescriptor>,
    selected: Option<String>,
    cursor: usize,
    fetch: FetchState,
    generation: u64,
    active_token: Option<u64>,
}

impl Default for CheckpointMetadataPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointMetadataPanel {
    pub fn new() -> Self {
        Self {
            checkpoints: Vec::new(),
            selected: None,
            cursor: 0,
            fetch: FetchState::Idle,
            generation: 0,
            active_token: None,
        }
    }

    pub fn checkpoints(&self) -> &[CheckpointDescriptor] {
        &self.checkpoints
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the checkpoint list and auto-select the highest step.
    ///
    /// Returns the fetch for the new selection, or `None` for an empty list.
    pub fn set_checkpoints(&mut self, checkpoints: &[CheckpointDescriptor]) -> Option<FetchRequest> {
        self.checkpoints = sort_by_step_desc(checkpoints);
        self.cursor = 0;
        match self.checkpoints.first() {
            Some(first) => {
                let filename = first.filename.clone();
                Some(self.begin_fetch(filename))
            }
            None => {
                self.selected = None;
                self.fetch = FetchState::Idle;
                self.active_token = None;
                None
            }
        }
    }

    /// Explicit user selection. Re-selecting the current item fetches again.
    pub fn select(&mut self, filename: &str) -> Option<FetchRequest> {
        let Some(index) = self.checkpoints.iter().position(|c| c.filename == filename) else {
            tracing::debug!(filename, "ignoring selection of unknown checkpoint");
            return None;
        };
        self.cursor = index;
        Some(self.begin_fetch(filename.to_string()))
    }

    pub fn select_cursor(&mut self) -> Option<FetchRequest> {
        let filename = self.checkpoints.get(self.cursor)?.filename.clone();
        self.select(&filename)
    }

    fn begin_fetch(&mut self, filename: String) -> FetchRequest {
        self.generation += 1;
        let token = self.generation;
        self.selected = Some(filename.clone());
        self.active_token = Some(token);
        self.fetch = FetchState::Loading;
        FetchRequest { token, filename }
    }

    /// Settle a fetch. Returns `false` and leaves state untouched when the
    /// result belongs to a superseded selection.
    pub fn resolve(
        &mut self,
        token: u64,
        filename: &str,
        result: Result<CheckpointMetadata, FetchError>,
    ) -> bool {
        if self.active_token != Some(token) || self.selected.as_deref() != Some(filename) {
            tracing::debug!(token, filename, "discarding stale metadata result");
            return false;
        }
        self.fetch = match result {
            Ok(meta) => FetchState::Loaded(meta.training_entries()),
            Err(e) => {
                tracing::warn!(code = e.code.as_str(), filename, "metadata fetch failed: {}", e.message);
                FetchState::Failed(e.message)
            }
        };
        true
    }

    pub fn close(&self) -> PanelEvent {
        PanelEvent::Close
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PanelAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.cursor + 1 < self.checkpoints.len() {
                    self.cursor += 1;
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Enter => self.select_cursor().map(PanelAction::Fetch),
            KeyCode::Esc | KeyCode::Char('q') => Some(PanelAction::Event(self.close())),
            _ => None,
        }
    }

    pub fn view(&self) -> PanelView {
        let items = self
            .checkpoints
            .iter()
            .enumerate()
            .map(|(i, c)| ItemView {
                filename: c.filename.clone(),
                step_number: c.step_number,
                has_samples: c.has_samples,
                selected: self.selected.as_deref() == Some(c.filename.as_str()),
                cursor: i == self.cursor,
            })
            .collect();
        let body = match &self.fetch {
            FetchState::Idle => PanelBody::Idle,
            FetchState::Loading => PanelBody::Loading,
            FetchState::Loaded(entries) if entries.is_empty() => PanelBody::Empty,
            FetchState::Loaded(entries) => PanelBody::Table(entries.clone()),
            FetchState::Failed(message) => PanelBody::Alert(message.clone()),
        };
        PanelView {
            title: PANEL_TITLE,
            items,
            body,
        }
    }

    pub fn widget<'a>(&self, theme: &'a Theme, focused: bool) -> MetadataPanelWidget<'a> {
        MetadataPanelWidget {
            view: self.view(),
            theme,
            focused,
        }
    }
}

pub struct MetadataPanelWidget<'a> {
    view: PanelView,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> MetadataPanelWidget<'a> {
    fn item_line(&self, item: &ItemView) -> Line<'static> {
        let marker = if item.selected { "▶ " } else { "  " };
        let style = if item.selected {
            self.theme.selected()
        } else if item.cursor && self.focused {
            self.theme.accent_bold()
        } else {
            self.theme.text()
        };
        Line::from(vec![
            Span::styled(marker, style),
            Span::styled(format!("{:>8} ", item.step_number), style),
            Span::styled(item.filename.clone(), style),
            Span::styled(
                if item.has_samples { " ●" } else { "" },
                ratatui::style::Style::default().fg(self.theme.samples_color(item.has_samples)),
            ),
        ])
    }

    fn render_body(&self, area: Rect, buf: &mut Buffer) {
        match &self.view.body {
            PanelBody::Idle => {
                Paragraph::new(Span::styled(IDLE_MESSAGE, self.theme.hint())).render(area, buf);
            }
            PanelBody::Loading => {
                Paragraph::new(Span::styled(LOADING_MESSAGE, self.theme.pending())).render(area, buf);
            }
            PanelBody::Empty => {
                Paragraph::new(Span::styled(EMPTY_MESSAGE, self.theme.hint())).render(area, buf);
            }
            PanelBody::Table(entries) => {
                let field_width = entries
                    .iter()
                    .map(|e| e.field.len())
                    .max()
                    .unwrap_or(5)
                    .max(5) as u16;
                let rows = entries.iter().map(|e| {
                    Row::new(vec![
                        Cell::from(e.field.clone()).style(self.theme.secondary()),
                        Cell::from(e.value.clone()).style(self.theme.text()),
                    ])
                });
                let header = Row::new(vec!["Field", "Value"])
                    .style(self.theme.accent_bold().add_modifier(Modifier::UNDERLINED));
                Table::new(rows, [Constraint::Length(field_width), Constraint::Min(5)])
                    .header(header)
                    .column_spacing(2)
                    .render(area, buf);
            }
            PanelBody::Alert(message) => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.alert())
                    .title(" Error ")
                    .title_style(self.theme.alert());
                Paragraph::new(Span::styled(message.clone(), self.theme.alert()))
                    .block(block)
                    .wrap(Wrap { trim: true })
                    .render(area, buf);
            }
        }
    }
}

impl<'a> Widget for MetadataPanelWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(self.focused))
            .title(format!(" {} ({}) ", self.view.title, self.view.items.len()))
            .title_style(self.theme.title(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let list_height = (self.view.items.len() as u16).min(inner.height / 2);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(list_height),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        // Keep the cursor row visible.
        let cursor = self.view.items.iter().position(|i| i.cursor).unwrap_or(0);
        let visible = list_height as usize;
        let start = if visible == 0 { 0 } else { cursor.saturating_sub(visible - 1) };
        let lines: Vec<Line> = self
            .view
            .items
            .iter()
            .skip(start)
            .take(visible)
            .map(|item| self.item_line(item))
            .collect();
        Paragraph::new(lines).render(chunks[0], buf);

        self.render_body(chunks[2], buf);
    }
}
