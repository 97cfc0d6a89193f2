//! Slider over an ordered list of string values.
//!
//! The slider is controlled: it never changes `current_value` itself. Key
//! presses and position changes produce a [`SliderEvent`] carrying the value
//! at the new index, and the host feeds the value back through
//! [`IndexedValueSlider::set_current_value`].

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::theme::Theme;
use crate::widgets::render_track;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SliderEvent {
    Change(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedValueSlider {
    values: Vec<String>,
    current_value: String,
    label: String,
}

/// Everything needed to draw the slider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderView {
    pub label: String,
    pub min: usize,
    pub max: usize,
    pub position: usize,
    pub value_text: Option<String>,
    pub focusable: bool,
}

impl IndexedValueSlider {
    pub fn new(values: Vec<String>, current_value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            values,
            current_value: current_value.into(),
            label: label.into(),
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn current_value(&self) -> &str {
        &self.current_value
    }

    pub fn set_values(&mut self, values: Vec<String>) {
        self.values = values;
    }

    pub fn set_current_value(&mut self, value: impl Into<String>) {
        self.current_value = value.into();
    }

    pub fn min(&self) -> usize {
        0
    }

    pub fn max(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// Index of the current value, or 0 when it is not in the list.
    pub fn position(&self) -> usize {
        self.values
            .iter()
            .position(|v| *v == self.current_value)
            .unwrap_or(0)
    }

    /// Move the thumb to `index`. Emits only for a valid index that differs
    /// from the current position.
    pub fn set_position(&self, index: usize) -> Option<SliderEvent> {
        if index == self.position() {
            return None;
        }
        self.values.get(index).map(|v| SliderEvent::Change(v.clone()))
    }

    /// Arrow-key stepping. Right/Up advance, Left/Down retreat; stepping past
    /// either end and every other key are no-ops.
    pub fn handle_key(&self, key: KeyEvent) -> Option<SliderEvent> {
        if self.values.is_empty() {
            return None;
        }
        let position = self.position();
        let target = match key.code {
            KeyCode::Right | KeyCode::Up => position + 1,
            KeyCode::Left | KeyCode::Down => position.checked_sub(1)?,
            _ => return None,
        };
        if target > self.max() {
            return None;
        }
        self.set_position(target)
    }

    pub fn view(&self) -> SliderView {
        SliderView {
            label: self.label.clone(),
            min: self.min(),
            max: self.max(),
            position: self.position(),
            value_text: self.values.get(self.position()).cloned(),
            focusable: true,
        }
    }

    pub fn widget<'a>(&self, theme: &'a Theme, focused: bool) -> ValueSliderWidget<'a> {
        ValueSliderWidget {
            view: self.view(),
            theme,
            focused,
        }
    }
}

pub struct ValueSliderWidget<'a> {
    view: SliderView,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> Widget for ValueSliderWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(self.focused))
            .title(format!(" {} ", self.view.label))
            .title_style(self.theme.title(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let v = &self.view;
        let lines = match &v.value_text {
            Some(value) => {
                let fraction = if v.max == v.min {
                    0.0
                } else {
                    (v.position - v.min) as f64 / (v.max - v.min) as f64
                };
                let width = (inner.width as usize).saturating_sub(2).min(40);
                vec![
                    Line::from(Span::styled(
                        render_track(fraction, width),
                        if self.focused { self.theme.accent_bold() } else { self.theme.hint() },
                    )),
                    Line::from(vec![
                        Span::styled(value.clone(), self.theme.text()),
                        Span::styled(
                            format!("  ({}/{})", v.position + 1, v.max + 1),
                            self.theme.secondary(),
                        ),
                    ]),
                ]
            }
            None => vec![Line::from(Span::styled("(no values)", self.theme.hint()))],
        };
        Paragraph::new(lines).render(inner, buf);
    }
}
