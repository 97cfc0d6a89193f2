//! Fixed-range size slider.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::theme::Theme;
use crate::widgets::render_track;

pub const ZOOM_MIN: u16 = 100;
pub const ZOOM_MAX: u16 = 600;
pub const ZOOM_STEP: u16 = 10;
pub const ZOOM_UNIT: &str = "px";

const GROUP_LABEL: &str = "Zoom";
const SLIDER_LABEL: &str = "Drawer width";

/// Clamp `size` into range and round it to the nearest step.
pub fn snap_zoom(size: u16) -> u16 {
    let offset = size.clamp(ZOOM_MIN, ZOOM_MAX) - ZOOM_MIN;
    let steps = (offset + ZOOM_STEP / 2) / ZOOM_STEP;
    (ZOOM_MIN + steps * ZOOM_STEP).min(ZOOM_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomEvent {
    UpdateSize(u16),
}

/// Controlled size slider over `ZOOM_MIN..=ZOOM_MAX`.
///
/// Sizes outside the range or off the step grid are shown as given. Arrow
/// keys always land on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeZoomControl {
    size: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoomView {
    pub group_label: &'static str,
    pub slider_label: &'static str,
    pub min: u16,
    pub max: u16,
    pub step: u16,
    pub value: u16,
    pub display_text: String,
}

impl Default for RangeZoomControl {
    fn default() -> Self {
        Self { size: 300 }
    }
}

impl RangeZoomControl {
    pub fn new(size: u16) -> Self {
        Self { size }
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn set_size(&mut self, size: u16) {
        self.size = size;
    }

    /// Raw slider output, passed through untransformed.
    pub fn set_value(&self, value: u16) -> ZoomEvent {
        ZoomEvent::UpdateSize(value)
    }

    /// Move to the neighbouring grid value, bounded like a native range input.
    /// An off-grid size lands on the nearest grid value in the key's direction.
    pub fn handle_key(&self, key: KeyEvent) -> Option<ZoomEvent> {
        let next = match key.code {
            KeyCode::Right | KeyCode::Up => self.grid_above(),
            KeyCode::Left | KeyCode::Down => self.grid_below(),
            _ => return None,
        };
        if next == self.size {
            return None;
        }
        Some(self.set_value(next))
    }

    fn grid_above(&self) -> u16 {
        if self.size < ZOOM_MIN {
            return ZOOM_MIN;
        }
        let steps = (self.size - ZOOM_MIN) / ZOOM_STEP + 1;
        ZOOM_MIN.saturating_add(steps.saturating_mul(ZOOM_STEP)).min(ZOOM_MAX)
    }

    fn grid_below(&self) -> u16 {
        if self.size > ZOOM_MAX {
            return ZOOM_MAX;
        }
        if self.size <= ZOOM_MIN {
            return ZOOM_MIN;
        }
        ZOOM_MIN + (self.size - ZOOM_MIN - 1) / ZOOM_STEP * ZOOM_STEP
    }

    pub fn display_text(&self) -> String {
        format!("{}{ZOOM_UNIT}", self.size)
    }

    /// Terminal columns for the drawer at this size.
    pub fn drawer_columns(&self) -> u16 {
        self.size / 10
    }

    pub fn view(&self) -> ZoomView {
        ZoomView {
            group_label: GROUP_LABEL,
            slider_label: SLIDER_LABEL,
            min: ZOOM_MIN,
            max: ZOOM_MAX,
            step: ZOOM_STEP,
            value: self.size,
            display_text: self.display_text(),
        }
    }

    pub fn widget<'a>(&self, theme: &'a Theme, focused: bool) -> ZoomControlWidget<'a> {
        ZoomControlWidget {
            view: self.view(),
            theme,
            focused,
        }
    }
}

pub struct ZoomControlWidget<'a> {
    view: ZoomView,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> Widget for ZoomControlWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let v = &self.view;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(self.focused))
            .title(format!(" {} ", v.group_label))
            .title_style(self.theme.title(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let fraction = (f64::from(v.value) - f64::from(v.min)) / f64::from(v.max - v.min);
        let width = (inner.width as usize)
            .saturating_sub(v.slider_label.len() + v.display_text.len() + 5)
            .min(40);
        let line = Line::from(vec![
            Span::styled(format!("{}: ", v.slider_label), self.theme.secondary()),
            Span::styled(
                render_track(fraction, width),
                if self.focused { self.theme.accent_bold() } else { self.theme.hint() },
            ),
            Span::styled(format!(" {}", v.display_text), self.theme.text()),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::buffer_text;
    use crossterm::event::KeyModifiers;
    use proptest::prelude::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn fixed_range_and_step() {
        let view = RangeZoomControl::new(250).view();
        assert_eq!((view.min, view.max, view.step), (100, 600, 10));
        assert_eq!(view.value, 250);
        assert_eq!(view.group_label, "Zoom");
        assert_eq!(view.slider_label, "Drawer width");
    }

    #[test]
    fn update_round_trip() {
        for x in [100u16, 150, 200, 300, 450, 600] {
            let mut zoom = RangeZoomControl::new(300);
            let ZoomEvent::UpdateSize(emitted) = zoom.set_value(x);
            assert_eq!(emitted, x);
            zoom.set_size(emitted);
            assert_eq!(zoom.display_text(), format!("{x}px"));
            assert_eq!(zoom.view().value, x);
        }
    }

    #[test]
    fn arrow_keys_step_within_bounds() {
        let zoom = RangeZoomControl::new(300);
        assert_eq!(zoom.handle_key(key(KeyCode::Right)), Some(ZoomEvent::UpdateSize(310)));
        assert_eq!(zoom.handle_key(key(KeyCode::Down)), Some(ZoomEvent::UpdateSize(290)));
        assert_eq!(zoom.handle_key(key(KeyCode::Tab)), None);

        assert_eq!(RangeZoomControl::new(600).handle_key(key(KeyCode::Up)), None);
        assert_eq!(RangeZoomControl::new(100).handle_key(key(KeyCode::Left)), None);
        assert_eq!(
            RangeZoomControl::new(595).handle_key(key(KeyCode::Right)),
            Some(ZoomEvent::UpdateSize(600))
        );
    }

    #[test]
    fn out_of_range_props_display_as_given() {
        let zoom = RangeZoomControl::new(50);
        assert_eq!(zoom.display_text(), "50px");
        assert_eq!(zoom.handle_key(key(KeyCode::Right)), Some(ZoomEvent::UpdateSize(100)));
    }

    #[test]
    fn off_grid_size_steps_onto_grid() {
        let zoom = RangeZoomControl::new(155);
        assert_eq!(zoom.display_text(), "155px");
        assert_eq!(zoom.handle_key(key(KeyCode::Right)), Some(ZoomEvent::UpdateSize(160)));
        assert_eq!(zoom.handle_key(key(KeyCode::Left)), Some(ZoomEvent::UpdateSize(150)));
        assert_eq!(
            RangeZoomControl::new(601).handle_key(key(KeyCode::Left)),
            Some(ZoomEvent::UpdateSize(600))
        );
    }

    #[test]
    fn snap_rounds_to_nearest_step() {
        assert_eq!(snap_zoom(155), 160);
        assert_eq!(snap_zoom(154), 150);
        assert_eq!(snap_zoom(300), 300);
        assert_eq!(snap_zoom(5), 100);
        assert_eq!(snap_zoom(u16::MAX), 600);
    }

    #[test]
    fn drawer_columns_scale_with_size() {
        assert_eq!(RangeZoomControl::new(100).drawer_columns(), 10);
        assert_eq!(RangeZoomControl::new(450).drawer_columns(), 45);
    }

    #[test]
    fn renders_labels_and_size() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 3);
        let mut buf = Buffer::empty(area);
        RangeZoomControl::new(450).widget(&theme, false).render(area, &mut buf);

        let content = buffer_text(&buf);
        assert!(content.contains("Zoom"));
        assert!(content.contains("Drawer width"));
        assert!(content.contains("450px"));
    }

    proptest! {
        #[test]
        fn keys_never_leave_range(
            start in ZOOM_MIN..=ZOOM_MAX,
            steps in prop::collection::vec(prop::bool::ANY, 1..80),
        ) {
            let mut zoom = RangeZoomControl::new(start);
            for right in steps {
                let code = if right { KeyCode::Right } else { KeyCode::Left };
                if let Some(ZoomEvent::UpdateSize(size)) = zoom.handle_key(key(code)) {
                    prop_assert_eq!(size % ZOOM_STEP, 0);
                    zoom.set_size(size);
                }
                prop_assert!((ZOOM_MIN..=ZOOM_MAX).contains(&zoom.size()));
            }
        }
    }
}
