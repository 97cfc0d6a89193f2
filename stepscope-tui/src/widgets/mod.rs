//! Stateless-except-for-selection widgets.
//!
//! Each widget takes its inputs as plain fields, turns key presses into
//! events the host applies, and exposes a pure `view()` that a ratatui
//! `Widget` draws.
//!
//! - IndexedValueSlider: pick one of an ordered list of strings
//! - RangeZoomControl: fixed-range numeric size
//! - CheckpointMetadataPanel: checkpoint list with per-selection metadata fetch

pub mod metadata_panel;
pub mod value_slider;
pub mod zoom_control;

pub use metadata_panel::{
    CheckpointMetadataPanel, FetchRequest, FetchState, MetadataPanelWidget, PanelAction,
    PanelBody, PanelEvent, PanelView,
};
pub use value_slider::{IndexedValueSlider, SliderEvent, SliderView, ValueSliderWidget};
pub use zoom_control::{RangeZoomControl, ZoomControlWidget, ZoomEvent, ZoomView};

/// Draw a slider track `[===|   ]` with the thumb at `fraction` of `width`.
pub(crate) fn render_track(fraction: f64, width: usize) -> String {
    if width == 0 {
        return "[]".to_string();
    }
    let frac = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let thumb = ((frac * (width - 1) as f64).round() as usize).min(width - 1);
    let mut track = String::with_capacity(width + 2);
    track.push('[');
    for i in 0..width {
        track.push(match i.cmp(&thumb) {
            std::cmp::Ordering::Less => '=',
            std::cmp::Ordering::Equal => '|',
            std::cmp::Ordering::Greater => ' ',
        });
    }
    track.push(']');
    track
}

/// Flatten a rendered buffer into one string for assertions.
#[cfg(test)]
pub(crate) fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    let area = buf.area;
    let mut content = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            content.push_str(buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "));
        }
        content.push('\n');
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_endpoints() {
        assert_eq!(render_track(0.0, 5), "[|    ]");
        assert_eq!(render_track(1.0, 5), "[====|]");
        assert_eq!(render_track(0.5, 5), "[==|  ]");
    }

    #[test]
    fn track_degenerate_inputs() {
        assert_eq!(render_track(0.3, 0), "[]");
        assert_eq!(render_track(f64::NAN, 3), "[|  ]");
        assert_eq!(render_track(7.0, 3), "[==|]");
    }
}
