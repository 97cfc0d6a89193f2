//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels;
//! nothing in this module touches the filesystem.
//! Widget events are applied here, which keeps the widgets themselves free
//! of host concerns.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;

use stepscope_core::{CheckpointDescriptor, FetchError, FetchErrorCode};

use crate::theme::Theme;
use crate::widgets::{
    CheckpointMetadataPanel, FetchRequest, IndexedValueSlider, PanelAction, PanelEvent,
    RangeZoomControl, SliderEvent, ZoomEvent,
};
use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;
pub const STEP_SLIDER_LABEL: &str = "Sample step";

/// Which widget receives arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Slider,
    Zoom,
    Drawer,
}

impl Focus {
    pub fn next(self, drawer_open: bool) -> Focus {
        match self {
            Focus::Slider => Focus::Zoom,
            Focus::Zoom if drawer_open => Focus::Drawer,
            Focus::Zoom | Focus::Drawer => Focus::Slider,
        }
    }

    pub fn prev(self, drawer_open: bool) -> Focus {
        match self {
            Focus::Slider if drawer_open => Focus::Drawer,
            Focus::Slider => Focus::Zoom,
            Focus::Zoom => Focus::Slider,
            Focus::Drawer => Focus::Zoom,
        }
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub code: &'static str,
    pub message: String,
    pub context: String,
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    ErrorHistory,
}

/// Top-level application state.
pub struct AppState {
    pub running: bool,
    pub focus: Focus,
    pub drawer_open: bool,
    pub theme: Theme,

    // Widgets
    pub step_slider: IndexedValueSlider,
    pub zoom: RangeZoomControl,
    pub panel: CheckpointMetadataPanel,

    // Directory contents
    pub checkpoint_dir: PathBuf,
    pub checkpoints: Vec<CheckpointDescriptor>,
    pub samples: Vec<PathBuf>,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        checkpoint_dir: PathBuf,
        zoom_size: u16,
    ) -> Self {
        Self {
            running: true,
            focus: Focus::Slider,
            drawer_open: true,
            theme: Theme::default(),
            step_slider: IndexedValueSlider::new(Vec::new(), String::new(), STEP_SLIDER_LABEL),
            zoom: RangeZoomControl::new(zoom_size),
            panel: CheckpointMetadataPanel::new(),
            checkpoint_dir,
            checkpoints: Vec::new(),
            samples: Vec::new(),
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
        }
    }

    /// Ask the worker to re-read the checkpoint directory.
    pub fn rescan(&mut self) {
        let dir = self.checkpoint_dir.clone();
        if self.send(WorkerCommand::Scan { dir }) {
            self.set_status(format!("Scanning {}", self.checkpoint_dir.display()));
        }
    }

    /// Feed a new checkpoint list to both the slider and the drawer.
    pub fn load_checkpoints(&mut self, checkpoints: Vec<CheckpointDescriptor>) {
        let mut steps: Vec<u64> = checkpoints
            .iter()
            .filter(|c| c.has_samples)
            .map(|c| c.step_number)
            .collect();
        steps.sort_unstable();
        steps.dedup();
        let values: Vec<String> = steps.iter().map(u64::to_string).collect();

        // Keep the chosen step if it survived the rescan, else jump to the latest.
        if !values.iter().any(|v| v == self.step_slider.current_value()) {
            let latest = values.last().cloned().unwrap_or_default();
            self.step_slider.set_current_value(latest);
        }
        self.step_slider.set_values(values);

        if let Some(request) = self.panel.set_checkpoints(&checkpoints) {
            self.dispatch(request);
        }
        self.checkpoints = checkpoints;
        self.refresh_samples();
    }

    /// Hand a fetch to the worker. A dead worker settles the fetch as failed.
    pub fn dispatch(&mut self, request: FetchRequest) {
        let FetchRequest { token, filename } = request;
        tracing::debug!(token, filename = %filename, "dispatching metadata fetch");
        if let Err(e) = self.worker_tx.send(WorkerCommand::FetchMetadata {
            token,
            filename: filename.clone(),
        }) {
            tracing::error!(error = %e, "worker channel closed");
            let err = FetchError::new(FetchErrorCode::Disconnected, "metadata worker is not running");
            self.handle_worker_response(WorkerResponse::Metadata {
                token,
                filename,
                result: Err(err),
            });
        }
    }

    /// Drain worker responses without blocking.
    pub fn drain_worker(&mut self) {
        while let Ok(resp) = self.worker_rx.try_recv() {
            self.handle_worker_response(resp);
        }
    }

    pub fn handle_worker_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Scanned { dir, result } => {
                if dir != self.checkpoint_dir {
                    return;
                }
                match result {
                    Ok(found) => {
                        let count = found.len();
                        self.load_checkpoints(found);
                        self.set_status(format!("{count} checkpoints in {}", dir.display()));
                    }
                    Err(message) => {
                        tracing::error!(error = %message, "checkpoint scan failed");
                        self.load_checkpoints(Vec::new());
                        self.push_error("scan", message, dir.display().to_string());
                    }
                }
            }
            WorkerResponse::Samples { step, paths } => {
                // Drop listings for a step the slider has already left.
                if self.current_step() == Some(step) {
                    self.samples = paths;
                }
            }
            WorkerResponse::Metadata {
                token,
                filename,
                result,
            } => {
                let failure = result.as_ref().err().map(|e| (e.code, e.message.clone()));
                if self.panel.resolve(token, &filename, result) {
                    if let Some((code, message)) = failure {
                        self.push_error(code.as_str(), message, filename);
                    }
                }
            }
        }
    }

    pub fn apply_slider_event(&mut self, event: SliderEvent) {
        match event {
            SliderEvent::Change(value) => {
                self.step_slider.set_current_value(value);
                self.refresh_samples();
            }
        }
    }

    pub fn apply_zoom_event(&mut self, event: ZoomEvent) {
        match event {
            ZoomEvent::UpdateSize(size) => self.zoom.set_size(size),
        }
    }

    pub fn apply_panel_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::Fetch(request) => self.dispatch(request),
            PanelAction::Event(PanelEvent::Close) => {
                self.drawer_open = false;
                if self.focus == Focus::Drawer {
                    self.focus = Focus::Slider;
                }
            }
        }
    }

    pub fn toggle_drawer(&mut self) {
        self.drawer_open = !self.drawer_open;
        if self.drawer_open {
            self.focus = Focus::Drawer;
        } else if self.focus == Focus::Drawer {
            self.focus = Focus::Slider;
        }
    }

    /// Drawer width in columns, driven by the zoom size.
    pub fn drawer_width(&self) -> u16 {
        self.zoom.drawer_columns()
    }

    fn current_step(&self) -> Option<u64> {
        self.step_slider.current_value().parse().ok()
    }

    /// Clear the sample list and ask the worker for the current step's images.
    fn refresh_samples(&mut self) {
        self.samples.clear();
        if let Some(step) = self.current_step() {
            let dir = self.checkpoint_dir.clone();
            self.send(WorkerCommand::ListSamples { dir, step });
        }
    }

    /// Send a non-fetch command. A dead worker is recorded, not fatal.
    fn send(&mut self, command: WorkerCommand) -> bool {
        match self.worker_tx.send(command) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "worker channel closed");
                self.push_error(
                    FetchErrorCode::Disconnected.as_str(),
                    "background worker is not running".to_string(),
                    self.checkpoint_dir.display().to_string(),
                );
                false
            }
        }
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, code: &'static str, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            code,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}
