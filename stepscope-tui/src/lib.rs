//! stepscope TUI: browse a training run's checkpoints from the terminal.
//!
//! - Step slider over the steps that produced sample images
//! - Zoom control sizing the metadata drawer
//! - Checkpoint drawer showing `ss_*` training metadata, fetched off-thread

pub mod app;
pub mod config;
pub mod input;
pub mod logging;
pub mod persistence;
pub mod theme;
pub mod ui;
pub mod widgets;
pub mod worker;

pub use app::AppState;
pub use config::TuiConfig;
pub use theme::Theme;
