use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use stepscope_core::safetensors::write_metadata_only;
use stepscope_core::{
    CheckpointDescriptor, CheckpointMetadata, FetchError, FetchErrorCode, MetadataSource,
    SafetensorsSource,
};
use stepscope_tui::widgets::{CheckpointMetadataPanel, FetchState, PanelBody};
use stepscope_tui::worker::{self, WorkerCommand};
use stepscope_tui::AppState;

/// In-memory source with canned answers per file.
struct ScriptedSource {
    answers: HashMap<String, Result<CheckpointMetadata, FetchError>>,
}

impl MetadataSource for ScriptedSource {
    fn fetch(&self, filename: &str) -> Result<CheckpointMetadata, FetchError> {
        self.answers
            .get(filename)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::not_found(filename)))
    }
}

fn scripted() -> ScriptedSource {
    let mut answers = HashMap::new();
    answers.insert(
        "a.safetensors".to_string(),
        Ok([("ss_epoch", "1"), ("format", "pt")].into_iter().collect()),
    );
    answers.insert(
        "b.safetensors".to_string(),
        Ok([("ss_epoch", "2"), ("ss_lr", "1e-4")].into_iter().collect()),
    );
    answers.insert(
        "c.safetensors".to_string(),
        Err(FetchError::new(FetchErrorCode::Io, "Connection lost")),
    );
    ScriptedSource { answers }
}

fn list() -> Vec<CheckpointDescriptor> {
    vec![
        CheckpointDescriptor::new("a.safetensors", 100, true),
        CheckpointDescriptor::new("b.safetensors", 200, false),
        CheckpointDescriptor::new("c.safetensors", 50, false),
    ]
}

#[test]
fn older_result_arriving_last_is_discarded() {
    let source = scripted();
    let mut panel = CheckpointMetadataPanel::new();

    let first = panel.set_checkpoints(&list()).unwrap();
    assert_eq!(first.filename, "b.safetensors");
    let second = panel.select("a.safetensors").unwrap();

    // The newer answer lands first, then the stale one.
    assert!(panel.resolve(second.token, &second.filename, source.fetch(&second.filename)));
    assert!(!panel.resolve(first.token, &first.filename, source.fetch(&first.filename)));

    assert_eq!(panel.selected(), Some("a.safetensors"));
    match panel.view().body {
        PanelBody::Table(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].field, "ss_epoch");
            assert_eq!(rows[0].value, "1");
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn failure_shows_source_message() {
    let source = scripted();
    let mut panel = CheckpointMetadataPanel::new();
    panel.set_checkpoints(&list());
    let request = panel.select("c.safetensors").unwrap();
    panel.resolve(request.token, &request.filename, source.fetch(&request.filename));
    assert_eq!(panel.view().body, PanelBody::Alert("Connection lost".into()));
}

#[test]
fn reselecting_after_failure_recovers() {
    let mut source = scripted();
    let mut panel = CheckpointMetadataPanel::new();
    panel.set_checkpoints(&list());

    let failed = panel.select("c.safetensors").unwrap();
    panel.resolve(failed.token, &failed.filename, source.fetch(&failed.filename));

    source.answers.insert(
        "c.safetensors".to_string(),
        Ok([("ss_epoch", "0")].into_iter().collect()),
    );
    let retry = panel.select("c.safetensors").unwrap();
    assert_eq!(panel.fetch_state(), &FetchState::Loading);
    assert!(panel.resolve(retry.token, &retry.filename, source.fetch(&retry.filename)));
    assert!(matches!(panel.fetch_state(), FetchState::Loaded(rows) if rows.len() == 1));
}

fn write_checkpoint(dir: &std::path::Path, name: &str, pairs: &[(&str, &str)]) {
    let metadata: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    write_metadata_only(&dir.join(name), &metadata).unwrap();
}

fn wait_until(app: &mut AppState, done: impl Fn(&AppState) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        app.drain_worker();
        if done(app) {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("worker did not answer in time");
}

#[test]
fn app_fetches_through_worker_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_checkpoint(dir.path(), "run-000100.safetensors", &[("ss_epoch", "1")]);
    write_checkpoint(
        dir.path(),
        "run-000200.safetensors",
        &[("ss_epoch", "2"), ("ss_network_dim", "32"), ("modelspec.title", "x")],
    );
    let samples = dir.path().join("sample");
    std::fs::create_dir(&samples).unwrap();
    std::fs::write(samples.join("run_000100_00_20260101.png"), b"").unwrap();

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let source = Arc::new(SafetensorsSource::new(dir.path()));
    let handle = worker::spawn_worker(source, cmd_rx, resp_tx).unwrap();

    let mut app = AppState::new(cmd_tx.clone(), resp_rx, PathBuf::from(dir.path()), 300);
    app.rescan();
    assert!(app.checkpoints.is_empty());

    wait_until(&mut app, |a| {
        a.checkpoints.len() == 2
            && a.samples.len() == 1
            && !matches!(a.panel.fetch_state(), FetchState::Loading)
    });
    assert_eq!(app.panel.selected(), Some("run-000200.safetensors"));
    assert_eq!(app.step_slider.values(), &["100".to_string()]);
    match app.panel.fetch_state() {
        FetchState::Loaded(rows) => {
            let fields: Vec<&str> = rows.iter().map(|r| r.field.as_str()).collect();
            assert_eq!(fields, vec!["ss_epoch", "ss_network_dim"]);
        }
        other => panic!("expected loaded, got {other:?}"),
    }

    cmd_tx.send(WorkerCommand::Shutdown).unwrap();
    handle.join().unwrap();
}

#[test]
fn missing_file_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    write_checkpoint(dir.path(), "run-000100.safetensors", &[("ss_epoch", "1")]);

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let source = Arc::new(SafetensorsSource::new(dir.path()));
    let handle = worker::spawn_worker(source, cmd_rx, resp_tx).unwrap();

    let mut app = AppState::new(cmd_tx.clone(), resp_rx, PathBuf::from(dir.path()), 300);
    app.rescan();
    wait_until(&mut app, |a| a.panel.selected().is_some());
    std::fs::remove_file(dir.path().join("run-000100.safetensors")).unwrap();
    // Re-selecting the same checkpoint fetches again.
    let request = app.panel.select("run-000100.safetensors").unwrap();
    app.dispatch(request);

    wait_until(&mut app, |a| matches!(a.panel.fetch_state(), FetchState::Failed(_)));
    assert_eq!(app.error_history[0].code, "not_found");

    cmd_tx.send(WorkerCommand::Shutdown).unwrap();
    handle.join().unwrap();
}
