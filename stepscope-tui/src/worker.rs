//! Background worker thread: directory scans, sample listing and metadata
//! fetches run here so the render loop never touches the filesystem.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Commands
//! are handled in order; a superseded fetch still runs to completion and its
//! answer is dropped by the panel's token check.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use stepscope_core::{
    list_samples, scan_checkpoints, CheckpointDescriptor, CheckpointMetadata, FetchError,
    MetadataSource,
};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Scan { dir: PathBuf },
    ListSamples { dir: PathBuf, step: u64 },
    FetchMetadata { token: u64, filename: String },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    Scanned {
        dir: PathBuf,
        result: Result<Vec<CheckpointDescriptor>, String>,
    },
    Samples {
        step: u64,
        paths: Vec<PathBuf>,
    },
    Metadata {
        token: u64,
        filename: String,
        result: Result<CheckpointMetadata, FetchError>,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    source: Arc<dyn MetadataSource>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stepscope-worker".into())
        .spawn(move || worker_loop(source, rx, tx))
}

fn worker_loop(
    source: Arc<dyn MetadataSource>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    loop {
        let response = match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Scan { dir }) => {
                let result = scan_checkpoints(&dir).map_err(|e| e.to_string());
                WorkerResponse::Scanned { dir, result }
            }
            Ok(WorkerCommand::ListSamples { dir, step }) => WorkerResponse::Samples {
                step,
                paths: list_samples(&dir, step),
            },
            Ok(WorkerCommand::FetchMetadata { token, filename }) => {
                let result = source.fetch(&filename);
                tracing::debug!(token, filename = %filename, ok = result.is_ok(), "metadata fetch finished");
                WorkerResponse::Metadata {
                    token,
                    filename,
                    result,
                }
            }
        };
        if tx.send(response).is_err() {
            break;
        }
    }
    tracing::debug!("worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;
    use stepscope_core::FetchErrorCode;

    struct EchoSource;

    impl MetadataSource for EchoSource {
        fn fetch(&self, filename: &str) -> Result<CheckpointMetadata, FetchError> {
            if filename.starts_with("bad") {
                return Err(FetchError::new(FetchErrorCode::Io, "Connection lost"));
            }
            Ok([("ss_output_name", filename)].into_iter().collect())
        }
    }

    fn recv(rx: &Receiver<WorkerResponse>) -> WorkerResponse {
        rx.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn worker_shutdown() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, _resp_rx) = mpsc::channel();

        let handle = spawn_worker(Arc::new(EchoSource), cmd_rx, resp_tx).unwrap();
        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().expect("worker should join cleanly");
    }

    #[test]
    fn worker_answers_in_order_with_tokens() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(Arc::new(EchoSource), cmd_rx, resp_tx).unwrap();

        cmd_tx
            .send(WorkerCommand::FetchMetadata { token: 1, filename: "a.safetensors".into() })
            .unwrap();
        cmd_tx
            .send(WorkerCommand::FetchMetadata { token: 2, filename: "bad.safetensors".into() })
            .unwrap();

        let WorkerResponse::Metadata { token, result, .. } = recv(&resp_rx) else {
            panic!("expected metadata");
        };
        assert_eq!(token, 1);
        assert_eq!(result.unwrap().get("ss_output_name"), Some("a.safetensors"));

        let WorkerResponse::Metadata { token, filename, result } = recv(&resp_rx) else {
            panic!("expected metadata");
        };
        assert_eq!(token, 2);
        assert_eq!(filename, "bad.safetensors");
        assert_eq!(result.unwrap_err().message, "Connection lost");

        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn scan_and_samples_run_on_worker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("run-000100.safetensors"), b"").unwrap();
        let samples = dir.path().join("sample");
        std::fs::create_dir(&samples).unwrap();
        std::fs::write(samples.join("run_000100_00_1.png"), b"").unwrap();

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(Arc::new(EchoSource), cmd_rx, resp_tx).unwrap();

        cmd_tx.send(WorkerCommand::Scan { dir: dir.path().to_path_buf() }).unwrap();
        cmd_tx
            .send(WorkerCommand::ListSamples { dir: dir.path().to_path_buf(), step: 100 })
            .unwrap();
        cmd_tx.send(WorkerCommand::Scan { dir: dir.path().join("missing") }).unwrap();

        let WorkerResponse::Scanned { result, .. } = recv(&resp_rx) else {
            panic!("expected scan");
        };
        let found = result.unwrap();
        assert_eq!(found, vec![CheckpointDescriptor::new("run-000100.safetensors", 100, true)]);

        let WorkerResponse::Samples { step, paths } = recv(&resp_rx) else {
            panic!("expected samples");
        };
        assert_eq!(step, 100);
        assert_eq!(paths.len(), 1);

        let WorkerResponse::Scanned { result, .. } = recv(&resp_rx) else {
            panic!("expected scan");
        };
        assert!(result.unwrap_err().contains("not found"));

        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn worker_exits_when_sender_dropped() {
        let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();
        let (resp_tx, _resp_rx) = mpsc::channel();
        let handle = spawn_worker(Arc::new(EchoSource), cmd_rx, resp_tx).unwrap();
        drop(cmd_tx);
        handle.join().unwrap();
    }
}
