//! stepscope CLI: inspect training checkpoints without the TUI.
//!
//! Commands:
//! - `list`: checkpoints in a directory, newest step first
//! - `metadata`: training metadata from one `.safetensors` header

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use stepscope_core::safetensors::read_metadata;
use stepscope_core::{scan_checkpoints, sort_by_step_desc, MetadataEntry};

#[derive(Parser)]
#[command(name = "stepscope", about = "stepscope CLI: checkpoint and training metadata inspector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List checkpoints sorted by step, highest first.
    ///
    /// The step comes from a trailing counter in the file name (`-000500`,
    /// `_step2000`). Names without one, or ending in a version tag like `v2`,
    /// use the header's `ss_steps` instead.
    List {
        /// Checkpoint directory. Defaults to the current directory.
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Emit JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the training metadata stored in a checkpoint header.
    Metadata {
        /// Path to a .safetensors file.
        file: PathBuf,

        /// Include every header key, not only `ss_*` fields.
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Emit `field,value` CSV rows.
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
}

#[derive(Debug, Serialize)]
struct ListRow {
    step: u64,
    filename: String,
    has_samples: bool,
    output_name: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::List { dir, json } => {
            let rows = list_rows(&dir)?;
            if json {
                serde_json::to_writer_pretty(&mut out, &rows)?;
                writeln!(out)?;
            } else {
                write_table(&mut out, &rows)?;
            }
        }
        Commands::Metadata { file, all, csv } => {
            let entries = metadata_entries(&file, all)?;
            if csv {
                write_csv(&mut out, &entries)?;
            } else {
                write_entries(&mut out, &entries)?;
            }
        }
    }
    Ok(())
}

fn list_rows(dir: &Path) -> Result<Vec<ListRow>> {
    let checkpoints = scan_checkpoints(dir)?;
    let sorted = sort_by_step_desc(&checkpoints);
    let rows = sorted
        .par_iter()
        .map(|c| {
            let output_name = match read_metadata(&dir.join(&c.filename)) {
                Ok(meta) => meta.get("ss_output_name").map(String::from),
                Err(e) => {
                    tracing::warn!(filename = c.filename.as_str(), code = e.code.as_str(), "{}", e.message);
                    None
                }
            };
            ListRow {
                step: c.step_number,
                filename: c.filename.clone(),
                has_samples: c.has_samples,
                output_name,
            }
        })
        .collect();
    Ok(rows)
}

fn metadata_entries(file: &Path, all: bool) -> Result<Vec<MetadataEntry>> {
    let meta = read_metadata(file)
        .with_context(|| format!("failed to read metadata from {}", file.display()))?;
    Ok(if all {
        meta.all_entries()
    } else {
        meta.training_entries()
    })
}

fn write_table(out: &mut impl Write, rows: &[ListRow]) -> Result<()> {
    let width = rows
        .iter()
        .map(|r| r.filename.len())
        .max()
        .unwrap_or(0)
        .max("FILENAME".len());
    writeln!(out, "{:>8}  {:<width$}  {:<7}  OUTPUT", "STEP", "FILENAME", "SAMPLES")?;
    for row in rows {
        writeln!(
            out,
            "{:>8}  {:<width$}  {:<7}  {}",
            row.step,
            row.filename,
            if row.has_samples { "yes" } else { "no" },
            row.output_name.as_deref().unwrap_or("-"),
        )?;
    }
    Ok(())
}

fn write_entries(out: &mut impl Write, entries: &[MetadataEntry]) -> Result<()> {
    if entries.is_empty() {
        writeln!(out, "No training metadata found")?;
        return Ok(());
    }
    let width = entries.iter().map(|e| e.field.len()).max().unwrap_or(0);
    for entry in entries {
        writeln!(out, "{:<width$}  {}", entry.field, entry.value)?;
    }
    Ok(())
}

fn write_csv(out: &mut impl Write, entries: &[MetadataEntry]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["field", "value"])?;
    for entry in entries {
        writer.write_record([entry.field.as_str(), entry.value.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use stepscope_core::safetensors::write_metadata_only;

    fn write(dir: &Path, name: &str, pairs: &[(&str, &str)]) {
        let meta: BTreeMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        write_metadata_only(&dir.join(name), &meta).unwrap();
    }

    #[test]
    fn list_is_descending_with_output_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lora-000100.safetensors", &[("ss_output_name", "lora")]);
        write(dir.path(), "lora-000300.safetensors", &[]);
        write(dir.path(), "lora-000200.safetensors", &[("ss_output_name", "lora")]);

        let rows = list_rows(dir.path()).unwrap();
        let steps: Vec<u64> = rows.iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![300, 200, 100]);
        assert_eq!(rows[0].output_name, None);
        assert_eq!(rows[1].output_name.as_deref(), Some("lora"));
    }

    #[test]
    fn missing_dir_is_error() {
        assert!(list_rows(Path::new("/nonexistent/stepscope")).is_err());
    }

    #[test]
    fn metadata_filters_unless_all() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "m.safetensors", &[("ss_epoch", "4"), ("format", "pt")]);
        let path = dir.path().join("m.safetensors");

        assert_eq!(metadata_entries(&path, false).unwrap().len(), 1);
        assert_eq!(metadata_entries(&path, true).unwrap().len(), 2);
    }

    #[test]
    fn missing_file_is_error() {
        let err = metadata_entries(Path::new("/nonexistent/m.safetensors"), false).unwrap_err();
        assert!(format!("{err:#}").contains("m.safetensors"));
    }

    #[test]
    fn csv_has_header_and_rows() {
        let entries = vec![
            MetadataEntry::new("ss_epoch", "4"),
            MetadataEntry::new("ss_tag", "a,b"),
        ];
        let mut buf = Vec::new();
        write_csv(&mut buf, &entries).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "field,value\nss_epoch,4\nss_tag,\"a,b\"\n");
    }

    #[test]
    fn empty_entries_print_message() {
        let mut buf = Vec::new();
        write_entries(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "No training metadata found\n");
    }
}
