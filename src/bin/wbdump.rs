//! wbdump Binary
//!
//! Inspects a file of framed replicated writes: verifies each checksum,
//! drops duplicates and decodes the write buffer batches.

use std::fs::File;
use std::io::{BufReader, Read};

use clap::Parser;
use delorean_wal::replication::ReplicatedWriteReader;
use delorean_wal::{Config, Deduplicator, ReplicatedWrite, WriteBufferBatch};
use serde_json::json;
use tracing_subscriber::{fmt, EnvFilter};

/// Replicated write inspector
#[derive(Parser, Debug)]
#[command(name = "wbdump")]
#[command(about = "Dump replicated write buffer batches from a file")]
#[command(version)]
struct Args {
    /// File containing back-to-back ReplicatedWrite frames
    path: String,

    /// Print one JSON object per record instead of a summary
    #[arg(long)]
    json: bool,

    /// Largest payload accepted, in MB
    #[arg(long, default_value = "16")]
    max_payload_mb: usize,

    /// Number of recent writes remembered for duplicate detection
    #[arg(long, default_value = "1024")]
    dedup_window: usize,
}

#[derive(Debug, Default)]
struct Summary {
    records: u64,
    duplicates: u64,
    corrupt: u64,
    malformed: u64,
    entries: u64,
    rows: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,delorean_wal=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("wbdump v{}", delorean_wal::VERSION);
    tracing::info!("Input: {}", args.path);

    let config = Config::builder()
        .max_payload_size(args.max_payload_mb.saturating_mul(1024 * 1024))
        .dedup_window(args.dedup_window)
        .build();

    match run(&args, config) {
        Ok(summary) => {
            tracing::info!(
                records = summary.records,
                duplicates = summary.duplicates,
                corrupt = summary.corrupt,
                malformed = summary.malformed,
                entries = summary.entries,
                rows = summary.rows,
                "Done"
            );
            if !args.json {
                println!(
                    "{} records, {} duplicates, {} corrupt, {} malformed, {} entries, {} rows",
                    summary.records,
                    summary.duplicates,
                    summary.corrupt,
                    summary.malformed,
                    summary.entries,
                    summary.rows
                );
            }
        }
        Err(e) => {
            tracing::error!("Failed to read {}: {}", args.path, e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args, config: Config) -> delorean_wal::Result<Summary> {
    let file = File::open(&args.path)?;
    dump(BufReader::new(file), args.json, config)
}

/// Walk every frame of `reader`, printing each record
///
/// Bad records are counted and skipped; only stream errors end the walk.
fn dump<R: Read>(reader: R, as_json: bool, config: Config) -> delorean_wal::Result<Summary> {
    let dedup = Deduplicator::new(&config);
    let mut summary = Summary::default();

    for write in ReplicatedWriteReader::new(reader, config) {
        // Stream and framing errors leave no next record to read
        let write = write?;
        summary.records += 1;

        match dedup.accept(&write) {
            Ok(true) => {}
            Ok(false) => {
                summary.duplicates += 1;
                if as_json {
                    print_json(&write, "duplicate", None);
                }
                continue;
            }
            Err(e) => {
                summary.corrupt += 1;
                tracing::error!("Discarding record: {}", e);
                if as_json {
                    print_json(&write, "corrupt", None);
                }
                continue;
            }
        }

        // Checksum already verified by the deduplicator
        match WriteBufferBatch::decode(&write.payload) {
            Ok(batch) => {
                summary.entries += batch.entries.len() as u64;
                summary.rows += batch
                    .entries
                    .iter()
                    .flat_map(|entry| entry.table_batches.iter())
                    .map(|table| table.rows.len() as u64)
                    .sum::<u64>();

                if as_json {
                    print_json(&write, "ok", Some(&batch));
                } else {
                    print_line(&write, &batch);
                }
            }
            Err(e) => {
                summary.malformed += 1;
                tracing::error!(
                    writer = write.writer,
                    sequence = write.sequence,
                    "Skipping undecodable payload: {}",
                    e
                );
                if as_json {
                    print_json(&write, "malformed", None);
                }
            }
        }
    }

    Ok(summary)
}

fn print_line(write: &ReplicatedWrite, batch: &WriteBufferBatch) {
    println!(
        "writer={} sequence={} checksum={:#010x} payload={}B",
        write.writer,
        write.sequence,
        write.checksum,
        write.payload.len()
    );
    for entry in &batch.entries {
        let tables: Vec<String> = entry
            .table_batches
            .iter()
            .map(|table| format!("{}({} rows)", table.name, table.rows.len()))
            .collect();
        print!("  partition={} tables=[{}]", entry.partition_key, tables.join(", "));
        if let Some(delete) = &entry.delete {
            print!(" delete={}:{}", delete.table_name, delete.predicate);
        }
        println!();
    }
}

fn print_json(write: &ReplicatedWrite, status: &str, batch: Option<&WriteBufferBatch>) {
    let record = json!({
        "writer": write.writer,
        "sequence": write.sequence,
        "checksum": write.checksum,
        "payload_len": write.payload.len(),
        "status": status,
        "batch": batch,
    });
    println!("{}", record);
}
