//! mergeline binary — run the sorting chain in-process or one position per
//! process.
//!
//! ```bash
//! # Sort a byte file in-process; the chain length is derived from the input
//! RUST_LOG=info cargo run --bin mergeline-node -- sort --input numbers
//!
//! # The same chain as four processes linked over TCP (start in any order)
//! cargo run --bin mergeline-node -- worker --position 3 --workers 4 &
//! cargo run --bin mergeline-node -- worker --position 2 --workers 4 &
//! cargo run --bin mergeline-node -- worker --position 1 --workers 4 &
//! cargo run --bin mergeline-node -- worker --position 0 --workers 4 --input numbers
//! ```
//!
//! The input is a binary file of one-byte unsigned values. They are echoed
//! space-separated on one line before sorting; the sorted output is one
//! value per line.

use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mergeline_net::{bind_upstream, connect_downstream};
use mergeline_pipeline::{run_interior, run_sink, run_source};
use mergeline_types::config::{NetConfig, PipelineConfig};
use mergeline_types::topology::MAX_WORKERS;
use mergeline_types::{Role, Topology};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "mergeline-node",
    version = env!("CARGO_PKG_VERSION"),
    about   = "mergeline — pipelined parallel merge sort over message-passing workers"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sort a byte file with an in-process chain.
    Sort {
        /// Binary file of one-byte unsigned values.
        #[arg(long)]
        input: PathBuf,

        /// Chain length P. Defaults to the smallest chain that can sort
        /// the input (a chain of P workers sorts up to 2^(P−1) values).
        #[arg(long)]
        workers: Option<u32>,

        /// Bound on in-flight tokens per link.
        #[arg(long)]
        capacity: Option<usize>,
    },

    /// Run one chain position as its own process, linked over TCP.
    Worker {
        /// This worker's position p in [0, P).
        #[arg(long)]
        position: u32,

        /// Chain length P.
        #[arg(long)]
        workers: u32,

        /// First TCP port of the chain; position p listens on base-port + p.
        #[arg(long)]
        base_port: Option<u16>,

        /// Input file. Required at position 0.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Default log level: INFO. Override with RUST_LOG=mergeline_pipeline=debug etc.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Sort { input, workers, capacity } => run_sort(&input, workers, capacity).await,
        Command::Worker { position, workers, base_port, input } => {
            run_worker(position, workers, base_port, input.as_deref()).await
        }
    }
}

// ── In-process mode ───────────────────────────────────────────────────────────

async fn run_sort(input: &Path, workers: Option<u32>, capacity: Option<usize>) -> Result<()> {
    let values = load_values(input)?;
    echo_values(&values);

    let workers = workers.unwrap_or_else(|| derive_workers(values.len()));
    let mut config = PipelineConfig::default();
    if let Some(capacity) = capacity {
        config.channel_capacity = capacity;
    }

    info!(workers, values = values.len(), "starting in-process chain");
    let sorted = mergeline_pipeline::sort(values, workers, &config).await?;

    print_values(&sorted)
}

/// Smallest chain that can sort `count` values: 2^(P−1) ≥ count, P ≥ 2.
/// Saturates at the topology maximum; the pipeline rejects inputs even a
/// maximal chain cannot hold.
fn derive_workers(count: usize) -> u32 {
    let mut workers = 2;
    while workers < MAX_WORKERS && Topology::capacity(workers) < count {
        workers += 1;
    }
    workers
}

// ── Per-worker mode ───────────────────────────────────────────────────────────

async fn run_worker(
    position: u32,
    workers: u32,
    base_port: Option<u16>,
    input: Option<&Path>,
) -> Result<()> {
    let topology = Topology::new(position, workers)?;
    let base_port = base_port.unwrap_or_else(|| NetConfig::default().base_port);
    info!(position, workers, base_port, role = ?topology.role(), "worker starting");

    match topology.role() {
        Role::Source if workers == 1 => {
            // Degenerate one-worker chain: no merge network exists, the
            // input passes through unchanged and unsorted.
            let values = load_values(require_input(input)?)?;
            echo_values(&values);
            let out =
                mergeline_pipeline::sort(values, 1, &PipelineConfig::default()).await?;
            print_values(&out)?;
        }
        Role::Source => {
            let values = load_values(require_input(input)?)?;
            echo_values(&values);
            let tx = connect_downstream(chain_addr(base_port, position + 1)).await?;
            run_source(values, tx).await?;
        }
        Role::Interior => {
            // Bind before dialing so every worker's listener exists while
            // its predecessor retries the connect.
            let listener = bind_upstream(chain_addr(base_port, position)).await?;
            let tx = connect_downstream(chain_addr(base_port, position + 1)).await?;
            let rx = listener.accept().await?;
            run_interior::<u8, _, _>(topology, rx, tx).await?;
        }
        Role::Sink => {
            let listener = bind_upstream(chain_addr(base_port, position)).await?;
            let rx = listener.accept().await?;
            let mut out = Vec::new();
            run_sink(topology, rx, &mut out).await?;
            print_values(&out)?;
        }
    }

    info!(position, "worker complete");
    Ok(())
}

fn chain_addr(base_port: u16, position: u32) -> SocketAddr {
    let port = base_port + position as u16;
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

fn require_input(input: Option<&Path>) -> Result<&Path> {
    input.context("position 0 reads the input; pass --input <file>")
}

// ── Input / output ────────────────────────────────────────────────────────────

fn load_values(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading input file {}", path.display()))
}

/// Echo the unsorted input, space-separated on one line.
fn echo_values(values: &[u8]) {
    if values.is_empty() {
        return;
    }
    let line = values
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
}

/// One value per line.
fn print_values(values: &[u8]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for value in values {
        writeln!(out, "{value}")?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_chain_always_fits() {
        assert_eq!(derive_workers(0), 2);
        assert_eq!(derive_workers(1), 2);
        assert_eq!(derive_workers(2), 2);
        assert_eq!(derive_workers(3), 3);
        assert_eq!(derive_workers(4), 3);
        assert_eq!(derive_workers(5), 4);
        assert_eq!(derive_workers(16), 5);
        assert_eq!(derive_workers(17), 6);

        for count in [1usize, 7, 100, 4096] {
            let workers = derive_workers(count);
            assert!(Topology::capacity(workers) >= count);
            assert!(workers == 2 || Topology::capacity(workers - 1) < count);
        }
    }

    #[test]
    fn chain_addresses_are_consecutive() {
        let a0 = chain_addr(7640, 0);
        let a3 = chain_addr(7640, 3);
        assert_eq!(a0.port(), 7640);
        assert_eq!(a3.port(), 7643);
    }
}
