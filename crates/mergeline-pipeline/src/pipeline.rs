//! In-process chain wiring.
//!
//! Spawns one task per chain position, links adjacent positions with
//! bounded channels, drives every position to completion and returns the
//! sink's output. This is the library entry point; the multi-process
//! deployment in `mergeline-node` wires the same drivers over TCP.

use tokio::task::JoinHandle;
use tracing::{info, warn};

use mergeline_types::config::PipelineConfig;
use mergeline_types::Topology;

use crate::channel::local_channel;
use crate::driver::{run_interior, run_sink, run_source};
use crate::error::{PipelineError, Result};

/// Sort `values` through a chain of `workers` cooperating positions.
///
/// A chain of P positions fully sorts at most 2^(P−1) values (the sink
/// produces runs of that length); longer inputs are rejected up front.
///
/// With a single worker there is no merge network at all: the input passes
/// through **unchanged and unsorted**. That is a structural limitation of a
/// one-position chain, kept deliberately — run P ≥ 2 to sort.
pub async fn sort<T>(values: Vec<T>, workers: u32, config: &PipelineConfig) -> Result<Vec<T>>
where
    T: Ord + Send + 'static,
{
    Topology::new(0, workers)?;
    let count = values.len();

    // A one-position chain has no merge network and no capacity bound: it
    // forwards everything it reads, unsorted.
    if workers == 1 {
        warn!("single-worker chain has no merge network; input passes through unsorted");
        return Ok(values);
    }

    if count > Topology::capacity(workers) {
        return Err(PipelineError::Config(format!(
            "{count} values exceed the capacity {} of a {workers}-worker chain",
            Topology::capacity(workers),
        )));
    }

    let capacity = config.channel_capacity;
    let (source_tx, mut rx_prev) = local_channel(capacity);

    let mut handles: Vec<JoinHandle<Result<()>>> =
        vec![tokio::spawn(run_source(values, source_tx))];

    for position in 1..workers - 1 {
        let topology = Topology::new(position, workers)?;
        let (tx, rx_next) = local_channel(capacity);
        let rx = std::mem::replace(&mut rx_prev, rx_next);
        handles.push(tokio::spawn(run_interior(topology, rx, tx)));
    }

    let sink_topology = Topology::new(workers - 1, workers)?;
    let sink: JoinHandle<Result<Vec<T>>> = tokio::spawn(async move {
        let mut out = Vec::with_capacity(count);
        run_sink(sink_topology, rx_prev, &mut out).await?;
        Ok(out)
    });

    // Join in chain order so the upstream-most failure surfaces as the
    // cause; downstream positions fail with ChannelClosed as a consequence.
    let mut first_err: Option<PipelineError> = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(PipelineError::Worker(e.to_string()));
                }
            }
        }
    }

    let sink_result = match sink.await {
        Ok(r) => r,
        Err(e) => Err(PipelineError::Worker(e.to_string())),
    };

    if let Some(e) = first_err {
        return Err(e);
    }
    let out = sink_result?;

    info!(workers, values = count, "pipeline complete");
    debug_assert_eq!(out.len(), count);
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
