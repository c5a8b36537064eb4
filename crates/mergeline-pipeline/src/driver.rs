//! Per-role receive/emit loops.
//!
//! Each loop drives one chain position to completion over the channel
//! contract from [`crate::channel`]. The loops own the I/O; all merge
//! decisions live in [`crate::stage`]. A position never stops before
//! forwarding (interior) or emitting (sink) every buffered value — the
//! sentinel goes out strictly after the last real value, exactly once.

use tracing::debug;

use mergeline_types::{Token, Topology};

use crate::channel::{TokenRx, TokenTx};
use crate::error::Result;
use crate::stage::{MergeStage, RunTagger};

// ── Output contract ──────────────────────────────────────────────────────────

/// Ordered consumer fed by the sink position. Presentation (formatting,
/// writing) belongs to the implementor, not the core.
pub trait OutputSink<T> {
    fn accept(&mut self, value: T);
}

impl<T> OutputSink<T> for Vec<T> {
    fn accept(&mut self, value: T) {
        self.push(value);
    }
}

// ── Source (p = 0) ───────────────────────────────────────────────────────────

/// Forward each input value downstream as a singleton sorted run, toggling
/// the buffer side after every value, then send end-of-stream once.
pub async fn run_source<T, Tx>(values: Vec<T>, mut tx: Tx) -> Result<()>
where
    T: Send + 'static,
    Tx: TokenTx<T>,
{
    let mut tagger = RunTagger::new(1);
    let count = values.len();

    for value in values {
        tx.send(Token::value(tagger.next(), value)).await?;
    }
    tx.send(Token::end_of_stream()).await?;

    debug!(values = count, "source exhausted");
    Ok(())
}

// ── Interior (0 < p < P−1) ───────────────────────────────────────────────────

/// Merge two input runs of length 2^(p−1) into runs of 2^p and forward
/// them, then propagate end-of-stream.
pub async fn run_interior<T, Rx, Tx>(topology: Topology, mut rx: Rx, mut tx: Tx) -> Result<()>
where
    T: Ord + Send + 'static,
    Rx: TokenRx<T>,
    Tx: TokenTx<T>,
{
    let mut stage = MergeStage::new(topology.window_quota());
    let mut tagger = RunTagger::new(topology.output_run_length());
    let mut forwarded = 0u64;

    while !stage.is_finished() {
        if !stage.upstream_closed() {
            let token = rx.recv().await?;
            stage.accept(token)?;
        }
        while let Some(value) = stage.poll_emit() {
            tx.send(Token::value(tagger.next(), value)).await?;
            forwarded += 1;
        }
    }
    tx.send(Token::end_of_stream()).await?;

    debug!(position = topology.position(), forwarded, "interior stage closed");
    Ok(())
}

// ── Sink (p = P−1) ───────────────────────────────────────────────────────────

/// Same merge as an interior position, but emitted values go to `out` and
/// no sentinel is forwarded — there is no successor. Terminates silently
/// once closed and drained.
pub async fn run_sink<T, Rx, S>(topology: Topology, mut rx: Rx, out: &mut S) -> Result<()>
where
    T: Ord + Send + 'static,
    Rx: TokenRx<T>,
    S: OutputSink<T> + Send,
{
    let mut stage = MergeStage::new(topology.window_quota());
    let mut emitted = 0u64;

    while !stage.is_finished() {
        if !stage.upstream_closed() {
            let token = rx.recv().await?;
            stage.accept(token)?;
        }
        while let Some(value) = stage.poll_emit() {
            out.accept(value);
            emitted += 1;
        }
    }

    debug!(position = topology.position(), emitted, "sink drained");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
