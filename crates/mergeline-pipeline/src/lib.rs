//! `mergeline-pipeline` — the pipelined parallel merge-sort core.
//!
//! A fixed chain of P positions sorts a finite sequence using only local
//! comparisons and neighbor-to-neighbor message passing — no shared memory,
//! no central coordinator. Each position knows only (p, P).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  runs of 1  ┌──────────┐  runs of 2  ┌──────────┐
//! │ Source   │────────────▶│ Interior │────────────▶│  Sink    │
//! │  p = 0   │  A,B,A,B…   │  p = 1   │  A,A,B,B…   │ p = P−1  │
//! └──────────┘             └──────────┘             └──────────┘
//!    input                  merge 1+1                merge 2+2 → output
//! ```
//!
//! The source forwards each value as a singleton run with an alternating
//! buffer tag; every later position merges two runs of length 2^(p−1) into
//! one of length 2^p. One end-of-stream sentinel follows the last real
//! value through every link.

pub mod channel;
pub mod driver;
pub mod error;
pub mod pipeline;
pub mod stage;

// ── Public re-exports ────────────────────────────────────────────────────────

pub use channel::{local_channel, LocalRx, LocalTx, TokenRx, TokenTx};
pub use driver::{run_interior, run_sink, run_source, OutputSink};
pub use error::{PipelineError, ProtocolViolation, Result};
pub use pipeline::sort;
pub use stage::{Lifecycle, MergeStage, RunTagger};
