//! Chain topology: P workers on a line, indices 0..P−1.
//!
//! Each worker needs only its own position and the worker count — there is
//! no other topology metadata. Position 0 feeds the chain, position P−1
//! delivers the sorted output, everything in between merges.

use serde::{Deserialize, Serialize};

/// Worker counts above this would overflow the per-stage quota arithmetic;
/// 2^30 values is already far beyond what fits in memory per stage.
pub const MAX_WORKERS: u32 = 31;

// ── Role ─────────────────────────────────────────────────────────────────────

/// What a chain position does with its tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Position 0: forwards each input value as a singleton run.
    Source,
    /// Positions 1..P−1: merge two runs and forward the result.
    Interior,
    /// Position P−1: merges like an interior stage but emits to the consumer.
    Sink,
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("a pipeline needs at least one worker")]
    NoWorkers,

    #[error("position {position} out of bounds for {workers} workers")]
    PositionOutOfBounds { position: u32, workers: u32 },

    #[error("worker count {0} exceeds the supported maximum {max}", max = MAX_WORKERS)]
    TooManyWorkers(u32),
}

// ── Topology ─────────────────────────────────────────────────────────────────

/// One worker's view of the chain: its own position p and the total count P.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    position: u32,
    workers: u32,
}

impl Topology {
    pub fn new(position: u32, workers: u32) -> Result<Self, TopologyError> {
        if workers == 0 {
            return Err(TopologyError::NoWorkers);
        }
        if workers > MAX_WORKERS {
            return Err(TopologyError::TooManyWorkers(workers));
        }
        if position >= workers {
            return Err(TopologyError::PositionOutOfBounds { position, workers });
        }
        Ok(Self { position, workers })
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn workers(&self) -> u32 {
        self.workers
    }

    pub fn role(&self) -> Role {
        if self.position == 0 {
            Role::Source
        } else if self.position == self.workers - 1 {
            Role::Sink
        } else {
            Role::Interior
        }
    }

    pub fn is_source(&self) -> bool {
        self.position == 0
    }

    pub fn is_sink(&self) -> bool {
        self.position == self.workers - 1
    }

    /// Position of the next worker down the chain, if any.
    pub fn successor(&self) -> Option<u32> {
        if self.is_sink() {
            None
        } else {
            Some(self.position + 1)
        }
    }

    /// Position of the previous worker up the chain, if any.
    pub fn predecessor(&self) -> Option<u32> {
        if self.is_source() {
            None
        } else {
            Some(self.position - 1)
        }
    }

    /// Values consumed from each input buffer per merge window: 2^(p−1).
    /// Meaningful for merging positions only (p > 0).
    pub fn window_quota(&self) -> usize {
        debug_assert!(self.position > 0, "source stage has no merge window");
        1usize << (self.position - 1)
    }

    /// Length of the sorted runs this position emits: 2^p.
    pub fn output_run_length(&self) -> usize {
        1usize << self.position
    }

    /// Largest input a chain of `workers` positions can fully sort: the sink
    /// produces runs of at most 2^(P−1) values.
    pub fn capacity(workers: u32) -> usize {
        let workers = workers.min(MAX_WORKERS);
        1usize << (workers - 1)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_across_chain() {
        let source = Topology::new(0, 4).unwrap();
        assert_eq!(source.role(), Role::Source);
        assert!(source.is_source());
        assert_eq!(source.predecessor(), None);
        assert_eq!(source.successor(), Some(1));

        let interior = Topology::new(2, 4).unwrap();
        assert_eq!(interior.role(), Role::Interior);
        assert_eq!(interior.predecessor(), Some(1));
        assert_eq!(interior.successor(), Some(3));

        let sink = Topology::new(3, 4).unwrap();
        assert_eq!(sink.role(), Role::Sink);
        assert!(sink.is_sink());
        assert_eq!(sink.successor(), None);
    }

    #[test]
    fn single_worker_is_both_ends() {
        let only = Topology::new(0, 1).unwrap();
        assert!(only.is_source());
        assert!(only.is_sink());
        assert_eq!(only.successor(), None);
        assert_eq!(only.predecessor(), None);
    }

    #[test]
    fn quota_and_run_length_double() {
        assert_eq!(Topology::new(0, 4).unwrap().output_run_length(), 1);
        assert_eq!(Topology::new(1, 4).unwrap().window_quota(), 1);
        assert_eq!(Topology::new(1, 4).unwrap().output_run_length(), 2);
        assert_eq!(Topology::new(2, 4).unwrap().window_quota(), 2);
        assert_eq!(Topology::new(3, 4).unwrap().window_quota(), 4);
        assert_eq!(Topology::new(3, 4).unwrap().output_run_length(), 8);
    }

    #[test]
    fn capacity_matches_sink_run_length() {
        assert_eq!(Topology::capacity(1), 1);
        assert_eq!(Topology::capacity(2), 2);
        assert_eq!(Topology::capacity(4), 8);
        assert_eq!(Topology::capacity(5), 16);
    }

    #[test]
    fn invalid_topologies_rejected() {
        assert_eq!(Topology::new(0, 0), Err(TopologyError::NoWorkers));
        assert_eq!(
            Topology::new(4, 4),
            Err(TopologyError::PositionOutOfBounds { position: 4, workers: 4 })
        );
        assert_eq!(Topology::new(0, 32), Err(TopologyError::TooManyWorkers(32)));
    }

    #[test]
    fn topology_serde() {
        let t = Topology::new(1, 3).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let round: Topology = serde_json::from_str(&json).unwrap();
        assert_eq!(round, t);
    }
}
