use mergeline_types::TopologyError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("channel closed before end-of-stream")]
    ChannelClosed,

    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl From<TopologyError> for PipelineError {
    fn from(e: TopologyError) -> Self {
        Self::Config(e.to_string())
    }
}

/// Invariant breaches on the token stream. All fatal: ignoring any of these
/// would silently corrupt the window counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    #[error("unknown routing tag {0}")]
    UnknownTag(u8),

    #[error("token received after end-of-stream")]
    TokenAfterEndOfStream,

    #[error("duplicate end-of-stream")]
    DuplicateEndOfStream,
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, PipelineError>;
