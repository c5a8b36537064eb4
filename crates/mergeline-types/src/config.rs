// Configuration structs shared by the library and the binary.

// ── Pipeline ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bound on in-flight tokens per channel. Senders block once the
    /// receiver lags this far behind, which is the only backpressure
    /// mechanism in the chain.
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { channel_capacity: 64 }
    }
}

// ── Networking ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NetConfig {
    /// First TCP port of the chain in multi-process mode. Worker p listens
    /// on `base_port + p` for its predecessor and dials `base_port + p + 1`.
    pub base_port: u16,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self { base_port: 7640 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.channel_capacity, 64);
    }

    #[test]
    fn net_defaults() {
        let cfg = NetConfig::default();
        assert_eq!(cfg.base_port, 7640);
    }
}
