//! `mergeline-net` — the wire token codec and TCP neighbor links.
//!
//! In multi-process deployment each chain position runs as its own process;
//! adjacent positions are connected by one one-directional TCP stream
//! carrying fixed two-byte token frames. The stream inherits TCP's ordering
//! and delivery guarantees, which is exactly the channel contract the
//! pipeline core consumes.

pub mod tcp;
pub mod wire;

// ── Public re-exports ────────────────────────────────────────────────────────

pub use tcp::{bind_upstream, connect_downstream, TcpTokenRx, TcpTokenTx, UpstreamListener};
pub use wire::{decode_token, encode_token, TOKEN_WIRE_BYTES};
