// Tokens exchanged between adjacent chain positions.
//
// Shared across mergeline-pipeline, mergeline-net, mergeline-node.

use serde::{Deserialize, Serialize};

// ── Routing Tag ──────────────────────────────────────────────────────────────

/// Wire-level tag carried by every token.
///
/// `ChannelA` / `ChannelB` name the receiving stage's input buffer the value
/// belongs to; `EndOfStream` marks exhaustion of the upstream stream and
/// carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoutingTag {
    ChannelA = 0,
    ChannelB = 1,
    EndOfStream = 2,
}

impl RoutingTag {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::ChannelA),
            1 => Some(Self::ChannelB),
            2 => Some(Self::EndOfStream),
            _ => None,
        }
    }
}

// ── Buffer Side ──────────────────────────────────────────────────────────────

/// Which of a stage's two input buffers a value is routed to.
///
/// Upstream stamps every value with a side and toggles it once per output
/// run, producing the A-run/B-run interleaving the successor merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferSide {
    A,
    B,
}

impl BufferSide {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl From<BufferSide> for RoutingTag {
    fn from(side: BufferSide) -> Self {
        match side {
            BufferSide::A => RoutingTag::ChannelA,
            BufferSide::B => RoutingTag::ChannelB,
        }
    }
}

// ── Token ────────────────────────────────────────────────────────────────────

/// The unit exchanged between adjacent workers: a routed value, or the
/// end-of-stream sentinel. Tokens are moved by value through channels; there
/// is no shared ownership between stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token<T> {
    Value { side: BufferSide, value: T },
    EndOfStream,
}

impl<T> Token<T> {
    pub fn value(side: BufferSide, value: T) -> Self {
        Self::Value { side, value }
    }

    pub fn end_of_stream() -> Self {
        Self::EndOfStream
    }

    /// The wire tag for this token.
    pub fn tag(&self) -> RoutingTag {
        match self {
            Self::Value { side, .. } => (*side).into(),
            Self::EndOfStream => RoutingTag::EndOfStream,
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_tag_round_trip() {
        for v in 0..=2u8 {
            let tag = RoutingTag::from_u8(v).unwrap();
            assert_eq!(tag as u8, v);
        }
        assert!(RoutingTag::from_u8(3).is_none());
        assert!(RoutingTag::from_u8(255).is_none());
    }

    #[test]
    fn side_toggles() {
        assert_eq!(BufferSide::A.other(), BufferSide::B);
        assert_eq!(BufferSide::B.other(), BufferSide::A);
        assert_eq!(BufferSide::A.other().other(), BufferSide::A);
    }

    #[test]
    fn token_tags() {
        let t: Token<u8> = Token::value(BufferSide::A, 42);
        assert_eq!(t.tag(), RoutingTag::ChannelA);
        assert!(!t.is_end_of_stream());

        let t: Token<u8> = Token::value(BufferSide::B, 7);
        assert_eq!(t.tag(), RoutingTag::ChannelB);

        let end: Token<u8> = Token::end_of_stream();
        assert_eq!(end.tag(), RoutingTag::EndOfStream);
        assert!(end.is_end_of_stream());
    }

    #[test]
    fn token_serde() {
        let t: Token<u8> = Token::value(BufferSide::B, 200);
        let json = serde_json::to_string(&t).unwrap();
        let round: Token<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(round, t);

        let end: Token<u8> = Token::end_of_stream();
        let json = serde_json::to_string(&end).unwrap();
        let round: Token<u8> = serde_json::from_str(&json).unwrap();
        assert_eq!(round, end);
    }
}
