// mergeline-net::wire — token frames between adjacent workers.
//
// Wire format: two bytes, [tag][value]. tag ∈ {0 = buffer A, 1 = buffer B,
// 2 = end-of-stream}; the end-of-stream frame carries no payload, its value
// byte is written as 0 and ignored on read.

use mergeline_pipeline::ProtocolViolation;
use mergeline_types::{BufferSide, RoutingTag, Token};

/// Size of one token frame on the wire.
pub const TOKEN_WIRE_BYTES: usize = 2;

/// Encode a token as a `[tag][value]` frame.
pub fn encode_token(token: Token<u8>) -> [u8; TOKEN_WIRE_BYTES] {
    match token {
        Token::Value { side, value } => [RoutingTag::from(side) as u8, value],
        Token::EndOfStream => [RoutingTag::EndOfStream as u8, 0],
    }
}

/// Decode a `[tag][value]` frame. An unrecognized tag is a protocol
/// violation, never silently skipped — it would corrupt the receiving
/// stage's window counters.
pub fn decode_token(frame: [u8; TOKEN_WIRE_BYTES]) -> Result<Token<u8>, ProtocolViolation> {
    match RoutingTag::from_u8(frame[0]) {
        Some(RoutingTag::ChannelA) => Ok(Token::value(BufferSide::A, frame[1])),
        Some(RoutingTag::ChannelB) => Ok(Token::value(BufferSide::B, frame[1])),
        Some(RoutingTag::EndOfStream) => Ok(Token::end_of_stream()),
        None => Err(ProtocolViolation::UnknownTag(frame[0])),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
