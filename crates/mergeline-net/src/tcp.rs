//! TCP neighbor links for multi-process chains.
//!
//! Worker p listens for its predecessor and dials its successor; each link
//! is one TCP stream used in one direction, carrying the two-byte frames
//! from [`crate::wire`]. Dialing retries while the successor process is
//! still starting up.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

use mergeline_pipeline::{PipelineError, Result, TokenRx, TokenTx};
use mergeline_types::Token;

use crate::wire::{decode_token, encode_token, TOKEN_WIRE_BYTES};

const CONNECT_ATTEMPTS: u32 = 40;
const CONNECT_BACKOFF: Duration = Duration::from_millis(250);

// ── Sending half ─────────────────────────────────────────────────────────────

/// Link to the successor position.
pub struct TcpTokenTx {
    stream: TcpStream,
}

#[async_trait]
impl TokenTx<u8> for TcpTokenTx {
    async fn send(&mut self, token: Token<u8>) -> Result<()> {
        self.stream
            .write_all(&encode_token(token))
            .await
            .map_err(map_io)
    }
}

/// Dial the successor at `addr`, retrying while its listener comes up.
pub async fn connect_downstream(addr: SocketAddr) -> Result<TcpTokenTx> {
    let mut last_err: Option<io::Error> = None;

    for attempt in 0..CONNECT_ATTEMPTS {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                stream.set_nodelay(true).map_err(map_io)?;
                info!(%addr, "connected to successor");
                return Ok(TcpTokenTx { stream });
            }
            Err(e) => {
                debug!(%addr, attempt, error = %e, "successor not up yet");
                last_err = Some(e);
                tokio::time::sleep(CONNECT_BACKOFF).await;
            }
        }
    }

    Err(PipelineError::Transport(format!(
        "could not reach successor at {addr}: {}",
        last_err.map(|e| e.to_string()).unwrap_or_default(),
    )))
}

// ── Receiving half ───────────────────────────────────────────────────────────

/// Link from the predecessor position.
pub struct TcpTokenRx {
    stream: TcpStream,
}

#[async_trait]
impl TokenRx<u8> for TcpTokenRx {
    async fn recv(&mut self) -> Result<Token<u8>> {
        let mut frame = [0u8; TOKEN_WIRE_BYTES];
        self.stream.read_exact(&mut frame).await.map_err(map_io)?;
        Ok(decode_token(frame)?)
    }
}

/// A bound listener waiting for the predecessor to dial in.
pub struct UpstreamListener {
    listener: TcpListener,
}

impl UpstreamListener {
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(map_io)
    }

    /// Accept exactly one predecessor connection.
    pub async fn accept(self) -> Result<TcpTokenRx> {
        let (stream, peer) = self.listener.accept().await.map_err(map_io)?;
        stream.set_nodelay(true).map_err(map_io)?;
        info!(%peer, "predecessor connected");
        Ok(TcpTokenRx { stream })
    }
}

/// Bind the listening side of the link from the predecessor.
pub async fn bind_upstream(addr: SocketAddr) -> Result<UpstreamListener> {
    let listener = TcpListener::bind(addr).await.map_err(map_io)?;
    debug!(%addr, "listening for predecessor");
    Ok(UpstreamListener { listener })
}

/// A peer hanging up before the sentinel is a fatal transport failure, not
/// a shutdown path.
fn map_io(e: io::Error) -> PipelineError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        PipelineError::ChannelClosed
    } else {
        PipelineError::Transport(e.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mergeline_types::BufferSide;

    async fn loopback_pair() -> (TcpTokenTx, TcpTokenRx) {
        let listener = bind_upstream("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = tokio::spawn(listener.accept());
        let tx = connect_downstream(addr).await.unwrap();
        let rx = accept.await.unwrap().unwrap();
        (tx, rx)
    }

    #[tokio::test]
    async fn tokens_round_trip_in_order() {
        let (mut tx, mut rx) = loopback_pair().await;

        tx.send(Token::value(BufferSide::A, 5)).await.unwrap();
        tx.send(Token::value(BufferSide::B, 3)).await.unwrap();
        tx.send(Token::end_of_stream()).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), Token::value(BufferSide::A, 5));
        assert_eq!(rx.recv().await.unwrap(), Token::value(BufferSide::B, 3));
        assert!(rx.recv().await.unwrap().is_end_of_stream());
    }

    #[tokio::test]
    async fn unknown_tag_is_protocol_violation() {
        let listener = bind_upstream("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = tokio::spawn(listener.accept());
        let mut raw = TcpStream::connect(addr).await.unwrap();
        let mut rx = accept.await.unwrap().unwrap();

        raw.write_all(&[9, 0]).await.unwrap();

        let err = rx.recv().await.unwrap_err();
        assert!(matches!(err, PipelineError::Protocol(_)));
    }

    #[tokio::test]
    async fn peer_hangup_is_channel_closed() {
        let (tx, mut rx) = loopback_pair().await;
        drop(tx);

        let err = rx.recv().await.unwrap_err();
        assert!(matches!(err, PipelineError::ChannelClosed));
    }
}
