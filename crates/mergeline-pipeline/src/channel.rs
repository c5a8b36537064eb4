//! Transport contract between adjacent chain positions.
//!
//! A channel is one-directional, FIFO and exactly-once: tokens arrive in
//! send order, never duplicated. Both ends block — `send` once the receiver
//! lags by the channel capacity (the chain's only backpressure mechanism),
//! `recv` until a token is available. One channel serves exactly one
//! adjacent pair; there is no broadcast or multiplexing.
//!
//! The in-process implementation lives here; `mergeline-net` provides the
//! TCP binding for multi-process deployment.

use async_trait::async_trait;
use tokio::sync::mpsc;

use mergeline_types::Token;

use crate::error::{PipelineError, Result};

// ── Contract ─────────────────────────────────────────────────────────────────

/// Sending half of the link to the successor position.
#[async_trait]
pub trait TokenTx<T: Send + 'static>: Send {
    async fn send(&mut self, token: Token<T>) -> Result<()>;
}

/// Receiving half of the link from the predecessor position.
#[async_trait]
pub trait TokenRx<T: Send + 'static>: Send {
    async fn recv(&mut self) -> Result<Token<T>>;
}

// ── In-process channel ───────────────────────────────────────────────────────

pub struct LocalTx<T>(mpsc::Sender<Token<T>>);

pub struct LocalRx<T>(mpsc::Receiver<Token<T>>);

/// A bounded in-process channel for one adjacent pair.
pub fn local_channel<T: Send + 'static>(capacity: usize) -> (LocalTx<T>, LocalRx<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (LocalTx(tx), LocalRx(rx))
}

#[async_trait]
impl<T: Send + 'static> TokenTx<T> for LocalTx<T> {
    async fn send(&mut self, token: Token<T>) -> Result<()> {
        self.0
            .send(token)
            .await
            .map_err(|_| PipelineError::ChannelClosed)
    }
}

#[async_trait]
impl<T: Send + 'static> TokenRx<T> for LocalRx<T> {
    async fn recv(&mut self) -> Result<Token<T>> {
        self.0.recv().await.ok_or(PipelineError::ChannelClosed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mergeline_types::BufferSide;

    #[tokio::test]
    async fn tokens_arrive_in_send_order() {
        let (mut tx, mut rx) = local_channel::<u8>(4);

        tx.send(Token::value(BufferSide::A, 5)).await.unwrap();
        tx.send(Token::value(BufferSide::B, 3)).await.unwrap();
        tx.send(Token::end_of_stream()).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), Token::value(BufferSide::A, 5));
        assert_eq!(rx.recv().await.unwrap(), Token::value(BufferSide::B, 3));
        assert!(rx.recv().await.unwrap().is_end_of_stream());
    }

    #[tokio::test]
    async fn recv_after_sender_drop_is_closed() {
        let (tx, mut rx) = local_channel::<u8>(1);
        drop(tx);

        let err = rx.recv().await.unwrap_err();
        assert!(matches!(err, PipelineError::ChannelClosed));
    }

    #[tokio::test]
    async fn send_to_dropped_receiver_is_closed() {
        let (mut tx, rx) = local_channel::<u8>(1);
        drop(rx);

        let err = tx.send(Token::end_of_stream()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ChannelClosed));
    }
}
