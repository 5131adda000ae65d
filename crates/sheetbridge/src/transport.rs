//! Outbound message transport.
//!
//! The host platform owns the actual delivery (e.g. a `postMessage` bridge).
//! The bridge only needs to hand it serialized envelopes.

use sheetbridge_protocol::Envelope;
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{Error, Result};

/// Delivers envelopes to the context named in `envelope.context`.
pub trait Transport: Send + Sync {
    fn post(&self, envelope: &Envelope) -> Result<()>;
}

/// Transport writing JSON frames into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    /// Create a transport and the receiving end of its frames
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn post(&self, envelope: &Envelope) -> Result<()> {
        let frame = envelope.to_json()?;
        trace!(context = %envelope.context, %frame, "posting frame");
        self.tx
            .send(frame)
            .map_err(|_| Error::Transport("frame receiver dropped".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetbridge_protocol::Payload;

    #[tokio::test]
    async fn test_channel_transport_serializes_frames() {
        let (transport, mut rx) = ChannelTransport::new();
        let envelope = Envelope::to_sandbox("exec".into(), Payload::OnSaved);
        transport.post(&envelope).unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(Envelope::from_json(&frame).unwrap(), envelope);
    }

    #[tokio::test]
    async fn test_post_after_receiver_dropped() {
        let (transport, rx) = ChannelTransport::new();
        drop(rx);
        let envelope = Envelope::to_sandbox("exec".into(), Payload::OnSaved);
        assert!(matches!(transport.post(&envelope), Err(Error::Transport(_))));
    }
}
