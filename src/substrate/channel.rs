//! In-process substrate backed by tokio channels.
//!
//! Requests submitted here land on an unbounded channel read by whatever
//! driver task speaks the actual wire protocol. Tests use it to play the
//! remote peer.

use tokio::sync::mpsc;

use crate::protocol::Request;
use crate::substrate::{SubmitError, Substrate};

/// Substrate endpoint that forwards requests to a channel.
#[derive(Debug, Clone)]
pub struct ChannelSubstrate {
    tx: mpsc::UnboundedSender<Request>,
}

impl ChannelSubstrate {
    /// Creates a substrate endpoint and the receiver its driver reads
    /// submitted requests from.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Request>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Substrate for ChannelSubstrate {
    fn submit(&self, request: Request) -> Result<(), SubmitError> {
        tracing::trace!(request = request.name(), "forwarding to driver");
        self.tx.send(request).map_err(|_| SubmitError::Closed)
    }
}
