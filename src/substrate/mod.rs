//! Messaging substrate abstraction.
//!
//! The substrate is the asynchronous service layer this client sits on top
//! of: it accepts outbound requests and later delivers inbound responses and
//! events on the message channel handed to [`crate::BleCore::new`].

pub mod channel;

use thiserror::Error;

use crate::protocol::Request;

/// Errors a substrate can report when refusing a request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The substrate's outbound queue is full.
    #[error("substrate queue is full")]
    QueueFull,
    /// The substrate is shut down.
    #[error("substrate is closed")]
    Closed,
}

/// Trait for messaging substrate implementations.
///
/// [`Substrate::submit`] must return immediately: the request is either
/// accepted for asynchronous delivery or rejected. Implementations must
/// tolerate calls from any thread, including the dispatcher's own context,
/// since fire-and-forget requests may be submitted from inside event
/// callbacks.
pub trait Substrate: Send + Sync {
    /// Hands a request to the substrate for delivery.
    fn submit(&self, request: Request) -> Result<(), SubmitError>;
}

pub use channel::ChannelSubstrate;
