//! Protocol definitions for the core-service message channel.
//!
//! This module contains the message vocabulary exchanged with the messaging
//! substrate:
//! - Outbound requests
//! - Inbound responses and events
//! - Response classification used for correlation

pub mod message;
pub mod request;

pub use message::{CORE_SERVICE_ID, Message, ResponseKind, TimeoutReason};
pub use request::Request;
