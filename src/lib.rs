//! # blecore
//!
//! A Rust client library for BLE peripheral controllers that live behind an
//! asynchronous messaging substrate.
//!
//! The substrate accepts outbound requests with an immediate accept/reject
//! and later delivers responses and unsolicited events on a message channel.
//! `blecore` turns that into a synchronous calling convention: each operation
//! awaits its response up to a fixed deadline, while connection events,
//! attribute writes and signal-strength reports are demultiplexed to
//! registered callbacks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use blecore::{BleCore, ChannelSubstrate, GapEvent, ServiceKind, Uuid};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), blecore::Error> {
//!     // Wire the client to whatever drives the actual controller.
//!     let (substrate, _driver_rx) = ChannelSubstrate::new();
//!     let (_msg_tx, inbound) = tokio::sync::mpsc::channel(64);
//!
//!     let mut client = BleCore::new(substrate, inbound);
//!     let advertiser = client.advertiser();
//!     client
//!         .init(
//!             move |event| {
//!                 if matches!(event, GapEvent::Disconnected { .. }) {
//!                     let _ = advertiser.start(180);
//!                 }
//!             },
//!             |_write| {},
//!         )
//!         .await?;
//!
//!     client.set_device_config("thermometer", 0x0300, 0).await?;
//!     let service = client.add_service(Uuid::from_u16(0x1809), ServiceKind::Primary).await?;
//!     println!("health thermometer service at handle {service:#06x}");
//!
//!     client.start_advertising(180)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Request and message vocabulary with response classification
//! - [`types`] - GAP and GATT data structures
//! - [`substrate`] - The messaging substrate seam and a channel-backed implementation
//! - [`event`] - Subscriber callbacks for unsolicited events
//! - [`session`] - Connection state tracking
//! - [`client`] - High-level [`BleCore`] client

pub mod client;
pub mod error;
pub mod event;
pub mod protocol;
pub mod session;
pub mod substrate;
pub mod types;

mod dispatch;

// Re-exports for convenience
pub use client::{AdvertisingHandle, BleCore, RESPONSE_TIMEOUT};
pub use error::{Error, RemoteStatus, Result};
pub use event::{GapEvent, GapHandler, GattsEvent, GattsHandler};
pub use protocol::{CORE_SERVICE_ID, Message, Request, ResponseKind, TimeoutReason};
pub use session::Session;
pub use substrate::{ChannelSubstrate, SubmitError, Substrate};
pub use types::{
    Address, AddressKind, AdvertisingParams, AdvertisingType, AttributeWrite, CharHandles,
    Characteristic, CharacteristicProps, ConnectionParams, Descriptor, DeviceConfig,
    FilterPolicy, IoCapability, SecurityParams, ServiceKind, Uuid,
};
