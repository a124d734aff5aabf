//! Inbound message definitions and classification.
//!
//! Every message delivered by the substrate is either a *response* to a
//! previously submitted request or an unsolicited *event*. The
//! [`Message::response_kind`] classification drives the dispatcher: response
//! kinds complete the pending request, event kinds are routed to subscriber
//! callbacks.

use bytes::Bytes;

use crate::error::RemoteStatus;
use crate::types::{Address, AttributeWrite, CharHandles};

/// Service id of the core BLE service this client talks to.
///
/// Only availability notifications carrying this id complete the
/// initialization wait.
pub const CORE_SERVICE_ID: u16 = 0x0010;

/// Reason embedded in a link-timeout event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutReason {
    /// Advertising stopped because its timeout elapsed.
    Advertising,
    /// A connection attempt timed out.
    Connection,
}

/// Classification of response messages.
///
/// One variant per response kind; used to match an inbound response against
/// the pending request's expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Core service became available.
    ServiceAvailable,
    /// Logical session opened.
    SessionOpened,
    /// Device configuration written.
    DeviceConfigured,
    /// Security parameters configured.
    SecurityConfigured,
    /// Local address read.
    AddressRead,
    /// Advertising payload written.
    AdvertisingDataSet,
    /// Service declaration added.
    ServiceAdded,
    /// Service include added.
    ServiceIncluded,
    /// Characteristic added.
    CharacteristicAdded,
    /// Descriptor added.
    DescriptorAdded,
    /// Attribute value stored.
    AttributeValueSet,
    /// Notification or indication handed to the link layer.
    NotificationSent,
    /// Disconnect request completed.
    DisconnectComplete,
    /// RSSI reporting toggled.
    RssiReportSet,
}

/// Inbound messages delivered by the messaging substrate.
#[derive(Debug, Clone)]
pub enum Message {
    // Responses
    /// A registered service became available.
    ServiceAvailable {
        /// Id of the service that came up.
        service_id: u16,
    },
    /// The logical session was opened.
    SessionOpened {
        /// Opaque session handle assigned by the substrate.
        session: u32,
    },
    /// Response to [`crate::protocol::Request::SetDeviceConfig`].
    DeviceConfigured { status: RemoteStatus },
    /// Response to [`crate::protocol::Request::ConfigureSecurity`].
    SecurityConfigured { status: RemoteStatus },
    /// Response to [`crate::protocol::Request::ReadAddress`].
    AddressRead {
        status: RemoteStatus,
        /// Local device address, meaningful only on success.
        address: Address,
    },
    /// Response to [`crate::protocol::Request::SetAdvertisingData`].
    AdvertisingDataSet { status: RemoteStatus },
    /// Response to [`crate::protocol::Request::StartAdvertising`].
    AdvertisingEnabled { status: RemoteStatus },
    /// Response to [`crate::protocol::Request::StopAdvertising`].
    AdvertisingDisabled { status: RemoteStatus },
    /// Response to [`crate::protocol::Request::AddService`].
    ServiceAdded {
        status: RemoteStatus,
        /// Assigned service handle, meaningful only on success.
        handle: u16,
    },
    /// Response to [`crate::protocol::Request::IncludeService`].
    ServiceIncluded { status: RemoteStatus },
    /// Response to [`crate::protocol::Request::AddCharacteristic`].
    CharacteristicAdded {
        status: RemoteStatus,
        /// Assigned handle set, meaningful only on success.
        handles: CharHandles,
    },
    /// Response to [`crate::protocol::Request::AddDescriptor`].
    DescriptorAdded {
        status: RemoteStatus,
        /// Assigned descriptor handle, meaningful only on success.
        handle: u16,
    },
    /// Response to [`crate::protocol::Request::SetAttributeValue`].
    AttributeValueSet { status: RemoteStatus },
    /// Response to [`crate::protocol::Request::Notify`], either flavor.
    NotificationSent { status: RemoteStatus },
    /// Response to [`crate::protocol::Request::Disconnect`].
    DisconnectComplete { status: RemoteStatus },
    /// Response to [`crate::protocol::Request::SetRssiReport`].
    RssiReportSet { status: RemoteStatus },

    // Events
    /// A central connected to us.
    ConnectionEstablished {
        /// Handle of the new connection.
        conn_handle: u16,
        /// Peer device address.
        peer: Address,
    },
    /// The connection was torn down.
    ConnectionLost {
        /// Handle of the lost connection.
        conn_handle: u16,
        /// Disconnect reason code.
        reason: u8,
    },
    /// Advertising or a connection attempt timed out.
    LinkTimeout {
        /// What timed out.
        reason: TimeoutReason,
    },
    /// Periodic signal-strength report.
    SignalStrength {
        /// Connection the report belongs to.
        conn_handle: u16,
        /// Received signal strength in dBm.
        rssi: i8,
    },
    /// The peer wrote an attribute value.
    AttributeWritten(AttributeWrite),

    /// A message kind this client does not understand.
    ///
    /// Dropped silently by the dispatcher; newer substrates may deliver
    /// kinds an older client has no use for.
    Unknown {
        /// Raw kind tag.
        kind: u32,
        /// Raw payload.
        payload: Bytes,
    },
}

impl Message {
    /// Returns the response classification, or `None` for events.
    ///
    /// Advertising enable/disable responses also return `None`: the requests
    /// that trigger them are fire-and-forget, so no caller ever waits on
    /// them.
    #[must_use]
    pub const fn response_kind(&self) -> Option<ResponseKind> {
        match self {
            Self::ServiceAvailable { .. } => Some(ResponseKind::ServiceAvailable),
            Self::SessionOpened { .. } => Some(ResponseKind::SessionOpened),
            Self::DeviceConfigured { .. } => Some(ResponseKind::DeviceConfigured),
            Self::SecurityConfigured { .. } => Some(ResponseKind::SecurityConfigured),
            Self::AddressRead { .. } => Some(ResponseKind::AddressRead),
            Self::AdvertisingDataSet { .. } => Some(ResponseKind::AdvertisingDataSet),
            Self::ServiceAdded { .. } => Some(ResponseKind::ServiceAdded),
            Self::ServiceIncluded { .. } => Some(ResponseKind::ServiceIncluded),
            Self::CharacteristicAdded { .. } => Some(ResponseKind::CharacteristicAdded),
            Self::DescriptorAdded { .. } => Some(ResponseKind::DescriptorAdded),
            Self::AttributeValueSet { .. } => Some(ResponseKind::AttributeValueSet),
            Self::NotificationSent { .. } => Some(ResponseKind::NotificationSent),
            Self::DisconnectComplete { .. } => Some(ResponseKind::DisconnectComplete),
            Self::RssiReportSet { .. } => Some(ResponseKind::RssiReportSet),
            Self::AdvertisingEnabled { .. }
            | Self::AdvertisingDisabled { .. }
            | Self::ConnectionEstablished { .. }
            | Self::ConnectionLost { .. }
            | Self::LinkTimeout { .. }
            | Self::SignalStrength { .. }
            | Self::AttributeWritten(_)
            | Self::Unknown { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_classification() {
        let msg = Message::SessionOpened { session: 1 };
        assert_eq!(msg.response_kind(), Some(ResponseKind::SessionOpened));

        let msg = Message::CharacteristicAdded {
            status: RemoteStatus::Success,
            handles: CharHandles::default(),
        };
        assert_eq!(msg.response_kind(), Some(ResponseKind::CharacteristicAdded));
    }

    #[test]
    fn test_events_are_not_responses() {
        let msg = Message::ConnectionEstablished {
            conn_handle: 1,
            peer: Address::default(),
        };
        assert_eq!(msg.response_kind(), None);

        let msg = Message::LinkTimeout {
            reason: TimeoutReason::Advertising,
        };
        assert_eq!(msg.response_kind(), None);
    }

    #[test]
    fn test_fire_and_forget_responses_have_no_waiter() {
        let msg = Message::AdvertisingEnabled {
            status: RemoteStatus::Success,
        };
        assert_eq!(msg.response_kind(), None);

        let msg = Message::AdvertisingDisabled {
            status: RemoteStatus::Success,
        };
        assert_eq!(msg.response_kind(), None);
    }

    #[test]
    fn test_service_availability_carries_id() {
        let msg = Message::ServiceAvailable {
            service_id: CORE_SERVICE_ID,
        };
        assert_eq!(msg.response_kind(), Some(ResponseKind::ServiceAvailable));
    }
}
