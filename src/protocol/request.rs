//! Outbound request definitions.
//!
//! Requests are handed to the messaging substrate, which either accepts them
//! for delivery or rejects them immediately. Wire encoding is the substrate's
//! concern; this layer only defines the request vocabulary.

use bytes::Bytes;

use crate::types::{
    AdvertisingParams, Characteristic, Descriptor, DeviceConfig, SecurityParams, ServiceKind,
    Uuid,
};

/// Outbound requests submitted to the messaging substrate.
#[derive(Debug, Clone)]
pub enum Request {
    /// Register for the service-availability notification.
    RegisterServiceNotify,
    /// Open the logical session with the core service.
    OpenSession,
    /// Write identity and preferred connection parameters.
    SetDeviceConfig(DeviceConfig),
    /// Configure security-manager parameters.
    ConfigureSecurity(SecurityParams),
    /// Read the local device address.
    ReadAddress,
    /// Write the advertising payload.
    SetAdvertisingData {
        /// Raw advertising data.
        data: Bytes,
    },
    /// Start advertising. No response is awaited.
    StartAdvertising(AdvertisingParams),
    /// Stop advertising. No response is awaited.
    StopAdvertising,
    /// Add a service declaration.
    AddService {
        /// Service UUID.
        uuid: Uuid,
        /// Primary or secondary.
        kind: ServiceKind,
    },
    /// Include one service inside another.
    IncludeService {
        /// Handle of the including service.
        parent: u16,
        /// Handle of the included service.
        child: u16,
    },
    /// Add a characteristic to a service.
    AddCharacteristic {
        /// Handle of the owning service.
        service: u16,
        /// Characteristic declaration.
        characteristic: Characteristic,
    },
    /// Add a descriptor to the current characteristic context.
    AddDescriptor {
        /// Descriptor declaration.
        descriptor: Descriptor,
    },
    /// Set or overwrite a stored attribute value.
    SetAttributeValue {
        /// Attribute handle.
        handle: u16,
        /// Write offset in bytes.
        offset: u16,
        /// New value.
        value: Bytes,
    },
    /// Send a notification or indication for an attribute value.
    Notify {
        /// Active connection handle.
        conn_handle: u16,
        /// Value attribute handle.
        handle: u16,
        /// Value offset in bytes.
        offset: u16,
        /// Value bytes.
        value: Bytes,
        /// True for an indication, false for a notification.
        indication: bool,
    },
    /// Tear down the active connection.
    Disconnect {
        /// Active connection handle.
        conn_handle: u16,
        /// Disconnect reason code.
        reason: u8,
    },
    /// Enable or disable periodic signal-strength reporting.
    SetRssiReport {
        /// Active connection handle.
        conn_handle: u16,
        /// True to enable reporting.
        enable: bool,
    },
}

impl Request {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RegisterServiceNotify => "register_service_notify",
            Self::OpenSession => "open_session",
            Self::SetDeviceConfig(_) => "set_device_config",
            Self::ConfigureSecurity(_) => "configure_security",
            Self::ReadAddress => "read_address",
            Self::SetAdvertisingData { .. } => "set_advertising_data",
            Self::StartAdvertising(_) => "start_advertising",
            Self::StopAdvertising => "stop_advertising",
            Self::AddService { .. } => "add_service",
            Self::IncludeService { .. } => "include_service",
            Self::AddCharacteristic { .. } => "add_characteristic",
            Self::AddDescriptor { .. } => "add_descriptor",
            Self::SetAttributeValue { .. } => "set_attribute_value",
            Self::Notify { .. } => "notify",
            Self::Disconnect { .. } => "disconnect",
            Self::SetRssiReport { .. } => "set_rssi_report",
        }
    }
}
