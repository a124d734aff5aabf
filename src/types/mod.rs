//! Data types for GAP and GATT entities.
//!
//! This module contains the core data structures used throughout the library:
//! - Device addresses and connection/advertising parameters
//! - Security configuration
//! - Services, characteristics, descriptors and attribute writes

pub mod gap;
pub mod gatt;

pub use gap::{
    ADDRESS_LEN, Address, AddressKind, AdvertisingParams, AdvertisingType, ConnectionParams,
    DeviceConfig, FilterPolicy, IoCapability, SecurityParams,
};
pub use gatt::{
    AttributeWrite, CharHandles, Characteristic, CharacteristicProps, Descriptor, ServiceKind,
    Uuid,
};
