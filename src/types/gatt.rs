//! GATT-server data structures: UUIDs, services, characteristics,
//! descriptors and attribute writes.

use bytes::Bytes;

/// A 16-bit or 128-bit attribute UUID.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uuid {
    /// Bluetooth SIG assigned 16-bit UUID.
    Uuid16(u16),
    /// Vendor-specific 128-bit UUID.
    Uuid128([u8; 16]),
}

impl Uuid {
    /// Creates a 16-bit UUID.
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        Self::Uuid16(value)
    }

    /// Creates a 128-bit UUID from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self::Uuid128(bytes)
    }
}

impl std::fmt::Debug for Uuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Uuid({self})")
    }
}

impl std::fmt::Display for Uuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uuid16(value) => write!(f, "0x{value:04x}"),
            Self::Uuid128(bytes) => write!(f, "{}", hex::encode(bytes)),
        }
    }
}

/// Service declaration type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServiceKind {
    /// Primary service.
    #[default]
    Primary,
    /// Secondary service, referenced via includes.
    Secondary,
}

/// Characteristic property flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacteristicProps(u8);

impl CharacteristicProps {
    /// No properties set.
    pub const NONE: Self = Self(0);

    /// Value may be broadcast.
    pub const BROADCAST: Self = Self(1 << 0);

    /// Value may be read.
    pub const READ: Self = Self(1 << 1);

    /// Value may be written without response.
    pub const WRITE_WITHOUT_RESPONSE: Self = Self(1 << 2);

    /// Value may be written.
    pub const WRITE: Self = Self(1 << 3);

    /// Value may be notified.
    pub const NOTIFY: Self = Self(1 << 4);

    /// Value may be indicated.
    pub const INDICATE: Self = Self(1 << 5);

    /// Creates flags from a raw byte.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    /// Returns the raw byte value.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Combines two property sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if a property is set.
    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }
}

/// A characteristic declaration added to a service.
#[derive(Debug, Clone)]
pub struct Characteristic {
    /// Characteristic UUID.
    pub uuid: Uuid,
    /// Property flags.
    pub props: CharacteristicProps,
    /// Maximum value length in bytes.
    pub max_len: u16,
    /// Initial value, may be empty.
    pub initial_value: Bytes,
}

impl Characteristic {
    /// Creates a characteristic with an empty initial value.
    #[must_use]
    pub fn new(uuid: Uuid, props: CharacteristicProps, max_len: u16) -> Self {
        Self {
            uuid,
            props,
            max_len,
            initial_value: Bytes::new(),
        }
    }

    /// Sets the initial value.
    #[must_use]
    pub fn with_initial_value(mut self, value: impl Into<Bytes>) -> Self {
        self.initial_value = value.into();
        self
    }
}

/// A descriptor declaration added to the current characteristic context.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Descriptor UUID.
    pub uuid: Uuid,
    /// Descriptor value.
    pub value: Bytes,
}

impl Descriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(uuid: Uuid, value: impl Into<Bytes>) -> Self {
        Self {
            uuid,
            value: value.into(),
        }
    }
}

/// Handle set assigned by the stack when a characteristic is added.
///
/// A handle of 0 means the corresponding attribute was not created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharHandles {
    /// Value attribute handle.
    pub value: u16,
    /// User description descriptor handle.
    pub user_desc: u16,
    /// Client characteristic configuration descriptor handle.
    pub cccd: u16,
    /// Server characteristic configuration descriptor handle.
    pub sccd: u16,
}

/// Payload of an attribute write performed by the peer.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeWrite {
    /// Connection the write arrived on.
    pub conn_handle: u16,
    /// Attribute handle that was written.
    pub handle: u16,
    /// Write offset in bytes.
    pub offset: u16,
    /// Written data.
    pub data: Bytes,
}
