//! GAP-level data structures: device addresses, connection and advertising
//! parameters, security configuration.

/// Length of a device address in bytes.
pub const ADDRESS_LEN: usize = 6;

/// Connection interval units are 1.25 ms.
const INTERVAL_UNIT_US: u32 = 1250;

/// Supervision timeout units are 10 ms.
const SUPERVISION_UNIT_US: u32 = 10_000;

/// Advertising interval for fast discovery, in 0.625 ms units.
pub const ADV_INTERVAL_FAST: u16 = 32;

/// Default advertising timeout in seconds.
pub const ADV_TIMEOUT_SECS: u16 = 180;

/// Device address type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Fixed public device address.
    #[default]
    Public,
    /// Static random device address.
    Random,
}

/// A 6-byte device address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address {
    kind: AddressKind,
    octets: [u8; ADDRESS_LEN],
}

impl Address {
    /// Creates an address from its kind and octets.
    #[must_use]
    pub const fn new(kind: AddressKind, octets: [u8; ADDRESS_LEN]) -> Self {
        Self { kind, octets }
    }

    /// Returns the address type.
    #[must_use]
    pub const fn kind(&self) -> AddressKind {
        self.kind
    }

    /// Returns the raw octets.
    #[must_use]
    pub const fn octets(&self) -> &[u8; ADDRESS_LEN] {
        &self.octets
    }

    /// Returns the address as a contiguous hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.octets)
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({self}, {:?})", self.kind)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for octet in self.octets {
            if !first {
                write!(f, ":")?;
            }
            write!(f, "{octet:02x}")?;
            first = false;
        }
        Ok(())
    }
}

/// Preferred connection parameters, in controller units.
///
/// Intervals are in 1.25 ms units, the supervision timeout in 10 ms units.
/// Use [`ConnectionParams::from_millis`] to build from milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Minimum connection interval.
    pub interval_min: u16,
    /// Maximum connection interval.
    pub interval_max: u16,
    /// Number of connection events the peripheral may skip.
    pub slave_latency: u16,
    /// Link supervision timeout.
    pub supervision_timeout: u16,
}

impl ConnectionParams {
    /// Builds connection parameters from millisecond values.
    #[must_use]
    pub const fn from_millis(
        interval_min_ms: u32,
        interval_max_ms: u32,
        slave_latency: u16,
        supervision_timeout_ms: u32,
    ) -> Self {
        Self {
            interval_min: (interval_min_ms * 1000 / INTERVAL_UNIT_US) as u16,
            interval_max: (interval_max_ms * 1000 / INTERVAL_UNIT_US) as u16,
            slave_latency,
            supervision_timeout: (supervision_timeout_ms * 1000 / SUPERVISION_UNIT_US) as u16,
        }
    }
}

impl Default for ConnectionParams {
    /// 80-150 ms interval, no latency, 6 s supervision timeout.
    fn default() -> Self {
        Self::from_millis(80, 150, 0, 6000)
    }
}

/// Identity and preference configuration written to the controller.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Device name exposed over GAP.
    pub name: String,
    /// GAP appearance value.
    pub appearance: u16,
    /// Transmit power in dBm.
    pub tx_power: i8,
    /// Preferred parameters for the peripheral role.
    pub peripheral_params: ConnectionParams,
    /// Preferred parameters for the central role.
    pub central_params: ConnectionParams,
}

impl DeviceConfig {
    /// Creates a configuration with default connection parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, appearance: u16, tx_power: i8) -> Self {
        Self {
            name: name.into(),
            appearance,
            tx_power,
            peripheral_params: ConnectionParams::default(),
            central_params: ConnectionParams::default(),
        }
    }
}

/// I/O capabilities advertised during pairing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IoCapability {
    /// Display only.
    DisplayOnly,
    /// Display with yes/no input.
    DisplayYesNo,
    /// Keyboard only.
    KeyboardOnly,
    /// No input, no output.
    #[default]
    NoInputNoOutput,
    /// Keyboard and display.
    KeyboardDisplay,
}

/// Security-manager configuration applied after the device configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityParams {
    /// Whether bonding is requested.
    pub bonding: bool,
    /// I/O capabilities used for pairing.
    pub io_capability: IoCapability,
    /// Encryption key size in bytes.
    pub key_size: u8,
}

impl Default for SecurityParams {
    fn default() -> Self {
        Self {
            bonding: true,
            io_capability: IoCapability::NoInputNoOutput,
            key_size: 16,
        }
    }
}

/// Advertising type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdvertisingType {
    /// Connectable undirected advertising.
    #[default]
    ConnectableUndirected,
    /// Scannable undirected advertising.
    ScannableUndirected,
    /// Non-connectable undirected advertising.
    NonConnectableUndirected,
}

/// Advertising filter policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Allow scan and connect requests from any device.
    #[default]
    Any,
    /// Whitelist filters scan requests.
    WhitelistScan,
    /// Whitelist filters connect requests.
    WhitelistConnect,
    /// Whitelist filters both.
    WhitelistBoth,
}

/// Advertising parameters.
///
/// Intervals are in 0.625 ms units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvertisingParams {
    /// Advertising timeout in seconds (0 = no timeout).
    pub timeout_secs: u16,
    /// Minimum advertising interval.
    pub interval_min: u16,
    /// Maximum advertising interval.
    pub interval_max: u16,
    /// Advertising type.
    pub kind: AdvertisingType,
    /// Filter policy.
    pub filter_policy: FilterPolicy,
}

impl AdvertisingParams {
    /// Fast connectable advertising with the given timeout.
    #[must_use]
    pub const fn with_timeout(timeout_secs: u16) -> Self {
        Self {
            timeout_secs,
            interval_min: ADV_INTERVAL_FAST,
            interval_max: ADV_INTERVAL_FAST,
            kind: AdvertisingType::ConnectableUndirected,
            filter_policy: FilterPolicy::Any,
        }
    }
}

impl Default for AdvertisingParams {
    fn default() -> Self {
        Self::with_timeout(ADV_TIMEOUT_SECS)
    }
}
