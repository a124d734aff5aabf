//! Subscriber callbacks for unsolicited events.
//!
//! The dispatcher routes every unsolicited message to one of two event
//! categories: GAP (connection lifecycle and signal strength) and GATT-server
//! (attribute writes). Each category has a single callback slot, registered
//! once during initialization and never cleared.

use std::sync::OnceLock;

use crate::types::{Address, AttributeWrite};

/// Connection-lifecycle events delivered to the GAP subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapEvent {
    /// A central connected.
    Connected {
        /// Handle of the new connection.
        conn_handle: u16,
        /// Peer device address.
        peer: Address,
    },
    /// The connection was torn down.
    Disconnected {
        /// Handle of the lost connection.
        conn_handle: u16,
        /// Disconnect reason code.
        reason: u8,
    },
    /// Advertising stopped because its timeout elapsed.
    AdvertisingTimedOut,
    /// A connection attempt timed out.
    ConnectionTimedOut,
    /// Periodic signal-strength report.
    SignalStrength {
        /// Connection the report belongs to.
        conn_handle: u16,
        /// Received signal strength in dBm.
        rssi: i8,
    },
}

/// Attribute events delivered to the GATT-server subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum GattsEvent {
    /// The peer wrote an attribute value.
    Write(AttributeWrite),
}

/// Callback for GAP events.
///
/// Invoked synchronously from the dispatcher's context. Handlers may submit
/// fire-and-forget requests but must not block.
pub type GapHandler = Box<dyn Fn(GapEvent) + Send + Sync>;

/// Callback for GATT-server events. Same context rules as [`GapHandler`].
pub type GattsHandler = Box<dyn Fn(GattsEvent) + Send + Sync>;

/// One callback slot per event category, set once at initialization.
#[derive(Default)]
pub(crate) struct EventRegistry {
    gap: OnceLock<GapHandler>,
    gatts: OnceLock<GattsHandler>,
}

impl EventRegistry {
    /// Stores both handlers. A second registration is ignored.
    pub fn register(&self, gap: GapHandler, gatts: GattsHandler) {
        if self.gap.set(gap).is_err() || self.gatts.set(gatts).is_err() {
            tracing::debug!("event handlers already registered, ignoring");
        }
    }

    /// Delivers a GAP event, dropping it if no handler is registered yet.
    pub fn notify_gap(&self, event: GapEvent) {
        if let Some(handler) = self.gap.get() {
            handler(event);
        } else {
            tracing::trace!(?event, "no GAP subscriber, dropping event");
        }
    }

    /// Delivers a GATT-server event, dropping it if no handler is registered
    /// yet.
    pub fn notify_gatts(&self, event: GattsEvent) {
        if let Some(handler) = self.gatts.get() {
            handler(event);
        } else {
            tracing::trace!(?event, "no GATT subscriber, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_registered_handler_receives_events() {
        let registry = EventRegistry::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        registry.register(
            Box::new(move |event| sink.lock().unwrap().push(event)),
            Box::new(|_| {}),
        );

        registry.notify_gap(GapEvent::AdvertisingTimedOut);
        registry.notify_gap(GapEvent::Disconnected {
            conn_handle: 3,
            reason: 0x13,
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], GapEvent::AdvertisingTimedOut);
    }

    #[test]
    fn test_events_without_handler_are_dropped() {
        let registry = EventRegistry::default();
        // Must not panic.
        registry.notify_gap(GapEvent::ConnectionTimedOut);
        registry.notify_gatts(GattsEvent::Write(AttributeWrite {
            conn_handle: 1,
            handle: 2,
            offset: 0,
            data: bytes::Bytes::from_static(b"x"),
        }));
    }

    #[test]
    fn test_second_registration_is_ignored() {
        let registry = EventRegistry::default();
        let first = Arc::new(Mutex::new(0u32));

        let sink = Arc::clone(&first);
        registry.register(
            Box::new(move |_| *sink.lock().unwrap() += 1),
            Box::new(|_| {}),
        );
        registry.register(Box::new(|_| panic!("second handler")), Box::new(|_| {}));

        registry.notify_gap(GapEvent::AdvertisingTimedOut);
        assert_eq!(*first.lock().unwrap(), 1);
    }
}
