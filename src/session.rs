//! Session and connection state tracking.
//!
//! The dispatcher is the only writer of the connection fields; the
//! blocking-call protocol reads them to reject operations that require an
//! active connection. Plain atomics give the cross-context visibility the
//! poll-free wait design relies on.

use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

/// Snapshot of the session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    /// True once the logical session with the core service is open.
    pub opened: bool,
    /// Opaque session handle assigned when the session was opened.
    pub session_handle: u32,
    /// True while a central is connected.
    pub connected: bool,
    /// Handle of the active connection, meaningful only while connected.
    pub conn_handle: u16,
}

/// Shared mutable session state.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    opened: AtomicBool,
    session_handle: AtomicU32,
    connected: AtomicBool,
    conn_handle: AtomicU16,
}

impl SessionState {
    /// Records the opened session handle.
    pub fn on_open(&self, session_handle: u32) {
        self.session_handle.store(session_handle, Ordering::SeqCst);
        self.opened.store(true, Ordering::SeqCst);
    }

    /// Records a new connection.
    pub fn on_connect(&self, conn_handle: u16) {
        // Handle first so a reader that observes connected also sees it.
        self.conn_handle.store(conn_handle, Ordering::SeqCst);
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Records the loss of the connection.
    pub fn on_disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Returns the active connection handle, or `None` while disconnected.
    pub fn connection(&self) -> Option<u16> {
        if self.connected.load(Ordering::SeqCst) {
            Some(self.conn_handle.load(Ordering::SeqCst))
        } else {
            None
        }
    }

    /// Returns a consistent-enough snapshot for diagnostics.
    pub fn snapshot(&self) -> Session {
        Session {
            opened: self.opened.load(Ordering::SeqCst),
            session_handle: self.session_handle.load(Ordering::SeqCst),
            connected: self.connected.load(Ordering::SeqCst),
            conn_handle: self.conn_handle.load(Ordering::SeqCst),
        }
    }
}
