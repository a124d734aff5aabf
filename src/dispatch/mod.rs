//! Inbound message dispatch and request/response correlation.
//!
//! The dispatcher is the single consumer of the inbound message channel.
//! Every message is classified exactly once: response kinds complete the
//! pending-request slot, event kinds update the session state and are routed
//! to the matching subscriber callback. The dispatcher never blocks and never
//! waits on the slot itself.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::error::RemoteStatus;
use crate::event::{EventRegistry, GapEvent, GattsEvent};
use crate::protocol::{CORE_SERVICE_ID, Message, ResponseKind, TimeoutReason};
use crate::session::SessionState;
use crate::types::{Address, CharHandles};

/// Payload carried by a completed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResponsePayload {
    /// Response carries no data beyond its status.
    None,
    /// Opaque session handle.
    Session(u32),
    /// Local device address.
    Address(Address),
    /// Single attribute handle.
    Handle(u16),
    /// Characteristic handle set.
    CharHandles(CharHandles),
}

/// What the dispatcher hands back to the waiting caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Completion {
    pub status: RemoteStatus,
    pub payload: ResponsePayload,
}

impl Completion {
    /// A successful completion carrying `payload`.
    pub const fn success(payload: ResponsePayload) -> Self {
        Self {
            status: RemoteStatus::Success,
            payload,
        }
    }

    /// A completion carrying only a status.
    pub const fn status_only(status: RemoteStatus) -> Self {
        Self {
            status,
            payload: ResponsePayload::None,
        }
    }
}

struct Armed {
    expect: &'static [ResponseKind],
    tx: oneshot::Sender<Completion>,
}

/// Correlation state for the single in-flight blocking request.
///
/// Armed immediately before submission with the set of response kinds that
/// may complete it; completed at most once by the dispatcher; disarmed by the
/// caller on timeout so a late response finds nothing to complete.
#[derive(Default)]
pub(crate) struct PendingSlot {
    inner: Mutex<Option<Armed>>,
}

impl PendingSlot {
    /// Arms the slot, returning the receiver the caller waits on.
    ///
    /// Any stale armed state is discarded; blocking calls are serialized by
    /// the caller, so stale state can only be a leftover from a timed-out
    /// call that raced its own disarm.
    pub fn arm(&self, expect: &'static [ResponseKind]) -> oneshot::Receiver<Completion> {
        let (tx, rx) = oneshot::channel();
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.replace(Armed { expect, tx }).is_some() {
            tracing::debug!("discarding stale pending request");
        }
        rx
    }

    /// Clears the slot without completing it.
    pub fn disarm(&self) {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// Completes the armed request if `kind` is one it expects.
    ///
    /// Responses that match no expectation are dropped: either nothing is
    /// armed (a late response after timeout, or a fire-and-forget echo) or
    /// the armed request is waiting for a different kind.
    pub fn complete(&self, kind: ResponseKind, completion: Completion) {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let matches = slot
            .as_ref()
            .is_some_and(|armed| armed.expect.contains(&kind));
        if !matches {
            tracing::trace!(?kind, "response with no matching waiter, dropping");
            return;
        }
        if let Some(armed) = slot.take() {
            if armed.tx.send(completion).is_err() {
                tracing::trace!(?kind, "waiter gave up before completion");
            }
        }
    }
}

/// Classifies inbound messages and routes them.
pub(crate) struct Dispatcher {
    pending: Arc<PendingSlot>,
    session: Arc<SessionState>,
    registry: Arc<EventRegistry>,
}

impl Dispatcher {
    pub fn new(
        pending: Arc<PendingSlot>,
        session: Arc<SessionState>,
        registry: Arc<EventRegistry>,
    ) -> Self {
        Self {
            pending,
            session,
            registry,
        }
    }

    /// Handles one inbound message, consuming it.
    ///
    /// Runs to completion before the next message is taken off the channel;
    /// subscriber callbacks are invoked synchronously from here.
    pub fn handle(&self, message: Message) {
        match message {
            // Responses: complete the pending request.
            Message::ServiceAvailable { service_id } => {
                if service_id == CORE_SERVICE_ID {
                    self.pending.complete(
                        ResponseKind::ServiceAvailable,
                        Completion::success(ResponsePayload::None),
                    );
                } else {
                    tracing::trace!(service_id, "availability of unrelated service");
                }
            }
            Message::SessionOpened { session } => {
                self.pending.complete(
                    ResponseKind::SessionOpened,
                    Completion::success(ResponsePayload::Session(session)),
                );
            }
            Message::DeviceConfigured { status } => {
                self.complete_status(ResponseKind::DeviceConfigured, status);
            }
            Message::SecurityConfigured { status } => {
                self.complete_status(ResponseKind::SecurityConfigured, status);
            }
            Message::AddressRead { status, address } => {
                self.pending.complete(
                    ResponseKind::AddressRead,
                    Completion {
                        status,
                        payload: ResponsePayload::Address(address),
                    },
                );
            }
            Message::AdvertisingDataSet { status } => {
                self.complete_status(ResponseKind::AdvertisingDataSet, status);
            }
            Message::AdvertisingEnabled { status } | Message::AdvertisingDisabled { status } => {
                // Advertising start/stop is fire-and-forget; nobody waits.
                tracing::trace!(%status, "advertising state response");
            }
            Message::ServiceAdded { status, handle } => {
                self.pending.complete(
                    ResponseKind::ServiceAdded,
                    Completion {
                        status,
                        payload: ResponsePayload::Handle(handle),
                    },
                );
            }
            Message::ServiceIncluded { status } => {
                self.complete_status(ResponseKind::ServiceIncluded, status);
            }
            Message::CharacteristicAdded { status, handles } => {
                self.pending.complete(
                    ResponseKind::CharacteristicAdded,
                    Completion {
                        status,
                        payload: ResponsePayload::CharHandles(handles),
                    },
                );
            }
            Message::DescriptorAdded { status, handle } => {
                self.pending.complete(
                    ResponseKind::DescriptorAdded,
                    Completion {
                        status,
                        payload: ResponsePayload::Handle(handle),
                    },
                );
            }
            Message::AttributeValueSet { status } => {
                self.complete_status(ResponseKind::AttributeValueSet, status);
            }
            Message::NotificationSent { status } => {
                self.complete_status(ResponseKind::NotificationSent, status);
            }
            Message::DisconnectComplete { status } => {
                self.complete_status(ResponseKind::DisconnectComplete, status);
            }
            Message::RssiReportSet { status } => {
                self.complete_status(ResponseKind::RssiReportSet, status);
            }

            // Events: update session state, then notify the subscriber.
            Message::ConnectionEstablished { conn_handle, peer } => {
                self.session.on_connect(conn_handle);
                self.registry
                    .notify_gap(GapEvent::Connected { conn_handle, peer });
            }
            Message::ConnectionLost {
                conn_handle,
                reason,
            } => {
                self.session.on_disconnect();
                self.registry.notify_gap(GapEvent::Disconnected {
                    conn_handle,
                    reason,
                });
            }
            Message::LinkTimeout { reason } => match reason {
                TimeoutReason::Advertising => {
                    self.registry.notify_gap(GapEvent::AdvertisingTimedOut);
                }
                TimeoutReason::Connection => {
                    self.session.on_disconnect();
                    self.registry.notify_gap(GapEvent::ConnectionTimedOut);
                }
            },
            Message::SignalStrength { conn_handle, rssi } => {
                self.registry
                    .notify_gap(GapEvent::SignalStrength { conn_handle, rssi });
            }
            Message::AttributeWritten(write) => {
                self.registry.notify_gatts(GattsEvent::Write(write));
            }

            Message::Unknown { kind, .. } => {
                tracing::trace!(kind, "dropping unknown message kind");
            }
        }
    }

    fn complete_status(&self, kind: ResponseKind, status: RemoteStatus) {
        self.pending.complete(kind, Completion::status_only(status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> (Dispatcher, Arc<PendingSlot>, Arc<SessionState>, Arc<EventRegistry>) {
        let pending = Arc::new(PendingSlot::default());
        let session = Arc::new(SessionState::default());
        let registry = Arc::new(EventRegistry::default());
        let dispatcher = Dispatcher::new(
            Arc::clone(&pending),
            Arc::clone(&session),
            Arc::clone(&registry),
        );
        (dispatcher, pending, session, registry)
    }

    #[test]
    fn test_matching_response_completes_slot() {
        let (dispatcher, pending, _, _) = dispatcher();
        let mut rx = pending.arm(&[ResponseKind::ServiceAdded]);

        dispatcher.handle(Message::ServiceAdded {
            status: RemoteStatus::Success,
            handle: 0x000C,
        });

        let completion = rx.try_recv().unwrap();
        assert_eq!(completion.status, RemoteStatus::Success);
        assert_eq!(completion.payload, ResponsePayload::Handle(0x000C));
    }

    #[test]
    fn test_mismatched_response_is_dropped() {
        let (dispatcher, pending, _, _) = dispatcher();
        let mut rx = pending.arm(&[ResponseKind::AddressRead]);

        // A stray response of a different kind must not complete the waiter.
        dispatcher.handle(Message::ServiceAdded {
            status: RemoteStatus::Success,
            handle: 0x0042,
        });
        assert!(rx.try_recv().is_err());

        // The slot is still armed for the right kind.
        dispatcher.handle(Message::AddressRead {
            status: RemoteStatus::Success,
            address: Address::default(),
        });
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_response_without_waiter_is_dropped() {
        let (dispatcher, _, _, _) = dispatcher();
        // Must not panic with nothing armed.
        dispatcher.handle(Message::NotificationSent {
            status: RemoteStatus::Success,
        });
    }

    #[test]
    fn test_disarm_blocks_late_completion() {
        let (dispatcher, pending, _, _) = dispatcher();
        let mut rx = pending.arm(&[ResponseKind::DescriptorAdded]);
        pending.disarm();

        dispatcher.handle(Message::DescriptorAdded {
            status: RemoteStatus::Success,
            handle: 0x0019,
        });
        // Sender was dropped on disarm, so the channel reports closed.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unrelated_service_availability_is_ignored() {
        let (dispatcher, pending, _, _) = dispatcher();
        let mut rx = pending.arm(&[ResponseKind::ServiceAvailable]);

        dispatcher.handle(Message::ServiceAvailable {
            service_id: CORE_SERVICE_ID + 1,
        });
        assert!(rx.try_recv().is_err());

        dispatcher.handle(Message::ServiceAvailable {
            service_id: CORE_SERVICE_ID,
        });
        let completion = rx.try_recv().unwrap();
        assert!(completion.status.is_success());
    }

    #[test]
    fn test_connect_event_updates_session_and_notifies() {
        let (dispatcher, _, session, registry) = dispatcher();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.register(
            Box::new(move |event| sink.lock().unwrap().push(event)),
            Box::new(|_| {}),
        );

        let peer = Address::default();
        dispatcher.handle(Message::ConnectionEstablished {
            conn_handle: 5,
            peer,
        });

        assert_eq!(session.connection(), Some(5));
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[GapEvent::Connected {
                conn_handle: 5,
                peer
            }]
        );
    }

    #[test]
    fn test_timeout_event_branches_on_reason() {
        let (dispatcher, _, session, registry) = dispatcher();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.register(
            Box::new(move |event| sink.lock().unwrap().push(event)),
            Box::new(|_| {}),
        );

        session.on_connect(9);

        // Advertising timeout fires its tag without touching the connection.
        dispatcher.handle(Message::LinkTimeout {
            reason: TimeoutReason::Advertising,
        });
        assert_eq!(session.connection(), Some(9));

        // Connection-attempt timeout clears it.
        dispatcher.handle(Message::LinkTimeout {
            reason: TimeoutReason::Connection,
        });
        assert_eq!(session.connection(), None);

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[GapEvent::AdvertisingTimedOut, GapEvent::ConnectionTimedOut]
        );
    }

    #[test]
    fn test_write_event_routed_to_gatts_subscriber() {
        let (dispatcher, _, _, registry) = dispatcher();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.register(
            Box::new(|_| {}),
            Box::new(move |event| sink.lock().unwrap().push(event)),
        );

        dispatcher.handle(Message::AttributeWritten(crate::types::AttributeWrite {
            conn_handle: 5,
            handle: 0x10,
            offset: 0,
            data: bytes::Bytes::from_static(b"\x01\x00"),
        }));

        let seen = seen.lock().unwrap();
        let GattsEvent::Write(write) = &seen[0];
        assert_eq!(write.handle, 0x10);
        assert_eq!(write.data.as_ref(), b"\x01\x00");
    }

    #[test]
    fn test_unknown_kind_is_dropped() {
        let (dispatcher, pending, _, _) = dispatcher();
        let mut rx = pending.arm(&[ResponseKind::AddressRead]);

        dispatcher.handle(Message::Unknown {
            kind: 0xDEAD,
            payload: bytes::Bytes::from_static(b"??"),
        });
        assert!(rx.try_recv().is_err());
    }
}
