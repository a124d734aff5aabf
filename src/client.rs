//! Main [`BleCore`] client implementation.
//!
//! [`BleCore`] bridges the substrate's asynchronous message channel to a
//! synchronous calling convention: each operation submits a request, awaits
//! the matching response up to a fixed deadline, and returns the harvested
//! result. Unsolicited events flow to the callbacks registered at
//! [`BleCore::init`] without disturbing in-flight correlation.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::dispatch::{Completion, Dispatcher, PendingSlot, ResponsePayload};
use crate::error::{Error, Result};
use crate::event::{EventRegistry, GapEvent, GattsEvent};
use crate::protocol::{Message, Request, ResponseKind};
use crate::session::{Session, SessionState};
use crate::substrate::Substrate;
use crate::types::{
    Address, AdvertisingParams, CharHandles, Characteristic, Descriptor, DeviceConfig,
    SecurityParams, ServiceKind, Uuid,
};

/// Default deadline for a blocking call.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Pause between the availability notification and opening the session.
/// The core service needs a moment after announcing itself.
const SETTLE_DELAY: Duration = Duration::from_millis(1);

/// Client for a BLE peripheral controller behind a messaging substrate.
///
/// One instance owns the full correlation state; multiple independent
/// instances may coexist, each with its own substrate.
pub struct BleCore<S> {
    substrate: Arc<S>,
    inbound: Option<mpsc::Receiver<Message>>,
    pending: Arc<PendingSlot>,
    session: Arc<SessionState>,
    registry: Arc<EventRegistry>,
    /// Serializes blocking calls across the whole arm-submit-harvest span.
    call_lock: Mutex<()>,
    timeout: Duration,
    dispatch_task: Option<JoinHandle<()>>,
}

impl<S: Substrate> BleCore<S> {
    /// Creates a new client over the given substrate.
    ///
    /// `inbound` is the channel the substrate delivers responses and events
    /// on. Nothing is read from it until [`BleCore::init`] starts the
    /// dispatch loop.
    #[must_use]
    pub fn new(substrate: S, inbound: mpsc::Receiver<Message>) -> Self {
        Self {
            substrate: Arc::new(substrate),
            inbound: Some(inbound),
            pending: Arc::new(PendingSlot::default()),
            session: Arc::new(SessionState::default()),
            registry: Arc::new(EventRegistry::default()),
            call_lock: Mutex::new(()),
            timeout: RESPONSE_TIMEOUT,
            dispatch_task: None,
        }
    }

    /// Initializes the client and registers the event subscribers.
    ///
    /// This will:
    /// 1. Start the dispatch loop
    /// 2. Register for the core-service availability notification and await it
    /// 3. Open the logical session
    /// 4. Store the subscriber callbacks
    ///
    /// Only after both waits succeed is the client ready for further calls.
    ///
    /// # Errors
    ///
    /// Returns an error if either handshake step fails or times out; no
    /// session is opened in that case.
    pub async fn init<G, W>(&mut self, gap_handler: G, gatts_handler: W) -> Result<()>
    where
        G: Fn(GapEvent) + Send + Sync + 'static,
        W: Fn(GattsEvent) + Send + Sync + 'static,
    {
        self.start_dispatch();

        self.call(
            Request::RegisterServiceNotify,
            &[ResponseKind::ServiceAvailable],
        )
        .await?;

        // The service announces itself slightly before it accepts opens.
        tokio::time::sleep(SETTLE_DELAY).await;

        let completion = self
            .call(Request::OpenSession, &[ResponseKind::SessionOpened])
            .await?;
        let ResponsePayload::Session(session_handle) = completion.payload else {
            return Err(Error::Protocol {
                message: "session open response carried no handle".into(),
            });
        };
        self.session.on_open(session_handle);

        self.registry
            .register(Box::new(gap_handler), Box::new(gatts_handler));

        tracing::debug!(session_handle, "session open, client ready");
        Ok(())
    }

    /// Spawns the dispatch loop if it is not already running.
    fn start_dispatch(&mut self) {
        let Some(mut inbound) = self.inbound.take() else {
            return;
        };
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.pending),
            Arc::clone(&self.session),
            Arc::clone(&self.registry),
        );
        self.dispatch_task = Some(tokio::spawn(async move {
            while let Some(message) = inbound.recv().await {
                dispatcher.handle(message);
            }
            tracing::debug!("inbound channel closed, dispatch loop exiting");
        }));
    }

    /// Sets the blocking-call deadline.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Returns a snapshot of the session state.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    /// Returns true while a central is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.connection().is_some()
    }

    /// Returns a cloneable handle for the fire-and-forget advertising
    /// operations, usable from inside event callbacks.
    #[must_use]
    pub fn advertiser(&self) -> AdvertisingHandle<S> {
        AdvertisingHandle {
            substrate: Arc::clone(&self.substrate),
        }
    }

    /// Submits a request and awaits a response of one of the expected kinds.
    async fn call(
        &self,
        request: Request,
        expect: &'static [ResponseKind],
    ) -> Result<Completion> {
        // One blocking call at a time; a second concurrent caller waits here
        // rather than corrupting the correlation slot.
        let _serialized = self.call_lock.lock().await;

        let response = self.pending.arm(expect);
        tracing::trace!(request = request.name(), "submitting");
        if let Err(refused) = self.substrate.submit(request) {
            self.pending.disarm();
            return Err(Error::Submit(refused));
        }

        match tokio::time::timeout(self.timeout, response).await {
            Ok(Ok(completion)) => {
                if completion.status.is_success() {
                    Ok(completion)
                } else {
                    Err(Error::Remote(completion.status))
                }
            }
            Ok(Err(_)) => Err(Error::Closed),
            Err(_) => {
                // Late responses find a disarmed slot and are dropped.
                self.pending.disarm();
                Err(Error::Timeout {
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    }

    /// [`Self::call`] for operations whose response carries only a status.
    async fn call_unit(&self, request: Request, expect: &'static [ResponseKind]) -> Result<()> {
        self.call(request, expect).await.map(|_| ())
    }

    /// Returns the active connection handle or fails with `WrongState`.
    fn require_connected(&self) -> Result<u16> {
        self.session.connection().ok_or(Error::WrongState)
    }

    // ==================== GAP Operations ====================

    /// Writes the device identity and preferred connection parameters, then
    /// configures security/bonding as a follow-on step.
    pub async fn set_device_config(
        &self,
        name: &str,
        appearance: u16,
        tx_power: i8,
    ) -> Result<()> {
        let config = DeviceConfig::new(name, appearance, tx_power);
        self.call_unit(
            Request::SetDeviceConfig(config),
            &[ResponseKind::DeviceConfigured],
        )
        .await?;

        self.call_unit(
            Request::ConfigureSecurity(SecurityParams::default()),
            &[ResponseKind::SecurityConfigured],
        )
        .await
    }

    /// Reads the local device address.
    pub async fn read_address(&self) -> Result<Address> {
        let completion = self
            .call(Request::ReadAddress, &[ResponseKind::AddressRead])
            .await?;
        match completion.payload {
            ResponsePayload::Address(address) => Ok(address),
            _ => Err(Error::Protocol {
                message: "address response carried no address".into(),
            }),
        }
    }

    /// Writes the advertising payload.
    pub async fn set_advertising_data(&self, data: &[u8]) -> Result<()> {
        self.call_unit(
            Request::SetAdvertisingData {
                data: Bytes::copy_from_slice(data),
            },
            &[ResponseKind::AdvertisingDataSet],
        )
        .await
    }

    /// Starts fast connectable advertising with the given timeout.
    ///
    /// Fire and forget: the submission outcome is the whole result, no
    /// response is awaited. This keeps the call safe from inside an event
    /// callback, e.g. restarting advertising in the disconnect handler.
    pub fn start_advertising(&self, timeout_secs: u16) -> Result<()> {
        self.substrate
            .submit(Request::StartAdvertising(AdvertisingParams::with_timeout(
                timeout_secs,
            )))?;
        Ok(())
    }

    /// Stops advertising. Fire and forget, like [`Self::start_advertising`].
    pub fn stop_advertising(&self) -> Result<()> {
        self.substrate.submit(Request::StopAdvertising)?;
        Ok(())
    }

    // ==================== GATT Server Operations ====================

    /// Adds a service declaration and returns its handle.
    pub async fn add_service(&self, uuid: Uuid, kind: ServiceKind) -> Result<u16> {
        let completion = self
            .call(
                Request::AddService { uuid, kind },
                &[ResponseKind::ServiceAdded],
            )
            .await?;
        match completion.payload {
            ResponsePayload::Handle(handle) => Ok(handle),
            _ => Err(Error::Protocol {
                message: "service response carried no handle".into(),
            }),
        }
    }

    /// Includes one service inside another.
    pub async fn include_service(&self, parent: u16, child: u16) -> Result<()> {
        self.call_unit(
            Request::IncludeService { parent, child },
            &[ResponseKind::ServiceIncluded],
        )
        .await
    }

    /// Adds a characteristic to a service and returns its handle set.
    pub async fn add_characteristic(
        &self,
        service: u16,
        characteristic: Characteristic,
    ) -> Result<CharHandles> {
        let completion = self
            .call(
                Request::AddCharacteristic {
                    service,
                    characteristic,
                },
                &[ResponseKind::CharacteristicAdded],
            )
            .await?;
        match completion.payload {
            ResponsePayload::CharHandles(handles) => Ok(handles),
            _ => Err(Error::Protocol {
                message: "characteristic response carried no handles".into(),
            }),
        }
    }

    /// Adds a descriptor to the current characteristic context and returns
    /// its handle.
    pub async fn add_descriptor(&self, descriptor: Descriptor) -> Result<u16> {
        let completion = self
            .call(
                Request::AddDescriptor { descriptor },
                &[ResponseKind::DescriptorAdded],
            )
            .await?;
        match completion.payload {
            ResponsePayload::Handle(handle) => Ok(handle),
            _ => Err(Error::Protocol {
                message: "descriptor response carried no handle".into(),
            }),
        }
    }

    /// Sets or overwrites a stored attribute value.
    pub async fn set_attribute_value(
        &self,
        handle: u16,
        value: &[u8],
        offset: u16,
    ) -> Result<()> {
        self.call_unit(
            Request::SetAttributeValue {
                handle,
                offset,
                value: Bytes::copy_from_slice(value),
            },
            &[ResponseKind::AttributeValueSet],
        )
        .await
    }

    /// Sends a notification or indication for an attribute value.
    ///
    /// Requires an active connection.
    pub async fn notify(
        &self,
        handle: u16,
        value: &[u8],
        offset: u16,
        indication: bool,
    ) -> Result<()> {
        let conn_handle = self.require_connected()?;
        self.call_unit(
            Request::Notify {
                conn_handle,
                handle,
                offset,
                value: Bytes::copy_from_slice(value),
                indication,
            },
            &[ResponseKind::NotificationSent],
        )
        .await
    }

    /// Tears down the active connection.
    ///
    /// Requires an active connection.
    pub async fn disconnect(&self, reason: u8) -> Result<()> {
        let conn_handle = self.require_connected()?;
        self.call_unit(
            Request::Disconnect {
                conn_handle,
                reason,
            },
            &[ResponseKind::DisconnectComplete],
        )
        .await
    }

    /// Enables or disables periodic signal-strength reporting.
    ///
    /// Requires an active connection.
    pub async fn set_rssi_report(&self, enable: bool) -> Result<()> {
        let conn_handle = self.require_connected()?;
        self.call_unit(
            Request::SetRssiReport {
                conn_handle,
                enable,
            },
            &[ResponseKind::RssiReportSet],
        )
        .await
    }
}

impl<S> Drop for BleCore<S> {
    fn drop(&mut self) {
        if let Some(task) = self.dispatch_task.take() {
            task.abort();
        }
    }
}

/// Cloneable handle for the fire-and-forget advertising operations.
///
/// Event callbacks run in the dispatcher's context and cannot borrow the
/// client; this handle carries only the substrate reference they need.
pub struct AdvertisingHandle<S> {
    substrate: Arc<S>,
}

impl<S> Clone for AdvertisingHandle<S> {
    fn clone(&self) -> Self {
        Self {
            substrate: Arc::clone(&self.substrate),
        }
    }
}

impl<S: Substrate> AdvertisingHandle<S> {
    /// Starts fast connectable advertising with the given timeout.
    pub fn start(&self, timeout_secs: u16) -> Result<()> {
        self.start_with(AdvertisingParams::with_timeout(timeout_secs))
    }

    /// Starts advertising with explicit parameters.
    pub fn start_with(&self, params: AdvertisingParams) -> Result<()> {
        self.substrate.submit(Request::StartAdvertising(params))?;
        Ok(())
    }

    /// Stops advertising.
    pub fn stop(&self) -> Result<()> {
        self.substrate.submit(Request::StopAdvertising)?;
        Ok(())
    }
}
