//! Peripheral coordinator
//!
//! Owns the shared state: the bus, the handle to each peripheral, the
//! worker arming state and the last polled time. Everything lives
//! behind one mutex, so lifecycle transitions, worker iterations and
//! control queries are serialized against each other; a detach can
//! only proceed once an in-flight worker iteration has released the
//! lock.
//!
//! Attach/detach events arrive in arbitrary relative order. The worker
//! is armed exactly when both handles are present and disarmed (with a
//! stop/acknowledge handshake) before either handle is invalidated.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use horologe_core::control::{ControlError, ControlRequest, ControlResponse};
use horologe_core::registry::Capability;
use horologe_drivers::oled::{OledError, Ssd1306};
use horologe_hal::Bus;

/// One attached peripheral
///
/// The live transaction channel is the coordinator-owned bus; a handle
/// only carries the routing information. Handles are created on attach
/// and invalidated atomically with detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeripheralHandle {
    /// 7-bit bus address
    pub address: u8,
    /// Capability the device was matched as
    pub capability: Capability,
}

/// Identity of one armed worker run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WorkerHandle {
    /// Monotonic counter distinguishing worker runs across re-attach
    /// cycles
    pub generation: u32,
}

/// Shared coordinator state
///
/// Only ever touched under the coordinator's mutex. The worker is the
/// sole writer of `last_time_seconds`; the control endpoint only reads
/// it.
#[derive(Debug, Default)]
pub struct CoordinatorState {
    /// Display handle, present while the display is attached
    pub display: Option<PeripheralHandle>,
    /// Clock handle, present while the clock is attached
    pub clock: Option<PeripheralHandle>,
    /// Present exactly while the worker is armed
    pub worker: Option<WorkerHandle>,
    /// Seconds since midnight from the most recent successful poll
    /// (0 before any)
    pub last_time_seconds: i32,
    /// Control endpoint registration, coupled to the clock slot
    control_registered: bool,
    /// Next worker generation to hand out
    next_generation: u32,
}

/// Errors from an attach attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttachError {
    /// Display hardware bring-up failed; no handle was published
    DisplayInit(OledError),
}

struct Inner<B> {
    bus: B,
    state: CoordinatorState,
}

/// The coordinator
///
/// Create one per bus, hand `&Coordinator` to the registry, the
/// worker task and any control callers.
pub struct Coordinator<B> {
    inner: Mutex<CriticalSectionRawMutex, Inner<B>>,
    /// Arms the worker with the generation to run
    start: Signal<CriticalSectionRawMutex, u32>,
    /// Requests cooperative worker cancellation
    stop: Signal<CriticalSectionRawMutex, ()>,
    /// Worker's acknowledgement that it observed the stop
    stopped: Signal<CriticalSectionRawMutex, ()>,
}

impl<B> Coordinator<B>
where
    B: Bus,
{
    /// Create a coordinator owning the given bus
    pub fn new(bus: B) -> Self {
        Self {
            inner: Mutex::new(Inner {
                bus,
                state: CoordinatorState::default(),
            }),
            start: Signal::new(),
            stop: Signal::new(),
            stopped: Signal::new(),
        }
    }

    /// Attach a classified peripheral at the given address
    ///
    /// Display attach performs hardware bring-up (init + blank) before
    /// the handle becomes visible; clock attach registers the control
    /// endpoint. Attaching an already-attached capability is a no-op.
    /// Once both handles are present the worker is armed.
    pub async fn attach(&self, capability: Capability, address: u8) -> Result<(), AttachError> {
        let mut inner = self.inner.lock().await;
        let Inner { bus, state } = &mut *inner;

        match capability {
            Capability::Display => {
                if state.display.is_some() {
                    return Ok(());
                }
                let mut oled = Ssd1306::new(bus, address);
                oled.init().map_err(AttachError::DisplayInit)?;
                oled.blank().map_err(AttachError::DisplayInit)?;
                state.display = Some(PeripheralHandle {
                    address,
                    capability,
                });
                info!("display attached at {=u8:#x}", address);
            }
            Capability::Clock => {
                if state.clock.is_some() {
                    return Ok(());
                }
                state.clock = Some(PeripheralHandle {
                    address,
                    capability,
                });
                state.control_registered = true;
                info!("clock attached at {=u8:#x}, control endpoint up", address);
            }
        }

        if state.display.is_some() && state.clock.is_some() && state.worker.is_none() {
            let generation = state.next_generation;
            state.next_generation += 1;
            state.worker = Some(WorkerHandle { generation });
            self.start.signal(generation);
            info!("both peripherals present, arming worker {=u32}", generation);
        }
        Ok(())
    }

    /// Detach a peripheral
    ///
    /// Stops and joins the worker before the handle is cleared, and
    /// for the clock deregisters the control endpoint before clearing.
    /// Detaching an unattached capability is a no-op.
    pub async fn detach(&self, capability: Capability) {
        // Disarm the worker first. Taking the lock here also waits out
        // any in-flight worker iteration still using the handle.
        let worker = {
            let mut inner = self.inner.lock().await;
            let present = match capability {
                Capability::Display => inner.state.display.is_some(),
                Capability::Clock => inner.state.clock.is_some(),
            };
            if !present {
                return;
            }
            inner.state.worker.take()
        };
        if let Some(worker) = worker {
            info!("stopping worker {=u32}", worker.generation);
            self.stop.signal(());
            self.stopped.wait().await;
        }

        let mut inner = self.inner.lock().await;
        let Inner { bus, state } = &mut *inner;
        match capability {
            Capability::Display => {
                if let Some(handle) = state.display.take() {
                    // Best-effort blanking on the way out
                    if let Err(e) = Ssd1306::new(bus, handle.address).blank() {
                        warn!("blank on detach failed: {}", e);
                    }
                    info!("display detached");
                }
            }
            Capability::Clock => {
                // Endpoint goes down strictly before the handle
                state.control_registered = false;
                state.clock = None;
                info!("clock detached, control endpoint down");
            }
        }
    }

    /// Serve one control request
    ///
    /// Fails with [`ControlError::NotRegistered`] whenever the clock
    /// peripheral is not attached.
    pub async fn control_request(
        &self,
        request: ControlRequest,
    ) -> Result<ControlResponse, ControlError> {
        let inner = self.inner.lock().await;
        if !inner.state.control_registered {
            return Err(ControlError::NotRegistered);
        }
        match request {
            ControlRequest::GetTime => Ok(ControlResponse::Time(inner.state.last_time_seconds)),
        }
    }

    /// Whether a handle for the capability is currently published
    pub async fn is_attached(&self, capability: Capability) -> bool {
        let inner = self.inner.lock().await;
        match capability {
            Capability::Display => inner.state.display.is_some(),
            Capability::Clock => inner.state.clock.is_some(),
        }
    }

    /// Generation of the currently armed worker, if any
    pub async fn worker_generation(&self) -> Option<u32> {
        self.inner.lock().await.state.worker.map(|w| w.generation)
    }

    pub(crate) async fn wait_start(&self) -> u32 {
        self.start.wait().await
    }

    pub(crate) fn take_stop(&self) -> bool {
        self.stop.try_take().is_some()
    }

    pub(crate) fn ack_stopped(&self) {
        self.stopped.signal(());
    }

    pub(crate) async fn with_inner<R>(
        &self,
        f: impl FnOnce(&mut B, &mut CoordinatorState) -> R,
    ) -> R {
        let mut inner = self.inner.lock().await;
        let Inner { bus, state } = &mut *inner;
        f(bus, state)
    }
}
