//! Background polling worker
//!
//! One persistent task, not a pool. While armed, it polls the clock,
//! mirrors the time onto the display and publishes the seconds value
//! for the control endpoint, then sleeps. Cancellation is cooperative:
//! the stop request is observed at the loop top only, never
//! mid-transaction, so a stop can take up to one poll interval plus
//! one in-flight transaction to be honored.

use embassy_time::{Duration, Timer};

use horologe_drivers::oled::{OledError, Ssd1306};
use horologe_drivers::rtc::{Ds1307, RtcError};
use horologe_hal::Bus;

use crate::coordinator::Coordinator;

/// Worker tuning
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    /// Sleep between successful polls
    pub poll_interval: Duration,
    /// Sleep after a failed poll or a missing handle
    pub backoff_interval: Duration,
    /// Display page the time is rendered to
    pub page: u8,
    /// Start column; 40 centers the 48-pixel string on a 128-pixel row
    pub column: u8,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            backoff_interval: Duration::from_secs(1),
            page: 4,
            column: 40,
        }
    }
}

/// Errors from one poll iteration, all non-fatal to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollError {
    /// A handle was absent mid-run
    MissingPeripheral,
    /// Clock read failed
    Clock(RtcError),
    /// Display write failed
    Display(OledError),
}

/// Worker task body
///
/// Runs forever; the coordinator arms it via the start signal when
/// both peripherals are present and disarms it with the stop/stopped
/// handshake before invalidating a handle. No poll error terminates
/// the worker - only a stop request does.
pub async fn run<B>(coordinator: &Coordinator<B>, config: WorkerConfig) -> !
where
    B: Bus,
{
    loop {
        let generation = coordinator.wait_start().await;
        info!("worker {=u32} started", generation);

        loop {
            // Sole cancellation point: loop top, which is also
            // immediately after every sleep below.
            if coordinator.take_stop() {
                coordinator.ack_stopped();
                info!("worker {=u32} stopped", generation);
                break;
            }

            match poll_once(coordinator, &config).await {
                Ok(seconds) => {
                    trace!("polled {=i32} seconds since midnight", seconds);
                    Timer::after(config.poll_interval).await;
                }
                Err(PollError::MissingPeripheral) => {
                    // Cannot happen while armed unless lifecycle logic
                    // regresses; back off rather than die
                    warn!("handle absent mid-run");
                    Timer::after(config.backoff_interval).await;
                }
                Err(e) => {
                    warn!("poll failed: {}", e);
                    Timer::after(config.backoff_interval).await;
                }
            }
        }
    }
}

/// One poll iteration: read, publish, render
///
/// Holds the coordinator lock for the whole iteration so detach
/// cannot invalidate a handle under our feet, and releases it before
/// the caller sleeps.
async fn poll_once<B>(coordinator: &Coordinator<B>, config: &WorkerConfig) -> Result<i32, PollError>
where
    B: Bus,
{
    coordinator
        .with_inner(|bus, state| {
            let clock = state.clock.ok_or(PollError::MissingPeripheral)?;
            let display = state.display.ok_or(PollError::MissingPeripheral)?;

            let snapshot = Ds1307::new(bus, clock.address)
                .read_time()
                .map_err(PollError::Clock)?;
            let seconds = snapshot.seconds_since_midnight();
            state.last_time_seconds = seconds;

            let text = snapshot.format();
            let mut oled = Ssd1306::new(bus, display.address);
            oled.clear_page(config.page).map_err(PollError::Display)?;
            oled.render_string(config.page, config.column, &text)
                .map_err(PollError::Display)?;
            Ok(seconds)
        })
        .await
}
