//! Peripheral lifecycle coordination for the clock mirror
//!
//! Two independently-discovered peripherals share one bus: a clock/time
//! source and a character display. This crate owns their attach/detach
//! lifecycle, runs the background worker that mirrors the clock onto
//! the display while both are present, and serves time queries through
//! the control endpoint.
//!
//! Everything here is generic over [`horologe_hal::Bus`], so the same
//! code runs against a chip HAL on target and a scripted bus in host
//! tests.

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod coordinator;
pub mod registry;
pub mod worker;

pub use coordinator::{AttachError, Coordinator, CoordinatorState, PeripheralHandle, WorkerHandle};
pub use registry::{DiscoveryEvent, Registry, RegistryError};
pub use worker::{PollError, WorkerConfig};
