//! Horologe Hardware Abstraction Layer
//!
//! This crate defines the bus abstraction trait implemented by
//! chip-specific HALs. It is the seam between the board-agnostic
//! coordinator/driver crates and whatever I2C peripheral a concrete
//! board provides.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (horologe-coordinator)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  horologe-drivers (RTC, OLED)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  horologe-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!        chip HAL (board-specific crate)
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod bus;

// Re-export key items at crate root for convenience
pub use bus::{Bus, BusConfig, TransactionError};
