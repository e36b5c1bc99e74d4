//! Board-agnostic core logic for the clock mirror firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Wall-clock time math (BCD conversion, seconds-since-midnight,
//!   display formatting)
//! - Capability match table and attachment slot state machine
//! - Control endpoint wire types

#![no_std]
#![deny(unsafe_code)]

pub mod control;
pub mod registry;
pub mod time;
