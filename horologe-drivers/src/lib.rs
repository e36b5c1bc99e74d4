//! Peripheral protocol drivers
//!
//! This crate implements the byte-level register/command protocols of
//! the two device classes the coordinator manages:
//!
//! - RTC time source (DS1307-class, BCD register block)
//! - Paged OLED character display (SSD1306-class, command/data protocol)
//!
//! Drivers are generic over [`horologe_hal::Bus`] and borrow the bus
//! for the duration of one operation; ownership of the bus stays with
//! the coordinator.

#![no_std]
#![deny(unsafe_code)]

pub mod oled;
pub mod rtc;

#[cfg(test)]
pub(crate) mod testutil;
