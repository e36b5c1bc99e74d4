//! RTC time source drivers

mod ds1307;

pub use ds1307::{Ds1307, RtcError, DS1307_ADDR};
