//! Control endpoint wire types
//!
//! The control interface is a minimal request/response surface with a
//! single query: the last known time in seconds since midnight. On the
//! wire it is a one-byte request code in and a 4-byte little-endian
//! signed integer out.

/// Request code for the time query
///
/// Code assignments 1 and 2 belonged to peer device controls and are
/// reserved; the read slot is 3.
pub const REQUEST_GET_TIME: u8 = 0x03;

/// Size of an encoded response in bytes
pub const RESPONSE_LEN: usize = 4;

/// Errors from the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// Request code outside the known set
    UnknownRequest(u8),
    /// The endpoint is not registered (clock peripheral absent)
    NotRegistered,
    /// Response buffer malformed or truncated
    InvalidResponse,
}

/// A control request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlRequest {
    /// Query the last known time, in seconds since midnight
    GetTime,
}

impl ControlRequest {
    /// Wire code for this request
    pub fn code(&self) -> u8 {
        match self {
            ControlRequest::GetTime => REQUEST_GET_TIME,
        }
    }

    /// Parse a request from its wire code
    pub fn from_code(code: u8) -> Result<Self, ControlError> {
        match code {
            REQUEST_GET_TIME => Ok(ControlRequest::GetTime),
            other => Err(ControlError::UnknownRequest(other)),
        }
    }
}

/// A control response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlResponse {
    /// Seconds since midnight, 0..=86399 (0 before any successful poll)
    Time(i32),
}

impl ControlResponse {
    /// Encode the response payload as 4 little-endian bytes
    pub fn encode(&self) -> [u8; RESPONSE_LEN] {
        match self {
            ControlResponse::Time(seconds) => seconds.to_le_bytes(),
        }
    }

    /// Decode a time response payload
    pub fn decode(bytes: &[u8]) -> Result<Self, ControlError> {
        let payload: [u8; RESPONSE_LEN] = bytes
            .try_into()
            .map_err(|_| ControlError::InvalidResponse)?;
        Ok(ControlResponse::Time(i32::from_le_bytes(payload)))
    }
}
