//! Decoding of heart-rate measurement payloads.
//!
//! Layout: one flag byte, then the BPM value. Bit 0 of the flags selects a
//! little-endian `u16` value; otherwise the value is a single `u8`. Trailing
//! fields (energy expended, RR intervals) are ignored.

use super::error::HeartRateError;

/// Flag bit selecting the 16-bit BPM format.
pub const FLAG_VALUE_FORMAT_U16: u8 = 0x01;

/// Decodes the BPM value from a measurement payload.
pub fn decode_measurement(payload: &[u8]) -> Result<u16, HeartRateError> {
    let (&flags, rest) = payload.split_first().ok_or(HeartRateError::EmptyPayload)?;

    if flags & FLAG_VALUE_FORMAT_U16 != 0 {
        match rest {
            [lo, hi, ..] => Ok(u16::from_le_bytes([*lo, *hi])),
            _ => Err(HeartRateError::Truncated {
                expected: 3,
                actual: payload.len(),
            }),
        }
    } else {
        match rest {
            [value, ..] => Ok(u16::from(*value)),
            [] => Err(HeartRateError::Truncated {
                expected: 2,
                actual: payload.len(),
            }),
        }
    }
}
