//! Validation of user-typed account addresses.

use alloy_primitives::Address;
use thiserror::Error;

const PREFIX: &str = "0x";
const HEX_DIGITS: usize = 40;

/// Reason a typed address was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,

    #[error("address must have 40 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("address contains non-hexadecimal characters")]
    InvalidHex,
}

/// Validate a typed address.
///
/// Surrounding whitespace is ignored. The address must be `0x` followed by
/// exactly 40 hex digits; mixed-case checksum spelling is accepted but not
/// required.
pub fn validate(input: &str) -> Result<Address, AddressError> {
    let digits = input
        .trim()
        .strip_prefix(PREFIX)
        .ok_or(AddressError::MissingPrefix)?;

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidHex);
    }
    if digits.len() != HEX_DIGITS {
        return Err(AddressError::InvalidLength(digits.len()));
    }

    digits.parse().map_err(|_| AddressError::InvalidHex)
}
