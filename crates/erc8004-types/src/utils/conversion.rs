//! Strict conversions from caller-supplied text into on-chain value types.
//!
//! Nothing here coerces: a value either parses exactly or the caller gets an
//! [`EncodingError`] naming the field.

use super::formatting::without_0x_prefix;
use crate::EncodingError;
use alloy_primitives::{hex, Address, U256};

/// Parses a 20-byte address from hex text.
///
/// Accepts exactly 40 hex digits with an optional "0x"/"0X" prefix. Letter
/// case is ignored, so both checksummed and all-lowercase forms are accepted.
pub fn parse_address(field: &'static str, value: &str) -> Result<Address, EncodingError> {
	let body = without_0x_prefix(value);
	if body.len() != 40 {
		return Err(EncodingError::InvalidAddress {
			field,
			message: format!("expected 40 hex digits, got {}", body.len()),
		});
	}

	let mut bytes = [0u8; 20];
	hex::decode_to_slice(body, &mut bytes).map_err(|e| EncodingError::InvalidAddress {
		field,
		message: e.to_string(),
	})?;
	Ok(Address::from(bytes))
}

/// Parses an unsigned 256-bit integer from decimal or 0x-prefixed hex text.
pub fn parse_u256(field: &'static str, value: &str) -> Result<U256, EncodingError> {
	let (digits, radix) = split_radix(field, value)?;
	U256::from_str_radix(digits, radix).map_err(|_| EncodingError::IntegerOverflow {
		field,
		bits: 256,
		value: value.to_string(),
	})
}

/// Narrows a 256-bit value to a `uint64` field.
pub fn narrow_u64(field: &'static str, value: U256) -> Result<u64, EncodingError> {
	u64::try_from(value).map_err(|_| EncodingError::IntegerOverflow {
		field,
		bits: 64,
		value: value.to_string(),
	})
}

/// Checks the digit alphabet up front so that the only failure left for the
/// radix conversion is overflow.
fn split_radix<'a>(field: &'static str, value: &'a str) -> Result<(&'a str, u64), EncodingError> {
	if value.starts_with('-') {
		return Err(EncodingError::NegativeInteger {
			field,
			value: value.to_string(),
		});
	}

	let hex_body = without_0x_prefix(value);
	let (digits, radix, valid) = if hex_body.len() != value.len() {
		(hex_body, 16, hex_body.chars().all(|c| c.is_ascii_hexdigit()))
	} else {
		(value, 10, value.chars().all(|c| c.is_ascii_digit()))
	};

	if digits.is_empty() || !valid {
		return Err(EncodingError::InvalidInteger {
			field,
			message: format!("'{}' is not a decimal or 0x-prefixed hex number", value),
		});
	}
	Ok((digits, radix))
}
