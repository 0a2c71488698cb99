//! Errors raised while turning caller input into encodable values.

use thiserror::Error;

/// Errors that can occur while validating or encoding a feedback authorization.
///
/// Every variant names the offending field so callers can report exactly
/// which input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
	/// A required field was never supplied.
	#[error("Missing required field: {0}")]
	MissingField(&'static str),
	/// A negative number was supplied for an unsigned field.
	#[error("Field '{field}' must not be negative: {value}")]
	NegativeInteger { field: &'static str, value: String },
	/// The value does not fit in the field's integer width.
	#[error("Field '{field}' does not fit in {bits} bits: {value}")]
	IntegerOverflow {
		field: &'static str,
		bits: usize,
		value: String,
	},
	/// The value is not a decimal or 0x-prefixed hex integer.
	#[error("Field '{field}' is not a valid integer: {message}")]
	InvalidInteger {
		field: &'static str,
		message: String,
	},
	/// The value is not a 20-byte hex address.
	#[error("Field '{field}' is not a valid address: {message}")]
	InvalidAddress {
		field: &'static str,
		message: String,
	},
	/// The input as a whole has the wrong shape.
	#[error("Invalid authorization input: {0}")]
	InvalidInput(String),
	/// The EIP-712 domain description is unusable.
	#[error("Invalid EIP-712 domain: {0}")]
	InvalidDomain(String),
	/// A `feedbackAuth` payload could not be decoded.
	#[error("Invalid feedbackAuth payload: {0}")]
	InvalidPayload(String),
}
