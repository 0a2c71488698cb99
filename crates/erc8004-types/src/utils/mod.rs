//! Utility functions for common conversions and EIP-712 encoding.
//!
//! This module provides helpers for hex prefix handling, strict parsing of
//! addresses and unsigned integers, and the word-level encoder used to build
//! EIP-712 struct and domain hashes.

pub mod conversion;
pub mod eip712;
pub mod formatting;

pub use conversion::{narrow_u64, parse_address, parse_u256};
pub use eip712::{
	compute_domain_hash, compute_final_digest, Eip712AbiEncoder, DOMAIN_TYPE, FEEDBACK_AUTH_TYPE,
};
pub use formatting::{with_0x_prefix, without_0x_prefix};
