//! Common types for the ERC-8004 feedback authorization workspace.
//!
//! This crate defines the authorization record and its validating builder,
//! the EIP-712 domain description, the signature conventions shared with the
//! registry contracts, and the transport payload handed to the contract layer.

/// Feedback authorization record and its validating builder.
pub mod authorization;
/// EIP-712 domain description for feedback authorizations.
pub mod domain;
/// Encoding errors raised while validating or encoding inputs.
pub mod error;
/// Secure string type for private keys.
pub mod secret_string;
/// Signature conventions and the `feedbackAuth` transport payload.
pub mod signature;
/// Utility functions for hex formatting and EIP-712 word encoding.
pub mod utils;

pub use alloy_primitives::{Address, B256, U256};
pub use authorization::*;
pub use domain::*;
pub use error::EncodingError;
pub use secret_string::SecretString;
pub use signature::*;
pub use utils::{parse_address, with_0x_prefix, without_0x_prefix};
