//! Signature conventions and the `feedbackAuth` transport payload.
//!
//! The payload is what the contract-interaction layer passes through to the
//! reputation registry: the ABI-encoded authorization and signer address,
//! followed by the 65-byte `r || s || v` signature. Which hash that
//! signature covers is selected by [`PayloadScheme`].

use crate::utils::{narrow_u64, with_0x_prefix};
use crate::{EncodingError, FeedbackAuthorization};
use alloy_primitives::{hex, keccak256, Address, B256, U256};
use alloy_sol_types::{sol, SolType};
use serde::{Deserialize, Serialize};

/// Length of a recoverable secp256k1 signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Length of the ABI-encoded struct that precedes the signature.
pub const PAYLOAD_STRUCT_LENGTH: usize = 7 * 32;

sol! {
	/// ABI layout of the struct prefix of `feedbackAuth`.
	struct FeedbackAuthEnvelope {
		uint256 agentId;
		address clientAddress;
		uint64 indexLimit;
		uint256 expiry;
		uint256 chainId;
		address identityRegistry;
		address signerAddress;
	}
}

/// Convention for the final `v` byte of a signature.
///
/// Verifiers built on `ecrecover` expect 27/28; some libraries expect the
/// raw y-parity bit. The choice must match the verifying contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryByte {
	/// v is 27 or 28.
	#[default]
	Legacy,
	/// v is 0 or 1.
	Parity,
}

impl RecoveryByte {
	fn offset(self) -> u8 {
		match self {
			Self::Legacy => 27,
			Self::Parity => 0,
		}
	}

	/// Maps a y-parity bit to the wire byte.
	pub fn encode(self, y_parity: bool) -> u8 {
		self.offset() + u8::from(y_parity)
	}

	/// Maps a wire byte back to the y-parity bit, if it belongs to this convention.
	pub fn decode(self, v: u8) -> Option<bool> {
		match v.checked_sub(self.offset()) {
			Some(0) => Some(false),
			Some(1) => Some(true),
			_ => None,
		}
	}
}

/// Hash covered by the signature embedded in a [`FeedbackAuthPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadScheme {
	/// EIP-191 personal message over `keccak256(struct bytes)`; what the
	/// registry's `_verifyFeedbackAuth` recovers.
	#[default]
	PersonalSign,
	/// The EIP-712 digest of the authorization.
	TypedData,
}

/// The `feedbackAuth` bytes handed to the reputation registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackAuthPayload {
	pub authorization: FeedbackAuthorization,
	pub signer_address: Address,
	pub signature: [u8; SIGNATURE_LENGTH],
}

impl FeedbackAuthPayload {
	/// Returns the ABI-encoded struct that precedes the signature.
	///
	/// `indexLimit` is a `uint64` on the wire; wider values are rejected.
	pub fn struct_bytes(&self) -> Result<Vec<u8>, EncodingError> {
		let auth = &self.authorization;
		let index_limit = narrow_u64("index_limit", auth.index_limit)?;
		let envelope = FeedbackAuthEnvelope {
			agentId: auth.agent_id,
			clientAddress: auth.client_address,
			indexLimit: index_limit,
			expiry: auth.expiry,
			chainId: U256::from(auth.chain_id),
			identityRegistry: auth.identity_registry,
			signerAddress: self.signer_address,
		};
		Ok(<FeedbackAuthEnvelope as SolType>::abi_encode(&envelope))
	}

	/// keccak256 of [`struct_bytes`](Self::struct_bytes).
	pub fn message_hash(&self) -> Result<B256, EncodingError> {
		Ok(keccak256(self.struct_bytes()?))
	}

	/// Returns the ABI-encoded struct followed by the signature bytes.
	pub fn encoded(&self) -> Result<Vec<u8>, EncodingError> {
		let mut out = self.struct_bytes()?;
		out.extend_from_slice(&self.signature);
		Ok(out)
	}

	/// Returns the payload as a 0x-prefixed hex string.
	pub fn to_hex(&self) -> Result<String, EncodingError> {
		Ok(with_0x_prefix(&hex::encode(self.encoded()?)))
	}

	/// Decodes payload bytes produced by [`encoded`](Self::encoded).
	///
	/// Address and `uint64` words must carry zero padding and the chain id
	/// must fit in 64 bits; the signature bytes are returned as-is for
	/// recovery to judge.
	pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
		if bytes.len() != PAYLOAD_STRUCT_LENGTH + SIGNATURE_LENGTH {
			return Err(EncodingError::InvalidPayload(format!(
				"expected {} bytes, got {}",
				PAYLOAD_STRUCT_LENGTH + SIGNATURE_LENGTH,
				bytes.len()
			)));
		}
		let (struct_bytes, signature_bytes) = bytes.split_at(PAYLOAD_STRUCT_LENGTH);

		// (word, padding bytes): clientAddress, indexLimit, identityRegistry, signerAddress
		for (word, padding) in [(1usize, 12usize), (2, 24), (5, 12), (6, 12)] {
			let start = word * 32;
			if struct_bytes[start..start + padding].iter().any(|b| *b != 0) {
				return Err(EncodingError::InvalidPayload(format!(
					"word {} has non-zero padding",
					word
				)));
			}
		}

		let envelope = <FeedbackAuthEnvelope as SolType>::abi_decode(struct_bytes)
			.map_err(|e| EncodingError::InvalidPayload(e.to_string()))?;
		let chain_id = u64::try_from(envelope.chainId).map_err(|_| {
			EncodingError::InvalidPayload(format!(
				"chain id {} does not fit in 64 bits",
				envelope.chainId
			))
		})?;

		let mut signature = [0u8; SIGNATURE_LENGTH];
		signature.copy_from_slice(signature_bytes);

		Ok(Self {
			authorization: FeedbackAuthorization::new(
				envelope.agentId,
				envelope.clientAddress,
				U256::from(envelope.indexLimit),
				envelope.expiry,
				chain_id,
				envelope.identityRegistry,
			),
			signer_address: envelope.signerAddress,
			signature,
		})
	}

	/// Decodes a 0x-prefixed or bare hex payload.
	pub fn from_hex(value: &str) -> Result<Self, EncodingError> {
		let bytes = hex::decode(value).map_err(|e| EncodingError::InvalidPayload(e.to_string()))?;
		Self::decode(&bytes)
	}
}
