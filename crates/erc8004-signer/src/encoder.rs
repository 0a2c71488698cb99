//! EIP-712 encoding of feedback authorizations.
//!
//! The encoder turns a [`FeedbackAuthorization`] into the two-part typed-data
//! hash the registry contract verifies: a domain separator bound to one chain
//! and one identity registry, and a struct hash over the six message fields.
//! `chainId` and `identityRegistry` appear in both parts.
//!
//! Everything here is pure computation over its inputs.

use alloy_primitives::{keccak256, Address, B256};
use erc8004_types::utils::{compute_final_digest, Eip712AbiEncoder, FEEDBACK_AUTH_TYPE};
use erc8004_types::{
	EncodingError, FeedbackAuthorization, FeedbackAuthorizationBuilder, FeedbackDomain,
};
use serde_json::json;
use std::sync::Arc;

/// Primary type name of the signed struct.
pub const PRIMARY_TYPE: &str = "FeedbackAuth";

/// All intermediate and final values of one encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAuthorization {
	pub authorization: FeedbackAuthorization,
	pub domain_separator: B256,
	pub struct_hash: B256,
	pub digest: B256,
	/// `eth_signTypedData_v4` document for display and external tooling.
	pub typed_data: serde_json::Value,
}

/// Builds EIP-712 digests for feedback authorizations under one domain.
#[derive(Debug, Clone)]
pub struct TypedDataEncoder {
	domain: Arc<FeedbackDomain>,
}

impl Default for TypedDataEncoder {
	fn default() -> Self {
		Self::new(FeedbackDomain::standard())
	}
}

impl TypedDataEncoder {
	pub fn new(domain: Arc<FeedbackDomain>) -> Self {
		Self { domain }
	}

	pub fn domain(&self) -> &FeedbackDomain {
		&self.domain
	}

	pub fn domain_separator(&self, chain_id: u64, identity_registry: &Address) -> B256 {
		self.domain.separator(chain_id, identity_registry)
	}

	/// keccak256(typeHash || agentId || clientAddress || indexLimit || expiry || chainId || identityRegistry)
	pub fn struct_hash(&self, authorization: &FeedbackAuthorization) -> B256 {
		let mut enc = Eip712AbiEncoder::new();
		enc.push_b256(&keccak256(FEEDBACK_AUTH_TYPE.as_bytes()));
		enc.push_u256(authorization.agent_id);
		enc.push_address(&authorization.client_address);
		enc.push_u256(authorization.index_limit);
		enc.push_u256(authorization.expiry);
		enc.push_u64(authorization.chain_id);
		enc.push_address(&authorization.identity_registry);
		keccak256(enc.finish())
	}

	/// Returns the 32-byte digest that gets signed.
	pub fn digest(&self, authorization: &FeedbackAuthorization) -> B256 {
		let domain_separator =
			self.domain_separator(authorization.chain_id, &authorization.identity_registry);
		compute_final_digest(&domain_separator, &self.struct_hash(authorization))
	}

	/// Returns the full typed-data document for the authorization.
	///
	/// Integers in the message are decimal strings so that 256-bit values
	/// survive JSON consumers that parse numbers as doubles.
	pub fn typed_data(&self, authorization: &FeedbackAuthorization) -> serde_json::Value {
		json!({
			"types": {
				"EIP712Domain": [
					{ "name": "name", "type": "string" },
					{ "name": "version", "type": "string" },
					{ "name": "chainId", "type": "uint256" },
					{ "name": "verifyingContract", "type": "address" },
				],
				"FeedbackAuth": [
					{ "name": "agentId", "type": "uint256" },
					{ "name": "clientAddress", "type": "address" },
					{ "name": "indexLimit", "type": "uint256" },
					{ "name": "expiry", "type": "uint256" },
					{ "name": "chainId", "type": "uint256" },
					{ "name": "identityRegistry", "type": "address" },
				],
			},
			"primaryType": PRIMARY_TYPE,
			"domain": {
				"name": self.domain.name(),
				"version": self.domain.version(),
				"chainId": authorization.chain_id,
				"verifyingContract": authorization.identity_registry.to_checksum(None),
			},
			"message": {
				"agentId": authorization.agent_id.to_string(),
				"clientAddress": authorization.client_address.to_checksum(None),
				"indexLimit": authorization.index_limit.to_string(),
				"expiry": authorization.expiry.to_string(),
				"chainId": authorization.chain_id.to_string(),
				"identityRegistry": authorization.identity_registry.to_checksum(None),
			},
		})
	}

	/// Computes every part of the encoding at once.
	pub fn encode(&self, authorization: &FeedbackAuthorization) -> EncodedAuthorization {
		let domain_separator =
			self.domain_separator(authorization.chain_id, &authorization.identity_registry);
		let struct_hash = self.struct_hash(authorization);
		EncodedAuthorization {
			authorization: *authorization,
			domain_separator,
			struct_hash,
			digest: compute_final_digest(&domain_separator, &struct_hash),
			typed_data: self.typed_data(authorization),
		}
	}

	/// Validates loosely typed parameters and encodes them.
	pub fn encode_params(
		&self,
		params: FeedbackAuthorizationBuilder,
	) -> Result<EncodedAuthorization, EncodingError> {
		let authorization = params.build()?;
		Ok(self.encode(&authorization))
	}
}
