//! Feedback authorization record.
//!
//! A [`FeedbackAuthorization`] states that one client address may submit
//! feedback about one agent, up to an index limit and until an expiry, on one
//! chain and against one identity registry. Typed values go through
//! [`FeedbackAuthorization::new`]; loosely typed input (strings, signed
//! integers, JSON) goes through [`FeedbackAuthorizationBuilder`], which
//! rejects anything that does not fit the on-chain types instead of coercing.

use crate::utils::{narrow_u64, parse_address, parse_u256};
use crate::EncodingError;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Signed statement that `client_address` may give feedback about `agent_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackAuthorization {
	/// Agent being reviewed, unique within the identity registry.
	pub agent_id: U256,
	/// Account allowed to submit feedback.
	pub client_address: Address,
	/// Upper bound on the feedback index this grant covers.
	pub index_limit: U256,
	/// Unix timestamp in seconds after which the grant is void.
	pub expiry: U256,
	/// Chain the grant is valid on.
	pub chain_id: u64,
	/// Identity registry deployment the grant is valid against.
	pub identity_registry: Address,
}

impl FeedbackAuthorization {
	/// Creates an authorization from already-typed values.
	pub fn new(
		agent_id: U256,
		client_address: Address,
		index_limit: U256,
		expiry: U256,
		chain_id: u64,
		identity_registry: Address,
	) -> Self {
		Self {
			agent_id,
			client_address,
			index_limit,
			expiry,
			chain_id,
			identity_registry,
		}
	}

	/// Starts a validating builder for loosely typed input.
	pub fn builder() -> FeedbackAuthorizationBuilder {
		FeedbackAuthorizationBuilder::default()
	}

	/// Builds an authorization from a JSON object keyed like the EIP-712
	/// message (`agentId`, `clientAddress`, `indexLimit`, `expiry`, `chainId`,
	/// `identityRegistry`).
	///
	/// Numbers may be JSON integers or decimal/hex strings.
	pub fn from_json(value: &serde_json::Value) -> Result<Self, EncodingError> {
		let object = value.as_object().ok_or_else(|| {
			EncodingError::InvalidInput(format!("expected a JSON object, got {}", value))
		})?;

		let mut builder = Self::builder();
		if let Some(v) = object.get("agentId") {
			builder = builder.agent_id(UintInput::from_json("agent_id", v)?);
		}
		if let Some(v) = object.get("clientAddress") {
			builder = builder.client_address(AddressInput::from_json("client_address", v)?);
		}
		if let Some(v) = object.get("indexLimit") {
			builder = builder.index_limit(UintInput::from_json("index_limit", v)?);
		}
		if let Some(v) = object.get("expiry") {
			builder = builder.expiry(UintInput::from_json("expiry", v)?);
		}
		if let Some(v) = object.get("chainId") {
			builder = builder.chain_id(UintInput::from_json("chain_id", v)?);
		}
		if let Some(v) = object.get("identityRegistry") {
			builder = builder.identity_registry(AddressInput::from_json("identity_registry", v)?);
		}
		builder.build()
	}

	/// Returns true from the expiry second onwards, matching a registry
	/// that accepts only `block.timestamp < expiry`.
	///
	/// Nothing in the signing path calls this; enforcement belongs to the
	/// caller and the contract.
	pub fn is_expired_at(&self, timestamp: u64) -> bool {
		U256::from(timestamp) >= self.expiry
	}
}

/// Unvalidated unsigned integer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UintInput {
	/// Decimal or 0x-prefixed hex text.
	Text(String),
	/// A machine integer that may be negative.
	Signed(i128),
	/// A value that is already unsigned.
	Unsigned(U256),
}

impl UintInput {
	fn from_json(field: &'static str, value: &serde_json::Value) -> Result<Self, EncodingError> {
		match value {
			serde_json::Value::String(s) => Ok(Self::Text(s.clone())),
			serde_json::Value::Number(n) => {
				if let Some(u) = n.as_u64() {
					Ok(Self::Unsigned(U256::from(u)))
				} else if let Some(i) = n.as_i64() {
					Ok(Self::Signed(i as i128))
				} else {
					Err(EncodingError::InvalidInteger {
						field,
						message: format!("{} is not an integer", n),
					})
				}
			},
			other => Err(EncodingError::InvalidInteger {
				field,
				message: format!("expected a number or string, got {}", other),
			}),
		}
	}

	fn resolve(self, field: &'static str) -> Result<U256, EncodingError> {
		match self {
			Self::Text(text) if text.trim().is_empty() => Err(EncodingError::MissingField(field)),
			Self::Text(text) => parse_u256(field, &text),
			Self::Signed(v) if v < 0 => Err(EncodingError::NegativeInteger {
				field,
				value: v.to_string(),
			}),
			Self::Signed(v) => Ok(U256::from(v as u128)),
			Self::Unsigned(v) => Ok(v),
		}
	}

	fn resolve_u64(self, field: &'static str) -> Result<u64, EncodingError> {
		narrow_u64(field, self.resolve(field)?)
	}
}

macro_rules! uint_input_from {
	($variant:ident as $target:ty: $($t:ty),*) => {
		$(
			impl From<$t> for UintInput {
				fn from(v: $t) -> Self {
					Self::$variant(<$target>::from(v))
				}
			}
		)*
	};
}

uint_input_from!(Unsigned as U256: u8, u16, u32, u64, u128, U256);
uint_input_from!(Signed as i128: i8, i16, i32, i64, i128);

impl From<&str> for UintInput {
	fn from(v: &str) -> Self {
		Self::Text(v.to_string())
	}
}

impl From<String> for UintInput {
	fn from(v: String) -> Self {
		Self::Text(v)
	}
}

/// Unvalidated address input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressInput {
	/// Hex text, with or without prefix, any case.
	Text(String),
	/// An already-parsed address.
	Parsed(Address),
}

impl AddressInput {
	fn from_json(field: &'static str, value: &serde_json::Value) -> Result<Self, EncodingError> {
		value
			.as_str()
			.map(|s| Self::Text(s.to_string()))
			.ok_or_else(|| EncodingError::InvalidAddress {
				field,
				message: format!("expected a hex string, got {}", value),
			})
	}

	fn resolve(self, field: &'static str) -> Result<Address, EncodingError> {
		match self {
			Self::Text(text) if text.trim().is_empty() => Err(EncodingError::MissingField(field)),
			Self::Text(text) => parse_address(field, &text),
			Self::Parsed(address) => Ok(address),
		}
	}
}

impl From<&str> for AddressInput {
	fn from(v: &str) -> Self {
		Self::Text(v.to_string())
	}
}

impl From<String> for AddressInput {
	fn from(v: String) -> Self {
		Self::Text(v)
	}
}

impl From<Address> for AddressInput {
	fn from(v: Address) -> Self {
		Self::Parsed(v)
	}
}

/// Validating factory for [`FeedbackAuthorization`].
///
/// Every field is required. [`build`](Self::build) fails on the first field
/// that is missing or does not fit its on-chain type.
#[derive(Debug, Clone, Default)]
pub struct FeedbackAuthorizationBuilder {
	agent_id: Option<UintInput>,
	client_address: Option<AddressInput>,
	index_limit: Option<UintInput>,
	expiry: Option<UintInput>,
	chain_id: Option<UintInput>,
	identity_registry: Option<AddressInput>,
}

impl FeedbackAuthorizationBuilder {
	pub fn agent_id(mut self, value: impl Into<UintInput>) -> Self {
		self.agent_id = Some(value.into());
		self
	}

	pub fn client_address(mut self, value: impl Into<AddressInput>) -> Self {
		self.client_address = Some(value.into());
		self
	}

	pub fn index_limit(mut self, value: impl Into<UintInput>) -> Self {
		self.index_limit = Some(value.into());
		self
	}

	pub fn expiry(mut self, value: impl Into<UintInput>) -> Self {
		self.expiry = Some(value.into());
		self
	}

	pub fn chain_id(mut self, value: impl Into<UintInput>) -> Self {
		self.chain_id = Some(value.into());
		self
	}

	pub fn identity_registry(mut self, value: impl Into<AddressInput>) -> Self {
		self.identity_registry = Some(value.into());
		self
	}

	/// Validates every field and produces the typed record.
	pub fn build(self) -> Result<FeedbackAuthorization, EncodingError> {
		Ok(FeedbackAuthorization {
			agent_id: required(self.agent_id, "agent_id")?.resolve("agent_id")?,
			client_address: required(self.client_address, "client_address")?
				.resolve("client_address")?,
			index_limit: required(self.index_limit, "index_limit")?.resolve("index_limit")?,
			expiry: required(self.expiry, "expiry")?.resolve("expiry")?,
			chain_id: required(self.chain_id, "chain_id")?.resolve_u64("chain_id")?,
			identity_registry: required(self.identity_registry, "identity_registry")?
				.resolve("identity_registry")?,
		})
	}
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, EncodingError> {
	value.ok_or(EncodingError::MissingField(field))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use serde_json::json;

	fn complete() -> FeedbackAuthorizationBuilder {
		FeedbackAuthorization::builder()
			.agent_id(7u64)
			.client_address("0x0000000000000000000000000000000000000001")
			.index_limit(10u64)
			.expiry(1893456000u64)
			.chain_id(1u64)
			.identity_registry("0x000000000000000000000000000000000000dEaD")
	}

	#[test]
	fn test_builder_produces_typed_record() {
		let auth = complete().build().unwrap();
		assert_eq!(auth.agent_id, U256::from(7u64));
		assert_eq!(
			auth.client_address,
			address!("0000000000000000000000000000000000000001")
		);
		assert_eq!(auth.index_limit, U256::from(10u64));
		assert_eq!(auth.expiry, U256::from(1893456000u64));
		assert_eq!(auth.chain_id, 1);
		assert_eq!(
			auth.identity_registry,
			address!("000000000000000000000000000000000000dEaD")
		);
	}

	#[test]
	fn test_builder_reports_first_missing_field() {
		let err = FeedbackAuthorization::builder()
			.agent_id(1u64)
			.build()
			.unwrap_err();
		assert_eq!(err, EncodingError::MissingField("client_address"));

		let err = complete().expiry("").build().unwrap_err();
		assert_eq!(err, EncodingError::MissingField("expiry"));

		let err = complete().identity_registry("  ").build().unwrap_err();
		assert_eq!(err, EncodingError::MissingField("identity_registry"));
	}

	#[test]
	fn test_builder_accepts_boundaries() {
		let auth = complete()
			.agent_id(0u64)
			.index_limit(0u64)
			.expiry(0u64)
			.build()
			.unwrap();
		assert_eq!(auth.agent_id, U256::ZERO);
		assert_eq!(auth.expiry, U256::ZERO);

		let auth = complete()
			.agent_id(U256::MAX)
			.index_limit(U256::MAX.to_string())
			.expiry(format!("0x{:x}", U256::MAX))
			.chain_id(u64::MAX)
			.build()
			.unwrap();
		assert_eq!(auth.agent_id, U256::MAX);
		assert_eq!(auth.index_limit, U256::MAX);
		assert_eq!(auth.expiry, U256::MAX);
		assert_eq!(auth.chain_id, u64::MAX);
	}

	#[test]
	fn test_builder_rejects_negative_values() {
		let err = complete().agent_id(-1i64).build().unwrap_err();
		assert!(matches!(err, EncodingError::NegativeInteger { field: "agent_id", .. }));

		let err = complete().index_limit("-5").build().unwrap_err();
		assert!(matches!(err, EncodingError::NegativeInteger { field: "index_limit", .. }));
	}

	#[test]
	fn test_builder_rejects_over_width_values() {
		let two_pow_256 = format!("0x1{}", "0".repeat(64));
		let err = complete().expiry(two_pow_256).build().unwrap_err();
		assert!(matches!(err, EncodingError::IntegerOverflow { field: "expiry", bits: 256, .. }));

		let err = complete().chain_id(u128::from(u64::MAX) + 1).build().unwrap_err();
		assert!(matches!(err, EncodingError::IntegerOverflow { field: "chain_id", bits: 64, .. }));
	}

	#[test]
	fn test_builder_rejects_malformed_addresses() {
		// 19-byte literal
		let err = complete()
			.client_address("0x00000000000000000000000000000000000001")
			.build()
			.unwrap_err();
		assert!(matches!(err, EncodingError::InvalidAddress { field: "client_address", .. }));

		let err = complete()
			.identity_registry("0xnot-an-address")
			.build()
			.unwrap_err();
		assert!(matches!(err, EncodingError::InvalidAddress { field: "identity_registry", .. }));
	}

	#[test]
	fn test_from_json() {
		let value = json!({
			"agentId": 7,
			"clientAddress": "0x0000000000000000000000000000000000000001",
			"indexLimit": "10",
			"expiry": "0x70dbd880",
			"chainId": 1,
			"identityRegistry": "0x000000000000000000000000000000000000dead",
		});
		let auth = FeedbackAuthorization::from_json(&value).unwrap();
		assert_eq!(auth, complete().build().unwrap());
	}

	#[test]
	fn test_from_json_rejects_loose_values() {
		let mut value = json!({
			"agentId": -3,
			"clientAddress": "0x0000000000000000000000000000000000000001",
			"indexLimit": 10,
			"expiry": 1893456000,
			"chainId": 1,
			"identityRegistry": "0x000000000000000000000000000000000000dead",
		});
		assert!(matches!(
			FeedbackAuthorization::from_json(&value).unwrap_err(),
			EncodingError::NegativeInteger { field: "agent_id", .. }
		));

		value["agentId"] = json!(1.5);
		assert!(matches!(
			FeedbackAuthorization::from_json(&value).unwrap_err(),
			EncodingError::InvalidInteger { field: "agent_id", .. }
		));

		value["agentId"] = json!(7);
		value.as_object_mut().unwrap().remove("chainId");
		assert_eq!(
			FeedbackAuthorization::from_json(&value).unwrap_err(),
			EncodingError::MissingField("chain_id")
		);
	}

	#[test]
	fn test_from_json_requires_object() {
		for value in [json!([7, 1]), json!("0x07"), json!(null)] {
			assert!(matches!(
				FeedbackAuthorization::from_json(&value).unwrap_err(),
				EncodingError::InvalidInput(_)
			));
		}
	}

	#[test]
	fn test_is_expired_at() {
		let auth = complete().build().unwrap();
		assert!(!auth.is_expired_at(1893455999));
		assert!(auth.is_expired_at(1893456000));
		assert!(auth.is_expired_at(1893456001));
	}
}
