//! Configuration builder for tests and local tooling.

use crate::{AuthorizationConfig, Config, DomainConfig, NetworkConfig, SignerConfig};
use erc8004_types::{PayloadScheme, RecoveryByte, SecretString};

/// Builder for creating `Config` instances with a fluent API.
///
/// Defaults to chain 1, registry `0x…dEaD`, the standard domain and no key.
/// Values are not validated; use [`Config::from_str`](std::str::FromStr) for that.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	domain: Option<(String, String)>,
	chain_id: u64,
	identity_registry: String,
	private_key: Option<String>,
	recovery_byte: RecoveryByte,
	payload_scheme: PayloadScheme,
	default_ttl_seconds: u64,
	default_index_limit: u64,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	pub fn new() -> Self {
		Self {
			domain: None,
			chain_id: 1,
			identity_registry: "0x000000000000000000000000000000000000dEaD".to_string(),
			private_key: None,
			recovery_byte: RecoveryByte::Legacy,
			payload_scheme: PayloadScheme::PersonalSign,
			default_ttl_seconds: 3600,
			default_index_limit: 1,
		}
	}

	/// Overrides the EIP-712 domain name and version.
	pub fn domain(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
		self.domain = Some((name.into(), version.into()));
		self
	}

	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = chain_id;
		self
	}

	pub fn identity_registry(mut self, registry: impl Into<String>) -> Self {
		self.identity_registry = registry.into();
		self
	}

	pub fn private_key(mut self, key: impl Into<String>) -> Self {
		self.private_key = Some(key.into());
		self
	}

	pub fn recovery_byte(mut self, recovery_byte: RecoveryByte) -> Self {
		self.recovery_byte = recovery_byte;
		self
	}

	pub fn payload_scheme(mut self, payload_scheme: PayloadScheme) -> Self {
		self.payload_scheme = payload_scheme;
		self
	}

	pub fn default_ttl_seconds(mut self, ttl: u64) -> Self {
		self.default_ttl_seconds = ttl;
		self
	}

	pub fn default_index_limit(mut self, limit: u64) -> Self {
		self.default_index_limit = limit;
		self
	}

	/// Builds the `Config` with the configured values.
	pub fn build(self) -> Config {
		let signer = match (self.private_key, self.recovery_byte, self.payload_scheme) {
			(None, RecoveryByte::Legacy, PayloadScheme::PersonalSign) => None,
			(key, recovery_byte, payload_scheme) => Some(SignerConfig {
				private_key: key.map(SecretString::from),
				recovery_byte,
				payload_scheme,
			}),
		};

		Config {
			domain: self
				.domain
				.map(|(name, version)| DomainConfig { name, version }),
			network: NetworkConfig {
				chain_id: self.chain_id,
				identity_registry: self.identity_registry,
			},
			signer,
			authorization: AuthorizationConfig {
				default_ttl_seconds: self.default_ttl_seconds,
				default_index_limit: self.default_index_limit,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder_defaults_pass_validation() {
		let config = ConfigBuilder::new().build();
		assert!(config.validate().is_ok());
		assert!(config.signer.is_none());
		assert_eq!(config.recovery_byte(), RecoveryByte::Legacy);
	}

	#[test]
	fn test_builder_overrides() {
		let config = ConfigBuilder::new()
			.domain("Other", "9")
			.chain_id(10)
			.private_key("0x01")
			.recovery_byte(RecoveryByte::Parity)
			.payload_scheme(PayloadScheme::TypedData)
			.default_ttl_seconds(5)
			.build();
		assert!(config.validate().is_ok());
		assert_eq!(config.feedback_domain().unwrap().name(), "Other");
		assert_eq!(config.network.chain_id, 10);
		assert_eq!(config.recovery_byte(), RecoveryByte::Parity);
		assert_eq!(config.payload_scheme(), PayloadScheme::TypedData);
		assert!(config.private_key().is_some());
	}

	#[test]
	fn test_builder_output_is_unvalidated() {
		let config = ConfigBuilder::new().chain_id(0).build();
		assert!(config.validate().is_err());
	}
}
