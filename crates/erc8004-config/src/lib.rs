//! Configuration for the feedback authorization signer.
//!
//! Configuration is a single TOML file. `${VAR}` and `${VAR:-default}`
//! references are resolved from the environment before parsing, so the
//! signing key never has to be written to disk. Everything is validated
//! once at load time; a loaded [`Config`] always yields a usable domain,
//! chain id and registry address.

use alloy_primitives::Address;
use erc8004_types::{
	parse_address, FeedbackDomain, PayloadScheme, RecoveryByte, SecretString,
	DEFAULT_DOMAIN_NAME, DEFAULT_DOMAIN_VERSION,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[cfg(any(test, feature = "testing"))]
pub mod builders {
	pub mod config;
}

#[cfg(any(test, feature = "testing"))]
pub use builders::config::ConfigBuilder;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Only the message; the default rendering echoes the input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
	/// EIP-712 domain strings; the standard domain when absent.
	pub domain: Option<DomainConfig>,
	/// Chain and registry every authorization is scoped to.
	pub network: NetworkConfig,
	/// Signing key; absent for verification-only use.
	pub signer: Option<SignerConfig>,
	/// Defaults applied when a caller leaves optional values out.
	#[serde(default)]
	pub authorization: AuthorizationConfig,
}

/// EIP-712 domain name and version.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
	#[serde(default = "default_domain_name")]
	pub name: String,
	#[serde(default = "default_domain_version")]
	pub version: String,
}

fn default_domain_name() -> String {
	DEFAULT_DOMAIN_NAME.to_string()
}

fn default_domain_version() -> String {
	DEFAULT_DOMAIN_VERSION.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub chain_id: u64,
	/// Hex address of the identity registry contract.
	pub identity_registry: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SignerConfig {
	pub private_key: Option<SecretString>,
	#[serde(default)]
	pub recovery_byte: RecoveryByte,
	/// Hash covered by `feedbackAuth` payload signatures.
	#[serde(default)]
	pub payload_scheme: PayloadScheme,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthorizationConfig {
	/// Lifetime of an authorization when no explicit expiry is given.
	#[serde(default = "default_ttl_seconds")]
	pub default_ttl_seconds: u64,
	#[serde(default = "default_index_limit")]
	pub default_index_limit: u64,
}

impl Default for AuthorizationConfig {
	fn default() -> Self {
		Self {
			default_ttl_seconds: default_ttl_seconds(),
			default_index_limit: default_index_limit(),
		}
	}
}

/// Returns the default authorization lifetime (1 hour).
fn default_ttl_seconds() -> u64 {
	3600
}

fn default_index_limit() -> u64 {
	1
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file, resolving environment variables.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// - Chain id is non-zero
	/// - Identity registry is a well-formed, non-zero address
	/// - Domain name and version are non-empty when overridden
	/// - A configured private key is non-empty
	/// - Default authorization lifetime is non-zero
	fn validate(&self) -> Result<(), ConfigError> {
		if self.network.chain_id == 0 {
			return Err(ConfigError::Validation(
				"network.chain_id must be greater than 0".into(),
			));
		}

		let registry = self.identity_registry()?;
		if registry == Address::ZERO {
			return Err(ConfigError::Validation(
				"network.identity_registry cannot be the zero address".into(),
			));
		}

		if let Some(domain) = &self.domain {
			FeedbackDomain::new(domain.name.as_str(), domain.version.as_str())
				.map_err(|e| ConfigError::Validation(format!("domain: {}", e)))?;
		}

		if let Some(SignerConfig {
			private_key: Some(key),
			..
		}) = &self.signer
		{
			if key.is_empty() {
				return Err(ConfigError::Validation(
					"signer.private_key cannot be empty; omit it for verification-only use"
						.into(),
				));
			}
		}

		if self.authorization.default_ttl_seconds == 0 {
			return Err(ConfigError::Validation(
				"authorization.default_ttl_seconds must be greater than 0".into(),
			));
		}

		Ok(())
	}

	/// Returns the configured EIP-712 domain, or the shared standard one.
	pub fn feedback_domain(&self) -> Result<Arc<FeedbackDomain>, ConfigError> {
		match &self.domain {
			None => Ok(FeedbackDomain::standard()),
			Some(domain) => FeedbackDomain::new(domain.name.as_str(), domain.version.as_str())
				.map(Arc::new)
				.map_err(|e| ConfigError::Validation(format!("domain: {}", e))),
		}
	}

	pub fn identity_registry(&self) -> Result<Address, ConfigError> {
		parse_address("identity_registry", &self.network.identity_registry)
			.map_err(|e| ConfigError::Validation(format!("network: {}", e)))
	}

	pub fn private_key(&self) -> Option<&SecretString> {
		self.signer.as_ref().and_then(|s| s.private_key.as_ref())
	}

	pub fn recovery_byte(&self) -> RecoveryByte {
		self.signer
			.as_ref()
			.map(|s| s.recovery_byte)
			.unwrap_or_default()
	}

	pub fn payload_scheme(&self) -> PayloadScheme {
		self.signer
			.as_ref()
			.map(|s| s.payload_scheme)
			.unwrap_or_default()
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
