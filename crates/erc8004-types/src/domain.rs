//! EIP-712 domain description for feedback authorizations.
//!
//! The name and version strings must be agreed byte for byte with the
//! verifying contract. A mismatch never surfaces as an error here; the
//! contract simply recovers a different signer.

use crate::utils::compute_domain_hash;
use crate::EncodingError;
use alloy_primitives::{Address, B256};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Domain name used by the reputation registry verifier.
pub const DEFAULT_DOMAIN_NAME: &str = "ERC8004ReputationRegistry";

/// Domain version used by the reputation registry verifier.
pub const DEFAULT_DOMAIN_VERSION: &str = "1";

static STANDARD_DOMAIN: Lazy<Arc<FeedbackDomain>> = Lazy::new(|| {
	Arc::new(FeedbackDomain {
		name: DEFAULT_DOMAIN_NAME.to_string(),
		version: DEFAULT_DOMAIN_VERSION.to_string(),
	})
});

/// Static part of the EIP-712 domain: name and version.
///
/// The dynamic part (`chainId`, `verifyingContract`) comes from each
/// authorization, so one domain value serves every chain and registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackDomain {
	name: String,
	version: String,
}

impl FeedbackDomain {
	/// Creates a domain with custom name and version.
	pub fn new(name: impl Into<String>, version: impl Into<String>) -> Result<Self, EncodingError> {
		let name = name.into();
		let version = version.into();
		if name.is_empty() {
			return Err(EncodingError::InvalidDomain(
				"name cannot be empty".to_string(),
			));
		}
		if version.is_empty() {
			return Err(EncodingError::InvalidDomain(
				"version cannot be empty".to_string(),
			));
		}
		Ok(Self { name, version })
	}

	/// Returns the process-wide default domain.
	pub fn standard() -> Arc<FeedbackDomain> {
		Arc::clone(&STANDARD_DOMAIN)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn version(&self) -> &str {
		&self.version
	}

	/// Computes the domain separator for one chain and registry deployment.
	pub fn separator(&self, chain_id: u64, verifying_contract: &Address) -> B256 {
		compute_domain_hash(&self.name, &self.version, chain_id, verifying_contract)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn test_standard_domain_is_shared() {
		let a = FeedbackDomain::standard();
		let b = FeedbackDomain::standard();
		assert!(Arc::ptr_eq(&a, &b));
		assert_eq!(a.name(), DEFAULT_DOMAIN_NAME);
		assert_eq!(a.version(), DEFAULT_DOMAIN_VERSION);
	}

	#[test]
	fn test_new_rejects_empty_strings() {
		assert!(matches!(
			FeedbackDomain::new("", "1"),
			Err(EncodingError::InvalidDomain(_))
		));
		assert!(matches!(
			FeedbackDomain::new("Registry", ""),
			Err(EncodingError::InvalidDomain(_))
		));
	}

	#[test]
	fn test_separator_depends_on_every_component() {
		let registry = address!("000000000000000000000000000000000000dEaD");
		let standard = FeedbackDomain::standard();
		let base = standard.separator(1, &registry);

		assert_ne!(base, standard.separator(10, &registry));
		assert_ne!(
			base,
			standard.separator(1, &address!("000000000000000000000000000000000000bEEF"))
		);
		assert_ne!(
			base,
			FeedbackDomain::new(DEFAULT_DOMAIN_NAME, "2")
				.unwrap()
				.separator(1, &registry)
		);
		assert_ne!(
			base,
			FeedbackDomain::new("Other", DEFAULT_DOMAIN_VERSION)
				.unwrap()
				.separator(1, &registry)
		);
	}
}
