//! In-memory secp256k1 signing key.

use crate::{SigningError, SigningKey};
use alloy_primitives::{Address, Signature, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use erc8004_types::SecretString;

/// Signing capability backed by a private key held in process memory.
///
/// The parsed key zeroizes itself on drop; the source text stays inside the
/// caller's [`SecretString`] and is only borrowed while parsing.
pub struct LocalKey {
	signer: PrivateKeySigner,
}

impl LocalKey {
	/// Parses a 32-byte hex private key, with or without "0x".
	pub fn from_secret(private_key: &SecretString) -> Result<Self, SigningError> {
		if private_key.is_empty() {
			return Err(SigningError::MissingKey);
		}
		// Parse errors are replaced wholesale so no key fragment reaches a log line.
		let signer = private_key.with_exposed(|key| {
			key.trim().parse::<PrivateKeySigner>().map_err(|_| {
				SigningError::InvalidKey(
					"expected 32 bytes of hex encoding a valid secp256k1 scalar".to_string(),
				)
			})
		})?;
		Ok(Self { signer })
	}
}

impl SigningKey for LocalKey {
	fn address(&self) -> Address {
		self.signer.address()
	}

	fn sign_digest(&self, digest: &B256) -> Result<Signature, SigningError> {
		self.signer
			.sign_hash_sync(digest)
			.map_err(|e| SigningError::Failed(e.to_string()))
	}
}

impl std::fmt::Debug for LocalKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LocalKey")
			.field("address", &self.signer.address())
			.finish()
	}
}
