//! Feedback authorization signing for ERC-8004 reputation registries.
//!
//! This crate drives the [`TypedDataEncoder`] and a [`SigningKey`] capability
//! to produce the 65-byte recoverable signature that authorizes a client to
//! leave feedback about an agent, and recovers the signer of such a signature.
//!
//! The same signer also produces and checks the `feedbackAuth` payload the
//! registry consumes. Its embedded signature covers the hash selected by
//! [`PayloadScheme`]: by default the EIP-191 personal message over the
//! ABI-encoded struct, which is what the registry recovers.
//!
//! An [`AuthorizationSigner`] is either keyed (can sign and recover) or
//! keyless (can only recover). A key that is missing or fails to parse does
//! not stop construction; it surfaces as a [`SigningError`] on the first
//! attempt to sign, so verification-only deployments never need key access.

use alloy_primitives::{eip191_hash_message, uint, Address, Signature, B256, U256};
use erc8004_types::{
	EncodingError, FeedbackAuthPayload, FeedbackAuthorization, FeedbackAuthorizationBuilder,
	PayloadScheme, RecoveryByte, SecretString, SIGNATURE_LENGTH,
};
use thiserror::Error;
use tracing::{debug, warn};

pub mod encoder;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use encoder::{EncodedAuthorization, TypedDataEncoder};
pub use implementations::local::LocalKey;

/// Half the secp256k1 group order; larger `s` values are malleable twins.
const SECP256K1N_HALF: U256 =
	uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// Errors that can occur while producing a signature.
#[derive(Debug, Error)]
pub enum SigningError {
	/// No key was supplied; the signer is verification-only.
	#[error("No signing key configured")]
	MissingKey,
	/// A key was supplied but could not be used.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// The key backend failed to sign.
	#[error("Signing failed: {0}")]
	Failed(String),
}

/// Errors that can occur while recovering a signer address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
	#[error("Signature must be {expected} bytes, got {actual}")]
	InvalidLength { expected: usize, actual: usize },
	#[error("Recovery byte {v} is not valid for the {convention:?} convention")]
	InvalidRecoveryByte { v: u8, convention: RecoveryByte },
	#[error("Signature s value is in the upper half of the curve order")]
	MalleableSignature,
	#[error("Signature recovery failed: {0}")]
	Recovery(String),
	#[error("Signature recovers the zero address")]
	ZeroAddress,
	#[error("Payload names signer {claimed} but the signature recovers {recovered}")]
	SignerMismatch { claimed: Address, recovered: Address },
}

/// Any failure of a signer operation, with the stage it failed in.
#[derive(Debug, Error)]
pub enum AuthError {
	#[error("Cannot encode feedback authorization: {0}")]
	Encoding(#[from] EncodingError),
	#[error("Cannot sign feedback authorization: {0}")]
	Signing(#[from] SigningError),
	#[error("Cannot recover feedback authorization signer: {0}")]
	Recovery(#[from] RecoveryError),
}

/// Capability to sign EIP-712 digests.
///
/// Implementations hold key material; everything else in this crate only
/// ever sees digests, addresses and signatures.
pub trait SigningKey: Send + Sync {
	/// Address derived from the public key.
	fn address(&self) -> Address;

	/// Signs a 32-byte digest without any further hashing or prefixing.
	fn sign_digest(&self, digest: &B256) -> Result<Signature, SigningError>;
}

/// Whether a signer can produce signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerState {
	Keyed,
	Keyless,
}

enum KeyState {
	Keyed(Box<dyn SigningKey>),
	/// `rejected` holds why a supplied key was unusable.
	Keyless { rejected: Option<String> },
}

/// A signed feedback authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedFeedbackAuth {
	pub authorization: FeedbackAuthorization,
	pub digest: B256,
	pub signer: Address,
	/// `r || s || v`, with `v` in the signer's [`RecoveryByte`] convention.
	pub signature: [u8; SIGNATURE_LENGTH],
}

impl SignedFeedbackAuth {
	pub fn signature_hex(&self) -> String {
		format!("0x{}", alloy_primitives::hex::encode(self.signature))
	}
}

/// Signs and verifies feedback authorizations.
///
/// Holds no mutable state, so a single instance can be shared across
/// threads and used concurrently.
pub struct AuthorizationSigner {
	encoder: TypedDataEncoder,
	key: KeyState,
	recovery_byte: RecoveryByte,
	payload_scheme: PayloadScheme,
}

impl AuthorizationSigner {
	/// Creates a verification-only signer.
	pub fn keyless(encoder: TypedDataEncoder, recovery_byte: RecoveryByte) -> Self {
		Self {
			encoder,
			key: KeyState::Keyless { rejected: None },
			recovery_byte,
			payload_scheme: PayloadScheme::default(),
		}
	}

	/// Creates a signer around an existing signing capability.
	pub fn with_key(
		encoder: TypedDataEncoder,
		key: Box<dyn SigningKey>,
		recovery_byte: RecoveryByte,
	) -> Self {
		Self {
			encoder,
			key: KeyState::Keyed(key),
			recovery_byte,
			payload_scheme: PayloadScheme::default(),
		}
	}

	/// Creates a signer from a hex private key.
	///
	/// Never fails: an empty or malformed key yields a keyless signer whose
	/// first `build`/`sign` call reports the problem.
	pub fn from_private_key(
		encoder: TypedDataEncoder,
		private_key: &SecretString,
		recovery_byte: RecoveryByte,
	) -> Self {
		let key = match LocalKey::from_secret(private_key) {
			Ok(key) => KeyState::Keyed(Box::new(key)),
			Err(SigningError::MissingKey) => KeyState::Keyless { rejected: None },
			Err(e) => {
				warn!("Signing key rejected, signer is verification-only: {}", e);
				KeyState::Keyless {
					rejected: Some(e.to_string()),
				}
			},
		};
		Self {
			encoder,
			key,
			recovery_byte,
			payload_scheme: PayloadScheme::default(),
		}
	}

	pub fn state(&self) -> SignerState {
		match self.key {
			KeyState::Keyed(_) => SignerState::Keyed,
			KeyState::Keyless { .. } => SignerState::Keyless,
		}
	}

	/// Address of the held key, if any.
	pub fn signer_address(&self) -> Option<Address> {
		match &self.key {
			KeyState::Keyed(key) => Some(key.address()),
			KeyState::Keyless { .. } => None,
		}
	}

	/// Address of the held key, or why there is none.
	pub fn require_key(&self) -> Result<Address, SigningError> {
		self.signing_key().map(|key| key.address())
	}

	pub fn encoder(&self) -> &TypedDataEncoder {
		&self.encoder
	}

	pub fn recovery_byte(&self) -> RecoveryByte {
		self.recovery_byte
	}

	/// Selects the hash that `feedbackAuth` payload signatures cover.
	pub fn with_payload_scheme(mut self, payload_scheme: PayloadScheme) -> Self {
		self.payload_scheme = payload_scheme;
		self
	}

	pub fn payload_scheme(&self) -> PayloadScheme {
		self.payload_scheme
	}

	/// Validates loosely typed parameters, then signs them.
	pub fn build(
		&self,
		params: FeedbackAuthorizationBuilder,
	) -> Result<SignedFeedbackAuth, AuthError> {
		let authorization = params.build()?;
		self.sign(&authorization)
	}

	/// Signs an already-validated authorization.
	pub fn sign(
		&self,
		authorization: &FeedbackAuthorization,
	) -> Result<SignedFeedbackAuth, AuthError> {
		let key = self.signing_key()?;
		let digest = self.encoder.digest(authorization);
		let signature = self.sign_hash(key, &digest)?;

		let signer = key.address();
		debug!(
			agent_id = %authorization.agent_id,
			chain_id = authorization.chain_id,
			client = %authorization.client_address,
			signer = %signer,
			"Signed feedback authorization"
		);

		Ok(SignedFeedbackAuth {
			authorization: *authorization,
			digest,
			signer,
			signature,
		})
	}

	/// Recovers the address that signed `authorization`.
	///
	/// The caller compares the result against the signer it expects.
	pub fn recover(
		&self,
		authorization: &FeedbackAuthorization,
		signature: &[u8],
	) -> Result<Address, AuthError> {
		let digest = self.encoder.digest(authorization);
		let recovered = self.recover_hash(&digest, signature)?;

		debug!(
			agent_id = %authorization.agent_id,
			chain_id = authorization.chain_id,
			recovered = %recovered,
			"Recovered feedback authorization signer"
		);
		Ok(recovered)
	}

	/// Returns whether `signature` over `authorization` was made by `expected`.
	pub fn verify(
		&self,
		authorization: &FeedbackAuthorization,
		signature: &[u8],
		expected: Address,
	) -> Result<bool, AuthError> {
		Ok(self.recover(authorization, signature)? == expected)
	}

	/// Validates loosely typed parameters, then signs them into `feedbackAuth` bytes.
	pub fn build_payload(
		&self,
		params: FeedbackAuthorizationBuilder,
	) -> Result<FeedbackAuthPayload, AuthError> {
		let authorization = params.build()?;
		self.sign_payload(&authorization)
	}

	/// Produces the `feedbackAuth` payload naming this signer's address,
	/// signed under the configured [`PayloadScheme`].
	pub fn sign_payload(
		&self,
		authorization: &FeedbackAuthorization,
	) -> Result<FeedbackAuthPayload, AuthError> {
		let key = self.signing_key()?;
		let mut payload = FeedbackAuthPayload {
			authorization: *authorization,
			signer_address: key.address(),
			signature: [0u8; SIGNATURE_LENGTH],
		};
		let hash = self.payload_hash(&payload)?;
		payload.signature = self.sign_hash(key, &hash)?;

		debug!(
			agent_id = %authorization.agent_id,
			chain_id = authorization.chain_id,
			scheme = ?self.payload_scheme,
			"Signed feedbackAuth payload"
		);
		Ok(payload)
	}

	/// Hash that a payload signature covers under the configured scheme.
	pub fn payload_hash(&self, payload: &FeedbackAuthPayload) -> Result<B256, EncodingError> {
		match self.payload_scheme {
			PayloadScheme::PersonalSign => Ok(eip191_hash_message(payload.message_hash()?)),
			PayloadScheme::TypedData => Ok(self.encoder.digest(&payload.authorization)),
		}
	}

	/// Decodes `feedbackAuth` payload bytes and checks that the signature
	/// recovers the signer address embedded in them.
	pub fn recover_payload(&self, payload: &[u8]) -> Result<FeedbackAuthPayload, AuthError> {
		let decoded = FeedbackAuthPayload::decode(payload)?;
		let hash = self.payload_hash(&decoded)?;
		let recovered = self.recover_hash(&hash, &decoded.signature)?;
		if recovered != decoded.signer_address {
			return Err(RecoveryError::SignerMismatch {
				claimed: decoded.signer_address,
				recovered,
			}
			.into());
		}
		Ok(decoded)
	}

	fn sign_hash(
		&self,
		key: &dyn SigningKey,
		hash: &B256,
	) -> Result<[u8; SIGNATURE_LENGTH], SigningError> {
		let signature = key.sign_digest(hash)?;
		let signature = signature.normalize_s().unwrap_or(signature);

		let mut bytes = [0u8; SIGNATURE_LENGTH];
		bytes[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
		bytes[32..64].copy_from_slice(&signature.s().to_be_bytes::<32>());
		bytes[64] = self.recovery_byte.encode(signature.v());
		Ok(bytes)
	}

	fn recover_hash(&self, hash: &B256, signature: &[u8]) -> Result<Address, RecoveryError> {
		let parsed = self.parse_signature(signature)?;
		let recovered = parsed
			.recover_address_from_prehash(hash)
			.map_err(|e| RecoveryError::Recovery(e.to_string()))?;
		if recovered == Address::ZERO {
			return Err(RecoveryError::ZeroAddress);
		}
		Ok(recovered)
	}

	fn signing_key(&self) -> Result<&dyn SigningKey, SigningError> {
		match &self.key {
			KeyState::Keyed(key) => Ok(key.as_ref()),
			KeyState::Keyless { rejected: None } => Err(SigningError::MissingKey),
			KeyState::Keyless {
				rejected: Some(reason),
			} => Err(SigningError::InvalidKey(reason.clone())),
		}
	}

	fn parse_signature(&self, bytes: &[u8]) -> Result<Signature, RecoveryError> {
		if bytes.len() != SIGNATURE_LENGTH {
			return Err(RecoveryError::InvalidLength {
				expected: SIGNATURE_LENGTH,
				actual: bytes.len(),
			});
		}

		let v = bytes[64];
		let y_parity =
			self.recovery_byte
				.decode(v)
				.ok_or(RecoveryError::InvalidRecoveryByte {
					v,
					convention: self.recovery_byte,
				})?;

		let r = U256::from_be_slice(&bytes[..32]);
		let s = U256::from_be_slice(&bytes[32..64]);
		if r.is_zero() || s.is_zero() {
			return Err(RecoveryError::Recovery(
				"r and s must be non-zero".to_string(),
			));
		}
		if s > SECP256K1N_HALF {
			return Err(RecoveryError::MalleableSignature);
		}
		Ok(Signature::new(r, s, y_parity))
	}
}

impl std::fmt::Debug for AuthorizationSigner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AuthorizationSigner")
			.field("domain", self.encoder.domain())
			.field("state", &self.state())
			.field("signer", &self.signer_address())
			.field("recovery_byte", &self.recovery_byte)
			.field("payload_scheme", &self.payload_scheme)
			.finish()
	}
}
