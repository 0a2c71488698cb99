//! Subcommand implementations.
//!
//! Each command returns the JSON value that `main` prints, which keeps them
//! testable without capturing stdout.

use alloy_primitives::{hex, Address, U256};
use clap::Args;
use erc8004_config::Config;
use erc8004_signer::{AuthError, AuthorizationSigner, TypedDataEncoder};
use erc8004_types::{FeedbackAuthorization, FeedbackAuthorizationBuilder, UintInput};
use serde_json::{json, Value};
use std::error::Error;
use tracing::{info, warn};

/// Per-authorization values supplied on the command line.
#[derive(Args, Debug, Clone)]
pub struct AuthArgs {
	/// Agent id (decimal or 0x hex)
	#[arg(long)]
	pub agent_id: String,

	/// Client address allowed to give feedback
	#[arg(long)]
	pub client: String,

	/// Highest feedback index covered; defaults to the configured value
	#[arg(long)]
	pub index_limit: Option<String>,

	/// Absolute expiry as a Unix timestamp
	#[arg(long, conflicts_with = "ttl")]
	pub expiry: Option<String>,

	/// Lifetime in seconds from now; defaults to the configured value
	#[arg(long)]
	pub ttl: Option<u64>,
}

/// Values of an authorization that has already been signed.
///
/// Every field is required: a signature only recovers its signer against the
/// exact values it was made over, so nothing is filled from defaults or the
/// clock.
#[derive(Args, Debug, Clone)]
pub struct SignedAuthArgs {
	/// Agent id (decimal or 0x hex)
	#[arg(long)]
	pub agent_id: String,

	/// Client address allowed to give feedback
	#[arg(long)]
	pub client: String,

	/// Highest feedback index covered
	#[arg(long)]
	pub index_limit: String,

	/// Absolute expiry as a Unix timestamp
	#[arg(long)]
	pub expiry: String,
}

/// Loaded configuration plus the signer built from it.
pub struct Context {
	config: Config,
	signer: AuthorizationSigner,
	identity_registry: Address,
}

impl Context {
	pub fn from_config(config: Config) -> Result<Self, Box<dyn Error>> {
		let encoder = TypedDataEncoder::new(config.feedback_domain()?);
		let signer = match config.private_key() {
			Some(key) => {
				AuthorizationSigner::from_private_key(encoder, key, config.recovery_byte())
			},
			None => AuthorizationSigner::keyless(encoder, config.recovery_byte()),
		}
		.with_payload_scheme(config.payload_scheme());
		let identity_registry = config.identity_registry()?;

		Ok(Self {
			config,
			signer,
			identity_registry,
		})
	}

	fn params(&self, args: &AuthArgs, now: u64) -> FeedbackAuthorizationBuilder {
		let defaults = &self.config.authorization;
		let index_limit: UintInput = match &args.index_limit {
			Some(limit) => limit.as_str().into(),
			None => defaults.default_index_limit.into(),
		};
		let expiry: UintInput = match &args.expiry {
			Some(expiry) => expiry.as_str().into(),
			None => {
				let ttl = args.ttl.unwrap_or(defaults.default_ttl_seconds);
				(U256::from(now) + U256::from(ttl)).into()
			},
		};

		FeedbackAuthorization::builder()
			.agent_id(args.agent_id.as_str())
			.client_address(args.client.as_str())
			.index_limit(index_limit)
			.expiry(expiry)
			.chain_id(self.config.network.chain_id)
			.identity_registry(self.identity_registry)
	}

	fn signed_params(&self, args: &SignedAuthArgs) -> FeedbackAuthorizationBuilder {
		FeedbackAuthorization::builder()
			.agent_id(args.agent_id.as_str())
			.client_address(args.client.as_str())
			.index_limit(args.index_limit.as_str())
			.expiry(args.expiry.as_str())
			.chain_id(self.config.network.chain_id)
			.identity_registry(self.identity_registry)
	}
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
	u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

fn message(context: &Context, authorization: &FeedbackAuthorization) -> Value {
	context.signer.encoder().typed_data(authorization)["message"].clone()
}

pub fn address(context: &Context) -> Result<Value, Box<dyn Error>> {
	let address = context.signer.require_key().map_err(AuthError::from)?;
	Ok(json!({ "signer": address.to_checksum(None) }))
}

pub fn digest(context: &Context, args: &AuthArgs, now: u64) -> Result<Value, Box<dyn Error>> {
	let encoded = context
		.signer
		.encoder()
		.encode_params(context.params(args, now))
		.map_err(AuthError::from)?;

	Ok(json!({
		"domainSeparator": encoded.domain_separator,
		"structHash": encoded.struct_hash,
		"digest": encoded.digest,
		"typedData": encoded.typed_data,
	}))
}

pub fn build(context: &Context, args: &AuthArgs, now: u64) -> Result<Value, Box<dyn Error>> {
	let authorization = context.params(args, now).build().map_err(AuthError::from)?;
	let signed = context.signer.sign(&authorization)?;
	let payload = context.signer.sign_payload(&authorization)?;
	if signed.authorization.is_expired_at(now) {
		warn!(
			expiry = %signed.authorization.expiry,
			now,
			"Signed an authorization that has already expired"
		);
	}
	info!(signer = %signed.signer, "Built feedback authorization");

	Ok(json!({
		"authorization": message(context, &signed.authorization),
		"digest": signed.digest,
		"signer": signed.signer.to_checksum(None),
		"signature": signed.signature_hex(),
		"feedbackAuth": payload.to_hex().map_err(AuthError::from)?,
		"payloadScheme": context.signer.payload_scheme(),
	}))
}

pub fn recover(
	context: &Context,
	args: &SignedAuthArgs,
	signature: &str,
) -> Result<Value, Box<dyn Error>> {
	let authorization = context.signed_params(args).build().map_err(AuthError::from)?;
	let signature = hex::decode(signature.trim())
		.map_err(|e| format!("Signature is not valid hex: {}", e))?;
	let signer = context.signer.recover(&authorization, &signature)?;

	Ok(json!({
		"authorization": message(context, &authorization),
		"signer": signer.to_checksum(None),
	}))
}

pub fn decode(context: &Context, payload: &str) -> Result<Value, Box<dyn Error>> {
	let bytes =
		hex::decode(payload.trim()).map_err(|e| format!("Payload is not valid hex: {}", e))?;
	let decoded = context.signer.recover_payload(&bytes)?;
	let authorization = decoded.authorization;

	if authorization.chain_id != context.config.network.chain_id
		|| authorization.identity_registry != context.identity_registry
	{
		warn!(
			chain_id = authorization.chain_id,
			identity_registry = %authorization.identity_registry,
			"Payload is scoped to a different chain or registry than configured"
		);
	}

	Ok(json!({
		"authorization": message(context, &authorization),
		"signer": decoded.signer_address.to_checksum(None),
		"signature": hex::encode_prefixed(decoded.signature),
	}))
}
