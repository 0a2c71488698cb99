//! Secret string type for private key material.
//!
//! `SecretString` zeroes its buffer on drop and never prints its contents
//! through `Debug`, `Display` or `Serialize`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

const REDACTED: &str = "***REDACTED***";

/// A string whose contents are wiped on drop and hidden from logs.
///
/// Deliberately not `Clone`: the key text is held once and borrowed through
/// [`with_exposed`](Self::with_exposed) when it has to be parsed.
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret to a closure, limiting where it is visible.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(&self.0)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString({})", REDACTED)
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		self.0.as_str() == other.0.as_str()
	}
}

impl Eq for SecretString {}

// Serialization always redacts; keys are only ever read in, never written out.
impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(SecretString::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	#[test]
	fn test_debug_and_display_redact() {
		let secret = SecretString::from(KEY);
		let debug_str = format!("{:?}", secret);
		let display_str = format!("{}", secret);
		assert_eq!(debug_str, "SecretString(***REDACTED***)");
		assert_eq!(display_str, "***REDACTED***");
		assert!(!debug_str.contains("ac0974"));
	}

	#[test]
	fn test_serialize_redacts() {
		let secret = SecretString::from(KEY);
		let json = serde_json::to_string(&secret).unwrap();
		assert_eq!(json, "\"***REDACTED***\"");

		let back: SecretString = serde_json::from_str(&format!("\"{}\"", KEY)).unwrap();
		assert_eq!(back, secret);
	}

	#[test]
	fn test_with_exposed() {
		let secret = SecretString::from(KEY);
		let len = secret.with_exposed(|s| {
			assert_eq!(s, KEY);
			s.len()
		});
		assert_eq!(len, 66);
		assert_eq!(secret.len(), 66);
	}

	#[test]
	fn test_blank_is_empty() {
		assert!(SecretString::from("").is_empty());
		assert!(SecretString::from("   ").is_empty());
		assert!(!SecretString::from(KEY).is_empty());
	}
}
