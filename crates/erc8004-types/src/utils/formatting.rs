//! String formatting utilities.
//!
//! Provides functions for managing the "0x" prefix of hex strings.

/// Adds "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.to_lowercase().starts_with("0x") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_with_0x_prefix() {
		assert_eq!(
			with_0x_prefix("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
			"0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
		);
		assert_eq!(with_0x_prefix("0xdead"), "0xdead");
		assert_eq!(with_0x_prefix("0Xdead"), "0Xdead");
	}

	#[test]
	fn test_without_0x_prefix() {
		assert_eq!(without_0x_prefix("0xdead"), "dead");
		assert_eq!(without_0x_prefix("0Xdead"), "dead");
		assert_eq!(without_0x_prefix("dead"), "dead");
	}
}
