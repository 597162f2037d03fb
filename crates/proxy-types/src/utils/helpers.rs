//! Address parsing and clock helpers.

use alloy_primitives::Address;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Error returned when an address string cannot be parsed.
#[derive(Debug, Error)]
#[error("Invalid address '{input}': {reason}")]
pub struct AddressParseError {
	/// The offending input string.
	pub input: String,
	/// Why parsing failed.
	pub reason: String,
}

/// Parses a 20-byte hex address, with or without a `0x` prefix.
pub fn parse_address(s: &str) -> Result<Address, AddressParseError> {
	let trimmed = s.strip_prefix("0x").unwrap_or(s);
	trimmed
		.parse::<Address>()
		.map_err(|e| AddressParseError {
			input: s.to_string(),
			reason: e.to_string(),
		})
}

/// Current unix time in seconds.
///
/// Deadlines are absolute timestamps compared against this clock; there is
/// no mechanism to extend an expired request.
pub fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}
