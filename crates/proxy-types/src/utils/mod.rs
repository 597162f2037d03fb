//! Utility functions shared across the proxy crates.

/// EIP-712 hashing helpers and the minimal static ABI encoder.
pub mod eip712;
/// Address parsing and clock helpers.
pub mod helpers;

pub use helpers::{parse_address, unix_now, AddressParseError};
