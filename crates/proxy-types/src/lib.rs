//! Common types module for the gasless transfer proxy.
//!
//! This module defines the core data types and structures shared by the
//! proxy components. It provides a centralized location for the signable
//! wire types, emitted records, and hashing utilities so that every
//! component canonicalizes requests the exact same way.

/// Emitted record types and the broadcast channel they travel on.
pub mod events;
/// Signable transfer request and permit payload types.
pub mod request;
/// EIP-712 hashing and address parsing utilities.
pub mod utils;

// Re-export all types for convenient access
pub use events::*;
pub use request::*;
pub use utils::{parse_address, unix_now};

/// Re-export the EVM primitives used throughout the proxy so downstream
/// crates share a single alloy-primitives surface.
pub use alloy_primitives::{Address, B256, U256};
