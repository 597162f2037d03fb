//! Core engine for the gasless transfer proxy.
//!
//! This crate is the authorization-and-execution engine: canonical message
//! hashing ([`AuthorizationCodec`]), signature verification
//! ([`SignatureVerifier`]), nonce-based replay protection ([`NonceLedger`]),
//! and the orchestrating [`TransferExecutor`] with its two execution paths
//! (pre-approved allowance vs. bundled permit).

use proxy_token::TokenError;
use proxy_types::{Address, U256};
use thiserror::Error;

mod codec;
mod executor;
mod nonce;
mod verifier;

pub use codec::{AuthorizationCodec, DomainDescriptor};
pub use executor::TransferExecutor;
pub use nonce::NonceLedger;
pub use verifier::{EcdsaRecoveryVerifier, SignatureVerifier};

/// Errors that abort a transfer request.
///
/// Every variant aborts the entire request atomically; nothing is retried
/// internally. The only recovery path is resubmission with corrected inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
	/// The signature is malformed, recovers to no address, or recovers to
	/// an address other than the claimed sender. Deliberately a single
	/// variant so callers cannot probe which part of verification failed.
	#[error("Invalid signature")]
	SignatureInvalid,
	/// The presented nonce does not match the account's current ledger
	/// value. Covers both replay and out-of-order submission.
	#[error("Nonce mismatch for {account}: presented {presented}, expected {expected}")]
	NonceMismatch {
		account: Address,
		presented: u64,
		expected: u64,
	},
	/// The request's (or permit's) deadline has passed.
	#[error("Request expired: deadline {deadline}, now {now}")]
	RequestExpired { deadline: u64, now: u64 },
	/// The token is not on the support allow-list.
	#[error("Token {0} is not supported")]
	TokenUnsupported(Address),
	/// The submitting relayer is not on the relayer allow-list.
	#[error("Relayer {0} is not authorized")]
	RelayerUnauthorized(Address),
	/// The permit's approval value does not cover amount + fee, or the
	/// total overflows.
	#[error("Permit approval {approved} does not cover required {required}")]
	AllowanceInsufficient { required: U256, approved: U256 },
	/// The token has no permit capability.
	#[error("Token {0} does not support permit")]
	PermitUnsupported(Address),
	/// The underlying token call was rejected.
	#[error("Token transfer failed: {0}")]
	TransferFailed(#[from] TokenError),
}
