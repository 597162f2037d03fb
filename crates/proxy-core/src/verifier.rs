//! Signature verification as a swappable primitive.
//!
//! The executor only depends on the [`SignatureVerifier`] trait, so the
//! underlying cryptographic scheme can be substituted without touching the
//! orchestration logic.

use crate::TransferError;
use alloy_primitives::PrimitiveSignature;
use proxy_types::{Address, B256};

/// Recovers the signing address from a digest + signature pair.
pub trait SignatureVerifier: Send + Sync {
	/// Returns the address that signed `digest`.
	///
	/// Fails with [`TransferError::SignatureInvalid`] when the signature is
	/// malformed (wrong length, out-of-range components) or recovery yields
	/// no address.
	fn recover(&self, digest: &B256, signature: &[u8]) -> Result<Address, TransferError>;
}

/// secp256k1 ECDSA recovery over 65-byte `r || s || v` signatures.
pub struct EcdsaRecoveryVerifier;

impl SignatureVerifier for EcdsaRecoveryVerifier {
	fn recover(&self, digest: &B256, signature: &[u8]) -> Result<Address, TransferError> {
		let parsed = PrimitiveSignature::try_from(signature)
			.map_err(|_| TransferError::SignatureInvalid)?;
		parsed
			.recover_address_from_prehash(digest)
			.map_err(|_| TransferError::SignatureInvalid)
	}
}
