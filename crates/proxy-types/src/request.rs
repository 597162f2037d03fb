//! Signable transfer request and permit payload types.
//!
//! A `TransferRequest` describes exactly one intended token movement and is
//! the payload the sender signs off-chain. Its field order and names are the
//! wire format: any signer or verifier that reorders or renames fields
//! produces digests that will never match existing signatures.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// An immutable description of one intended transfer, signed by `from`.
///
/// `amount` and `relayer_fee` are denominated in the token's smallest unit.
/// `nonce` must equal the account's current ledger value at execution time,
/// and `deadline` is an absolute unix timestamp in seconds after which the
/// request may no longer be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
	/// Account whose funds move and whose signature authorizes the request.
	pub from: Address,
	/// Recipient of `amount`.
	pub to: Address,
	/// Token contract the transfer is denominated in.
	pub token: Address,
	/// Amount delivered to `to`, in the token's smallest unit.
	pub amount: U256,
	/// Fee paid to the submitting relayer, in the token's smallest unit.
	pub relayer_fee: U256,
	/// Per-account replay counter; must match the ledger exactly.
	pub nonce: u64,
	/// Absolute expiry timestamp (unix seconds).
	pub deadline: u64,
}

impl TransferRequest {
	/// Total debit pulled from `from`: `amount + relayer_fee`.
	///
	/// Returns `None` on overflow so callers can reject the request before
	/// touching any state.
	pub fn total_debit(&self) -> Option<U256> {
		self.amount.checked_add(self.relayer_fee)
	}
}

/// A second, independently signed authorization granting the proxy an
/// allowance of `approval_value` on the request's token (EIP-2612 permit).
///
/// The permit carries its own deadline, checked separately from the
/// transfer deadline; a transfer and its permit may legitimately expire at
/// different times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermitData {
	/// Allowance granted to the proxy; must cover `amount + relayer_fee`.
	pub approval_value: U256,
	/// Absolute expiry timestamp of the permit itself (unix seconds).
	pub permit_deadline: u64,
	/// Recovery id of the permit signature (0, 1, 27 or 28).
	pub signature_v: u8,
	/// First 32 bytes of the permit signature.
	pub signature_r: B256,
	/// Second 32 bytes of the permit signature.
	pub signature_s: B256,
}
