//! Per-account monotonic nonce ledger, the sole replay-prevention
//! mechanism.
//!
//! A request's nonce must equal the account's current ledger value exactly;
//! on success the ledger advances by exactly 1. Consumption happens before
//! any external fund-movement call, so a reentrant invocation observes the
//! already-advanced nonce and cannot replay mid-execution.

use crate::TransferError;
use proxy_types::Address;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Mapping of account -> next expected nonce, starting at 0.
pub struct NonceLedger {
	entries: RwLock<HashMap<Address, u64>>,
}

impl Default for NonceLedger {
	fn default() -> Self {
		Self::new()
	}
}

impl NonceLedger {
	pub fn new() -> Self {
		Self {
			entries: RwLock::new(HashMap::new()),
		}
	}

	/// The next expected nonce for `account` (0 for unseen accounts).
	pub async fn peek(&self, account: Address) -> u64 {
		self.entries
			.read()
			.await
			.get(&account)
			.copied()
			.unwrap_or(0)
	}

	/// Consumes `presented` for `account`, advancing the ledger by exactly
	/// 1. Fails with [`TransferError::NonceMismatch`] unless `presented`
	/// equals the current ledger value.
	pub async fn consume(&self, account: Address, presented: u64) -> Result<(), TransferError> {
		let mut entries = self.entries.write().await;
		let expected = entries.get(&account).copied().unwrap_or(0);
		if presented != expected {
			return Err(TransferError::NonceMismatch {
				account,
				presented,
				expected,
			});
		}
		entries.insert(account, expected + 1);
		Ok(())
	}

	/// Rewinds `account` by one step after an external call failed
	/// mid-execution, restoring the pre-request state so the aborted
	/// request leaves no trace. Only the executor calls this, only after
	/// `consume` succeeded for the same request, and only while holding
	/// the account's execution lock, so the rewind cannot cross a nonce
	/// another request committed in between.
	pub(crate) async fn rollback(&self, account: Address) {
		let mut entries = self.entries.write().await;
		if let Some(value) = entries.get_mut(&account) {
			*value = value.saturating_sub(1);
		}
	}
}
