//! Permit adapter: probed access to a token's delegated-approval capability.
//!
//! Permit support is a static property of a deployed token, so the probe
//! result is cached per token address and never re-evaluated.

use crate::{TokenError, TokenInterface};
use proxy_types::{Address, B256, U256};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Adapter over the optional EIP-2612 capability of token collaborators.
pub struct PermitAdapter {
	/// Token address -> probed permit support.
	probe_cache: RwLock<HashMap<Address, bool>>,
}

impl Default for PermitAdapter {
	fn default() -> Self {
		Self::new()
	}
}

impl PermitAdapter {
	pub fn new() -> Self {
		Self {
			probe_cache: RwLock::new(HashMap::new()),
		}
	}

	/// Best-effort capability probe: attempts the token's permit-nonce read
	/// and caches whether it succeeded.
	pub async fn check_permit_support(
		&self,
		token_address: Address,
		token: &dyn TokenInterface,
	) -> bool {
		if let Some(&supported) = self.probe_cache.read().await.get(&token_address) {
			return supported;
		}

		let supported = token.permit_nonce(Address::ZERO).await.is_ok();
		tracing::debug!(token = %token_address, supported, "Probed permit support");
		self.probe_cache
			.write()
			.await
			.insert(token_address, supported);
		supported
	}

	/// Invokes the token's permit call to grant `spender` an allowance of
	/// `value` on `owner`'s balance.
	///
	/// Fails with [`TokenError::PermitUnsupported`] without touching the
	/// token when the cached probe is negative.
	#[allow(clippy::too_many_arguments)]
	pub async fn grant_allowance(
		&self,
		token_address: Address,
		token: &dyn TokenInterface,
		owner: Address,
		spender: Address,
		value: U256,
		deadline: u64,
		v: u8,
		r: B256,
		s: B256,
	) -> Result<(), TokenError> {
		if !self.check_permit_support(token_address, token).await {
			return Err(TokenError::PermitUnsupported);
		}
		token.permit(owner, spender, value, deadline, v, r, s).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;

	/// Token with no permit capability at all.
	struct PlainToken;

	#[async_trait]
	impl TokenInterface for PlainToken {
		async fn balance_of(&self, _account: Address) -> U256 {
			U256::ZERO
		}

		async fn transfer(
			&self,
			_caller: Address,
			_to: Address,
			_amount: U256,
		) -> Result<(), TokenError> {
			Ok(())
		}

		async fn transfer_from(
			&self,
			_caller: Address,
			_owner: Address,
			_to: Address,
			_amount: U256,
		) -> Result<(), TokenError> {
			Ok(())
		}
	}

	#[tokio::test]
	async fn test_negative_probe_is_cached_and_blocks_grant() {
		let adapter = PermitAdapter::new();
		let token = PlainToken;
		let token_address = Address::repeat_byte(0x01);

		assert!(!adapter.check_permit_support(token_address, &token).await);
		// Second call hits the cache.
		assert!(!adapter.check_permit_support(token_address, &token).await);

		let result = adapter
			.grant_allowance(
				token_address,
				&token,
				Address::repeat_byte(0x02),
				Address::repeat_byte(0x03),
				U256::from(1u64),
				u64::MAX,
				27,
				B256::ZERO,
				B256::ZERO,
			)
			.await;
		assert_eq!(result, Err(TokenError::PermitUnsupported));
	}
}
