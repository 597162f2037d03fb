//! In-memory testnet token implementation.
//!
//! A faithful stand-in for the testnet stablecoin the proxy is deployed
//! against: fixed initial supply to the deployer, a capped faucet, a
//! blacklist enforced on senders, and full EIP-2612 permit support with its
//! own domain separator and per-owner permit nonces.

use crate::{TokenError, TokenInterface};
use alloy_primitives::{keccak256, normalize_v, PrimitiveSignature};
use async_trait::async_trait;
use proxy_types::utils::eip712::{compute_domain_hash, compute_final_digest, StructEncoder};
use proxy_types::{unix_now, Address, B256, U256};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// EIP-2612 permit type string.
const PERMIT_TYPE: &str =
	"Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";

/// Initial supply minted to the deployer, in whole tokens.
const INITIAL_SUPPLY_WHOLE: u64 = 1_000_000;

/// Maximum faucet mint per call, in whole tokens.
const FAUCET_LIMIT_WHOLE: u64 = 10_000;

/// Mutable ledger state behind the token's lock.
#[derive(Debug, Default)]
struct TokenState {
	balances: HashMap<Address, U256>,
	/// (owner, spender) -> remaining allowance.
	allowances: HashMap<(Address, Address), U256>,
	permit_nonces: HashMap<Address, U256>,
	blacklist: HashSet<Address>,
	total_supply: U256,
}

/// In-memory fungible token with faucet, blacklist, and EIP-2612 permit.
pub struct TestnetToken {
	name: String,
	symbol: String,
	decimals: u8,
	address: Address,
	/// Cached EIP-712 domain separator for permit digests.
	domain_separator: B256,
	permit_typehash: B256,
	faucet_limit: U256,
	state: RwLock<TokenState>,
}

impl TestnetToken {
	/// Deploys the token, minting the initial supply to `deployer`.
	pub fn new(
		name: &str,
		symbol: &str,
		decimals: u8,
		chain_id: u64,
		address: Address,
		deployer: Address,
	) -> Self {
		let unit = U256::from(10u64).pow(U256::from(decimals));
		let initial_supply = U256::from(INITIAL_SUPPLY_WHOLE) * unit;

		let mut state = TokenState::default();
		state.balances.insert(deployer, initial_supply);
		state.total_supply = initial_supply;

		Self {
			name: name.to_string(),
			symbol: symbol.to_string(),
			decimals,
			address,
			domain_separator: compute_domain_hash(name, "1", chain_id, &address),
			permit_typehash: keccak256(PERMIT_TYPE.as_bytes()),
			faucet_limit: U256::from(FAUCET_LIMIT_WHOLE) * unit,
			state: RwLock::new(state),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn symbol(&self) -> &str {
		&self.symbol
	}

	pub fn decimals(&self) -> u8 {
		self.decimals
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub async fn total_supply(&self) -> U256 {
		self.state.read().await.total_supply
	}

	/// Mints `amount` to `to`, capped per call.
	pub async fn faucet(&self, to: Address, amount: U256) -> Result<(), TokenError> {
		if amount > self.faucet_limit {
			return Err(TokenError::FaucetLimitExceeded);
		}
		let mut state = self.state.write().await;
		let balance = state.balances.entry(to).or_default();
		*balance = balance
			.checked_add(amount)
			.ok_or(TokenError::AmountOverflow)?;
		state.total_supply = state
			.total_supply
			.checked_add(amount)
			.ok_or(TokenError::AmountOverflow)?;
		Ok(())
	}

	/// Adds or removes `account` from the sender blacklist.
	pub async fn set_blacklisted(&self, account: Address, blacklisted: bool) {
		let mut state = self.state.write().await;
		if blacklisted {
			state.blacklist.insert(account);
		} else {
			state.blacklist.remove(&account);
		}
	}

	/// Direct allowance grant, the pre-approval path a sender uses when the
	/// token has no permit capability.
	pub async fn approve(&self, owner: Address, spender: Address, value: U256) {
		let mut state = self.state.write().await;
		state.allowances.insert((owner, spender), value);
	}

	/// Remaining allowance of `spender` on `owner`'s balance.
	pub async fn allowance(&self, owner: Address, spender: Address) -> U256 {
		self.state
			.read()
			.await
			.allowances
			.get(&(owner, spender))
			.copied()
			.unwrap_or_default()
	}

	/// The EIP-712 digest an owner signs to authorize a permit with the
	/// given nonce. Exposed so off-process signers build the exact digest
	/// the token verifies.
	pub fn permit_digest(
		&self,
		owner: Address,
		spender: Address,
		value: U256,
		nonce: U256,
		deadline: u64,
	) -> B256 {
		let mut enc = StructEncoder::new();
		enc.push_b256(&self.permit_typehash);
		enc.push_address(&owner);
		enc.push_address(&spender);
		enc.push_u256(value);
		enc.push_u256(nonce);
		enc.push_u64(deadline);
		let struct_hash = keccak256(enc.finish());
		compute_final_digest(&self.domain_separator, &struct_hash)
	}

	fn move_balance(
		state: &mut TokenState,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), TokenError> {
		if state.blacklist.contains(&from) {
			return Err(TokenError::SenderBlacklisted(from));
		}
		let from_balance = state.balances.get(&from).copied().unwrap_or_default();
		if from_balance < amount {
			return Err(TokenError::InsufficientBalance);
		}
		state.balances.insert(from, from_balance - amount);
		let to_balance = state.balances.entry(to).or_default();
		*to_balance = to_balance
			.checked_add(amount)
			.ok_or(TokenError::AmountOverflow)?;
		Ok(())
	}
}

#[async_trait]
impl TokenInterface for TestnetToken {
	async fn balance_of(&self, account: Address) -> U256 {
		self.state
			.read()
			.await
			.balances
			.get(&account)
			.copied()
			.unwrap_or_default()
	}

	async fn transfer(
		&self,
		caller: Address,
		to: Address,
		amount: U256,
	) -> Result<(), TokenError> {
		let mut state = self.state.write().await;
		Self::move_balance(&mut state, caller, to, amount)
	}

	async fn transfer_from(
		&self,
		caller: Address,
		owner: Address,
		to: Address,
		amount: U256,
	) -> Result<(), TokenError> {
		let mut state = self.state.write().await;
		let allowance = state
			.allowances
			.get(&(owner, caller))
			.copied()
			.unwrap_or_default();
		if allowance < amount {
			return Err(TokenError::InsufficientAllowance);
		}
		Self::move_balance(&mut state, owner, to, amount)?;
		state.allowances.insert((owner, caller), allowance - amount);
		Ok(())
	}

	async fn permit(
		&self,
		owner: Address,
		spender: Address,
		value: U256,
		deadline: u64,
		v: u8,
		r: B256,
		s: B256,
	) -> Result<(), TokenError> {
		if unix_now() > deadline {
			return Err(TokenError::PermitExpired);
		}

		let mut state = self.state.write().await;
		let nonce = state.permit_nonces.get(&owner).copied().unwrap_or_default();
		let digest = self.permit_digest(owner, spender, value, nonce, deadline);

		let parity = normalize_v(v as u64).ok_or(TokenError::InvalidPermitSignature)?;
		let signature = PrimitiveSignature::new(
			U256::from_be_bytes(r.0),
			U256::from_be_bytes(s.0),
			parity,
		);
		let recovered = signature
			.recover_address_from_prehash(&digest)
			.map_err(|_| TokenError::InvalidPermitSignature)?;
		if recovered != owner {
			return Err(TokenError::InvalidPermitSignature);
		}

		state.permit_nonces.insert(owner, nonce + U256::from(1u64));
		state.allowances.insert((owner, spender), value);
		tracing::debug!(%owner, %spender, %value, "Permit granted");
		Ok(())
	}

	async fn permit_nonce(&self, owner: Address) -> Result<U256, TokenError> {
		Ok(self
			.state
			.read()
			.await
			.permit_nonces
			.get(&owner)
			.copied()
			.unwrap_or_default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_signer::SignerSync;
	use alloy_signer_local::PrivateKeySigner;

	fn addr(byte: u8) -> Address {
		Address::repeat_byte(byte)
	}

	fn units(whole: u64) -> U256 {
		U256::from(whole) * U256::from(10u64).pow(U256::from(6u64))
	}

	fn deploy() -> TestnetToken {
		TestnetToken::new("Test USDC", "TUSDC", 6, 31337, addr(0xee), addr(0x01))
	}

	#[tokio::test]
	async fn test_initial_supply_to_deployer() {
		let token = deploy();
		assert_eq!(token.balance_of(addr(0x01)).await, units(1_000_000));
		assert_eq!(token.total_supply().await, units(1_000_000));
	}

	#[tokio::test]
	async fn test_transfer_moves_balance() {
		let token = deploy();
		token
			.transfer(addr(0x01), addr(0x02), units(100))
			.await
			.unwrap();
		assert_eq!(token.balance_of(addr(0x02)).await, units(100));
	}

	#[tokio::test]
	async fn test_transfer_insufficient_balance() {
		let token = deploy();
		let result = token.transfer(addr(0x02), addr(0x03), units(1)).await;
		assert_eq!(result, Err(TokenError::InsufficientBalance));
	}

	#[tokio::test]
	async fn test_blacklisted_sender_rejected() {
		let token = deploy();
		token
			.transfer(addr(0x01), addr(0x02), units(100))
			.await
			.unwrap();
		token.set_blacklisted(addr(0x02), true).await;
		let result = token.transfer(addr(0x02), addr(0x03), units(50)).await;
		assert_eq!(result, Err(TokenError::SenderBlacklisted(addr(0x02))));
	}

	#[tokio::test]
	async fn test_faucet_within_limit() {
		let token = deploy();
		token.faucet(addr(0x05), units(1_000)).await.unwrap();
		assert_eq!(token.balance_of(addr(0x05)).await, units(1_000));
	}

	#[tokio::test]
	async fn test_faucet_limit_exceeded() {
		let token = deploy();
		let result = token.faucet(addr(0x05), units(20_000)).await;
		assert_eq!(result, Err(TokenError::FaucetLimitExceeded));
	}

	#[tokio::test]
	async fn test_transfer_from_consumes_allowance() {
		let token = deploy();
		token.approve(addr(0x01), addr(0x02), units(60)).await;
		token
			.transfer_from(addr(0x02), addr(0x01), addr(0x03), units(40))
			.await
			.unwrap();
		assert_eq!(token.balance_of(addr(0x03)).await, units(40));
		assert_eq!(token.allowance(addr(0x01), addr(0x02)).await, units(20));

		let result = token
			.transfer_from(addr(0x02), addr(0x01), addr(0x03), units(40))
			.await;
		assert_eq!(result, Err(TokenError::InsufficientAllowance));
	}

	#[tokio::test]
	async fn test_permit_grants_allowance() {
		let token = deploy();
		let signer = PrivateKeySigner::random();
		let owner = signer.address();
		let spender = addr(0x09);
		let deadline = unix_now() + 3600;

		let nonce = token.permit_nonce(owner).await.unwrap();
		let digest = token.permit_digest(owner, spender, units(101), nonce, deadline);
		let signature = signer.sign_hash_sync(&digest).unwrap();

		token
			.permit(
				owner,
				spender,
				units(101),
				deadline,
				signature.v() as u8,
				signature.r().into(),
				signature.s().into(),
			)
			.await
			.unwrap();

		assert_eq!(token.allowance(owner, spender).await, units(101));
		assert_eq!(
			token.permit_nonce(owner).await.unwrap(),
			U256::from(1u64)
		);
	}

	#[tokio::test]
	async fn test_permit_rejects_wrong_signer() {
		let token = deploy();
		let signer = PrivateKeySigner::random();
		let owner = addr(0x0a); // not the signer
		let deadline = unix_now() + 3600;

		let digest = token.permit_digest(owner, addr(0x09), units(101), U256::ZERO, deadline);
		let signature = signer.sign_hash_sync(&digest).unwrap();

		let result = token
			.permit(
				owner,
				addr(0x09),
				units(101),
				deadline,
				signature.v() as u8,
				signature.r().into(),
				signature.s().into(),
			)
			.await;
		assert_eq!(result, Err(TokenError::InvalidPermitSignature));
	}

	#[tokio::test]
	async fn test_permit_rejects_expired_deadline() {
		let token = deploy();
		let result = token
			.permit(
				addr(0x0a),
				addr(0x09),
				units(101),
				1, // long past
				27,
				B256::ZERO,
				B256::ZERO,
			)
			.await;
		assert_eq!(result, Err(TokenError::PermitExpired));
	}
}
