//! Token boundary module for the gasless transfer proxy.
//!
//! The underlying fungible token is an external collaborator: the proxy
//! only requires a transfer/balance interface and, optionally, an
//! EIP-2612 delegated-approval ("permit") interface. This module defines
//! that boundary as [`TokenInterface`], the [`PermitAdapter`] that probes
//! and invokes the optional permit capability, and an in-memory testnet
//! token implementation used in-process and in tests.

use async_trait::async_trait;
use proxy_types::{Address, B256, U256};
use thiserror::Error;

mod adapter;
pub use adapter::PermitAdapter;

/// Re-export implementations
pub mod implementations {
	pub mod testnet;
}

/// Errors surfaced by a token collaborator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
	/// The owner's balance does not cover the requested movement.
	#[error("Insufficient balance")]
	InsufficientBalance,
	/// The spender's allowance does not cover the requested movement.
	#[error("Insufficient allowance")]
	InsufficientAllowance,
	/// The sending account is blacklisted by the token.
	#[error("Sender {0} is blacklisted")]
	SenderBlacklisted(Address),
	/// The token does not implement the delegated-approval interface.
	#[error("Token does not support permit")]
	PermitUnsupported,
	/// The permit's deadline has passed.
	#[error("Permit expired")]
	PermitExpired,
	/// The permit signature does not recover to the stated owner.
	#[error("Invalid permit signature")]
	InvalidPermitSignature,
	/// The permit nonce does not match the owner's current permit nonce.
	#[error("Permit nonce mismatch")]
	PermitNonceMismatch,
	/// A faucet mint exceeded the per-call cap.
	#[error("Faucet limit exceeded")]
	FaucetLimitExceeded,
	/// Arithmetic overflow in a balance or supply update.
	#[error("Amount overflow")]
	AmountOverflow,
}

/// Interface a token must expose for the proxy to move its funds.
///
/// Calls carry an explicit `caller` where the on-chain equivalent would use
/// the message sender: `transfer` moves the caller's own funds, while
/// `transfer_from` spends the caller's allowance on `owner`'s funds.
///
/// The permit methods have rejecting defaults; a token that implements
/// EIP-2612 overrides both, and [`PermitAdapter`] uses the nonce read as
/// its capability probe.
#[async_trait]
pub trait TokenInterface: Send + Sync {
	/// Balance of `account` in the token's smallest unit.
	async fn balance_of(&self, account: Address) -> U256;

	/// Moves `amount` from `caller` to `to`.
	async fn transfer(&self, caller: Address, to: Address, amount: U256)
		-> Result<(), TokenError>;

	/// Moves `amount` from `owner` to `to`, spending `caller`'s allowance.
	async fn transfer_from(
		&self,
		caller: Address,
		owner: Address,
		to: Address,
		amount: U256,
	) -> Result<(), TokenError>;

	/// Grants `spender` an allowance of `value` on `owner`'s balance,
	/// authorized by `owner`'s EIP-2612 signature.
	async fn permit(
		&self,
		_owner: Address,
		_spender: Address,
		_value: U256,
		_deadline: u64,
		_v: u8,
		_r: B256,
		_s: B256,
	) -> Result<(), TokenError> {
		Err(TokenError::PermitUnsupported)
	}

	/// Current permit nonce of `owner`. Also serves as the capability probe
	/// for permit support.
	async fn permit_nonce(&self, _owner: Address) -> Result<U256, TokenError> {
		Err(TokenError::PermitUnsupported)
	}
}
