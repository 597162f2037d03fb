//! Registry module for the gasless transfer proxy.
//!
//! This module owns the two allow-lists every execution consults: which
//! relayers may submit requests, and which tokens the proxy will move.
//! Reads go through [`RegistryStore`]; mutations go exclusively through
//! [`AdminController`], which gates every write on the configured owner and
//! emits a change record for each successful mutation.

use proxy_types::{Address, EventSender, ProxyEvent};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during admin operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminError {
	/// The caller is not the configured owner.
	#[error("Caller {0} is not the registry owner")]
	CallerUnauthorized(Address),
}

/// The two owner-mutable allow-lists: authorized relayers and supported
/// tokens.
///
/// The store is plain data; shared access and serialization of mutations
/// are provided by the `Arc<RwLock<_>>` the engine and the admin controller
/// hold jointly.
#[derive(Debug)]
pub struct RegistryStore {
	/// The single account allowed to mutate the registries.
	owner: Address,
	/// Relayer address -> authorized flag.
	relayers: HashMap<Address, bool>,
	/// Token address -> supported flag.
	tokens: HashMap<Address, bool>,
}

impl RegistryStore {
	/// Creates a store seeded with the initial owner, relayer set, and
	/// supported token set.
	pub fn new(owner: Address, initial_relayers: &[Address], initial_tokens: &[Address]) -> Self {
		let relayers = initial_relayers.iter().map(|a| (*a, true)).collect();
		let tokens = initial_tokens.iter().map(|a| (*a, true)).collect();
		Self {
			owner,
			relayers,
			tokens,
		}
	}

	/// The single configured owner.
	pub fn owner(&self) -> Address {
		self.owner
	}

	/// Whether `relayer` may submit requests.
	pub fn is_relayer_authorized(&self, relayer: Address) -> bool {
		self.relayers.get(&relayer).copied().unwrap_or(false)
	}

	/// Whether the proxy will move `token`.
	pub fn is_token_supported(&self, token: Address) -> bool {
		self.tokens.get(&token).copied().unwrap_or(false)
	}

	fn set_relayer(&mut self, relayer: Address, authorized: bool) {
		self.relayers.insert(relayer, authorized);
	}

	fn set_token(&mut self, token: Address, supported: bool) {
		self.tokens.insert(token, supported);
	}
}

/// Owner-gated mutation entry points over [`RegistryStore`].
///
/// Each successful mutation emits the corresponding change record on the
/// proxy's event channel.
pub struct AdminController {
	store: Arc<RwLock<RegistryStore>>,
	events: EventSender,
}

impl AdminController {
	/// Creates a controller over a shared registry store.
	pub fn new(store: Arc<RwLock<RegistryStore>>, events: EventSender) -> Self {
		Self { store, events }
	}

	/// Sets a relayer's authorization state. Only the owner may call this.
	pub async fn set_relayer_authorization(
		&self,
		caller: Address,
		relayer: Address,
		authorized: bool,
	) -> Result<(), AdminError> {
		let mut store = self.store.write().await;
		if caller != store.owner {
			return Err(AdminError::CallerUnauthorized(caller));
		}
		store.set_relayer(relayer, authorized);
		drop(store);

		tracing::info!(%relayer, authorized, "Relayer authorization updated");
		// Nobody listening is fine; records are advisory.
		let _ = self.events.send(ProxyEvent::RelayerAuthorizationUpdated {
			relayer,
			authorized,
		});
		Ok(())
	}

	/// Sets a token's support state. Only the owner may call this.
	pub async fn set_token_support(
		&self,
		caller: Address,
		token: Address,
		supported: bool,
	) -> Result<(), AdminError> {
		let mut store = self.store.write().await;
		if caller != store.owner {
			return Err(AdminError::CallerUnauthorized(caller));
		}
		store.set_token(token, supported);
		drop(store);

		tracing::info!(%token, supported, "Token support status updated");
		let _ = self
			.events
			.send(ProxyEvent::TokenSupportStatusUpdated { token, supported });
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proxy_types::event_channel;

	fn addr(byte: u8) -> Address {
		Address::repeat_byte(byte)
	}

	fn setup() -> (
		Arc<RwLock<RegistryStore>>,
		AdminController,
		proxy_types::EventReceiver,
	) {
		let owner = addr(0x01);
		let store = Arc::new(RwLock::new(RegistryStore::new(
			owner,
			&[addr(0x02)],
			&[addr(0x03)],
		)));
		let (tx, rx) = event_channel();
		let admin = AdminController::new(Arc::clone(&store), tx);
		(store, admin, rx)
	}

	#[tokio::test]
	async fn test_initial_seeding() {
		let (store, _admin, _rx) = setup();
		let store = store.read().await;
		assert!(store.is_relayer_authorized(addr(0x02)));
		assert!(store.is_token_supported(addr(0x03)));
		assert!(!store.is_relayer_authorized(addr(0x04)));
		assert!(!store.is_token_supported(addr(0x04)));
	}

	#[tokio::test]
	async fn test_non_owner_cannot_mutate() {
		let (store, admin, _rx) = setup();
		let intruder = addr(0x99);

		let result = admin
			.set_relayer_authorization(intruder, addr(0x05), true)
			.await;
		assert_eq!(result, Err(AdminError::CallerUnauthorized(intruder)));

		let result = admin.set_token_support(intruder, addr(0x05), true).await;
		assert_eq!(result, Err(AdminError::CallerUnauthorized(intruder)));

		// Nothing changed.
		let store = store.read().await;
		assert!(!store.is_relayer_authorized(addr(0x05)));
		assert!(!store.is_token_supported(addr(0x05)));
	}

	#[tokio::test]
	async fn test_owner_mutation_emits_record() {
		let (store, admin, mut rx) = setup();
		let owner = addr(0x01);
		let new_relayer = addr(0x07);

		admin
			.set_relayer_authorization(owner, new_relayer, true)
			.await
			.unwrap();
		assert!(store.read().await.is_relayer_authorized(new_relayer));
		assert_eq!(
			rx.recv().await.unwrap(),
			ProxyEvent::RelayerAuthorizationUpdated {
				relayer: new_relayer,
				authorized: true,
			}
		);

		let new_token = addr(0x08);
		admin.set_token_support(owner, new_token, true).await.unwrap();
		assert!(store.read().await.is_token_supported(new_token));
		assert_eq!(
			rx.recv().await.unwrap(),
			ProxyEvent::TokenSupportStatusUpdated {
				token: new_token,
				supported: true,
			}
		);
	}

	#[tokio::test]
	async fn test_revocation() {
		let (store, admin, _rx) = setup();
		let owner = addr(0x01);

		admin
			.set_relayer_authorization(owner, addr(0x02), false)
			.await
			.unwrap();
		assert!(!store.read().await.is_relayer_authorized(addr(0x02)));
	}
}
