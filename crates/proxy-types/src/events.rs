//! Emitted record types for observers and indexers.
//!
//! Records flow through a broadcast channel so the service layer (or any
//! other observer) can react to completed transfers and registry changes
//! without holding a reference into the engine.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default capacity of the record broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Records emitted by the proxy, in the order the mutations committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProxyEvent {
	/// A gasless transfer executed end to end: funds moved, fee paid,
	/// nonce advanced.
	GaslessTokenTransferCompleted {
		from: Address,
		to: Address,
		token: Address,
		amount: U256,
		relayer_fee: U256,
		executing_relayer: Address,
		nonce: u64,
	},
	/// The owner changed a relayer's authorization state.
	RelayerAuthorizationUpdated { relayer: Address, authorized: bool },
	/// The owner changed a token's support state.
	TokenSupportStatusUpdated { token: Address, supported: bool },
}

/// Sending half of the record channel, held by the engine and the admin
/// controller.
pub type EventSender = broadcast::Sender<ProxyEvent>;

/// Receiving half of the record channel, handed to observers.
pub type EventReceiver = broadcast::Receiver<ProxyEvent>;

/// Creates the broadcast channel proxy records are emitted on.
pub fn event_channel() -> (EventSender, EventReceiver) {
	broadcast::channel(EVENT_CHANNEL_CAPACITY)
}
