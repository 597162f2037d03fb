//! Transfer orchestration: validation, fund movement, and record emission.
//!
//! Each request executes as a single atomic unit. The hard ordering rule is
//! "validate, mutate internal state, then call externally": registries,
//! signature, deadline, and amount checks all happen before the nonce is
//! consumed, and the nonce is consumed strictly before any token call, so a
//! reentrant invocation observes the advanced nonce. If an external call
//! fails after that point, the nonce is rewound so the aborted request
//! leaves no trace.
//!
//! Execution is serialized per sender: a per-account lock is held from
//! nonce consumption through settlement (or unwind), so one request for an
//! account commits or aborts fully before the next begins and a rewind can
//! never cross a concurrently committed nonce.

use crate::codec::{AuthorizationCodec, DomainDescriptor};
use crate::nonce::NonceLedger;
use crate::verifier::{EcdsaRecoveryVerifier, SignatureVerifier};
use crate::TransferError;
use proxy_registry::{AdminController, RegistryStore};
use proxy_token::{PermitAdapter, TokenError, TokenInterface};
use proxy_types::{
	event_channel, unix_now, Address, EventReceiver, EventSender, PermitData, ProxyEvent,
	TransferRequest, U256,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// The authorization-and-execution engine.
///
/// Holds the process-wide state the core owns exclusively: the nonce
/// ledger and (jointly with [`AdminController`]) the registry store. Token
/// handles are resolved through a directory fixed at construction; the
/// registry decides whether a directory entry may currently be used.
pub struct TransferExecutor {
	codec: AuthorizationCodec,
	verifier: Box<dyn SignatureVerifier>,
	nonces: NonceLedger,
	registry: Arc<RwLock<RegistryStore>>,
	permit_adapter: PermitAdapter,
	/// Token address -> collaborator handle.
	tokens: HashMap<Address, Arc<dyn TokenInterface>>,
	/// The proxy's own address: custody waypoint for pulled funds and the
	/// spender named in permits. Equals the domain's verifying contract.
	proxy_address: Address,
	/// Sender address -> execution lock, created on first use.
	account_locks: Mutex<HashMap<Address, Arc<Mutex<()>>>>,
	events: EventSender,
}

impl TransferExecutor {
	/// Creates an executor over an existing registry store and event
	/// channel.
	pub fn new(
		domain: &DomainDescriptor,
		registry: Arc<RwLock<RegistryStore>>,
		tokens: HashMap<Address, Arc<dyn TokenInterface>>,
		verifier: Box<dyn SignatureVerifier>,
		events: EventSender,
	) -> Self {
		Self {
			codec: AuthorizationCodec::new(domain),
			verifier,
			nonces: NonceLedger::new(),
			registry,
			permit_adapter: PermitAdapter::new(),
			tokens,
			proxy_address: domain.verifying_contract,
			account_locks: Mutex::new(HashMap::new()),
			events,
		}
	}

	/// Convenience constructor matching the deployment interface: seeds the
	/// registries from an initial owner, relayer set, and supported token
	/// set, and wires up the admin controller and record channel.
	pub fn init(
		domain: &DomainDescriptor,
		owner: Address,
		initial_relayers: &[Address],
		initial_supported_tokens: &[Address],
		tokens: HashMap<Address, Arc<dyn TokenInterface>>,
	) -> (Self, AdminController, EventReceiver) {
		let registry = Arc::new(RwLock::new(RegistryStore::new(
			owner,
			initial_relayers,
			initial_supported_tokens,
		)));
		let (tx, rx) = event_channel();
		let admin = AdminController::new(Arc::clone(&registry), tx.clone());
		let executor = Self::new(
			domain,
			registry,
			tokens,
			Box::new(EcdsaRecoveryVerifier),
			tx,
		);
		(executor, admin, rx)
	}

	/// The next expected nonce for `account`.
	pub async fn current_nonce(&self, account: Address) -> u64 {
		self.nonces.peek(account).await
	}

	/// The execution lock for `account`. Must be held from nonce
	/// consumption until the request has fully committed or unwound.
	async fn account_lock(&self, account: Address) -> Arc<Mutex<()>> {
		let mut locks = self.account_locks.lock().await;
		Arc::clone(locks.entry(account).or_default())
	}

	/// Whether `token` exposes the delegated-approval capability. Probed
	/// once and cached per token address.
	pub async fn check_permit_support(&self, token: Address) -> Result<bool, TransferError> {
		let handle = self
			.tokens
			.get(&token)
			.ok_or(TransferError::TokenUnsupported(token))?;
		Ok(self
			.permit_adapter
			.check_permit_support(token, handle.as_ref())
			.await)
	}

	/// Executes a transfer whose sender has already pre-approved the proxy
	/// for at least `amount + relayer_fee` on the token.
	pub async fn process_direct_gasless_transfer(
		&self,
		request: &TransferRequest,
		transfer_signature: &[u8],
		relayer: Address,
	) -> Result<(), TransferError> {
		let (token, total) = self.validate(request, transfer_signature, relayer).await?;

		let lock = self.account_lock(request.from).await;
		let _serialized = lock.lock().await;

		// Last internal mutation before external calls.
		self.nonces.consume(request.from, request.nonce).await?;

		if let Err(e) = self.settle(token.as_ref(), request, total, relayer).await {
			self.nonces.rollback(request.from).await;
			return Err(e);
		}

		self.complete(request, relayer);
		Ok(())
	}

	/// Executes a transfer whose allowance is established by a bundled
	/// EIP-2612 permit immediately before funds are pulled.
	pub async fn process_permit_based_gasless_transfer(
		&self,
		request: &TransferRequest,
		transfer_signature: &[u8],
		permit_data: &PermitData,
		relayer: Address,
	) -> Result<(), TransferError> {
		let (token, total) = self.validate(request, transfer_signature, relayer).await?;

		if permit_data.approval_value < total {
			return Err(TransferError::AllowanceInsufficient {
				required: total,
				approved: permit_data.approval_value,
			});
		}
		// The permit carries its own deadline, independent of the
		// transfer's.
		let now = unix_now();
		if now > permit_data.permit_deadline {
			return Err(TransferError::RequestExpired {
				deadline: permit_data.permit_deadline,
				now,
			});
		}
		if !self
			.permit_adapter
			.check_permit_support(request.token, token.as_ref())
			.await
		{
			return Err(TransferError::PermitUnsupported(request.token));
		}

		let lock = self.account_lock(request.from).await;
		let _serialized = lock.lock().await;

		self.nonces.consume(request.from, request.nonce).await?;

		let granted = self
			.permit_adapter
			.grant_allowance(
				request.token,
				token.as_ref(),
				request.from,
				self.proxy_address,
				permit_data.approval_value,
				permit_data.permit_deadline,
				permit_data.signature_v,
				permit_data.signature_r,
				permit_data.signature_s,
			)
			.await;
		if let Err(e) = granted {
			self.nonces.rollback(request.from).await;
			return Err(match e {
				TokenError::PermitUnsupported => TransferError::PermitUnsupported(request.token),
				other => TransferError::TransferFailed(other),
			});
		}

		if let Err(e) = self.settle(token.as_ref(), request, total, relayer).await {
			self.nonces.rollback(request.from).await;
			return Err(e);
		}

		self.complete(request, relayer);
		Ok(())
	}

	/// Applies the direct path to an ordered sequence of requests.
	///
	/// Items are isolated: each tuple is validated and executed
	/// independently and the returned vector carries one result per item in
	/// input order. One item's failure never unwinds another's transfer.
	pub async fn process_direct_gasless_transfer_batch(
		&self,
		items: &[(TransferRequest, Vec<u8>)],
		relayer: Address,
	) -> Vec<Result<(), TransferError>> {
		let mut results = Vec::with_capacity(items.len());
		for (request, signature) in items {
			results.push(
				self.process_direct_gasless_transfer(request, signature, relayer)
					.await,
			);
		}
		results
	}

	/// Applies the permit path to an ordered sequence of requests, with the
	/// same per-item isolation as the direct batch.
	pub async fn process_permit_based_gasless_transfer_batch(
		&self,
		items: &[(TransferRequest, Vec<u8>, PermitData)],
		relayer: Address,
	) -> Vec<Result<(), TransferError>> {
		let mut results = Vec::with_capacity(items.len());
		for (request, signature, permit_data) in items {
			results.push(
				self.process_permit_based_gasless_transfer(request, signature, permit_data, relayer)
					.await,
			);
		}
		results
	}

	/// Validation shared by both paths, in the fixed order: relayer
	/// authorized, token supported, signature valid, deadline not passed.
	/// Returns the token handle and the total debit.
	async fn validate(
		&self,
		request: &TransferRequest,
		transfer_signature: &[u8],
		relayer: Address,
	) -> Result<(Arc<dyn TokenInterface>, U256), TransferError> {
		{
			let registry = self.registry.read().await;
			if !registry.is_relayer_authorized(relayer) {
				return Err(TransferError::RelayerUnauthorized(relayer));
			}
			if !registry.is_token_supported(request.token) {
				return Err(TransferError::TokenUnsupported(request.token));
			}
		}
		let token = self
			.tokens
			.get(&request.token)
			.cloned()
			.ok_or(TransferError::TokenUnsupported(request.token))?;

		let digest = self.codec.digest(request);
		let recovered = self.verifier.recover(&digest, transfer_signature)?;
		if recovered != request.from {
			// Reported identically to a malformed signature; the error must
			// not reveal which part of verification failed.
			return Err(TransferError::SignatureInvalid);
		}

		let now = unix_now();
		if now > request.deadline {
			return Err(TransferError::RequestExpired {
				deadline: request.deadline,
				now,
			});
		}

		let total = request
			.total_debit()
			.ok_or(TransferError::AllowanceInsufficient {
				required: U256::MAX,
				approved: U256::ZERO,
			})?;

		Ok((token, total))
	}

	/// Pulls `total` from the sender into proxy custody, then pays out the
	/// amount and the relayer fee. On a partial payout failure the custody
	/// remainder is returned to the sender.
	async fn settle(
		&self,
		token: &dyn TokenInterface,
		request: &TransferRequest,
		total: U256,
		relayer: Address,
	) -> Result<(), TransferError> {
		token
			.transfer_from(self.proxy_address, request.from, self.proxy_address, total)
			.await?;

		let mut remaining = total;
		let payout = async {
			token
				.transfer(self.proxy_address, request.to, request.amount)
				.await?;
			remaining -= request.amount;
			token
				.transfer(self.proxy_address, relayer, request.relayer_fee)
				.await?;
			remaining -= request.relayer_fee;
			Ok::<(), TokenError>(())
		}
		.await;

		if let Err(e) = payout {
			if remaining > U256::ZERO {
				if let Err(refund_err) = token
					.transfer(self.proxy_address, request.from, remaining)
					.await
				{
					tracing::error!(
						from = %request.from,
						%remaining,
						error = %refund_err,
						"Failed to refund custody after aborted payout"
					);
				}
			}
			return Err(TransferError::TransferFailed(e));
		}
		Ok(())
	}

	/// Emits the completion record once every mutation has committed.
	fn complete(&self, request: &TransferRequest, relayer: Address) {
		tracing::info!(
			from = %request.from,
			to = %request.to,
			token = %request.token,
			amount = %request.amount,
			relayer_fee = %request.relayer_fee,
			nonce = request.nonce,
			"Gasless transfer completed"
		);
		let _ = self.events.send(ProxyEvent::GaslessTokenTransferCompleted {
			from: request.from,
			to: request.to,
			token: request.token,
			amount: request.amount,
			relayer_fee: request.relayer_fee,
			executing_relayer: relayer,
			nonce: request.nonce,
		});
	}
}
