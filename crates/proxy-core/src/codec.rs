//! Canonical EIP-712 hashing of transfer requests.
//!
//! The codec binds every `TransferRequest` field together with a domain
//! descriptor fixed at construction. Both the domain separator and the
//! transfer typehash are computed once and cached; they are never derived
//! from request content.

use alloy_primitives::keccak256;
use proxy_types::utils::eip712::{compute_domain_hash, compute_final_digest, StructEncoder};
use proxy_types::{Address, TransferRequest, B256};

/// Transfer type string. The ordered field list is the wire format; any
/// signer or verifier must reproduce it bit for bit.
const TRANSFER_TYPE: &str = "Transfer(address from,address to,address token,uint256 amount,uint256 relayerFee,uint256 nonce,uint256 deadline)";

/// The fixed tuple mixed into every signed hash to prevent cross-context
/// signature reuse.
#[derive(Debug, Clone)]
pub struct DomainDescriptor {
	/// Signing domain name (e.g. the deployed proxy's name).
	pub name: String,
	/// Signing domain version.
	pub version: String,
	/// Chain the proxy is deployed on.
	pub chain_id: u64,
	/// Address of the deployed proxy.
	pub verifying_contract: Address,
}

/// Builds the canonical digest of a transfer intent.
pub struct AuthorizationCodec {
	domain_separator: B256,
	transfer_typehash: B256,
}

impl AuthorizationCodec {
	/// Creates a codec for the given domain, caching the domain separator
	/// and typehash.
	pub fn new(domain: &DomainDescriptor) -> Self {
		Self {
			domain_separator: compute_domain_hash(
				&domain.name,
				&domain.version,
				domain.chain_id,
				&domain.verifying_contract,
			),
			transfer_typehash: keccak256(TRANSFER_TYPE.as_bytes()),
		}
	}

	/// The cached domain separator.
	pub fn domain_separator(&self) -> B256 {
		self.domain_separator
	}

	/// Computes the digest the sender must have signed for `request`.
	///
	/// Deterministic and injective over (domain, ordered field list):
	/// changing any single field changes the digest.
	pub fn digest(&self, request: &TransferRequest) -> B256 {
		let mut enc = StructEncoder::new();
		enc.push_b256(&self.transfer_typehash);
		enc.push_address(&request.from);
		enc.push_address(&request.to);
		enc.push_address(&request.token);
		enc.push_u256(request.amount);
		enc.push_u256(request.relayer_fee);
		enc.push_u64(request.nonce);
		enc.push_u64(request.deadline);
		let struct_hash = keccak256(enc.finish());
		compute_final_digest(&self.domain_separator, &struct_hash)
	}
}
