//! Generic EIP-712 utilities shared across the proxy.
//!
//! These helpers provide:
//! - Domain hash computation for a `{name, version, chainId, verifyingContract}` domain
//! - Final digest computation (0x1901 || domainHash || structHash)
//! - A minimal ABI encoder for the static field types used in struct hashing

use alloy_primitives::{keccak256, Address, B256, U256};

/// EIP-712 domain type string. The proxy and its tokens both use the full
/// four-field domain, including the version.
pub const DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Compute the EIP-712 domain hash:
/// `keccak256(abi.encode(typeHash, nameHash, versionHash, chainId, verifyingContract))`.
pub fn compute_domain_hash(
	name: &str,
	version: &str,
	chain_id: u64,
	verifying_contract: &Address,
) -> B256 {
	let domain_type_hash = keccak256(DOMAIN_TYPE.as_bytes());
	let name_hash = keccak256(name.as_bytes());
	let version_hash = keccak256(version.as_bytes());
	let mut enc = StructEncoder::new();
	enc.push_b256(&domain_type_hash);
	enc.push_b256(&name_hash);
	enc.push_b256(&version_hash);
	enc.push_u256(U256::from(chain_id));
	enc.push_address(verifying_contract);
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: `keccak256(0x1901 || domainHash || structHash)`.
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Minimal ABI encoder for the static types used in EIP-712 struct hashing.
///
/// Every pushed value occupies exactly one 32-byte word, so the resulting
/// hash is an injective function of the ordered field list: changing any
/// field, its position, or its width changes the digest.
pub struct StructEncoder {
	buf: Vec<u8>,
}

impl Default for StructEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl StructEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u64(&mut self, v: u64) {
		self.push_u256(U256::from(v));
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn addr(byte: u8) -> Address {
		Address::repeat_byte(byte)
	}

	#[test]
	fn test_domain_hash_binds_every_field() {
		let base = compute_domain_hash("Proxy", "1", 1, &addr(0x11));
		assert_ne!(base, compute_domain_hash("Other", "1", 1, &addr(0x11)));
		assert_ne!(base, compute_domain_hash("Proxy", "2", 1, &addr(0x11)));
		assert_ne!(base, compute_domain_hash("Proxy", "1", 2, &addr(0x11)));
		assert_ne!(base, compute_domain_hash("Proxy", "1", 1, &addr(0x22)));
	}

	#[test]
	fn test_domain_hash_is_deterministic() {
		let a = compute_domain_hash("Proxy", "1", 5920, &addr(0x33));
		let b = compute_domain_hash("Proxy", "1", 5920, &addr(0x33));
		assert_eq!(a, b);
	}

	#[test]
	fn test_encoder_word_alignment() {
		let mut enc = StructEncoder::new();
		enc.push_address(&addr(0xaa));
		enc.push_u64(7);
		let bytes = enc.finish();
		assert_eq!(bytes.len(), 64);
		// Addresses are right-aligned in their word.
		assert_eq!(&bytes[..12], &[0u8; 12]);
		assert_eq!(bytes[12], 0xaa);
		assert_eq!(bytes[63], 7);
	}

	#[test]
	fn test_final_digest_differs_from_struct_hash() {
		let domain = compute_domain_hash("Proxy", "1", 1, &addr(0x11));
		let struct_hash = keccak256(b"payload");
		let digest = compute_final_digest(&domain, &struct_hash);
		assert_ne!(digest, struct_hash);
		assert_ne!(digest, domain);
	}
}
