//! Signing capability.
//!
//! Key custody is out of scope for the core: the engine and the facade only
//! need something that can state its address and sign transaction bytes.
//! [`LocalKeySigner`] is the one concrete provider, holding an ed25519 key
//! loaded from a 64-character hex string. Key material never leaves this
//! crate and is never formatted into logs or errors.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signer as _, SigningKey};
use thiserror::Error;

/// Signature-scheme flag byte prefixed to the serialized signature.
const ED25519_FLAG: u8 = 0x00;

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("invalid key: {0}")]
	InvalidKey(String),

	#[error("signing failed: {0}")]
	SigningFailed(String),
}

/// Anything that can sign transaction bytes on behalf of one address.
pub trait Signer: Send + Sync {
	/// The on-chain address this signer acts for.
	fn address(&self) -> &str;

	/// Signs raw transaction bytes, returning the base64 serialized
	/// signature envelope the node accepts.
	fn sign(&self, tx_bytes: &[u8]) -> Result<String, AccountError>;
}

/// In-process signer over a raw ed25519 key.
pub struct LocalKeySigner {
	key: SigningKey,
	address: String,
}

impl LocalKeySigner {
	/// Builds a signer from a 64-character hex seed and its address.
	pub fn from_hex(key_hex: &str, address: impl Into<String>) -> Result<Self, AccountError> {
		let bytes = hex::decode(key_hex)
			.map_err(|_| AccountError::InvalidKey("key is not valid hex".into()))?;
		let seed: [u8; 32] = bytes
			.try_into()
			.map_err(|_| AccountError::InvalidKey("key must be exactly 32 bytes".into()))?;

		Ok(Self {
			key: SigningKey::from_bytes(&seed),
			address: address.into(),
		})
	}
}

impl Signer for LocalKeySigner {
	fn address(&self) -> &str {
		&self.address
	}

	fn sign(&self, tx_bytes: &[u8]) -> Result<String, AccountError> {
		let signature = self.key.sign(tx_bytes);

		// flag || signature || public key, base64-encoded.
		let mut serialized = Vec::with_capacity(1 + 64 + 32);
		serialized.push(ED25519_FLAG);
		serialized.extend_from_slice(&signature.to_bytes());
		serialized.extend_from_slice(self.key.verifying_key().as_bytes());
		Ok(BASE64.encode(serialized))
	}
}

// The Debug impl must not leak key bytes.
impl std::fmt::Debug for LocalKeySigner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LocalKeySigner")
			.field("address", &self.address)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ed25519_dalek::{Verifier, VerifyingKey};

	const TEST_KEY: &str = "9bf49a6a0755f953811fce125f2683d50429c3bb49e074147e0089a52eae155f";

	#[test]
	fn rejects_malformed_keys() {
		assert!(LocalKeySigner::from_hex("zz", "0x1").is_err());
		assert!(LocalKeySigner::from_hex("abcd", "0x1").is_err());
		assert!(LocalKeySigner::from_hex(TEST_KEY, "0x1").is_ok());
	}

	#[test]
	fn signature_envelope_verifies() {
		let signer = LocalKeySigner::from_hex(TEST_KEY, "0x1").unwrap();
		let message = b"tx bytes";
		let envelope = BASE64.decode(signer.sign(message).unwrap()).unwrap();

		assert_eq!(envelope.len(), 97);
		assert_eq!(envelope[0], ED25519_FLAG);

		let signature = ed25519_dalek::Signature::from_bytes(envelope[1..65].try_into().unwrap());
		let public = VerifyingKey::from_bytes(envelope[65..].try_into().unwrap()).unwrap();
		assert!(public.verify(message, &signature).is_ok());
	}

	#[test]
	fn debug_hides_key_material() {
		let signer = LocalKeySigner::from_hex(TEST_KEY, "0xabc").unwrap();
		let rendered = format!("{signer:?}");
		assert!(rendered.contains("0xabc"));
		assert!(!rendered.contains(TEST_KEY));
	}
}
