//! Hash keys of configuration documents and request hashes sent by the client

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Lowercase hex SHA-256 of `data`
pub fn derive(data: &[u8]) -> String {
	format!("{:x}", Sha256::digest(data))
}

/// Hash the client sends for a request: SHA-256 of the absolute URL followed by the secret
pub fn request_hash(url: &str, secret: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(url.as_bytes());
	hasher.update(secret.as_bytes());
	format!("{:x}", hasher.finalize())
}

/// Compares two hashes in constant time (for equal lengths)
pub fn hashes_equal(expected: &str, received: &str) -> bool {
	expected.as_bytes().ct_eq(received.as_bytes()).into()
}


// vim: ts=4
