// Copyright 2025 chenjjiaa
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! SHA-1 request signing.
//!
//! Every request carries `sign = sha1_hex(user || user_key || timestamp)`,
//! where `timestamp` is the decimal unix time in seconds that travels in the
//! same request.

use std::time::{SystemTime, UNIX_EPOCH};

use sha1::{Digest, Sha1};
use tracing::warn;

use crate::credentials::Credentials;

/// Sign an `(identity, secret, timestamp)` triple.
///
/// Returns the SHA-1 digest of the concatenated UTF-8 strings as 40 lowercase
/// hex characters.
pub fn sign(identity: &str, secret: &str, timestamp: u64) -> String {
	let mut hasher = Sha1::new();
	hasher.update(identity.as_bytes());
	hasher.update(secret.as_bytes());
	hasher.update(timestamp.to_string().as_bytes());
	hex::encode(hasher.finalize())
}

/// Current unix time in milliseconds.
pub fn unix_millis() -> u64 {
	millis_since_epoch(SystemTime::now())
}

/// Milliseconds since the unix epoch; 0 (with a warning) for earlier times.
fn millis_since_epoch(now: SystemTime) -> u64 {
	match now.duration_since(UNIX_EPOCH) {
		Ok(elapsed) => elapsed.as_millis() as u64,
		Err(e) => {
			warn!(
				behind_ms = e.duration().as_millis() as u64,
				"System clock is before the unix epoch; signing with timestamp 0"
			);
			0
		}
	}
}

/// The authentication triple that goes into every envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthParams {
	pub identity: String,
	/// Unix seconds; the value that was signed.
	pub timestamp: u64,
	pub signature: String,
}

/// Request signer bound to one set of credentials.
pub struct RequestSigner<'a> {
	credentials: &'a Credentials,
}

impl<'a> RequestSigner<'a> {
	pub fn new(credentials: &'a Credentials) -> Self {
		Self { credentials }
	}

	/// Sign the given unix timestamp (seconds).
	pub fn sign(&self, timestamp: u64) -> String {
		sign(
			self.credentials.identity(),
			self.credentials.expose_secret(),
			timestamp,
		)
	}

	/// Auth params for the current second.
	pub fn auth_params(&self) -> AuthParams {
		self.auth_params_at(unix_millis())
	}

	/// Auth params for a given clock reading in milliseconds.
	///
	/// The signed timestamp is the reading truncated to whole seconds.
	pub fn auth_params_at(&self, unix_millis: u64) -> AuthParams {
		let timestamp = unix_millis / 1000;
		AuthParams {
			identity: self.credentials.identity().to_string(),
			timestamp,
			signature: self.sign(timestamp),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sign_known_vector() {
		let signature = sign(
			"1911342262@qq.com",
			"eebc89e280ba47c5a12d6dc750348811",
			1_700_000_000,
		);

		assert_eq!(signature, "5a7686511424b59153c9e05c1e9755c843dfcff2");
	}

	#[test]
	fn test_sign_is_deterministic_lowercase_hex() {
		let a = sign("user", "user-key", 1_700_000_000);
		let b = sign("user", "user-key", 1_700_000_000);

		assert_eq!(a, b);
		assert_eq!(a, "8db5a593a556f27d6ed13d9b66f14ce1e789cf65");
		assert_eq!(a.len(), 40);
		assert!(
			a.chars()
				.all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
		);
	}

	#[test]
	fn test_sign_sensitive_to_each_field() {
		let base = sign("user", "user-key", 1_700_000_000);

		assert_ne!(base, sign("user2", "user-key", 1_700_000_000));
		assert_ne!(base, sign("user", "user-key2", 1_700_000_000));
		assert_eq!(
			sign("user", "user-key", 1_700_000_001),
			"75411ea58104590cb41d7cf7f71669435b1f5774"
		);
	}

	#[test]
	fn test_empty_secret_still_signs() {
		let signature = sign("user", "", 1_700_000_000);
		assert_eq!(signature, "9517b06bef3745813b598982c7d466045d8c50d8");
	}

	#[test]
	fn test_auth_params_at_is_consistent() {
		let creds = Credentials::new("user", "user-key");
		let signer = RequestSigner::new(&creds);

		let first = signer.auth_params_at(1_700_000_000_123);
		let second = signer.auth_params_at(1_700_000_001_999);

		assert_eq!(first.identity, "user");
		assert_eq!(first.timestamp, 1_700_000_000);
		assert_eq!(first.signature, signer.sign(first.timestamp));

		assert_eq!(second.timestamp, 1_700_000_001);
		assert_eq!(second.signature, signer.sign(second.timestamp));
		assert_ne!(first.signature, second.signature);
	}

	#[test]
	fn test_clock_before_epoch_reads_zero() {
		let before_epoch = UNIX_EPOCH - std::time::Duration::from_secs(5);
		assert_eq!(millis_since_epoch(before_epoch), 0);

		let later = UNIX_EPOCH + std::time::Duration::from_millis(1_700_000_000_123);
		assert_eq!(millis_since_epoch(later), 1_700_000_000_123);
	}

	#[test]
	fn test_auth_params_uses_current_time() {
		let creds = Credentials::new("user", "user-key");
		let signer = RequestSigner::new(&creds);

		let before = unix_millis() / 1000;
		let params = signer.auth_params();
		let after = unix_millis() / 1000;

		assert!(params.timestamp >= before && params.timestamp <= after);
		assert_eq!(params.signature, sign("user", "user-key", params.timestamp));
	}
}
