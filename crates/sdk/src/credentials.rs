// Copyright 2025 itscheems
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

//! Account credentials.
//!
//! The user key is wrapped in `SecretString`, so it never shows up in
//! `Debug` output and is zeroed on drop.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, XpyunError};

/// Environment variable holding the account identity
pub const ENV_USER: &str = "XPYUN_USER";

/// Environment variable holding the account user key
pub const ENV_USER_KEY: &str = "XPYUN_USER_KEY";

/// Account identity plus user key, fixed for the lifetime of a client.
#[derive(Clone)]
pub struct Credentials {
	identity: String,
	secret: SecretString,
}

impl Credentials {
	/// Create credentials from explicit values.
	///
	/// The secret is not checked for strength; an empty key still signs.
	pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
		Self {
			identity: identity.into(),
			secret: SecretString::from(secret.into()),
		}
	}

	/// Load credentials from `XPYUN_USER` / `XPYUN_USER_KEY`, reading a
	/// `.env` file first when one is present.
	pub fn from_env() -> Result<Self> {
		dotenv::dotenv().ok();

		let identity = std::env::var(ENV_USER)
			.map_err(|_| XpyunError::Auth(format!("Missing environment variable: {}", ENV_USER)))?;
		let secret = std::env::var(ENV_USER_KEY).map_err(|_| {
			XpyunError::Auth(format!("Missing environment variable: {}", ENV_USER_KEY))
		})?;

		if identity.trim().is_empty() {
			return Err(XpyunError::Auth(format!("{} is empty", ENV_USER)));
		}

		Ok(Self::new(identity, secret))
	}

	/// Account identity (safe to log).
	pub fn identity(&self) -> &str {
		&self.identity
	}

	/// Expose the user key for signing. Never log the return value.
	pub fn expose_secret(&self) -> &str {
		self.secret.expose_secret()
	}
}

impl std::fmt::Debug for Credentials {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Credentials")
			.field("identity", &self.identity)
			.field("secret", &"[REDACTED]")
			.finish()
	}
}
