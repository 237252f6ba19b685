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

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default API origin and path prefix (can be overridden by XPYUN_BASE_URL)
pub const DEFAULT_BASE_URL: &str = "https://open.xpyun.net/api/openapi/xprinter";

/// Default request timeout in seconds (can be overridden by XPYUN_TIMEOUT_SECS)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default wire logging switch (can be overridden by XPYUN_DEBUG)
pub const DEFAULT_DEBUG: bool = false;

/// Environment variable prefix for client configuration
pub const ENV_PREFIX: &str = "XPYUN";

fn default_base_url() -> String {
	DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
	DEFAULT_TIMEOUT_SECS
}

fn default_debug() -> bool {
	DEFAULT_DEBUG
}

fn default_user_agent() -> String {
	format!("xpyun-sdk-rust/{}", env!("CARGO_PKG_VERSION"))
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Origin plus path prefix; operation names are appended as `/{name}`
	#[serde(default = "default_base_url")]
	pub base_url: String,
	/// Per-request timeout in seconds
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
	/// Log every outgoing envelope and raw response.
	///
	/// **Not safe for production**: the envelope is logged verbatim,
	/// including the account identity and the request signature.
	#[serde(default = "default_debug")]
	pub debug: bool,
	/// `User-Agent` header value
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: default_base_url(),
			timeout_secs: default_timeout_secs(),
			debug: default_debug(),
			user_agent: default_user_agent(),
		}
	}
}

impl ClientConfig {
	/// Load configuration from `XPYUN_*` environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::Environment::with_prefix(ENV_PREFIX))
			.build()?;

		cfg.try_deserialize()
	}

	/// Load configuration from file, then apply environment overrides
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(config::Environment::with_prefix(ENV_PREFIX))
			.build()?;

		cfg.try_deserialize()
	}

	/// Enable or disable wire logging
	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;
		self
	}

	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	/// Full URL for an operation.
	pub fn operation_url(&self, operation: &str) -> String {
		format!("{}/{}", self.base_url.trim_end_matches('/'), operation)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let cfg = ClientConfig::default();
		assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
		assert_eq!(cfg.timeout(), Duration::from_secs(30));
		assert!(!cfg.debug);
		assert!(cfg.user_agent.starts_with("xpyun-sdk-rust/"));
	}

	#[test]
	fn test_operation_url() {
		let cfg = ClientConfig::default();
		assert_eq!(
			cfg.operation_url("print"),
			"https://open.xpyun.net/api/openapi/xprinter/print"
		);

		let cfg = cfg.with_base_url("http://localhost:8080/api/");
		assert_eq!(
			cfg.operation_url("queryPrinterStatus"),
			"http://localhost:8080/api/queryPrinterStatus"
		);
	}

	#[test]
	fn test_from_file_fills_missing_fields() {
		let dir = std::env::temp_dir().join(format!("xpyun-config-{}", std::process::id()));
		std::fs::create_dir_all(&dir).unwrap();
		let path = dir.join("client.toml");
		std::fs::write(&path, "timeout_secs = 5\ndebug = true\n").unwrap();

		let cfg = ClientConfig::from_file(path.to_str().unwrap()).unwrap();
		assert_eq!(cfg.timeout_secs, 5);
		assert!(cfg.debug);
		assert_eq!(cfg.base_url, DEFAULT_BASE_URL);

		std::fs::remove_dir_all(&dir).ok();
	}
}
