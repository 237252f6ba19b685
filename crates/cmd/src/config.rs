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

use std::path::Path;

use anyhow::{Context, Result};
use xpyun_sdk::{ClientConfig, Credentials};

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "xpyun-cli";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

/// Command-line overrides applied on top of the loaded configuration
#[derive(Debug, Default, Clone)]
pub struct Overrides {
	pub base_url: Option<String>,
	pub timeout_secs: Option<u64>,
	pub debug: bool,
}

/// Load client configuration.
///
/// Layers, lowest priority first: built-in defaults, the optional config
/// file, `XPYUN_*` environment variables, then command-line overrides.
pub fn load_client_config(path: Option<&Path>, overrides: &Overrides) -> Result<ClientConfig> {
	dotenv::dotenv().ok();

	let mut config = match path {
		Some(path) => {
			let path_str = path
				.to_str()
				.with_context(|| format!("Config path is not valid UTF-8: {}", path.display()))?;
			ClientConfig::from_file(path_str)
				.with_context(|| format!("Failed to load config file {}", path.display()))?
		}
		None => ClientConfig::from_env().context("Failed to load XPYUN_* configuration")?,
	};

	if let Some(base_url) = &overrides.base_url {
		config = config.with_base_url(base_url.clone());
	}
	if let Some(timeout_secs) = overrides.timeout_secs {
		config.timeout_secs = timeout_secs;
	}
	if overrides.debug {
		config = config.with_debug(true);
	}

	Ok(config)
}

/// Load credentials from `XPYUN_USER` / `XPYUN_USER_KEY`
pub fn load_credentials() -> Result<Credentials> {
	Credentials::from_env().context("Missing Xpyun credentials")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_overrides_applied_last() {
		let dir = std::env::temp_dir().join("xpyun-cli-config-test");
		std::fs::create_dir_all(&dir).unwrap();
		let path = dir.join("client.toml");
		std::fs::write(&path, "base_url = \"http://file.test\"\ntimeout_secs = 5\n").unwrap();

		let overrides = Overrides {
			base_url: Some("http://flag.test".to_string()),
			timeout_secs: None,
			debug: true,
		};
		let config = load_client_config(Some(&path), &overrides).unwrap();

		assert_eq!(config.base_url, "http://flag.test");
		assert_eq!(config.timeout_secs, 5);
		assert!(config.debug);
	}
}
