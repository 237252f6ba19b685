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

//! Error taxonomy surfaced by every SDK call.
//!
//! `XpyunError` is the single base error. Callers that need to branch on the
//! remote result inspect `code` on [`XpyunError::Api`]; every other kind is an
//! opaque signal, and the SDK makes no retry decision itself.

use serde_json::Value;
use thiserror::Error;

use crate::transport::TransportError;

/// Message used when the service omits one on a failed call.
pub const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// Code reported when a response object carries no integer `code`.
pub const UNKNOWN_ERROR_CODE: i64 = -1;

/// Error types for SDK operations
#[derive(Debug, Error)]
pub enum XpyunError {
	/// Credential problems (missing or malformed identity / secret).
	#[error("Authentication error: {0}")]
	Auth(String),

	/// The service answered with a non-zero `code`.
	#[error("API error {code}: {message}")]
	Api {
		/// Service error code.
		code: i64,
		/// Service error message.
		message: String,
		/// Optional payload returned alongside the error.
		data: Value,
	},

	/// Transport-level failure; never retried by the SDK.
	#[error("Network error: {0}")]
	Network(#[from] TransportError),

	/// Anything else: unparseable responses, serialization failures and
	/// rejected arguments.
	#[error("{0}")]
	Generic(String),
}

/// Result alias used throughout the SDK.
pub type Result<T> = std::result::Result<T, XpyunError>;

impl XpyunError {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::Generic(message.into())
	}

	/// Service error code, if this is an API error.
	pub fn code(&self) -> Option<i64> {
		match self {
			Self::Api { code, .. } => Some(*code),
			_ => None,
		}
	}

	pub fn is_auth(&self) -> bool {
		matches!(self, Self::Auth(_))
	}

	pub fn is_network(&self) -> bool {
		matches!(self, Self::Network(_))
	}
}

impl From<serde_json::Error> for XpyunError {
	fn from(err: serde_json::Error) -> Self {
		Self::Generic(format!("serialization failed: {}", err))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_api_error_display() {
		let err = XpyunError::Api {
			code: 3,
			message: "printer not found".to_string(),
			data: Value::Null,
		};
		assert_eq!(err.to_string(), "API error 3: printer not found");
		assert_eq!(err.code(), Some(3));
	}

	#[test]
	fn test_network_error_keeps_source() {
		let err = XpyunError::from(TransportError::Connection("refused".to_string()));
		assert!(err.is_network());
		assert!(std::error::Error::source(&err).is_some());
		assert_eq!(err.code(), None);
	}
}
