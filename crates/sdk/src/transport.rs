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

//! HTTP transport seam.
//!
//! The dispatcher only needs "POST this JSON body to this URL and give me the
//! raw response text". [`HttpTransport`] does that with `reqwest`; tests plug
//! in their own [`Transport`] implementation.

use std::future::Future;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use thiserror::Error;

/// Content type sent with every request.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
	/// Request timed out.
	#[error("Request timeout")]
	Timeout,

	/// Connection, DNS or TLS failure.
	#[error("Connection error: {0}")]
	Connection(String),

	/// Non-success HTTP status.
	#[error("HTTP error: {status} - {body}")]
	Http {
		/// HTTP status code.
		status: u16,
		/// Response body, possibly empty.
		body: String,
	},

	/// Failed to build the HTTP client or request.
	#[error("Request build error: {0}")]
	RequestBuild(String),
}

impl From<reqwest::Error> for TransportError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			TransportError::Timeout
		} else if err.is_builder() {
			TransportError::RequestBuild(err.to_string())
		} else if let Some(status) = err.status() {
			TransportError::Http {
				status: status.as_u16(),
				body: err.to_string(),
			}
		} else {
			TransportError::Connection(err.to_string())
		}
	}
}

/// Something that can POST a JSON body and return the raw response text.
pub trait Transport: Send + Sync {
	fn post_json(
		&self,
		url: &str,
		body: String,
	) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// `reqwest`-backed transport. The inner client keeps its connection pool
/// across calls; nothing else is shared between requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: ReqwestClient,
}

impl HttpTransport {
	/// Build a transport with the given timeout and user agent.
	pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
		let mut headers = HeaderMap::new();
		headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
		headers.insert(
			USER_AGENT,
			HeaderValue::from_str(user_agent)
				.map_err(|e| TransportError::RequestBuild(format!("Invalid user agent: {}", e)))?,
		);

		let client = ReqwestClient::builder()
			.timeout(timeout)
			.default_headers(headers)
			.build()
			.map_err(|e| TransportError::RequestBuild(e.to_string()))?;

		Ok(Self { client })
	}
}

impl Transport for HttpTransport {
	async fn post_json(&self, url: &str, body: String) -> Result<String, TransportError> {
		let response = self.client.post(url).body(body).send().await?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(TransportError::Http {
				status: status.as_u16(),
				body,
			});
		}

		Ok(response.text().await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_http_transport_creation() {
		let transport = HttpTransport::new(Duration::from_secs(5), "xpyun-sdk-rust/test");
		assert!(transport.is_ok());
	}

	#[test]
	fn test_invalid_user_agent_rejected() {
		let err = HttpTransport::new(Duration::from_secs(5), "bad\nagent").unwrap_err();
		assert!(matches!(err, TransportError::RequestBuild(_)));
	}

	#[tokio::test]
	async fn test_unreachable_host_is_connection_error() {
		let transport = HttpTransport::new(Duration::from_secs(2), "xpyun-sdk-rust/test").unwrap();
		// Port 9 on localhost is the discard service and is closed on test machines.
		let err = transport
			.post_json("http://127.0.0.1:9/print", "{}".to_string())
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			TransportError::Connection(_) | TransportError::Timeout
		));
	}
}
