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

//! Shared fixtures for the SDK integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;
use xpyun_sdk::{Client, ClientConfig, Credentials, Transport, TransportError};

pub const TEST_BASE_URL: &str = "http://printer.test/api";
pub const OK_BODY: &str = r#"{"code":0,"msg":"ok","data":null}"#;

/// One request seen by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct Recorded {
	pub url: String,
	pub body: Value,
}

impl Recorded {
	/// Operation path segment of the request URL
	pub fn operation(&self) -> &str {
		self.url.rsplit('/').next().unwrap_or_default()
	}
}

/// Replays scripted replies in order and records every request.
///
/// Once the script is exhausted every request gets [`OK_BODY`].
#[derive(Default)]
pub struct MockTransport {
	replies: Mutex<VecDeque<Result<String, TransportError>>>,
	requests: Mutex<Vec<Recorded>>,
}

impl MockTransport {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn reply(self, body: &str) -> Self {
		self.replies.lock().unwrap().push_back(Ok(body.to_string()));
		self
	}

	pub fn fail(self, error: TransportError) -> Self {
		self.replies.lock().unwrap().push_back(Err(error));
		self
	}

	pub fn requests(&self) -> Vec<Recorded> {
		self.requests.lock().unwrap().clone()
	}
}

impl Transport for MockTransport {
	async fn post_json(&self, url: &str, body: String) -> Result<String, TransportError> {
		self.requests.lock().unwrap().push(Recorded {
			url: url.to_string(),
			body: serde_json::from_str(&body).expect("client sent invalid JSON"),
		});
		self.replies
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| Ok(OK_BODY.to_string()))
	}
}

pub fn client(transport: MockTransport) -> Client<MockTransport> {
	Client::with_transport(
		Credentials::new("user", "user-key"),
		ClientConfig::default().with_base_url(TEST_BASE_URL),
		transport,
	)
}
