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

//! Integration tests for the request dispatcher
//!
//! These tests verify:
//! - Envelope signing on the wire
//! - Response classification (success, API error, transport, parse)
//! - The blocking client wrapper

mod common;

use common::{MockTransport, OK_BODY, TEST_BASE_URL, client};
use serde_json::{Map, Value, json};
use xpyun_sdk::error::UNKNOWN_ERROR_CODE;
use xpyun_sdk::{Operation, SyncClient, TransportError, XpyunError, sign};

#[tokio::test]
async fn test_envelope_is_signed() {
	let client = client(MockTransport::new());
	client.send(Operation::QueryPrinterStatus, None).await.unwrap();

	let requests = client.transport().requests();
	assert_eq!(requests.len(), 1);
	let body = &requests[0].body;

	let timestamp = body["timestamp"].as_str().unwrap();
	let request_time = body["requestTime"].as_u64().unwrap();
	assert_eq!(timestamp, (request_time / 1000).to_string());
	assert_eq!(body["user"], json!("user"));
	assert_eq!(
		body["sign"],
		json!(sign("user", "user-key", timestamp.parse().unwrap()))
	);
	assert_eq!(requests[0].url, format!("{}/queryPrinterStatus", TEST_BASE_URL));
}

#[tokio::test]
async fn test_caller_params_merged_and_reserved_keys_kept() {
	let client = client(MockTransport::new());
	let mut params = Map::new();
	params.insert("sn".to_string(), json!("SN1"));
	params.insert("sign".to_string(), json!("forged"));

	client.send("queryPrinterStatus", Some(params)).await.unwrap();

	let body = &client.transport().requests()[0].body;
	assert_eq!(body["sn"], json!("SN1"));
	assert_ne!(body["sign"], json!("forged"));
}

#[tokio::test]
async fn test_success_returns_parsed_envelope() {
	let client = client(MockTransport::new().reply(r#"{"code":0,"msg":"ok","data":"OM123"}"#));

	let response = client.send(Operation::Print, None).await.unwrap();
	assert!(response.is_success());
	assert_eq!(response.data, json!("OM123"));
}

#[tokio::test]
async fn test_api_error_carries_code_and_data() {
	let client = client(
		MockTransport::new().reply(r#"{"code":1002,"message":"bad sign","data":{"hint":"clock"}}"#),
	);

	let err = client.send(Operation::Print, None).await.unwrap_err();
	assert_eq!(err.code(), Some(1002));
	match err {
		XpyunError::Api { message, data, .. } => {
			assert_eq!(message, "bad sign");
			assert_eq!(data, json!({"hint": "clock"}));
		}
		other => panic!("unexpected error: {:?}", other),
	}
}

#[tokio::test]
async fn test_http_failure_is_network_error() {
	let client = client(MockTransport::new().fail(TransportError::Http {
		status: 502,
		body: "bad gateway".to_string(),
	}));

	let err = client.send(Operation::Print, None).await.unwrap_err();
	assert!(err.is_network());
	assert_eq!(err.code(), None);
}

#[tokio::test]
async fn test_unparseable_body_is_generic_error() {
	let client = client(
		MockTransport::new()
			.reply("<html>maintenance</html>")
			.reply("[1, 2, 3]"),
	);

	let err = client.send(Operation::Print, None).await.unwrap_err();
	assert!(matches!(&err, XpyunError::Generic(m) if m.starts_with("response parse failed")));

	let err = client.send(Operation::Print, None).await.unwrap_err();
	assert!(matches!(err, XpyunError::Generic(_)));
}

#[tokio::test]
async fn test_object_without_integer_code_is_api_error() {
	let client = client(
		MockTransport::new()
			.reply(r#"{"msg":"denied","data":null}"#)
			.reply(r#"{"code":"1","msg":"denied"}"#),
	);

	let err = client.send(Operation::Print, None).await.unwrap_err();
	assert_eq!(err.code(), Some(UNKNOWN_ERROR_CODE));
	assert!(matches!(&err, XpyunError::Api { message, .. } if message == "denied"));

	let err = client.send(Operation::Print, None).await.unwrap_err();
	match err {
		XpyunError::Api { code, data, .. } => {
			assert_eq!(code, UNKNOWN_ERROR_CODE);
			assert_eq!(data["code"], json!("1"));
		}
		other => panic!("unexpected error: {:?}", other),
	}
}

#[tokio::test]
async fn test_each_call_issues_one_request() {
	let client = client(MockTransport::new().fail(TransportError::Timeout));

	assert!(client.send(Operation::Print, None).await.is_err());
	assert!(client.send(Operation::Print, None).await.is_ok());
	assert_eq!(client.transport().requests().len(), 2);
}

#[test]
fn test_sync_client_blocks_on_single_call() {
	let sync = SyncClient::from_client(client(MockTransport::new().reply(OK_BODY))).unwrap();

	let response = sync.query_printer_status("SN1").unwrap();
	assert_eq!(response.data, Value::Null);

	let requests = sync.client().transport().requests();
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].operation(), "queryPrinterStatus");
	assert_eq!(requests[0].body["sn"], json!("SN1"));
}
