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

use std::future::Future;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::{Result, XpyunError};
use crate::signing::{RequestSigner, unix_millis};
use crate::transport::{HttpTransport, Transport};
use crate::types::{
	ApiResponse, LabelRequest, Operation, Params, PlayVoiceRequest, PrinterEntry, TicketRequest,
	VoiceTypeRequest,
};

/// Envelope key carrying the account identity
pub const KEY_USER: &str = "user";
/// Envelope key carrying the signed unix timestamp (seconds)
pub const KEY_TIMESTAMP: &str = "timestamp";
/// Envelope key carrying the signature
pub const KEY_SIGN: &str = "sign";
/// Envelope key carrying the request time in milliseconds (not signed)
pub const KEY_REQUEST_TIME: &str = "requestTime";

/// Keys generated by the client; caller params never override them.
pub const RESERVED_KEYS: [&str; 4] = [KEY_USER, KEY_TIMESTAMP, KEY_SIGN, KEY_REQUEST_TIME];

/// Tracing target for debug-mode wire dumps.
pub const WIRE_LOG_TARGET: &str = "xpyun_sdk::wire";

/// Client for the Xpyun open API.
///
/// Every call goes through [`Client::send`]: sign, POST once, classify. There
/// are no retries and no state shared between calls apart from the transport's
/// connection pool.
pub struct Client<T = HttpTransport> {
	credentials: Credentials,
	config: ClientConfig,
	transport: T,
}

impl Client<HttpTransport> {
	/// Create a client with the default configuration
	pub fn new(credentials: Credentials) -> Result<Self> {
		Self::with_config(credentials, ClientConfig::default())
	}

	/// Create a client with custom configuration
	pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
		let transport = HttpTransport::new(config.timeout(), &config.user_agent)?;
		Ok(Self::with_transport(credentials, config, transport))
	}
}

impl<T: Transport> Client<T> {
	/// Create a client over an arbitrary transport
	pub fn with_transport(credentials: Credentials, config: ClientConfig, transport: T) -> Self {
		if config.debug {
			warn!(
				target: WIRE_LOG_TARGET,
				"Debug wire logging enabled; request envelopes are logged verbatim and must not reach production logs"
			);
		}

		Self {
			credentials,
			config,
			transport,
		}
	}

	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Build the request envelope for a given clock reading.
	///
	/// `timestamp` and `requestTime` come from the same reading, so
	/// `timestamp == requestTime / 1000`. Caller params that use a reserved
	/// key are dropped.
	pub fn envelope_at(&self, params: Option<Params>, unix_millis: u64) -> Params {
		let auth = RequestSigner::new(&self.credentials).auth_params_at(unix_millis);

		let mut envelope = Params::new();
		envelope.insert(KEY_USER.to_string(), Value::String(auth.identity));
		envelope.insert(
			KEY_TIMESTAMP.to_string(),
			Value::String(auth.timestamp.to_string()),
		);
		envelope.insert(KEY_SIGN.to_string(), Value::String(auth.signature));
		envelope.insert(KEY_REQUEST_TIME.to_string(), json!(unix_millis));

		for (key, value) in params.into_iter().flatten() {
			if RESERVED_KEYS.contains(&key.as_str()) {
				warn!(key = %key, "Ignoring caller param that collides with a reserved envelope key");
				continue;
			}
			envelope.insert(key, value);
		}

		envelope
	}

	/// Send one operation and classify the outcome.
	///
	/// On `code == 0` the full parsed response is returned; callers that only
	/// want the payload read `data` themselves.
	pub async fn send(
		&self,
		operation: impl AsRef<str>,
		params: Option<Params>,
	) -> Result<ApiResponse> {
		let operation = operation.as_ref();
		let url = self.config.operation_url(operation);
		let envelope = self.envelope_at(params, unix_millis());
		let body = serde_json::to_string(&envelope)?;

		debug!(operation = %operation, url = %url, "POST request");
		if self.config.debug {
			info!(
				target: WIRE_LOG_TARGET,
				operation = %operation,
				"Request envelope: {}",
				serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| body.clone())
			);
		}

		let raw = self.transport.post_json(&url, body).await.map_err(|e| {
			debug!(operation = %operation, error = %e, "Transport failure");
			XpyunError::Network(e)
		})?;

		if self.config.debug {
			info!(target: WIRE_LOG_TARGET, operation = %operation, "Raw response: {}", raw);
		}

		let value: Value = serde_json::from_str(&raw).map_err(|e| {
			warn!(operation = %operation, body = %raw, error = %e, "Failed to parse response");
			XpyunError::Generic(format!("response parse failed: {}", e))
		})?;

		let response = ApiResponse::from_value(value)?.into_result();
		if let Err(XpyunError::Api { code, message, .. }) = &response {
			debug!(operation = %operation, code, message = %message, "API returned error code");
		}
		response
	}

	async fn send_payload<P: Serialize>(
		&self,
		operation: Operation,
		payload: &P,
	) -> Result<ApiResponse> {
		let params = to_params(payload)?;
		self.send(operation, Some(params)).await
	}

	/// Register printers
	pub async fn add_printers(&self, printers: &[PrinterEntry]) -> Result<ApiResponse> {
		self.send_payload(Operation::AddPrinters, &json!({ "items": printers }))
			.await
	}

	/// Print a receipt
	pub async fn print_ticket(&self, request: &TicketRequest) -> Result<ApiResponse> {
		self.send_payload(Operation::Print, request).await
	}

	/// Print a label
	pub async fn print_label(&self, request: &LabelRequest) -> Result<ApiResponse> {
		self.send_payload(Operation::PrintLabel, request).await
	}

	/// Remove printers from the account
	pub async fn del_printers(&self, sn_list: &[String]) -> Result<ApiResponse> {
		self.send_payload(Operation::DelPrinters, &json!({ "snlist": sn_list }))
			.await
	}

	/// Rename a printer
	pub async fn upd_printer(&self, sn: &str, name: &str) -> Result<ApiResponse> {
		self.send_payload(Operation::UpdPrinter, &json!({ "sn": sn, "name": name }))
			.await
	}

	/// Drop all pending jobs of a printer
	pub async fn del_printer_queue(&self, sn: &str) -> Result<ApiResponse> {
		self.send_payload(Operation::DelPrinterQueue, &json!({ "sn": sn }))
			.await
	}

	pub async fn query_order_state(&self, order_id: &str) -> Result<ApiResponse> {
		self.send_payload(Operation::QueryOrderState, &json!({ "orderId": order_id }))
			.await
	}

	/// Order statistics between two `YYYYMMDD` dates (inclusive)
	pub async fn query_order_statistics(
		&self,
		sn: &str,
		date_from: &str,
		date_to: &str,
	) -> Result<ApiResponse> {
		self.send_payload(
			Operation::QueryOrderStatis,
			&json!({ "sn": sn, "dateFrom": date_from, "dateTo": date_to }),
		)
		.await
	}

	pub async fn query_printer_status(&self, sn: &str) -> Result<ApiResponse> {
		self.send_payload(Operation::QueryPrinterStatus, &json!({ "sn": sn }))
			.await
	}

	pub async fn query_printers_status(&self, sn_list: &[String]) -> Result<ApiResponse> {
		self.send_payload(Operation::QueryPrintersStatus, &json!({ "snlist": sn_list }))
			.await
	}

	pub async fn set_voice_type(&self, request: &VoiceTypeRequest) -> Result<ApiResponse> {
		self.send_payload(Operation::SetVoiceType, request).await
	}

	pub async fn play_voice(&self, request: &PlayVoiceRequest) -> Result<ApiResponse> {
		self.send_payload(Operation::PlayVoice, request).await
	}
}

/// Serialize a payload struct into envelope params.
pub fn to_params<P: Serialize>(payload: &P) -> Result<Params> {
	match serde_json::to_value(payload)? {
		Value::Object(map) => Ok(map),
		other => Err(XpyunError::Generic(format!(
			"operation payload must be a JSON object, got {}",
			other
		))),
	}
}

/// Synchronous client wrapper
///
/// This wraps the async client and runs it on a private tokio runtime, so
/// each call blocks the calling thread until the single attempt completes.
pub struct SyncClient<T = HttpTransport> {
	client: Client<T>,
	runtime: tokio::runtime::Runtime,
}

impl SyncClient<HttpTransport> {
	/// Create a new synchronous client
	pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
		Self::from_client(Client::with_config(credentials, config)?)
	}
}

impl<T: Transport> SyncClient<T> {
	/// Wrap an existing async client
	pub fn from_client(client: Client<T>) -> Result<Self> {
		let runtime = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.map_err(|e| XpyunError::Generic(format!("Failed to create tokio runtime: {}", e)))?;
		Ok(Self { client, runtime })
	}

	pub fn client(&self) -> &Client<T> {
		&self.client
	}

	/// Drive any SDK future (e.g. a service call) to completion
	pub fn block_on<F: Future>(&self, future: F) -> F::Output {
		self.runtime.block_on(future)
	}

	/// Send one operation (synchronous)
	pub fn send(&self, operation: impl AsRef<str>, params: Option<Params>) -> Result<ApiResponse> {
		self.runtime.block_on(self.client.send(operation, params))
	}

	/// Print a receipt (synchronous)
	pub fn print_ticket(&self, request: &TicketRequest) -> Result<ApiResponse> {
		self.runtime.block_on(self.client.print_ticket(request))
	}

	/// Print a label (synchronous)
	pub fn print_label(&self, request: &LabelRequest) -> Result<ApiResponse> {
		self.runtime.block_on(self.client.print_label(request))
	}

	/// Query one printer (synchronous)
	pub fn query_printer_status(&self, sn: &str) -> Result<ApiResponse> {
		self.runtime.block_on(self.client.query_printer_status(sn))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, Mutex};

	use super::*;
	use crate::signing::sign;
	use crate::transport::TransportError;

	/// Answers every request with the same canned outcome and keeps the bodies.
	struct CannedTransport {
		reply: fn() -> std::result::Result<String, TransportError>,
		seen: Mutex<Vec<(String, String)>>,
	}

	impl CannedTransport {
		fn new(reply: fn() -> std::result::Result<String, TransportError>) -> Self {
			Self {
				reply,
				seen: Mutex::new(Vec::new()),
			}
		}
	}

	impl Transport for CannedTransport {
		async fn post_json(
			&self,
			url: &str,
			body: String,
		) -> std::result::Result<String, TransportError> {
			self.seen.lock().unwrap().push((url.to_string(), body));
			(self.reply)()
		}
	}

	fn client(reply: fn() -> std::result::Result<String, TransportError>) -> Client<CannedTransport> {
		Client::with_transport(
			Credentials::new("user", "user-key"),
			ClientConfig::default().with_base_url("http://printer.test/api"),
			CannedTransport::new(reply),
		)
	}

	#[test]
	fn test_envelope_contains_auth_fields() {
		let client = client(|| Ok(String::new()));
		let envelope = client.envelope_at(None, 1_700_000_000_123);

		assert_eq!(envelope["user"], json!("user"));
		assert_eq!(envelope["timestamp"], json!("1700000000"));
		assert_eq!(envelope["sign"], json!(sign("user", "user-key", 1_700_000_000)));
		assert_eq!(envelope["requestTime"], json!(1_700_000_000_123u64));
		assert_eq!(envelope.len(), 4);
	}

	#[test]
	fn test_reserved_keys_not_overridden() {
		let client = client(|| Ok(String::new()));
		let mut params = Params::new();
		params.insert("user".to_string(), json!("mallory"));
		params.insert("timestamp".to_string(), json!("1"));
		params.insert("sign".to_string(), json!("0000"));
		params.insert("requestTime".to_string(), json!(1));
		params.insert("sn".to_string(), json!("SN1"));

		let envelope = client.envelope_at(Some(params), 1_700_000_000_000);

		assert_eq!(envelope["user"], json!("user"));
		assert_eq!(envelope["timestamp"], json!("1700000000"));
		assert_eq!(envelope["sign"], json!(sign("user", "user-key", 1_700_000_000)));
		assert_eq!(envelope["requestTime"], json!(1_700_000_000_000u64));
		assert_eq!(envelope["sn"], json!("SN1"));
	}

	#[tokio::test]
	async fn test_send_returns_full_response() {
		let client = client(|| Ok(r#"{"code":0,"msg":"ok","data":{"orderId":"OM1"}}"#.to_string()));

		let response = client.send(Operation::Print, None).await.unwrap();
		assert_eq!(response.code, 0);
		assert_eq!(response.message, "ok");
		assert_eq!(response.data, json!({"orderId": "OM1"}));

		let seen = client.transport().seen.lock().unwrap();
		assert_eq!(seen[0].0, "http://printer.test/api/print");
	}

	#[tokio::test]
	async fn test_send_api_error() {
		let client = client(|| Ok(r#"{"code":3,"msg":"printer not found"}"#.to_string()));

		let err = client.send("queryPrinterStatus", None).await.unwrap_err();
		match err {
			XpyunError::Api {
				code,
				message,
				data,
			} => {
				assert_eq!(code, 3);
				assert_eq!(message, "printer not found");
				assert_eq!(data, Value::Null);
			}
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_send_network_error() {
		let client = client(|| Err(TransportError::Connection("connection refused".to_string())));

		let err = client.send(Operation::Print, None).await.unwrap_err();
		match err {
			XpyunError::Network(TransportError::Connection(cause)) => {
				assert_eq!(cause, "connection refused");
			}
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_send_invalid_json_is_generic() {
		let client = client(|| Ok("<html>bad gateway</html>".to_string()));

		let err = client.send(Operation::Print, None).await.unwrap_err();
		match err {
			XpyunError::Generic(message) => assert!(message.starts_with("response parse failed")),
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_debug_mode_still_sends_once() {
		let client = Client::with_transport(
			Credentials::new("user", "user-key"),
			ClientConfig::default().with_debug(true),
			CannedTransport::new(|| Ok(r#"{"code":0,"data":null}"#.to_string())),
		);

		client.send(Operation::DelPrinterQueue, None).await.unwrap();
		assert_eq!(client.transport().seen.lock().unwrap().len(), 1);
	}

	/// Run `send` under a subscriber that captures formatted output.
	fn captured_send(debug: bool) -> (String, String) {
		let logs = Arc::new(Mutex::new(Vec::<u8>::new()));
		let writer = logs.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_max_level(tracing::Level::INFO)
			.with_ansi(false)
			.with_writer(move || CapturedWriter(writer.clone()))
			.finish();

		let signature = tracing::subscriber::with_default(subscriber, || {
			let client = Client::with_transport(
				Credentials::new("user", "user-key"),
				ClientConfig::default().with_debug(debug),
				CannedTransport::new(|| {
					Ok(r#"{"code":0,"msg":"wire-reply-ok","data":null}"#.to_string())
				}),
			);
			let sync = SyncClient::from_client(client).unwrap();
			sync.send(Operation::DelPrinterQueue, None).unwrap();

			let seen = sync.client().transport().seen.lock().unwrap();
			let body: Value = serde_json::from_str(&seen[0].1).unwrap();
			body[KEY_SIGN].as_str().unwrap().to_string()
		});

		let output = String::from_utf8(logs.lock().unwrap().clone()).unwrap();
		(output, signature)
	}

	struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

	impl std::io::Write for CapturedWriter {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn test_debug_mode_logs_envelope_then_response() {
		let (output, signature) = captured_send(true);

		let envelope_at = output.find(&signature).expect("envelope not logged");
		let response_at = output.find("wire-reply-ok").expect("response not logged");
		assert!(envelope_at < response_at);
		assert!(output.contains(WIRE_LOG_TARGET));
	}

	#[test]
	fn test_wire_logging_off_by_default() {
		let (output, signature) = captured_send(false);

		assert!(!output.contains(&signature));
		assert!(!output.contains("wire-reply-ok"));
	}

	#[tokio::test]
	async fn test_typed_operation_payload() {
		let client = client(|| Ok(r#"{"code":0,"data":true}"#.to_string()));

		client
			.query_order_statistics("SN1", "20240101", "20240107")
			.await
			.unwrap();

		let seen = client.transport().seen.lock().unwrap();
		let (url, body) = &seen[0];
		let body: Value = serde_json::from_str(body).unwrap();
		assert_eq!(url, "http://printer.test/api/queryOrderStatis");
		assert_eq!(body["sn"], json!("SN1"));
		assert_eq!(body["dateFrom"], json!("20240101"));
		assert_eq!(body["dateTo"], json!("20240107"));
		assert!(body["sign"].as_str().unwrap().len() == 40);
	}

	#[test]
	fn test_to_params_rejects_non_objects() {
		assert!(to_params(&json!(["a"])).is_err());
		assert!(to_params(&json!({"sn": "SN1"})).is_ok());
	}

	#[test]
	fn test_sync_client_send() {
		let sync = SyncClient::from_client(client(|| {
			Ok(r#"{"code":0,"msg":"ok","data":1}"#.to_string())
		}))
		.unwrap();

		let response = sync.send(Operation::QueryPrinterStatus, None).unwrap();
		assert_eq!(response.data, json!(1));
	}
}
