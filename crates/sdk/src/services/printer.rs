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

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::{UNKNOWN, field_bool, field_str, require, require_list};
use crate::client::Client;
use crate::error::{Result, XpyunError};
use crate::transport::{HttpTransport, Transport};
use crate::types::{ApiResponse, PrinterEntry};

/// Default queue status when the printer does not report one
const DEFAULT_QUEUE_STATUS: &str = "normal";

/// Printer summary that never fails to build
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrinterInfo {
	pub sn: String,
	/// Raw status payload, `"unknown"` when the query failed
	pub status: Value,
	pub is_online: bool,
	pub queue_status: String,
}

/// Printer registration and housekeeping
pub struct PrinterManager<'a, T = HttpTransport> {
	client: &'a Client<T>,
}

impl<'a, T: Transport> PrinterManager<'a, T> {
	pub fn new(client: &'a Client<T>) -> Self {
		Self { client }
	}

	/// Register a single printer
	pub async fn add_printer(
		&self,
		sn: &str,
		name: &str,
		card: Option<&str>,
	) -> Result<ApiResponse> {
		let mut entry = PrinterEntry::new(sn, name);
		if let Some(card) = card.filter(|c| !c.is_empty()) {
			entry = entry.with_card(card);
		}
		self.add_printers(&[entry]).await
	}

	/// Register several printers in one request
	pub async fn add_printers(&self, printers: &[PrinterEntry]) -> Result<ApiResponse> {
		if printers.is_empty() {
			return Err(XpyunError::invalid("printer list must not be empty"));
		}
		for printer in printers {
			if printer.sn.trim().is_empty() || printer.name.trim().is_empty() {
				return Err(XpyunError::invalid(
					"every printer needs a non-empty sn and name",
				));
			}
		}

		self.client.add_printers(printers).await
	}

	pub async fn delete_printer(&self, sn: &str) -> Result<ApiResponse> {
		require(sn, "sn")?;
		self.client.del_printers(&[sn.to_string()]).await
	}

	pub async fn delete_printers(&self, sn_list: &[String]) -> Result<ApiResponse> {
		require_list(sn_list, "sn list")?;
		self.client.del_printers(sn_list).await
	}

	pub async fn update_printer_name(&self, sn: &str, name: &str) -> Result<ApiResponse> {
		require(sn, "sn")?;
		require(name, "name")?;
		self.client.upd_printer(sn, name).await
	}

	/// Drop all pending jobs on the printer
	pub async fn clear_print_queue(&self, sn: &str) -> Result<ApiResponse> {
		require(sn, "sn")?;
		self.client.del_printer_queue(sn).await
	}

	pub async fn get_printer_status(&self, sn: &str) -> Result<ApiResponse> {
		require(sn, "sn")?;
		self.client.query_printer_status(sn).await
	}

	pub async fn get_printers_status(&self, sn_list: &[String]) -> Result<ApiResponse> {
		require_list(sn_list, "sn list")?;
		self.client.query_printers_status(sn_list).await
	}

	/// Status summary for one printer.
	///
	/// Any failure is folded into an "unknown / offline" summary.
	pub async fn get_printer_info(&self, sn: &str) -> PrinterInfo {
		match self.get_printer_status(sn).await {
			Ok(response) => PrinterInfo {
				sn: sn.to_string(),
				is_online: field_bool(&response.data, "connected"),
				queue_status: queue_status(&response.data),
				status: response.data,
			},
			Err(e) => {
				warn!(sn = %sn, error = %e, "Printer status unavailable");
				PrinterInfo {
					sn: sn.to_string(),
					status: Value::String(UNKNOWN.to_string()),
					is_online: false,
					queue_status: UNKNOWN.to_string(),
				}
			}
		}
	}
}

fn queue_status(data: &Value) -> String {
	if data.is_null() || data.as_object().is_some_and(|m| m.is_empty()) {
		return UNKNOWN.to_string();
	}
	field_str(data, "queue_status").unwrap_or_else(|| DEFAULT_QUEUE_STATUS.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_queue_status() {
		assert_eq!(queue_status(&Value::Null), UNKNOWN);
		assert_eq!(queue_status(&json!({})), UNKNOWN);
		assert_eq!(queue_status(&json!({"connected": true})), "normal");
		assert_eq!(queue_status(&json!({"queue_status": "busy"})), "busy");
	}
}
