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

//! Domain services layered on top of [`Client`](crate::Client).
//!
//! Each service borrows a client, validates its arguments and then issues
//! exactly one request per remote operation. Rejected arguments never reach
//! the network.

pub mod print;
pub mod printer;
pub mod query;
pub mod voice;

pub use print::{
	BatchOutcome, LabelOptions, OrderDocument, PrintService, PrintTask, ReceiptOptions,
};
pub use printer::{PrinterInfo, PrinterManager};
pub use query::{
	OrderStatistics, OrderStatus, PrinterOverview, PrinterStatus, PrintersStatus, QueryService,
	Report, ReportKind, StatisticsRange,
};
pub use voice::{AutoOrder, AutoVoiceMode, Gender, Language, Notice, VoiceService, VoiceSettings};

use serde_json::Value;

use crate::error::{Result, XpyunError};

/// Placeholder reported when a value could not be determined.
pub const UNKNOWN: &str = "unknown";

fn require(value: &str, what: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(XpyunError::invalid(format!("{} must not be empty", what)));
	}
	Ok(())
}

fn require_list(values: &[String], what: &str) -> Result<()> {
	if values.is_empty() {
		return Err(XpyunError::invalid(format!("{} must not be empty", what)));
	}
	Ok(())
}

fn field_str(data: &Value, key: &str) -> Option<String> {
	match data.get(key)? {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

fn field_bool(data: &Value, key: &str) -> bool {
	match data.get(key) {
		Some(Value::Bool(b)) => *b,
		Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
		_ => false,
	}
}

fn field_u64(data: &Value, key: &str) -> u64 {
	data.get(key).and_then(Value::as_u64).unwrap_or_default()
}
