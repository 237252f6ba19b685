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

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{UNKNOWN_ERROR_CODE, UNKNOWN_ERROR_MESSAGE, XpyunError};

/// Caller-supplied operation fields merged into the envelope.
pub type Params = Map<String, Value>;

/// Remote operation, addressed by its path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
	AddPrinters,
	Print,
	PrintLabel,
	DelPrinters,
	UpdPrinter,
	DelPrinterQueue,
	QueryOrderState,
	QueryOrderStatis,
	QueryPrinterStatus,
	QueryPrintersStatus,
	SetVoiceType,
	PlayVoice,
}

impl Operation {
	pub const ALL: [Operation; 12] = [
		Operation::AddPrinters,
		Operation::Print,
		Operation::PrintLabel,
		Operation::DelPrinters,
		Operation::UpdPrinter,
		Operation::DelPrinterQueue,
		Operation::QueryOrderState,
		Operation::QueryOrderStatis,
		Operation::QueryPrinterStatus,
		Operation::QueryPrintersStatus,
		Operation::SetVoiceType,
		Operation::PlayVoice,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Operation::AddPrinters => "addPrinters",
			Operation::Print => "print",
			Operation::PrintLabel => "printLabel",
			Operation::DelPrinters => "delPrinters",
			Operation::UpdPrinter => "updPrinter",
			Operation::DelPrinterQueue => "delPrinterQueue",
			Operation::QueryOrderState => "queryOrderState",
			Operation::QueryOrderStatis => "queryOrderStatis",
			Operation::QueryPrinterStatus => "queryPrinterStatus",
			Operation::QueryPrintersStatus => "queryPrintersStatus",
			Operation::SetVoiceType => "setVoiceType",
			Operation::PlayVoice => "playVoice",
		}
	}
}

impl AsRef<str> for Operation {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Operation {
	type Err = XpyunError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Operation::ALL
			.into_iter()
			.find(|op| op.as_str() == s)
			.ok_or_else(|| XpyunError::invalid(format!("Unsupported operation: {}", s)))
	}
}

/// Parsed response envelope `{code, msg, data}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
	pub code: i64,
	#[serde(rename = "msg")]
	pub message: String,
	pub data: Value,
}

impl ApiResponse {
	/// Interpret a decoded JSON body.
	///
	/// The message is read from `msg`, then `message`. An object whose `code`
	/// is missing or not an integer is a failed call: `code` becomes
	/// [`UNKNOWN_ERROR_CODE`] and `data` holds the whole body, raw `code`
	/// included. Only non-object bodies are rejected outright.
	pub fn from_value(value: Value) -> Result<Self, XpyunError> {
		let Value::Object(mut body) = value else {
			return Err(XpyunError::Generic(
				"response parse failed: body is not a JSON object".to_string(),
			));
		};

		let message = ["msg", "message"]
			.iter()
			.find_map(|key| body.get(*key).and_then(Value::as_str))
			.unwrap_or(UNKNOWN_ERROR_MESSAGE)
			.to_string();

		let Some(code) = body.get("code").and_then(Value::as_i64) else {
			return Ok(Self {
				code: UNKNOWN_ERROR_CODE,
				message,
				data: Value::Object(body),
			});
		};

		let data = body.remove("data").unwrap_or(Value::Null);

		Ok(Self {
			code,
			message,
			data,
		})
	}

	pub fn is_success(&self) -> bool {
		self.code == 0
	}

	/// Convert a non-zero code into [`XpyunError::Api`].
	pub fn into_result(self) -> Result<Self, XpyunError> {
		if self.is_success() {
			Ok(self)
		} else {
			Err(XpyunError::Api {
				code: self.code,
				message: self.message,
				data: self.data,
			})
		}
	}
}

/// Map a boolean switch onto the service's 0/1 integer flags.
pub fn flag(enabled: bool) -> u8 {
	u8::from(enabled)
}

/// Printer registration entry for `addPrinters`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterEntry {
	pub sn: String,
	pub name: String,
	/// Printer identification code; generated by the service when omitted
	#[serde(skip_serializing_if = "Option::is_none")]
	pub card: Option<String>,
}

impl PrinterEntry {
	pub fn new(sn: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			sn: sn.into(),
			name: name.into(),
			card: None,
		}
	}

	pub fn with_card(mut self, card: impl Into<String>) -> Self {
		self.card = Some(card.into());
		self
	}
}

/// Receipt print mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintMode {
	/// Queue the job normally
	#[default]
	Auto,
	/// Print even when the printer reports a problem
	Force,
}

impl PrintMode {
	pub fn code(self) -> u8 {
		match self {
			PrintMode::Auto => 0,
			PrintMode::Force => 1,
		}
	}
}

/// Payload of the `print` operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketRequest {
	pub sn: String,
	pub content: String,
	pub times: u32,
	pub mode: u8,
	pub voice: u8,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub code_u: Option<String>,
}

/// Payload of the `printLabel` operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelRequest {
	pub sn: String,
	pub content: String,
	pub height: u32,
	pub quantity: u32,
	pub width: u32,
	pub top: u32,
	pub left: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub code_u: Option<String>,
}

/// Printer voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceType {
	MandarinFemale,
	MandarinMale,
	CantoneseFemale,
	EnglishFemale,
	CantoneseMale,
	EnglishMale,
}

impl VoiceType {
	/// Symbol → wire code table.
	pub const TABLE: [(&'static str, VoiceType, u8); 6] = [
		("MANDARIN_FEMALE", VoiceType::MandarinFemale, 0),
		("MANDARIN_MALE", VoiceType::MandarinMale, 1),
		("CANTONESE_FEMALE", VoiceType::CantoneseFemale, 2),
		("ENGLISH_FEMALE", VoiceType::EnglishFemale, 3),
		("CANTONESE_MALE", VoiceType::CantoneseMale, 4),
		("ENGLISH_MALE", VoiceType::EnglishMale, 5),
	];

	pub fn code(self) -> u8 {
		Self::entry(self).2
	}

	pub fn symbol(self) -> &'static str {
		Self::entry(self).0
	}

	fn entry(voice: VoiceType) -> (&'static str, VoiceType, u8) {
		Self::TABLE
			.into_iter()
			.find(|(_, v, _)| *v == voice)
			.unwrap_or(Self::TABLE[0])
	}
}

impl fmt::Display for VoiceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.symbol())
	}
}

impl Serialize for VoiceType {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.symbol())
	}
}

impl FromStr for VoiceType {
	type Err = XpyunError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let wanted = s.trim().to_ascii_uppercase();
		Self::TABLE
			.into_iter()
			.find(|(symbol, _, _)| *symbol == wanted)
			.map(|(_, voice, _)| voice)
			.ok_or_else(|| XpyunError::invalid(format!("Unsupported voice type: {}", s)))
	}
}

impl TryFrom<u8> for VoiceType {
	type Error = XpyunError;

	fn try_from(code: u8) -> Result<Self, Self::Error> {
		Self::TABLE
			.into_iter()
			.find(|(_, _, c)| *c == code)
			.map(|(_, voice, _)| voice)
			.ok_or_else(|| XpyunError::invalid(format!("Unsupported voice type code: {}", code)))
	}
}

/// Payment method announced with amount prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayType {
	Other,
	Cash,
	Card,
	QrCode,
}

impl PayType {
	/// Symbol → wire code table.
	pub const TABLE: [(&'static str, PayType, u8); 4] = [
		("OTHER", PayType::Other, 0),
		("CASH", PayType::Cash, 1),
		("CARD", PayType::Card, 2),
		("QR_CODE", PayType::QrCode, 3),
	];

	pub fn code(self) -> u8 {
		Self::entry(self).2
	}

	pub fn symbol(self) -> &'static str {
		Self::entry(self).0
	}

	fn entry(pay: PayType) -> (&'static str, PayType, u8) {
		Self::TABLE
			.into_iter()
			.find(|(_, p, _)| *p == pay)
			.unwrap_or(Self::TABLE[0])
	}
}

impl fmt::Display for PayType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.symbol())
	}
}

impl FromStr for PayType {
	type Err = XpyunError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let wanted = s.trim().to_ascii_uppercase();
		Self::TABLE
			.into_iter()
			.find(|(symbol, _, _)| *symbol == wanted)
			.map(|(_, pay, _)| pay)
			.ok_or_else(|| XpyunError::invalid(format!("Unsupported pay type: {}", s)))
	}
}

impl TryFrom<u8> for PayType {
	type Error = XpyunError;

	fn try_from(code: u8) -> Result<Self, Self::Error> {
		Self::TABLE
			.into_iter()
			.find(|(_, _, c)| *c == code)
			.map(|(_, pay, _)| pay)
			.ok_or_else(|| XpyunError::invalid(format!("Unsupported pay type code: {}", code)))
	}
}

/// Payload of the `setVoiceType` operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceTypeRequest {
	pub sn: String,
	#[serde(rename = "voiceType")]
	pub voice_type: u8,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub voice: Option<u8>,
}

/// Payload of the `playVoice` operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayVoiceRequest {
	pub sn: String,
	/// Prompt name, e.g. `AMOUNT_CASH` or `FEMALE_NEW_ORDER`
	#[serde(rename = "voiceType")]
	pub prompt: String,
	#[serde(rename = "payType", skip_serializing_if = "Option::is_none")]
	pub pay_type: Option<u8>,
}
