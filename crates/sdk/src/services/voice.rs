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

//! Voice announcements.
//!
//! `setVoiceType` takes a numeric voice code, `playVoice` takes a prompt name
//! such as `AMOUNT_CASH` or `FEMALE_NEW_ORDER`. The prompt names are built
//! here from typed parts so callers never concatenate strings themselves.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::print::{PrintService, ReceiptOptions};
use super::{field_bool, field_str, require};
use crate::client::Client;
use crate::error::Result;
use crate::transport::{HttpTransport, Transport};
use crate::types::{ApiResponse, PayType, PlayVoiceRequest, VoiceType, VoiceTypeRequest, flag};

/// Pause between the amount prompt and the new-order prompt
pub const DEFAULT_ANNOUNCE_PAUSE: Duration = Duration::from_secs(1);

/// Prompt played for a new order
pub const NEW_ORDER_PROMPT: &str = "NEW_ORDER";

/// Speaker gender used in prompt names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
	Female,
	Male,
}

impl Gender {
	pub fn as_str(self) -> &'static str {
		match self {
			Gender::Female => "FEMALE",
			Gender::Male => "MALE",
		}
	}
}

/// Prompt language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
	Mandarin,
	Cantonese,
	English,
}

/// Canned printer notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
	NewOrder,
	CompleteOrder,
	Error,
	NoPaper,
	LowBattery,
}

impl Notice {
	pub fn as_str(self) -> &'static str {
		match self {
			Notice::NewOrder => NEW_ORDER_PROMPT,
			Notice::CompleteOrder => "COMPLETE_ORDER",
			Notice::Error => "ERROR",
			Notice::NoPaper => "NO_PAPER",
			Notice::LowBattery => "LOW_BATTERY",
		}
	}
}

/// Prompt name for a payment amount announcement
pub fn amount_prompt(pay_type: PayType) -> String {
	format!("AMOUNT_{}", pay_type.symbol())
}

/// Prompt name for a message in a given language and voice.
///
/// Mandarin prompts carry only the gender (`FEMALE_x`); the others are
/// prefixed with the language (`CANTONESE_MALE_x`).
pub fn language_prompt(language: Language, gender: Gender, message: &str) -> String {
	match language {
		Language::Mandarin => format!("{}_{}", gender.as_str(), message),
		Language::Cantonese => format!("CANTONESE_{}_{}", gender.as_str(), message),
		Language::English => format!("ENGLISH_{}_{}", gender.as_str(), message),
	}
}

/// Prompt name for a canned notice (`FEMALE_NO_PAPER`, ...)
pub fn notice_prompt(gender: Gender, notice: Notice) -> String {
	format!("{}_{}", gender.as_str(), notice.as_str())
}

/// Order data for automatic announcements
#[derive(Debug, Clone, PartialEq)]
pub struct AutoOrder {
	pub total_amount: Option<f64>,
	pub pay_type: PayType,
}

/// Outcome of enabling automatic announcements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoVoiceMode {
	pub voice_type_set: ApiResponse,
	pub auto_voice_contents: Vec<String>,
	pub message: String,
}

/// Voice settings as reported by printer status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSettings {
	pub is_voice_enabled: bool,
	pub current_voice_type: Option<VoiceType>,
	/// Absent on printers without a speaker
	pub voice_quality: Option<String>,
	pub last_voice_update: Option<String>,
	pub supported_voices: Vec<&'static str>,
}

impl VoiceSettings {
	pub fn from_data(data: &Value) -> Self {
		let current_voice_type = data
			.get("voiceType")
			.and_then(Value::as_u64)
			.and_then(|code| u8::try_from(code).ok())
			.and_then(|code| VoiceType::try_from(code).ok());

		Self {
			is_voice_enabled: field_bool(data, "voiceEnabled"),
			current_voice_type,
			voice_quality: field_str(data, "voiceQuality"),
			last_voice_update: field_str(data, "lastVoiceUpdate"),
			supported_voices: VoiceType::TABLE.iter().map(|(s, _, _)| *s).collect(),
		}
	}
}

/// Voice type configuration and announcements
pub struct VoiceService<'a, T = HttpTransport> {
	client: &'a Client<T>,
	announce_pause: Duration,
}

impl<'a, T: Transport> VoiceService<'a, T> {
	pub fn new(client: &'a Client<T>) -> Self {
		Self {
			client,
			announce_pause: DEFAULT_ANNOUNCE_PAUSE,
		}
	}

	/// Override the pause used by [`VoiceService::voice_auto_order`]
	pub fn with_announce_pause(mut self, pause: Duration) -> Self {
		self.announce_pause = pause;
		self
	}

	/// Select the printer voice and switch announcements on or off
	pub async fn set_voice_type(
		&self,
		sn: &str,
		voice_type: VoiceType,
		enabled: bool,
	) -> Result<ApiResponse> {
		require(sn, "sn")?;
		let request = VoiceTypeRequest {
			sn: sn.to_string(),
			voice_type: voice_type.code(),
			voice: Some(flag(enabled)),
		};
		self.client.set_voice_type(&request).await
	}

	pub async fn disable_all_voices(&self, sn: &str) -> Result<ApiResponse> {
		self.set_voice_type(sn, VoiceType::MandarinFemale, false)
			.await
	}

	/// Play a named prompt
	pub async fn play_voice(
		&self,
		sn: &str,
		prompt: &str,
		pay_type: Option<PayType>,
	) -> Result<ApiResponse> {
		require(sn, "sn")?;
		require(prompt, "voice prompt")?;
		let request = PlayVoiceRequest {
			sn: sn.to_string(),
			prompt: prompt.to_string(),
			pay_type: pay_type.map(PayType::code),
		};
		self.client.play_voice(&request).await
	}

	/// Announce a received payment
	pub async fn play_amount_voice(
		&self,
		sn: &str,
		amount: f64,
		pay_type: PayType,
	) -> Result<ApiResponse> {
		debug!(sn = %sn, amount, pay_type = %pay_type, "Announcing payment");
		self.play_voice(sn, &amount_prompt(pay_type), Some(pay_type))
			.await
	}

	pub async fn play_welcome_message(&self, sn: &str, voice_type: VoiceType) -> Result<ApiResponse> {
		self.play_voice(sn, &format!("WELCOME_{}", voice_type.symbol()), None)
			.await
	}

	pub async fn test_voice(&self, sn: &str, voice_type: VoiceType) -> Result<ApiResponse> {
		self.play_voice(sn, &format!("TEST_{}", voice_type.symbol()), None)
			.await
	}

	/// Play `message` in the given language and voice
	pub async fn play_language(
		&self,
		sn: &str,
		language: Language,
		gender: Gender,
		message: &str,
		pay_type: Option<PayType>,
	) -> Result<ApiResponse> {
		require(message, "voice message")?;
		self.play_voice(sn, &language_prompt(language, gender, message), pay_type)
			.await
	}

	/// Play one of the canned printer notices
	pub async fn play_notice(&self, sn: &str, gender: Gender, notice: Notice) -> Result<ApiResponse> {
		self.play_voice(sn, &notice_prompt(gender, notice), None)
			.await
	}

	/// Print a receipt, then announce the amount.
	///
	/// A failed announcement is logged and does not fail the print.
	pub async fn print_and_voice(
		&self,
		sn: &str,
		content: &str,
		amount: Option<f64>,
		voice_enabled: bool,
		pay_type: PayType,
	) -> Result<ApiResponse> {
		let options = ReceiptOptions {
			voice_enabled,
			..Default::default()
		};
		let printed = PrintService::new(self.client)
			.print_receipt(sn, content, &options)
			.await?;

		if voice_enabled && let Some(amount) = amount {
			if let Err(e) = self.play_amount_voice(sn, amount, pay_type).await {
				warn!(sn = %sn, error = %e, "Amount announcement failed");
			}
		}

		Ok(printed)
	}

	/// Announce the order amount (if any), pause, then announce a new order.
	///
	/// Failures are logged; `None` means the new-order prompt failed.
	pub async fn voice_auto_order(&self, sn: &str, order: &AutoOrder) -> Option<ApiResponse> {
		if let Some(amount) = order.total_amount {
			match self.play_amount_voice(sn, amount, order.pay_type).await {
				Ok(_) => tokio::time::sleep(self.announce_pause).await,
				Err(e) => warn!(sn = %sn, error = %e, "Amount announcement failed"),
			}
		}

		match self.play_voice(sn, NEW_ORDER_PROMPT, None).await {
			Ok(response) => Some(response),
			Err(e) => {
				warn!(sn = %sn, error = %e, "New order announcement failed");
				None
			}
		}
	}

	/// Select a voice and record which prompts should be announced automatically
	pub async fn set_auto_voice_mode(
		&self,
		sn: &str,
		voice_type: VoiceType,
		contents: Option<Vec<Notice>>,
	) -> Result<AutoVoiceMode> {
		let contents = contents
			.unwrap_or_else(|| vec![Notice::NewOrder, Notice::CompleteOrder, Notice::Error]);
		let voice_type_set = self.set_voice_type(sn, voice_type, true).await?;

		Ok(AutoVoiceMode {
			voice_type_set,
			auto_voice_contents: contents.iter().map(|n| n.as_str().to_string()).collect(),
			message: format!("Voice type {} set, automatic announcements enabled", voice_type),
		})
	}

	/// Voice settings derived from the printer status
	pub async fn get_voice_settings(&self, sn: &str) -> Result<VoiceSettings> {
		require(sn, "sn")?;
		let status = self.client.query_printer_status(sn).await?;
		Ok(VoiceSettings::from_data(&status.data))
	}

	/// Whether the printer reports any voice capability
	pub async fn validate_voice_support(&self, sn: &str) -> Result<bool> {
		Ok(self.get_voice_settings(sn).await?.voice_quality.is_some())
	}
}
