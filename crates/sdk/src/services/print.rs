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

use tracing::{debug, warn};

use super::require;
use crate::client::Client;
use crate::error::{Result, XpyunError};
use crate::format::{LabelData, ReceiptData};
use crate::transport::{HttpTransport, Transport};
use crate::types::{ApiResponse, LabelRequest, PrintMode, TicketRequest, flag};

/// Allowed receipt copies
pub const RECEIPT_COPIES: std::ops::RangeInclusive<u32> = 1..=10;

/// Allowed label quantity
pub const LABEL_QUANTITY: std::ops::RangeInclusive<u32> = 1..=100;

/// Default label width in millimetres
pub const DEFAULT_LABEL_WIDTH: u32 = 30;

/// Label height used for order labels, in millimetres
pub const DEFAULT_ORDER_LABEL_HEIGHT: u32 = 50;

/// Receipt print options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptOptions {
	pub copies: u32,
	pub code_u: Option<String>,
	/// Queue normally (`true`) or force printing (`false`)
	pub auto_print: bool,
	pub voice_enabled: bool,
}

impl Default for ReceiptOptions {
	fn default() -> Self {
		Self {
			copies: 1,
			code_u: None,
			auto_print: true,
			voice_enabled: false,
		}
	}
}

/// Label print options; all sizes in millimetres
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelOptions {
	pub height: u32,
	pub width: u32,
	pub quantity: u32,
	pub top_margin: u32,
	pub left_margin: u32,
	pub code_u: Option<String>,
}

impl LabelOptions {
	pub fn with_height(height: u32) -> Self {
		Self {
			height,
			width: DEFAULT_LABEL_WIDTH,
			quantity: 1,
			top_margin: 0,
			left_margin: 0,
			code_u: None,
		}
	}
}

impl Default for LabelOptions {
	fn default() -> Self {
		Self::with_height(DEFAULT_ORDER_LABEL_HEIGHT)
	}
}

/// Structured order to render and print
#[derive(Debug, Clone, PartialEq)]
pub enum OrderDocument {
	Receipt(ReceiptData, ReceiptOptions),
	Label(LabelData, LabelOptions),
}

/// One entry of a batch run
#[derive(Debug, Clone, PartialEq)]
pub enum PrintTask {
	Receipt {
		sn: String,
		content: String,
		options: ReceiptOptions,
	},
	Label {
		sn: String,
		content: String,
		options: LabelOptions,
	},
	Order {
		sn: String,
		document: OrderDocument,
	},
}

/// Result of one batch task
#[derive(Debug)]
pub struct BatchOutcome {
	pub task: PrintTask,
	pub result: Result<ApiResponse>,
}

impl BatchOutcome {
	pub fn is_success(&self) -> bool {
		self.result.is_ok()
	}
}

/// Receipt and label printing
pub struct PrintService<'a, T = HttpTransport> {
	client: &'a Client<T>,
}

impl<'a, T: Transport> PrintService<'a, T> {
	pub fn new(client: &'a Client<T>) -> Self {
		Self { client }
	}

	/// Print receipt content; the response `data` carries the order id
	pub async fn print_receipt(
		&self,
		sn: &str,
		content: &str,
		options: &ReceiptOptions,
	) -> Result<ApiResponse> {
		let request = receipt_request(sn, content, options)?;
		self.client.print_ticket(&request).await
	}

	/// Print label content; the response `data` carries the order id
	pub async fn print_label(
		&self,
		sn: &str,
		content: &str,
		options: &LabelOptions,
	) -> Result<ApiResponse> {
		let request = label_request(sn, content, options)?;
		self.client.print_label(&request).await
	}

	/// Render a structured order and print it
	pub async fn print_order(&self, sn: &str, document: &OrderDocument) -> Result<ApiResponse> {
		match document {
			OrderDocument::Receipt(data, options) => {
				self.print_receipt(sn, &data.render(), options).await
			}
			OrderDocument::Label(data, options) => {
				self.print_label(sn, &data.render(), options).await
			}
		}
	}

	/// Run every task in order, collecting each outcome.
	pub async fn batch_print(&self, tasks: Vec<PrintTask>) -> Vec<BatchOutcome> {
		let mut outcomes = Vec::with_capacity(tasks.len());

		for task in tasks {
			let result = match &task {
				PrintTask::Receipt {
					sn,
					content,
					options,
				} => self.print_receipt(sn, content, options).await,
				PrintTask::Label {
					sn,
					content,
					options,
				} => self.print_label(sn, content, options).await,
				PrintTask::Order { sn, document } => self.print_order(sn, document).await,
			};

			if let Err(e) = &result {
				warn!(error = %e, "Batch print task failed");
			}
			outcomes.push(BatchOutcome { task, result });
		}

		debug!(
			total = outcomes.len(),
			failed = outcomes.iter().filter(|o| !o.is_success()).count(),
			"Batch print finished"
		);
		outcomes
	}
}

/// Validate receipt arguments and build the `print` payload.
pub fn receipt_request(sn: &str, content: &str, options: &ReceiptOptions) -> Result<TicketRequest> {
	require(sn, "sn")?;
	require(content, "content")?;
	if !RECEIPT_COPIES.contains(&options.copies) {
		return Err(XpyunError::invalid(format!(
			"copies must be between {} and {}",
			RECEIPT_COPIES.start(),
			RECEIPT_COPIES.end()
		)));
	}

	let mode = if options.auto_print {
		PrintMode::Auto
	} else {
		PrintMode::Force
	};

	Ok(TicketRequest {
		sn: sn.to_string(),
		content: content.to_string(),
		times: options.copies,
		mode: mode.code(),
		voice: flag(options.voice_enabled),
		code_u: options.code_u.clone().filter(|c| !c.is_empty()),
	})
}

/// Validate label arguments and build the `printLabel` payload.
pub fn label_request(sn: &str, content: &str, options: &LabelOptions) -> Result<LabelRequest> {
	require(sn, "sn")?;
	require(content, "content")?;
	if options.height == 0 || options.width == 0 {
		return Err(XpyunError::invalid(
			"label height and width must be positive",
		));
	}
	if !LABEL_QUANTITY.contains(&options.quantity) {
		return Err(XpyunError::invalid(format!(
			"quantity must be between {} and {}",
			LABEL_QUANTITY.start(),
			LABEL_QUANTITY.end()
		)));
	}

	Ok(LabelRequest {
		sn: sn.to_string(),
		content: content.to_string(),
		height: options.height,
		quantity: options.quantity,
		width: options.width,
		top: options.top_margin,
		left: options.left_margin,
		code_u: options.code_u.clone().filter(|c| !c.is_empty()),
	})
}
