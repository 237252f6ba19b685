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

//! Xpyun CLI
//!
//! Command-line front-end for the Xpyun cloud printer open API. Every
//! subcommand maps onto one SDK service call and prints the result as JSON on
//! stdout.
//!
//! Credentials come from `XPYUN_USER` / `XPYUN_USER_KEY` (a `.env` file is
//! honoured); client settings from `XPYUN_*` variables or `--config`.

mod config;
mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use xpyun_sdk::format::{LabelData, test_label, test_receipt};
use xpyun_sdk::services::{
	LabelOptions, OrderDocument, ReceiptOptions, ReportKind, StatisticsRange,
};
use xpyun_sdk::{
	Client, PayType, PrintService, PrinterEntry, PrinterManager, QueryService, VoiceService,
	VoiceType,
};

use crate::config::{Overrides, load_client_config, load_credentials};
use crate::logging::init_logging;

/// Xpyun cloud printer command-line client
#[derive(Parser, Debug)]
#[command(name = "xpyun", version)]
#[command(about = "Manage Xpyun cloud printers and send print jobs")]
struct Args {
	/// Configuration file (TOML/JSON/YAML); XPYUN_* variables still apply on top
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	/// Override the API base URL
	#[arg(long, global = true)]
	base_url: Option<String>,

	/// Override the request timeout in seconds
	#[arg(long, global = true)]
	timeout: Option<u64>,

	/// Log request envelopes and raw responses (not for production)
	#[arg(long, global = true)]
	debug: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Register one printer
	AddPrinter {
		#[arg(long)]
		sn: String,
		#[arg(long)]
		name: String,
		/// Printer identification code
		#[arg(long)]
		card: Option<String>,
	},
	/// Register several printers given as SN=NAME pairs
	AddPrinters {
		#[arg(required = true, value_parser = parse_printer_entry)]
		printers: Vec<PrinterEntry>,
	},
	/// Remove printers from the account
	DeletePrinter {
		#[arg(required = true)]
		sn: Vec<String>,
	},
	/// Rename a printer
	Rename {
		#[arg(long)]
		sn: String,
		#[arg(long)]
		name: String,
	},
	/// Drop all pending jobs of a printer
	ClearQueue { sn: String },
	/// Printer status; several SNs yield an aggregate
	Status {
		#[arg(required = true)]
		sn: Vec<String>,
	},
	/// Status plus today's and yesterday's statistics
	Info { sn: String },
	/// Print a receipt
	Print {
		#[arg(long)]
		sn: String,
		/// Receipt content; read from --file when omitted
		#[arg(long, conflicts_with = "file")]
		content: Option<String>,
		#[arg(long)]
		file: Option<PathBuf>,
		#[arg(long, default_value_t = 1)]
		copies: u32,
		/// Print even when the printer reports a problem
		#[arg(long)]
		force: bool,
		/// Announce the job on the printer speaker
		#[arg(long)]
		voice: bool,
		#[arg(long)]
		code_u: Option<String>,
	},
	/// Print a label
	PrintLabel {
		#[arg(long)]
		sn: String,
		#[arg(long)]
		content: String,
		/// Label height in millimetres
		#[arg(long)]
		height: u32,
		#[arg(long)]
		width: Option<u32>,
		#[arg(long, default_value_t = 1)]
		quantity: u32,
	},
	/// Print the built-in sample receipt or label
	TestPrint {
		#[arg(long)]
		sn: String,
		#[arg(long)]
		label: bool,
	},
	/// Print a product label from its fields
	ProductLabel {
		#[arg(long)]
		sn: String,
		#[arg(long)]
		name: String,
		#[arg(long)]
		barcode: Option<String>,
		#[arg(long)]
		price: Option<f64>,
	},
	/// Print job status
	OrderState { order_id: String },
	/// Order statistics for a date range
	Stats {
		#[arg(long)]
		sn: String,
		/// First day (YYYY-MM-DD); requires --to
		#[arg(long, requires = "to")]
		from: Option<NaiveDate>,
		#[arg(long, requires = "from")]
		to: Option<NaiveDate>,
		/// Last N days ending today (ignored with --from/--to)
		#[arg(long, default_value_t = 1)]
		days: u32,
	},
	/// Daily, weekly or monthly statistics report
	Report {
		#[arg(long)]
		sn: String,
		#[arg(long, default_value = "daily")]
		kind: ReportKind,
		/// Anchor date (YYYY-MM-DD), today when omitted
		#[arg(long)]
		date: Option<NaiveDate>,
	},
	/// Select the printer voice
	SetVoice {
		#[arg(long)]
		sn: String,
		/// MANDARIN_FEMALE, MANDARIN_MALE, CANTONESE_FEMALE, ...
		#[arg(long)]
		voice: VoiceType,
		/// Turn announcements off
		#[arg(long)]
		disable: bool,
	},
	/// Play a named voice prompt
	PlayVoice {
		#[arg(long)]
		sn: String,
		#[arg(long)]
		prompt: String,
		/// OTHER, CASH, CARD or QR_CODE
		#[arg(long)]
		pay_type: Option<PayType>,
	},
	/// Announce a received payment
	Announce {
		#[arg(long)]
		sn: String,
		#[arg(long)]
		amount: f64,
		#[arg(long, default_value = "OTHER")]
		pay_type: PayType,
	},
	/// Voice settings reported by the printer
	VoiceSettings { sn: String },
}

fn parse_printer_entry(raw: &str) -> std::result::Result<PrinterEntry, String> {
	match raw.split_once('=') {
		Some((sn, name)) if !sn.is_empty() && !name.is_empty() => Ok(PrinterEntry::new(sn, name)),
		_ => Err(format!("expected SN=NAME, got '{}'", raw)),
	}
}

fn emit(value: &Value) -> Result<()> {
	let text = serde_json::to_string_pretty(value).context("Failed to encode output")?;
	println!("{}", text);
	Ok(())
}

async fn run(client: &Client, command: Command) -> Result<Value> {
	let manager = PrinterManager::new(client);
	let printer = PrintService::new(client);
	let query = QueryService::new(client);
	let voice = VoiceService::new(client);

	let output = match command {
		Command::AddPrinter { sn, name, card } => serde_json::to_value(
			manager.add_printer(&sn, &name, card.as_deref()).await?,
		)?,
		Command::AddPrinters { printers } => {
			serde_json::to_value(manager.add_printers(&printers).await?)?
		}
		Command::DeletePrinter { sn } => {
			serde_json::to_value(manager.delete_printers(&sn).await?)?
		}
		Command::Rename { sn, name } => {
			serde_json::to_value(manager.update_printer_name(&sn, &name).await?)?
		}
		Command::ClearQueue { sn } => serde_json::to_value(manager.clear_print_queue(&sn).await?)?,
		Command::Status { sn } => match sn.as_slice() {
			[one] => serde_json::to_value(query.get_printer_status(one).await?)?,
			many => serde_json::to_value(query.get_printers_status(many).await?)?,
		},
		Command::Info { sn } => serde_json::to_value(query.get_printer_info(&sn).await?)?,
		Command::Print {
			sn,
			content,
			file,
			copies,
			force,
			voice: voice_enabled,
			code_u,
		} => {
			let content = match (content, file) {
				(Some(content), _) => content,
				(None, Some(path)) => std::fs::read_to_string(&path)
					.with_context(|| format!("Failed to read {}", path.display()))?,
				(None, None) => anyhow::bail!("either --content or --file is required"),
			};
			let options = ReceiptOptions {
				copies,
				code_u,
				auto_print: !force,
				voice_enabled,
			};
			serde_json::to_value(printer.print_receipt(&sn, &content, &options).await?)?
		}
		Command::PrintLabel {
			sn,
			content,
			height,
			width,
			quantity,
		} => {
			let mut options = LabelOptions::with_height(height);
			options.quantity = quantity;
			if let Some(width) = width {
				options.width = width;
			}
			serde_json::to_value(printer.print_label(&sn, &content, &options).await?)?
		}
		Command::TestPrint { sn, label } => {
			let document = if label {
				OrderDocument::Label(test_label(), LabelOptions::default())
			} else {
				OrderDocument::Receipt(test_receipt(), ReceiptOptions::default())
			};
			serde_json::to_value(printer.print_order(&sn, &document).await?)?
		}
		Command::ProductLabel {
			sn,
			name,
			barcode,
			price,
		} => {
			let data = LabelData {
				barcode,
				price,
				..LabelData::new(name)
			};
			let document = OrderDocument::Label(data, LabelOptions::default());
			serde_json::to_value(printer.print_order(&sn, &document).await?)?
		}
		Command::OrderState { order_id } => {
			serde_json::to_value(query.get_order_status(&order_id).await?)?
		}
		Command::Stats { sn, from, to, days } => {
			let range = match (from, to) {
				(Some(from), Some(to)) => StatisticsRange::Between(from, to),
				_ => StatisticsRange::LastDays(days),
			};
			serde_json::to_value(query.get_order_statistics(&sn, range).await?)?
		}
		Command::Report { sn, kind, date } => {
			serde_json::to_value(query.generate_report(&sn, kind, date).await?)?
		}
		Command::SetVoice {
			sn,
			voice: voice_type,
			disable,
		} => serde_json::to_value(voice.set_voice_type(&sn, voice_type, !disable).await?)?,
		Command::PlayVoice {
			sn,
			prompt,
			pay_type,
		} => serde_json::to_value(voice.play_voice(&sn, &prompt, pay_type).await?)?,
		Command::Announce {
			sn,
			amount,
			pay_type,
		} => serde_json::to_value(voice.play_amount_voice(&sn, amount, pay_type).await?)?,
		Command::VoiceSettings { sn } => {
			serde_json::to_value(voice.get_voice_settings(&sn).await?)?
		}
	};

	Ok(output)
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	// Initialize logging first
	init_logging()?;

	let overrides = Overrides {
		base_url: args.base_url,
		timeout_secs: args.timeout,
		debug: args.debug,
	};
	let config = load_client_config(args.config.as_deref(), &overrides)?;
	let credentials = load_credentials()?;
	info!(target: "xpyun", base_url = %config.base_url, "Using Xpyun endpoint");

	let client = Client::with_config(credentials, config).context("Failed to create client")?;
	let output = run(&client, args.command).await?;

	emit(&output)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_printer_entry() {
		let entry = parse_printer_entry("SN1=Kitchen").unwrap();
		assert_eq!(entry, PrinterEntry::new("SN1", "Kitchen"));
		assert!(parse_printer_entry("SN1").is_err());
		assert!(parse_printer_entry("=Kitchen").is_err());
	}

	#[test]
	fn test_cli_parses_typed_arguments() {
		let args = Args::try_parse_from([
			"xpyun", "set-voice", "--sn", "SN1", "--voice", "english_male",
		])
		.unwrap();
		match args.command {
			Command::SetVoice { voice, disable, .. } => {
				assert_eq!(voice, VoiceType::EnglishMale);
				assert!(!disable);
			}
			other => panic!("unexpected command: {:?}", other),
		}

		let args = Args::try_parse_from([
			"xpyun", "stats", "--sn", "SN1", "--from", "2024-01-01", "--to", "2024-01-31",
		])
		.unwrap();
		assert!(matches!(args.command, Command::Stats { from: Some(_), .. }));

		assert!(Args::try_parse_from(["xpyun", "set-voice", "--sn", "SN1", "--voice", "ROBOT"]).is_err());
	}
}
