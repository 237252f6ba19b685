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

//! Order, statistics and printer status queries.
//!
//! Raw responses are interpreted leniently: missing fields fall back to
//! defaults and the untouched payload is kept in `raw` for callers that need
//! more than the summary.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, NaiveDate, Timelike};
use serde::Serialize;
use serde_json::Value;

use super::{field_bool, field_str, field_u64, require, require_list};
use crate::client::Client;
use crate::error::{Result, XpyunError};
use crate::transport::{HttpTransport, Transport};

/// Wire format of statistics dates
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Format of `last_update` timestamps
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ORDER_STATE_COMPLETED: &str = "completed";
const ORDER_STATE_FAILED: &str = "failed";

/// Print order status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatus {
	pub order_id: Option<String>,
	pub status: Option<String>,
	pub print_status: Option<String>,
	pub print_time: Option<String>,
	pub printer_sn: Option<String>,
	pub is_completed: bool,
	pub is_failed: bool,
	pub raw: Value,
}

impl OrderStatus {
	pub fn from_data(data: Value) -> Self {
		let status = field_str(&data, "state");
		Self {
			order_id: field_str(&data, "orderId"),
			print_status: field_str(&data, "printStatus"),
			print_time: field_str(&data, "printTime"),
			printer_sn: field_str(&data, "sn"),
			is_completed: status.as_deref() == Some(ORDER_STATE_COMPLETED),
			is_failed: status.as_deref() == Some(ORDER_STATE_FAILED),
			status,
			raw: data,
		}
	}
}

/// Order counts for a date range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatistics {
	pub print_orders: u64,
	pub failed_orders: u64,
	/// Percentage, two decimals
	pub success_rate: f64,
	pub date_from: Option<String>,
	pub date_to: Option<String>,
	pub raw: Value,
}

impl OrderStatistics {
	pub fn from_data(data: Value) -> Self {
		let print_orders = field_u64(&data, "printCount");
		let failed_orders = field_u64(&data, "failedCount");
		Self {
			print_orders,
			failed_orders,
			success_rate: success_rate(print_orders, failed_orders),
			date_from: field_str(&data, "dateFrom"),
			date_to: field_str(&data, "dateTo"),
			raw: data,
		}
	}
}

/// Single printer status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrinterStatus {
	pub sn: Option<String>,
	pub is_online: bool,
	pub has_paper: bool,
	pub temperature: Option<String>,
	pub voltage: Option<String>,
	pub queue_length: u64,
	pub last_update: Option<String>,
	pub raw: Value,
}

impl PrinterStatus {
	pub fn from_data(data: Value) -> Self {
		Self {
			sn: field_str(&data, "sn"),
			is_online: field_bool(&data, "connected"),
			has_paper: field_bool(&data, "hasPaper"),
			temperature: field_str(&data, "temperature"),
			voltage: field_str(&data, "voltage"),
			queue_length: field_u64(&data, "queueLength"),
			last_update: field_str(&data, "lastUpdateTime"),
			raw: data,
		}
	}
}

/// Aggregate over several printers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintersStatus {
	pub total: usize,
	pub online_count: usize,
	pub offline_count: usize,
	pub printers: Vec<PrinterStatus>,
}

impl PrintersStatus {
	/// `data` maps each SN to its status object.
	pub fn from_data(data: Value) -> Self {
		let printers: Vec<PrinterStatus> = match data {
			Value::Object(map) => map
				.into_iter()
				.map(|(sn, status)| {
					let mut parsed = PrinterStatus::from_data(status);
					parsed.sn = Some(sn);
					parsed
				})
				.collect(),
			_ => Vec::new(),
		};

		let online_count = printers.iter().filter(|p| p.is_online).count();
		Self {
			total: printers.len(),
			online_count,
			offline_count: printers.len() - online_count,
			printers,
		}
	}
}

/// Everything known about one printer at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrinterOverview {
	pub sn: String,
	pub status: PrinterStatus,
	pub today_stats: OrderStatistics,
	pub yesterday_stats: OrderStatistics,
	pub is_online: bool,
	pub last_update: String,
}

/// Date range for statistics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticsRange {
	/// Inclusive range
	Between(NaiveDate, NaiveDate),
	/// The last `n` days ending today (`n` is at least 1)
	LastDays(u32),
}

impl StatisticsRange {
	pub fn resolve(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
		match self {
			StatisticsRange::Between(from, to) => (from, to),
			StatisticsRange::LastDays(days) => {
				let back = u64::from(days.max(1) - 1);
				let from = today.checked_sub_days(Days::new(back)).unwrap_or(today);
				(from, today)
			}
		}
	}
}

/// Report period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
	Daily,
	Weekly,
	Monthly,
}

impl ReportKind {
	/// Inclusive date range covered by a report anchored at `date`.
	pub fn range(self, date: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
		match self {
			ReportKind::Daily => Ok((date, date)),
			ReportKind::Weekly => {
				let from = date
					.checked_sub_days(Days::new(6))
					.ok_or_else(|| XpyunError::invalid("report date out of range"))?;
				Ok((from, date))
			}
			ReportKind::Monthly => {
				let first = date
					.with_day(1)
					.ok_or_else(|| XpyunError::invalid("report date out of range"))?;
				let (year, month) = if first.month() == 12 {
					(first.year() + 1, 1)
				} else {
					(first.year(), first.month() + 1)
				};
				let last = NaiveDate::from_ymd_opt(year, month, 1)
					.and_then(|next| next.pred_opt())
					.ok_or_else(|| XpyunError::invalid("report date out of range"))?;
				Ok((first, last))
			}
		}
	}

	fn summary(self, stats: &OrderStatistics) -> String {
		let total = stats.print_orders;
		let rate = stats.success_rate;
		match self {
			ReportKind::Daily => format!(
				"今日订单统计：共 {} 单，成功 {} 单，成功率 {:.2}%",
				total,
				total.saturating_sub(stats.failed_orders),
				rate
			),
			ReportKind::Weekly => format!(
				"本周订单统计：共 {} 单，日均 {:.1} 单，成功率 {:.2}%",
				total,
				total as f64 / 7.0,
				rate
			),
			ReportKind::Monthly => format!(
				"本月订单统计：共 {} 单，日均 {:.1} 单，成功率 {:.2}%",
				total,
				total as f64 / 30.0,
				rate
			),
		}
	}
}

impl fmt::Display for ReportKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			ReportKind::Daily => "daily",
			ReportKind::Weekly => "weekly",
			ReportKind::Monthly => "monthly",
		})
	}
}

impl FromStr for ReportKind {
	type Err = XpyunError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"daily" => Ok(ReportKind::Daily),
			"weekly" => Ok(ReportKind::Weekly),
			"monthly" => Ok(ReportKind::Monthly),
			other => Err(XpyunError::invalid(format!(
				"Unsupported report type: {}",
				other
			))),
		}
	}
}

/// Statistics report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
	pub kind: ReportKind,
	pub date_from: String,
	pub date_to: String,
	pub statistics: OrderStatistics,
	pub summary: String,
}

/// Order, statistics and status queries
pub struct QueryService<'a, T = HttpTransport> {
	client: &'a Client<T>,
	today: Option<NaiveDate>,
}

impl<'a, T: Transport> QueryService<'a, T> {
	pub fn new(client: &'a Client<T>) -> Self {
		Self {
			client,
			today: None,
		}
	}

	/// Pin "today" instead of reading the local clock.
	pub fn with_today(mut self, today: NaiveDate) -> Self {
		self.today = Some(today);
		self
	}

	fn today(&self) -> NaiveDate {
		self.today.unwrap_or_else(|| Local::now().date_naive())
	}

	pub async fn get_order_status(&self, order_id: &str) -> Result<OrderStatus> {
		require(order_id, "order id")?;
		let response = self.client.query_order_state(order_id).await?;
		Ok(OrderStatus::from_data(response.data))
	}

	pub async fn get_order_statistics(
		&self,
		sn: &str,
		range: StatisticsRange,
	) -> Result<OrderStatistics> {
		require(sn, "sn")?;
		let (from, to) = range.resolve(self.today());
		let response = self
			.client
			.query_order_statistics(
				sn,
				&from.format(DATE_FORMAT).to_string(),
				&to.format(DATE_FORMAT).to_string(),
			)
			.await?;
		Ok(OrderStatistics::from_data(response.data))
	}

	pub async fn get_printer_status(&self, sn: &str) -> Result<PrinterStatus> {
		require(sn, "sn")?;
		let response = self.client.query_printer_status(sn).await?;
		Ok(PrinterStatus::from_data(response.data))
	}

	pub async fn get_printers_status(&self, sn_list: &[String]) -> Result<PrintersStatus> {
		require_list(sn_list, "sn list")?;
		let response = self.client.query_printers_status(sn_list).await?;
		Ok(PrintersStatus::from_data(response.data))
	}

	pub async fn is_printer_online(&self, sn: &str) -> Result<bool> {
		Ok(self.get_printer_status(sn).await?.is_online)
	}

	/// Status plus today's and yesterday's statistics
	pub async fn get_printer_info(&self, sn: &str) -> Result<PrinterOverview> {
		require(sn, "sn")?;

		let status = self.get_printer_status(sn).await?;
		let today = self.today();
		let yesterday = today.pred_opt().unwrap_or(today);

		let today_stats = self
			.get_order_statistics(sn, StatisticsRange::Between(today, today))
			.await?;
		let yesterday_stats = self
			.get_order_statistics(sn, StatisticsRange::Between(yesterday, yesterday))
			.await?;

		Ok(PrinterOverview {
			sn: sn.to_string(),
			is_online: status.is_online,
			status,
			today_stats,
			yesterday_stats,
			last_update: Local::now().format(DISPLAY_TIME_FORMAT).to_string(),
		})
	}

	/// Build a report for the period containing `date` (today when `None`)
	pub async fn generate_report(
		&self,
		sn: &str,
		kind: ReportKind,
		date: Option<NaiveDate>,
	) -> Result<Report> {
		require(sn, "sn")?;

		let (from, to) = kind.range(date.unwrap_or_else(|| self.today()))?;
		let statistics = self
			.get_order_statistics(sn, StatisticsRange::Between(from, to))
			.await?;

		Ok(Report {
			kind,
			date_from: from.format(DATE_FORMAT).to_string(),
			date_to: to.format(DATE_FORMAT).to_string(),
			summary: kind.summary(&statistics),
			statistics,
		})
	}
}

/// Success percentage rounded to two decimals; 0 when nothing was printed.
pub fn success_rate(total: u64, failed: u64) -> f64 {
	if total == 0 {
		return 0.0;
	}
	let rate = (total as f64 - failed as f64) / total as f64 * 100.0;
	(rate * 100.0).round() / 100.0
}

/// Human-readable duration: seconds, minutes+seconds, or hours+minutes.
pub fn format_duration(seconds: u64) -> String {
	if seconds < 60 {
		format!("{}秒", seconds)
	} else if seconds < 3600 {
		format!("{}分{}秒", seconds / 60, seconds % 60)
	} else {
		format!("{}小时{}分", seconds / 3600, (seconds % 3600) / 60)
	}
}

/// Whether `hour` falls in `[start, end)`.
pub fn is_business_hour(hour: u32, start: u32, end: u32) -> bool {
	start <= hour && hour < end
}

/// Whether the local time is within business hours `[start, end)`.
pub fn is_business_hours(start: u32, end: u32) -> bool {
	is_business_hour(Local::now().hour(), start, end)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	#[test]
	fn test_success_rate() {
		assert_eq!(success_rate(0, 0), 0.0);
		assert_eq!(success_rate(10, 1), 90.0);
		assert_eq!(success_rate(3, 1), 66.67);
		assert_eq!(success_rate(7, 0), 100.0);
	}

	#[test]
	fn test_format_duration() {
		assert_eq!(format_duration(59), "59秒");
		assert_eq!(format_duration(61), "1分1秒");
		assert_eq!(format_duration(3600), "1小时0分");
		assert_eq!(format_duration(7322), "2小时2分");
	}

	#[test]
	fn test_business_hour() {
		assert!(is_business_hour(9, 9, 21));
		assert!(is_business_hour(20, 9, 21));
		assert!(!is_business_hour(21, 9, 21));
		assert!(!is_business_hour(8, 9, 21));
	}

	#[test]
	fn test_last_days_range() {
		let today = date(2024, 3, 2);
		assert_eq!(
			StatisticsRange::LastDays(1).resolve(today),
			(today, today)
		);
		assert_eq!(
			StatisticsRange::LastDays(3).resolve(today),
			(date(2024, 2, 29), today)
		);
		assert_eq!(
			StatisticsRange::LastDays(0).resolve(today),
			(today, today)
		);
	}

	#[test]
	fn test_report_ranges() {
		let d = date(2024, 2, 14);
		assert_eq!(ReportKind::Daily.range(d).unwrap(), (d, d));
		assert_eq!(ReportKind::Weekly.range(d).unwrap(), (date(2024, 2, 8), d));
		assert_eq!(
			ReportKind::Monthly.range(d).unwrap(),
			(date(2024, 2, 1), date(2024, 2, 29))
		);
		assert_eq!(
			ReportKind::Monthly.range(date(2023, 12, 25)).unwrap(),
			(date(2023, 12, 1), date(2023, 12, 31))
		);
	}

	#[test]
	fn test_report_kind_parse() {
		assert_eq!("Weekly".parse::<ReportKind>().unwrap(), ReportKind::Weekly);
		assert!("yearly".parse::<ReportKind>().is_err());
	}

	#[test]
	fn test_report_summary() {
		let stats = OrderStatistics::from_data(json!({"printCount": 14, "failedCount": 0}));
		assert_eq!(
			ReportKind::Weekly.summary(&stats),
			"本周订单统计：共 14 单，日均 2.0 单，成功率 100.00%"
		);
		assert_eq!(
			ReportKind::Daily.summary(&stats),
			"今日订单统计：共 14 单，成功 14 单，成功率 100.00%"
		);
	}

	#[test]
	fn test_order_status_parse() {
		let status = OrderStatus::from_data(json!({
			"orderId": "OM1",
			"state": "completed",
			"sn": "SN1"
		}));
		assert_eq!(status.order_id.as_deref(), Some("OM1"));
		assert!(status.is_completed);
		assert!(!status.is_failed);

		let status = OrderStatus::from_data(Value::Bool(true));
		assert_eq!(status.status, None);
		assert!(!status.is_completed);
	}

	#[test]
	fn test_printers_status_aggregate() {
		let status = PrintersStatus::from_data(json!({
			"SN1": {"connected": true, "hasPaper": true, "queueLength": 2},
			"SN2": {"connected": false},
			"SN3": {"connected": true}
		}));
		assert_eq!(status.total, 3);
		assert_eq!(status.online_count, 2);
		assert_eq!(status.offline_count, 1);
		let sn1 = status
			.printers
			.iter()
			.find(|p| p.sn.as_deref() == Some("SN1"))
			.unwrap();
		assert_eq!(sn1.queue_length, 2);
		assert!(sn1.has_paper);

		assert_eq!(PrintersStatus::from_data(Value::Null).total, 0);
	}
}
