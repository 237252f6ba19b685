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

//! Receipt and label content rendering.
//!
//! Output uses the printer markup the service understands (`**bold**`) and
//! one line per field, joined with `\n`.

use serde::{Deserialize, Serialize};

const SEPARATOR: &str = "----------------------";
const DEFAULT_TITLE: &str = "订单详情";
const DEFAULT_FOOTER: &str = "谢谢惠顾，欢迎下次光临！";
const DEFAULT_PRODUCT_NAME: &str = "商品";

/// Named label fields; extension entries with these keys are ignored.
pub const LABEL_FIELDS: [&str; 6] = [
	"product_name",
	"barcode",
	"price",
	"spec",
	"production_date",
	"expiry_date",
];

/// One receipt line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
	pub name: String,
	pub qty: u32,
	pub price: f64,
	/// Line total; `qty * price` when absent
	#[serde(default)]
	pub amount: Option<f64>,
}

impl ReceiptItem {
	pub fn new(name: impl Into<String>, qty: u32, price: f64) -> Self {
		Self {
			name: name.into(),
			qty,
			price,
			amount: None,
		}
	}

	pub fn amount(&self) -> f64 {
		self.amount.unwrap_or(self.qty as f64 * self.price)
	}
}

/// Order data rendered onto a receipt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptData {
	pub title: Option<String>,
	pub order_no: String,
	pub time: String,
	pub table_no: String,
	pub items: Vec<ReceiptItem>,
	/// Amount due; the item total when absent
	pub total_amount: Option<f64>,
	pub remark: Option<String>,
	pub footer: Option<String>,
}

impl ReceiptData {
	pub fn total_quantity(&self) -> u32 {
		self.items.iter().map(|item| item.qty).sum()
	}

	pub fn items_amount(&self) -> f64 {
		self.items.iter().map(ReceiptItem::amount).sum()
	}

	/// Render the receipt content.
	pub fn render(&self) -> String {
		let mut lines = Vec::new();

		lines.push(format!(
			"**{}**",
			self.title.as_deref().unwrap_or(DEFAULT_TITLE)
		));
		lines.push(SEPARATOR.to_string());

		lines.push(format!("订单号: {}", self.order_no));
		lines.push(format!("时间: {}", self.time));
		lines.push(format!("桌号: {}", self.table_no));
		lines.push(String::new());

		lines.push("**商品清单**".to_string());
		lines.push(SEPARATOR.to_string());
		for item in &self.items {
			lines.push(format!("{} x{}  {:.2}", item.name, item.qty, item.amount()));
		}
		lines.push(SEPARATOR.to_string());

		let items_amount = self.items_amount();
		lines.push(format!(
			"合计: {}件  ￥{:.2}",
			self.total_quantity(),
			items_amount
		));
		lines.push(format!(
			"应付: ￥{:.2}",
			self.total_amount.unwrap_or(items_amount)
		));

		if let Some(remark) = self.remark.as_deref().filter(|r| !r.is_empty()) {
			lines.push(String::new());
			lines.push(format!("备注: {}", remark));
		}

		lines.push(String::new());
		lines.push(self.footer.as_deref().unwrap_or(DEFAULT_FOOTER).to_string());

		lines.join("\n")
	}
}

/// Product data rendered onto a label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelData {
	pub product_name: Option<String>,
	pub barcode: Option<String>,
	pub price: Option<f64>,
	pub spec: Option<String>,
	pub production_date: Option<String>,
	pub expiry_date: Option<String>,
	/// Additional `key: value` lines, printed in insertion order
	pub extra: Vec<(String, String)>,
}

impl LabelData {
	pub fn new(product_name: impl Into<String>) -> Self {
		Self {
			product_name: Some(product_name.into()),
			..Default::default()
		}
	}

	/// Append an extension line. Keys naming one of [`LABEL_FIELDS`] are skipped.
	pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.push((key.into(), value.into()));
		self
	}

	/// Render the label content.
	pub fn render(&self) -> String {
		let mut lines = Vec::new();

		lines.push(format!(
			"**{}**",
			self.product_name.as_deref().unwrap_or(DEFAULT_PRODUCT_NAME)
		));
		lines.push(String::new());

		let optional = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_owned);

		if let Some(barcode) = optional(&self.barcode) {
			lines.push(format!("条码: {}", barcode));
		}
		if let Some(price) = self.price {
			lines.push(format!("价格: ￥{:.2}", price));
		}
		if let Some(spec) = optional(&self.spec) {
			lines.push(format!("规格: {}", spec));
		}
		if let Some(date) = optional(&self.production_date) {
			lines.push(format!("生产日期: {}", date));
		}
		if let Some(expiry) = optional(&self.expiry_date) {
			lines.push(format!("保质期: {}", expiry));
		}

		for (key, value) in &self.extra {
			if LABEL_FIELDS.contains(&key.as_str()) {
				continue;
			}
			lines.push(format!("{}: {}", key, value));
		}

		lines.join("\n")
	}
}

/// Sample receipt used for printer self-tests.
pub fn test_receipt() -> ReceiptData {
	ReceiptData {
		title: Some("测试订单".to_string()),
		order_no: "TEST001".to_string(),
		time: "2024-01-01 12:00:00".to_string(),
		table_no: "1号桌".to_string(),
		items: vec![
			ReceiptItem::new("商品A", 2, 10.00),
			ReceiptItem::new("商品B", 1, 15.00),
			ReceiptItem::new("商品C", 3, 8.00),
		],
		total_amount: None,
		remark: Some("少放盐".to_string()),
		footer: Some("谢谢惠顾！".to_string()),
	}
}

/// Sample label used for printer self-tests.
pub fn test_label() -> LabelData {
	LabelData {
		product_name: Some("测试商品".to_string()),
		barcode: Some("1234567890123".to_string()),
		price: Some(25.80),
		spec: Some("500g/袋".to_string()),
		production_date: Some("2024-01-01".to_string()),
		expiry_date: Some("12个月".to_string()),
		extra: Vec::new(),
	}
}
