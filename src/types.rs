//! Core types and data structures for the sales reconciliation system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw line-item record as exported by the POS service.
///
/// This is the full superset schema of the delimited export. Most of these
/// columns are dropped by the schema normalizer; a few (payment method) are
/// retained on [`SaleLineItem`] for the accounting export. All fields are
/// kept as strings here so that parsing failures can be reported with
/// receipt context instead of failing opaquely inside the CSV reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSaleRecord {
    #[serde(rename = "Receipt Number")]
    pub receipt_number: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Outlet")]
    pub outlet: String,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Served By")]
    pub served_by: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Items")]
    pub item_name: String,
    #[serde(rename = "Variant")]
    pub variant: String,
    #[serde(rename = "Event Type")]
    pub event_type: String,
    #[serde(rename = "Reason of Refund")]
    pub refund_reason: String,
    #[serde(rename = "Modifier Applied")]
    pub modifier_applied: String,
    #[serde(rename = "Discount Applied")]
    pub discount_applied: String,
    #[serde(rename = "Sales Type")]
    pub sales_type: String,
    #[serde(rename = "Collected By")]
    pub collected_by: String,
    #[serde(rename = "Customer")]
    pub customer: String,
    #[serde(rename = "Payment Method")]
    pub payment_method: String,
    #[serde(rename = "Quantity")]
    pub quantity: String,
    #[serde(rename = "Gross Sales")]
    pub gross_sales: String,
    #[serde(rename = "Discounts")]
    pub discounts: String,
    #[serde(rename = "Refunds")]
    pub refunds: String,
    #[serde(rename = "Net Sales")]
    pub net_sales: String,
    #[serde(rename = "Gratuity")]
    pub gratuity: String,
    #[serde(rename = "Tax")]
    pub tax: String,
}

/// Normalized sale line item, the unit of the reconciliation engine.
///
/// One row represents a purchased item (and optional variant) within a
/// receipt. `refunds` is zero for ordinary sale rows and strictly positive
/// for refund events; any other value is rejected during extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLineItem {
    /// Identifier of the POS transaction this line belongs to
    pub receipt_number: String,
    /// Transaction date (parsed day-first from the raw export)
    pub date: NaiveDate,
    /// Transaction time as exported (zero-padded `HH:MM`, compared lexically)
    pub time: String,
    /// Menu category of the item
    pub category: String,
    /// Item name; for refund events this is the derived item identity
    pub item_name: String,
    /// Optional variant; an absent variant is one canonical key value
    pub variant: Option<String>,
    /// Payment method, retained for the accounting export
    pub payment_method: String,
    /// Number of units sold; negative on refund events
    pub quantity: BigDecimal,
    pub gross_sales: BigDecimal,
    pub discounts: BigDecimal,
    /// Zero for sale rows, strictly positive for refund events
    pub refunds: BigDecimal,
    pub net_sales: BigDecimal,
    pub gratuity: BigDecimal,
    pub tax: BigDecimal,
}

impl SaleLineItem {
    /// Grouping key for deduplication and refund offsetting
    pub fn key(&self) -> LineItemKey {
        LineItemKey {
            receipt_number: self.receipt_number.clone(),
            item_name: self.item_name.clone(),
            variant: self.variant.clone(),
        }
    }
}

/// Grouping key identifying one line item within a receipt.
///
/// After deduplication this key is unique within a partition. A missing
/// variant (`None`) is a single distinct key value, not a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineItemKey {
    pub receipt_number: String,
    pub item_name: String,
    pub variant: Option<String>,
}

/// Errors that can occur while cleaning and reconciling sales data
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Invalid date '{value}' on receipt {receipt}: expected a day-first calendar date")]
    InvalidDate { receipt: String, value: String },
    #[error("Invalid number '{value}' in field '{field}' on receipt {receipt}")]
    InvalidNumber {
        receipt: String,
        field: &'static str,
        value: String,
    },
    #[error("Negative refunds value {value} on receipt {receipt}: refunds must be zero or positive")]
    NegativeRefunds { receipt: String, value: BigDecimal },
    #[error("Zero quantity on receipt {receipt}, item '{item}': cannot derive a unit price")]
    ZeroQuantity { receipt: String, item: String },
    #[error("Zero gross sales with nonzero discounts on receipt {receipt}, item '{item}': cannot derive a discount rate")]
    ZeroGrossSales { receipt: String, item: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cleaning operations
pub type CleanResult<T> = Result<T, CleanError>;
