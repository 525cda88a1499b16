//! Schema normalizer for raw POS export records

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::{CleanError, CleanResult, RawSaleRecord, SaleLineItem};

/// Date formats accepted for the export's day-first date column
const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y"];

/// Parse a day-first calendar date as written by the POS export.
pub fn parse_day_first_date(receipt: &str, value: &str) -> CleanResult<NaiveDate> {
    let trimmed = value.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(CleanError::InvalidDate {
        receipt: receipt.to_string(),
        value: value.to_string(),
    })
}

/// Parse a monetary or quantity column. An empty cell is treated as zero,
/// matching how the POS leaves unused columns blank.
fn parse_decimal(receipt: &str, field: &'static str, value: &str) -> CleanResult<BigDecimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(BigDecimal::from(0));
    }
    trimmed
        .parse::<BigDecimal>()
        .map_err(|_| CleanError::InvalidNumber {
            receipt: receipt.to_string(),
            field,
            value: value.to_string(),
        })
}

/// Normalize one raw record: parse the date and numeric columns, canonicalize
/// an empty variant to `None`, and drop the columns the engine does not use
/// (outlet, SKU, server, brand, event type, refund reason, modifier and
/// discount flags, sales type, collector, customer). The payment method is
/// retained for the accounting export.
pub fn normalize_record(raw: RawSaleRecord) -> CleanResult<SaleLineItem> {
    let receipt = raw.receipt_number;

    let variant = {
        let trimmed = raw.variant.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    };

    Ok(SaleLineItem {
        date: parse_day_first_date(&receipt, &raw.date)?,
        time: raw.time,
        category: raw.category,
        item_name: raw.item_name,
        variant,
        payment_method: raw.payment_method,
        quantity: parse_decimal(&receipt, "Quantity", &raw.quantity)?,
        gross_sales: parse_decimal(&receipt, "Gross Sales", &raw.gross_sales)?,
        discounts: parse_decimal(&receipt, "Discounts", &raw.discounts)?,
        refunds: parse_decimal(&receipt, "Refunds", &raw.refunds)?,
        net_sales: parse_decimal(&receipt, "Net Sales", &raw.net_sales)?,
        gratuity: parse_decimal(&receipt, "Gratuity", &raw.gratuity)?,
        tax: parse_decimal(&receipt, "Tax", &raw.tax)?,
        receipt_number: receipt,
    })
}

/// Normalize a full raw record set. Fails on the first malformed record;
/// the engine never partially succeeds.
pub fn normalize_records(raw: Vec<RawSaleRecord>) -> CleanResult<Vec<SaleLineItem>> {
    raw.into_iter().map(normalize_record).collect()
}
