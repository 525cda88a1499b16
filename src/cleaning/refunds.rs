//! Refund event extraction

use bigdecimal::BigDecimal;

use crate::types::{CleanError, CleanResult, SaleLineItem};

/// Derive the item identity from a refund row's raw item name.
///
/// Refund rows encode the item name as `"<prefix> - <item identity>"`; only
/// the segment after the last literal `" - "` is the identity. This is a
/// documented quirk of the POS export and is preserved exactly. Known
/// correctness gap: an item whose name itself contains `" - "` is truncated
/// to its final segment, making the identity ambiguous.
pub fn refund_item_identity(raw: &str) -> &str {
    raw.rsplit(" - ").next().unwrap_or(raw)
}

/// Extract refund events from a normalized record set.
///
/// Selects rows with `refunds > 0` and rewrites their item name to the
/// derived identity. A negative `refunds` value anywhere in the input is a
/// data-quality violation and aborts the transform.
pub fn extract_refunds(lines: &[SaleLineItem]) -> CleanResult<Vec<SaleLineItem>> {
    let zero = BigDecimal::from(0);
    let mut refunds = Vec::new();

    for line in lines {
        if line.refunds < zero {
            return Err(CleanError::NegativeRefunds {
                receipt: line.receipt_number.clone(),
                value: line.refunds.clone(),
            });
        }
        if line.refunds > zero {
            let mut event = line.clone();
            event.item_name = refund_item_identity(&event.item_name).to_string();
            refunds.push(event);
        }
    }

    Ok(refunds)
}
