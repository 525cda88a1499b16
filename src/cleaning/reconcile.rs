//! Refund reconciler
//!
//! Nets refund events against the sale lines of their receipts and
//! recomputes the price-derived fields. Sign convention: refund events carry
//! the refunded quantity as a negative number (as exported by the POS), so
//! the aggregated refund quantity is added directly to the original quantity
//! and the net effect is a decrease by the units returned.

use std::collections::HashMap;

use bigdecimal::BigDecimal;

use crate::cleaning::dedup::merge_duplicate_items;
use crate::types::{CleanError, CleanResult, LineItemKey, SaleLineItem};

/// Reconcile the sale lines of refund-affected receipts against their
/// refund events.
///
/// Both inputs are deduplicated independently first. For each sale line the
/// helper fields `unit_price = gross_sales / quantity` and `discount_rate =
/// discounts / gross_sales` are derived (zero divisors are data errors, not
/// silently skipped), refund quantities are aggregated per
/// `(receipt, item, variant)` key across all partial refunds, and the offset
/// quantity is computed via a left outer join: a line whose key has no
/// refund event keeps an implicit refunded quantity of zero. Lines whose net
/// quantity drops to zero or below vanish from the output. For the
/// survivors, `gross_sales`, `discounts` and `net_sales` are recomputed from
/// the preserved unit price and discount rate.
///
/// Gratuity and tax are deliberately not rescaled; they remain the figures
/// of the original, pre-offset transaction. Whether that is intentional
/// (non-refundable service charge) is an open question upstream; the
/// behavior is preserved as-is.
pub fn reconcile_refunded_receipts(
    receipt_lines: Vec<SaleLineItem>,
    refund_events: Vec<SaleLineItem>,
) -> CleanResult<Vec<SaleLineItem>> {
    let receipt_lines = merge_duplicate_items(receipt_lines);
    let refund_events = merge_duplicate_items(refund_events);

    let zero = BigDecimal::from(0);

    // Total refunded quantity per key; an item can be partially refunded
    // several times and all events must combine before offsetting.
    let mut refunded_quantity: HashMap<LineItemKey, BigDecimal> = HashMap::new();
    for event in refund_events {
        let key = event.key();
        *refunded_quantity
            .entry(key)
            .or_insert_with(|| BigDecimal::from(0)) += event.quantity;
    }

    let mut reconciled = Vec::with_capacity(receipt_lines.len());
    for line in receipt_lines {
        if line.quantity == zero {
            return Err(CleanError::ZeroQuantity {
                receipt: line.receipt_number,
                item: line.item_name,
            });
        }
        let unit_price = &line.gross_sales / &line.quantity;

        let discount_rate = if line.gross_sales == zero {
            if line.discounts > zero {
                return Err(CleanError::ZeroGrossSales {
                    receipt: line.receipt_number,
                    item: line.item_name,
                });
            }
            zero.clone()
        } else {
            &line.discounts / &line.gross_sales
        };

        let refund_delta = refunded_quantity
            .get(&line.key())
            .cloned()
            .unwrap_or_else(|| zero.clone());

        // Refund quantities are negative, so addition nets the offset.
        let new_quantity = &line.quantity + &refund_delta;
        if new_quantity <= zero {
            // Fully refunded line: dropped, not kept as a zero-quantity row.
            continue;
        }

        let gross_sales = &new_quantity * &unit_price;
        let discounts = &gross_sales * &discount_rate;
        let net_sales = &gross_sales - &discounts;

        let mut out = line;
        out.quantity = new_quantity;
        out.gross_sales = gross_sales;
        out.discounts = discounts;
        out.net_sales = net_sales;
        reconciled.push(out);
    }

    Ok(reconciled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sale_line(
        receipt: &str,
        item: &str,
        variant: Option<&str>,
        quantity: i64,
        gross_sales: i64,
        discounts: i64,
    ) -> SaleLineItem {
        SaleLineItem {
            receipt_number: receipt.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            time: "09:30".to_string(),
            category: "Coffee".to_string(),
            item_name: item.to_string(),
            variant: variant.map(str::to_string),
            payment_method: "Cash".to_string(),
            quantity: BigDecimal::from(quantity),
            gross_sales: BigDecimal::from(gross_sales),
            discounts: BigDecimal::from(discounts),
            refunds: BigDecimal::from(0),
            net_sales: BigDecimal::from(gross_sales - discounts),
            gratuity: BigDecimal::from(2),
            tax: BigDecimal::from(5),
        }
    }

    fn refund_event(
        receipt: &str,
        item: &str,
        variant: Option<&str>,
        quantity: i64,
        amount: i64,
    ) -> SaleLineItem {
        let mut event = sale_line(receipt, item, variant, quantity, -amount, 0);
        event.refunds = BigDecimal::from(amount);
        event
    }

    #[test]
    fn test_receipt_without_refund_events_passes_through() {
        let lines = vec![sale_line("R1", "Latte", None, 2, 20, 0)];
        let expected = merge_duplicate_items(lines.clone());

        let reconciled = reconcile_refunded_receipts(lines, Vec::new()).unwrap();
        assert_eq!(reconciled, expected);
    }

    #[test]
    fn test_fully_refunded_line_vanishes() {
        let lines = vec![sale_line("R1", "Latte", Some("Large"), 5, 50, 0)];
        let events = vec![refund_event("R1", "Latte", Some("Large"), -5, 50)];

        let reconciled = reconcile_refunded_receipts(lines, events).unwrap();
        assert!(reconciled.is_empty());
    }

    #[test]
    fn test_partial_refund_recomputes_derived_fields() {
        let lines = vec![sale_line("R2", "Latte", Some("Large"), 10, 100, 10)];
        let events = vec![refund_event("R2", "Latte", Some("Large"), -3, 30)];

        let reconciled = reconcile_refunded_receipts(lines, events).unwrap();
        assert_eq!(reconciled.len(), 1);

        let line = &reconciled[0];
        assert_eq!(line.quantity, BigDecimal::from(7));
        // unit price 10, discount rate 0.1 preserved
        assert_eq!(line.gross_sales, BigDecimal::from(70));
        assert_eq!(line.discounts, BigDecimal::from(7));
        assert_eq!(line.net_sales, BigDecimal::from(63));
        // gratuity and tax stay at the original, pre-offset figures
        assert_eq!(line.gratuity, BigDecimal::from(2));
        assert_eq!(line.tax, BigDecimal::from(5));
    }

    #[test]
    fn test_multiple_partial_refunds_combine_before_offsetting() {
        let lines = vec![sale_line("R3", "Mocha", None, 6, 60, 0)];
        let events = vec![
            refund_event("R3", "Mocha", None, -2, 20),
            refund_event("R3", "Mocha", None, -1, 10),
        ];

        let reconciled = reconcile_refunded_receipts(lines, events).unwrap();
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].quantity, BigDecimal::from(3));
        assert_eq!(reconciled[0].gross_sales, BigDecimal::from(30));
    }

    #[test]
    fn test_unrefunded_sibling_line_is_untouched() {
        let lines = vec![
            sale_line("R4", "Latte", None, 2, 20, 0),
            sale_line("R4", "Mocha", None, 1, 15, 0),
        ];
        let events = vec![refund_event("R4", "Latte", None, -2, 20)];

        let reconciled = reconcile_refunded_receipts(lines, events).unwrap();
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].item_name, "Mocha");
        assert_eq!(reconciled[0].quantity, BigDecimal::from(1));
        assert_eq!(reconciled[0].gross_sales, BigDecimal::from(15));
    }

    #[test]
    fn test_refund_for_other_variant_does_not_offset() {
        let lines = vec![sale_line("R5", "Latte", Some("Small"), 2, 16, 0)];
        let events = vec![refund_event("R5", "Latte", Some("Large"), -2, 24)];

        let reconciled = reconcile_refunded_receipts(lines, events).unwrap();
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].quantity, BigDecimal::from(2));
    }

    #[test]
    fn test_zero_quantity_is_a_data_error() {
        let lines = vec![sale_line("R6", "Latte", None, 0, 20, 0)];
        let err = reconcile_refunded_receipts(lines, Vec::new()).unwrap_err();
        match err {
            CleanError::ZeroQuantity { receipt, item } => {
                assert_eq!(receipt, "R6");
                assert_eq!(item, "Latte");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_gross_sales_with_discounts_is_a_data_error() {
        let lines = vec![sale_line("R7", "Latte", None, 1, 0, 5)];
        let err = reconcile_refunded_receipts(lines, Vec::new()).unwrap_err();
        assert!(matches!(err, CleanError::ZeroGrossSales { .. }));
    }

    #[test]
    fn test_zero_gross_sales_without_discounts_is_allowed() {
        // Complimentary item: zero price, no discount to rescale.
        let lines = vec![sale_line("R8", "Water", None, 1, 0, 0)];
        let reconciled = reconcile_refunded_receipts(lines, Vec::new()).unwrap();
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].gross_sales, BigDecimal::from(0));
    }

    #[test]
    fn test_duplicate_inputs_are_deduplicated_before_offsetting() {
        let lines = vec![
            sale_line("R9", "Latte", None, 3, 30, 0),
            sale_line("R9", "Latte", None, 2, 20, 0),
        ];
        let events = vec![refund_event("R9", "Latte", None, -4, 40)];

        let reconciled = reconcile_refunded_receipts(lines, events).unwrap();
        assert_eq!(reconciled.len(), 1);
        assert_eq!(reconciled[0].quantity, BigDecimal::from(1));
        assert_eq!(reconciled[0].gross_sales, BigDecimal::from(10));
    }
}
