//! Cleaning pipeline orchestrator and final merge/sort

use std::cmp::Ordering;
use std::collections::HashSet;

use bigdecimal::BigDecimal;

use crate::cleaning::dedup::merge_duplicate_items;
use crate::cleaning::normalize::normalize_records;
use crate::cleaning::reconcile::reconcile_refunded_receipts;
use crate::cleaning::refunds::extract_refunds;
use crate::types::{CleanResult, RawSaleRecord, SaleLineItem};

/// Clean a raw POS record set into the canonical sales record set.
///
/// Pipeline: normalize the schema, extract refund events, split the sale
/// rows into refund-affected and refund-free receipts, deduplicate each
/// partition, net refunds against the affected receipts, then merge and
/// sort. The whole transform is a pure function of its input; any violated
/// invariant aborts it with no partial result.
pub fn clean_sales_data(raw: Vec<RawSaleRecord>) -> CleanResult<Vec<SaleLineItem>> {
    let lines = normalize_records(raw)?;
    let refund_events = extract_refunds(&lines)?;

    let refunded_receipts: HashSet<String> = refund_events
        .iter()
        .map(|event| event.receipt_number.clone())
        .collect();

    let zero = BigDecimal::from(0);
    let mut refunded_lines = Vec::new();
    let mut refund_free_lines = Vec::new();
    for line in lines {
        if line.refunds > zero {
            // Refund events were already captured by the extractor.
            continue;
        }
        if refunded_receipts.contains(&line.receipt_number) {
            refunded_lines.push(line);
        } else {
            refund_free_lines.push(line);
        }
    }

    let refund_free = merge_duplicate_items(refund_free_lines);
    let reconciled = reconcile_refunded_receipts(refunded_lines, refund_events)?;

    Ok(merge_and_sort(refund_free, reconciled))
}

/// Concatenate the refund-free and reconciled partitions and apply the
/// final canonical ordering: ascending by `(date, receipt_number, category,
/// item_name, variant)`, with `None` variants before `Some`. The sort is
/// stable, so rows with equal keys keep their relative input order.
pub fn merge_and_sort(
    refund_free: Vec<SaleLineItem>,
    reconciled: Vec<SaleLineItem>,
) -> Vec<SaleLineItem> {
    let mut all = refund_free;
    all.extend(reconciled);
    all.sort_by(compare_output_order);
    all
}

fn compare_output_order(a: &SaleLineItem, b: &SaleLineItem) -> Ordering {
    (
        a.date,
        &a.receipt_number,
        &a.category,
        &a.item_name,
        &a.variant,
    )
        .cmp(&(
            b.date,
            &b.receipt_number,
            &b.category,
            &b.item_name,
            &b.variant,
        ))
}
