//! Line-item deduplicator
//!
//! A POS export can contain several rows for the same item and variant
//! within one receipt (re-rung items, split payments). This module merges
//! such rows into one aggregate row per `(receipt, item, variant)` key.

use std::collections::HashMap;

use crate::types::{LineItemKey, SaleLineItem};

/// Merge duplicate rows sharing a `(receipt_number, item_name, variant)` key.
///
/// Aggregation rules, enumerated per field:
/// - `date`, `time` → max (the latest duplicate wins)
/// - `category`, `payment_method` → first occurrence
/// - `quantity`, `gross_sales`, `discounts`, `refunds`, `net_sales`,
///   `gratuity`, `tax` → sum
///
/// An absent variant (`None`) is a valid, stable grouping value. Groups are
/// emitted in first-appearance order. The function is pure and idempotent:
/// re-running it on an already-deduplicated set is a no-op.
pub fn merge_duplicate_items(lines: Vec<SaleLineItem>) -> Vec<SaleLineItem> {
    let mut index: HashMap<LineItemKey, usize> = HashMap::new();
    let mut merged: Vec<SaleLineItem> = Vec::new();

    for line in lines {
        let key = line.key();
        match index.get(&key) {
            Some(&slot) => {
                let target = &mut merged[slot];
                if line.date > target.date {
                    target.date = line.date;
                }
                if line.time > target.time {
                    target.time = line.time;
                }
                target.quantity += line.quantity;
                target.gross_sales += line.gross_sales;
                target.discounts += line.discounts;
                target.refunds += line.refunds;
                target.net_sales += line.net_sales;
                target.gratuity += line.gratuity;
                target.tax += line.tax;
            }
            None => {
                index.insert(key, merged.len());
                merged.push(line);
            }
        }
    }

    merged
}
