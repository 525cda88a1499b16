//! Accounting-system export
//!
//! Maps the cleaned sales record set into the fixed-column upload schema of
//! the external accounting system. Each cleaned line item becomes one
//! invoice line; the invoice number is the receipt number, so multi-line
//! receipts import as multi-line invoices.

use bigdecimal::{BigDecimal, RoundingMode};

use crate::config::{ExportConfig, OutletConfig};
use crate::types::SaleLineItem;
use serde::{Deserialize, Serialize};

/// One row of the accounting-system upload file.
///
/// Column names and order are dictated by the external upload template;
/// columns the POS data cannot fill are emitted empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRow {
    #[serde(rename = "*Customer")]
    pub customer: String,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "BillingAddress")]
    pub billing_address: Option<String>,
    #[serde(rename = "ShippingAddress")]
    pub shipping_address: Option<String>,
    #[serde(rename = "*InvoiceDate")]
    pub invoice_date: String,
    #[serde(rename = "*DueDate")]
    pub due_date: String,
    #[serde(rename = "ShippingDate")]
    pub shipping_date: Option<String>,
    #[serde(rename = "ShipVia")]
    pub ship_via: Option<String>,
    #[serde(rename = "TrackingNo")]
    pub tracking_no: Option<String>,
    #[serde(rename = "CustomerRefNo")]
    pub customer_ref_no: Option<String>,
    #[serde(rename = "*InvoiceNumber")]
    pub invoice_number: String,
    #[serde(rename = "Message")]
    pub message: Option<String>,
    #[serde(rename = "Memo")]
    pub memo: Option<String>,
    #[serde(rename = "*ProductName")]
    pub product_name: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "*Quantity")]
    pub quantity: BigDecimal,
    #[serde(rename = "Unit")]
    pub unit: Option<String>,
    #[serde(rename = "*UnitPrice")]
    pub unit_price: String,
    #[serde(rename = "ProductDiscountRate(%)")]
    pub product_discount_rate: String,
    #[serde(rename = "InvoiceDiscount(value or %)")]
    pub invoice_discount: Option<String>,
    #[serde(rename = "TaxName")]
    pub tax_name: Option<String>,
    #[serde(rename = "TaxRate(%)")]
    pub tax_rate: String,
    #[serde(rename = "ShippingFee")]
    pub shipping_fee: Option<String>,
    #[serde(rename = "WitholdingAccountCode")]
    pub witholding_account_code: Option<String>,
    #[serde(rename = "WitholdingAmount(value or %)")]
    pub witholding_amount: Option<String>,
    #[serde(rename = "#paid?(yes/no)")]
    pub paid: String,
    #[serde(rename = "#PaymentMethod")]
    pub payment_method: String,
    #[serde(rename = "#PaidToAccountCode")]
    pub paid_to_account_code: String,
    #[serde(rename = "Tags (use ; to separate tags)")]
    pub tags: String,
    #[serde(rename = "WarehouseName")]
    pub warehouse_name: Option<String>,
}

/// Build the upload rows for one outlet from a cleaned record set.
///
/// Fails if the outlet key is absent from the configuration, or if any
/// line's payment method has no entry in the outlet's account-code mapping.
pub fn build_upload_rows(
    lines: &[SaleLineItem],
    config: &ExportConfig,
    outlet_key: &str,
) -> Result<Vec<UploadRow>, ExportError> {
    let outlet = config
        .outlets
        .get(outlet_key)
        .ok_or_else(|| ExportError::UnknownOutlet {
            outlet: outlet_key.to_string(),
            available: config.outlet_keys(),
        })?;

    lines.iter().map(|line| build_row(line, outlet)).collect()
}

fn build_row(line: &SaleLineItem, outlet: &OutletConfig) -> Result<UploadRow, ExportError> {
    let zero = BigDecimal::from(0);

    if line.quantity == zero {
        return Err(ExportError::ZeroQuantity {
            receipt: line.receipt_number.clone(),
        });
    }
    let unit_price = (&line.gross_sales / &line.quantity)
        .with_scale_round(0, RoundingMode::Down)
        .to_string();

    let product_discount_rate = if line.gross_sales == zero {
        if line.discounts > zero {
            return Err(ExportError::ZeroGrossSales {
                receipt: line.receipt_number.clone(),
            });
        }
        percent_string(&zero)
    } else {
        percent_string(&(&line.discounts / &line.gross_sales))
    };

    // Effective tax rate over the discounted amount; gratuity is folded in
    // because the accounting system has a single tax column.
    let taxable_base = &line.gross_sales - &line.discounts;
    let tax_total = &line.gratuity + &line.tax;
    let tax_rate = if taxable_base == zero {
        if tax_total != zero {
            return Err(ExportError::ZeroNetAmount {
                receipt: line.receipt_number.clone(),
            });
        }
        percent_string(&zero)
    } else {
        percent_string(&(&tax_total / &taxable_base))
    };

    let paid_to_account_code = outlet
        .payment_method_accounts
        .get(&line.payment_method)
        .cloned()
        .ok_or_else(|| ExportError::UnmappedPaymentMethod {
            method: line.payment_method.clone(),
            receipt: line.receipt_number.clone(),
        })?;

    let product_name = match &line.variant {
        Some(variant) => format!(
            "{} | {} - {}",
            outlet.product_name_prefix, line.item_name, variant
        ),
        None => format!("{} | {}", outlet.product_name_prefix, line.item_name),
    };

    let invoice_date = line.date.format("%d/%m/%Y").to_string();

    Ok(UploadRow {
        customer: outlet.customer_name.clone(),
        email: None,
        billing_address: None,
        shipping_address: None,
        due_date: invoice_date.clone(),
        invoice_date,
        shipping_date: None,
        ship_via: None,
        tracking_no: None,
        customer_ref_no: None,
        invoice_number: line.receipt_number.clone(),
        message: None,
        memo: None,
        product_name,
        description: None,
        quantity: line.quantity.clone(),
        unit: None,
        unit_price,
        product_discount_rate,
        invoice_discount: None,
        tax_name: if outlet.tax_name.is_empty() {
            None
        } else {
            Some(outlet.tax_name.clone())
        },
        tax_rate,
        shipping_fee: None,
        witholding_account_code: None,
        witholding_amount: None,
        paid: "YES".to_string(),
        payment_method: line.payment_method.clone(),
        paid_to_account_code,
        tags: outlet.tag.clone(),
        warehouse_name: None,
    })
}

/// Format a fractional rate as a percent string with two decimals,
/// e.g. `0.1` becomes `"10.00%"`.
fn percent_string(rate: &BigDecimal) -> String {
    let percent = (rate * BigDecimal::from(100)).with_scale_round(2, RoundingMode::HalfEven);
    format!("{percent}%")
}

/// Errors that can occur while building the upload structure
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Outlet '{outlet}' is not present in the export configuration; available outlets: {available:?}")]
    UnknownOutlet {
        outlet: String,
        available: Vec<String>,
    },
    #[error("Payment method '{method}' on receipt {receipt} has no account code mapping")]
    UnmappedPaymentMethod { method: String, receipt: String },
    #[error("Zero quantity on receipt {receipt}: cannot derive a unit price")]
    ZeroQuantity { receipt: String },
    #[error("Zero gross sales with nonzero discounts on receipt {receipt}")]
    ZeroGrossSales { receipt: String },
    #[error("Zero net amount with nonzero tax or gratuity on receipt {receipt}")]
    ZeroNetAmount { receipt: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutletConfig;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn outlet() -> OutletConfig {
        OutletConfig {
            customer_name: "Cafe Main".to_string(),
            product_name_prefix: "CAFE".to_string(),
            tax_name: "PB1".to_string(),
            payment_method_accounts: HashMap::from([
                ("Cash".to_string(), "1-10001".to_string()),
                ("Card".to_string(), "1-10002".to_string()),
            ]),
            tag: "pos-import".to_string(),
        }
    }

    fn config() -> ExportConfig {
        ExportConfig {
            outlets: HashMap::from([("cafe-main".to_string(), outlet())]),
        }
    }

    fn line() -> SaleLineItem {
        SaleLineItem {
            receipt_number: "INV-001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            time: "10:00".to_string(),
            category: "Coffee".to_string(),
            item_name: "Latte".to_string(),
            variant: Some("Large".to_string()),
            payment_method: "Cash".to_string(),
            quantity: BigDecimal::from(10),
            gross_sales: BigDecimal::from(100),
            discounts: BigDecimal::from(10),
            refunds: BigDecimal::from(0),
            net_sales: BigDecimal::from(90),
            gratuity: BigDecimal::from(0),
            tax: BigDecimal::from(9),
        }
    }

    #[test]
    fn test_build_row_maps_invoice_fields() {
        let rows = build_upload_rows(&[line()], &config(), "cafe-main").unwrap();
        let row = &rows[0];

        assert_eq!(row.customer, "Cafe Main");
        assert_eq!(row.invoice_number, "INV-001");
        assert_eq!(row.invoice_date, "05/01/2024");
        assert_eq!(row.due_date, "05/01/2024");
        assert_eq!(row.product_name, "CAFE | Latte - Large");
        assert_eq!(row.quantity, BigDecimal::from(10));
        assert_eq!(row.paid, "YES");
        assert_eq!(row.paid_to_account_code, "1-10001");
        assert_eq!(row.tags, "pos-import");
        assert_eq!(row.tax_name, Some("PB1".to_string()));
    }

    #[test]
    fn test_build_row_derives_rates() {
        let rows = build_upload_rows(&[line()], &config(), "cafe-main").unwrap();
        let row = &rows[0];

        assert_eq!(row.unit_price, "10");
        assert_eq!(row.product_discount_rate, "10.00%");
        // (0 + 9) / (100 - 10)
        assert_eq!(row.tax_rate, "10.00%");
    }

    #[test]
    fn test_unit_price_is_truncated() {
        let mut l = line();
        l.quantity = BigDecimal::from(3);
        l.gross_sales = BigDecimal::from(100);
        l.discounts = BigDecimal::from(0);
        l.tax = BigDecimal::from(0);
        let rows = build_upload_rows(&[l], &config(), "cafe-main").unwrap();
        assert_eq!(rows[0].unit_price, "33");
    }

    #[test]
    fn test_product_name_without_variant() {
        let mut l = line();
        l.variant = None;
        let rows = build_upload_rows(&[l], &config(), "cafe-main").unwrap();
        assert_eq!(rows[0].product_name, "CAFE | Latte");
    }

    #[test]
    fn test_empty_tax_name_is_omitted() {
        let mut cfg = config();
        if let Some(o) = cfg.outlets.get_mut("cafe-main") {
            o.tax_name = String::new();
        }
        let rows = build_upload_rows(&[line()], &cfg, "cafe-main").unwrap();
        assert_eq!(rows[0].tax_name, None);
    }

    #[test]
    fn test_unknown_outlet_fails() {
        let err = build_upload_rows(&[line()], &config(), "kiosk").unwrap_err();
        match err {
            ExportError::UnknownOutlet { outlet, available } => {
                assert_eq!(outlet, "kiosk");
                assert_eq!(available, vec!["cafe-main".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unmapped_payment_method_fails() {
        let mut l = line();
        l.payment_method = "Voucher".to_string();
        let err = build_upload_rows(&[l], &config(), "cafe-main").unwrap_err();
        match err {
            ExportError::UnmappedPaymentMethod { method, receipt } => {
                assert_eq!(method, "Voucher");
                assert_eq!(receipt, "INV-001");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_quantity_fails() {
        let mut l = line();
        l.quantity = BigDecimal::from(0);
        let err = build_upload_rows(&[l], &config(), "cafe-main").unwrap_err();
        assert!(matches!(err, ExportError::ZeroQuantity { .. }));
    }
}
