//! Balance and payment receipt request models.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateBalanceQuery {
    pub contract_no: Option<String>,
    pub delivery_id: Option<i64>,
    pub weighbill_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BalanceListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub exact_contract_no: Option<String>,
    pub exact_driver_name: Option<String>,
    pub fuzzy_keywords: Option<String>,
    /// 0 pending, 1 partial, 2 settled
    pub payment_status: Option<i8>,
}

#[derive(Debug, Deserialize)]
pub struct MatchPendingQuery {
    pub payee_name: String,
    pub amount: Decimal,
    /// Look-back window in days, default 7
    pub date_range: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SettlementItem {
    pub balance_id: i64,
    #[schema(value_type = String, example = "5000.00")]
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyPaymentRequest {
    pub receipt_id: i64,
    #[validate(length(min = 1, message = "At least one settlement item is required"))]
    pub items: Vec<SettlementItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PayeeSummaryQuery {
    pub payee_name: Option<String>,
    pub driver_phone: Option<String>,
    pub fuzzy_keywords: Option<String>,
    /// Rows with a smaller outstanding balance are hidden, default 0.01
    pub min_balance: Option<Decimal>,
    pub payment_status: Option<i8>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PayeeDetailsQuery {
    pub driver_phone: Option<String>,
    pub payment_status: Option<i8>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchVerifyRequest {
    pub receipt_id: i64,
    /// Narrows the payee's balances to one phone number
    pub driver_phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReceiptRequest {
    pub receipt_no: Option<String>,
    pub receipt_image: Option<String>,
    pub payment_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "14:30:00")]
    pub payment_time: Option<NaiveTime>,
    pub payer_name: Option<String>,
    pub payer_account: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Payee name is required"))]
    pub payee_name: String,
    pub payee_account: Option<String>,
    #[schema(value_type = String, example = "5000.00")]
    pub amount: Decimal,
    pub bank_name: Option<String>,
    pub remark: Option<String>,
    pub ocr_raw_data: Option<String>,
    /// Manual entries are stored as confirmed; defaults to true
    pub is_manual: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub exact_payee_name: Option<String>,
    pub ocr_status: Option<i8>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub fuzzy_keywords: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_payment_requires_items() {
        let empty = VerifyPaymentRequest { receipt_id: 1, items: Vec::new() };
        let errors = empty.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));

        let one = VerifyPaymentRequest {
            receipt_id: 1,
            items: vec![SettlementItem { balance_id: 3, amount: Decimal::new(500000, 2) }],
        };
        assert!(one.validate().is_ok());
    }
}
