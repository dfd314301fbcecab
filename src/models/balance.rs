use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::utils::round_money;

/// Settlement state of a balance row, stored as TINYINT.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum PaymentStatus {
    Pending,
    Partial,
    Settled,
}

impl PaymentStatus {
    pub fn as_i8(&self) -> i8 {
        match self {
            PaymentStatus::Pending => 0,
            PaymentStatus::Partial => 1,
            PaymentStatus::Settled => 2,
        }
    }

    pub fn from_i8(v: i8) -> Option<Self> {
        match v {
            0 => Some(PaymentStatus::Pending),
            1 => Some(PaymentStatus::Partial),
            2 => Some(PaymentStatus::Settled),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "待支付",
            PaymentStatus::Partial => "部分支付",
            PaymentStatus::Settled => "已结清",
        }
    }
}

/// Status implied by what has been paid against what is owed.
pub fn payment_status_for(payable: Decimal, paid: Decimal) -> PaymentStatus {
    if paid <= Decimal::ZERO {
        PaymentStatus::Pending
    } else if paid >= payable {
        PaymentStatus::Settled
    } else {
        PaymentStatus::Partial
    }
}

/// Amount that may actually be settled against a row with `remaining` open.
pub fn cap_settlement(requested: Decimal, remaining: Decimal) -> Decimal {
    requested.min(remaining).max(Decimal::ZERO)
}

/// Spreads `amount` over open balances in the given order until it runs out.
pub fn allocate(amount: Decimal, open: &[(i64, Decimal)]) -> Vec<(i64, Decimal)> {
    let mut left = amount;
    let mut items = Vec::new();
    for (balance_id, remaining) in open {
        if left <= Decimal::ZERO {
            break;
        }
        let take = cap_settlement(left, *remaining);
        if take > Decimal::ZERO {
            items.push((*balance_id, take));
            left -= take;
        }
    }
    items
}

/// Verification state of a payment receipt, stored as TINYINT.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum ReceiptStatus {
    Pending,
    Confirmed,
    Verified,
}

impl ReceiptStatus {
    pub fn as_i8(&self) -> i8 {
        match self {
            ReceiptStatus::Pending => 0,
            ReceiptStatus::Confirmed => 1,
            ReceiptStatus::Verified => 2,
        }
    }

    pub fn from_i8(v: i8) -> Option<Self> {
        match v {
            0 => Some(ReceiptStatus::Pending),
            1 => Some(ReceiptStatus::Confirmed),
            2 => Some(ReceiptStatus::Verified),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "待确认",
            ReceiptStatus::Confirmed => "已确认",
            ReceiptStatus::Verified => "已核销",
        }
    }
}

fn label_or_unknown(label: Option<&'static str>) -> String {
    label.unwrap_or("未知").to_string()
}

/// Row of `pd_balance_details`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct BalanceDetail {
    pub id: i64,
    pub contract_no: Option<String>,
    pub delivery_id: Option<i64>,
    pub weighbill_id: i64,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub vehicle_no: Option<String>,
    pub payable_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_amount: Decimal,
    pub payment_status: i8,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl BalanceDetail {
    pub fn payment_status_name(&self) -> String {
        label_or_unknown(PaymentStatus::from_i8(self.payment_status).map(|s| s.label()))
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct BalanceListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub balance: BalanceDetail,
    pub weighbill_image: Option<String>,
    pub receipt_count: i64,
    #[sqlx(skip)]
    pub payment_status_name: String,
}

impl BalanceListItem {
    pub fn with_status_name(mut self) -> Self {
        self.payment_status_name = self.balance.payment_status_name();
        self
    }
}

/// A receipt settled against one balance row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct BalanceReceipt {
    pub receipt_id: i64,
    pub payee_name: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub settled_amount: Decimal,
    pub receipt_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalanceWithReceipts {
    #[serde(flatten)]
    pub balance: BalanceDetail,
    pub payment_status_label: String,
    pub payment_receipts: Vec<BalanceReceipt>,
}

/// Confirmed weighbill that has no balance row yet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnbalancedWeighbill {
    pub weighbill_id: i64,
    pub contract_no: Option<String>,
    pub delivery_id: Option<i64>,
    pub vehicle_no: Option<String>,
    pub net_weight: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
}

impl UnbalancedWeighbill {
    /// Net weight times unit price; unknown values count as zero.
    pub fn payable(&self) -> Decimal {
        round_money(self.net_weight.unwrap_or_default() * self.unit_price.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GeneratedBalance {
    pub balance_id: i64,
    pub weighbill_id: i64,
    pub driver_name: Option<String>,
    pub payable_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecalculatedBalance {
    pub payable: Decimal,
    pub paid: Decimal,
    pub balance: Decimal,
    pub status: i8,
}

/// Row of `pd_payment_receipts`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct PaymentReceipt {
    pub id: i64,
    pub receipt_no: Option<String>,
    pub receipt_image: Option<String>,
    pub payment_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "14:30:00")]
    pub payment_time: Option<NaiveTime>,
    pub payer_name: Option<String>,
    pub payer_account: Option<String>,
    pub payee_name: String,
    pub payee_account: Option<String>,
    pub amount: Decimal,
    pub bank_name: Option<String>,
    pub remark: Option<String>,
    pub ocr_status: i8,
    pub is_manual_corrected: i8,
    pub ocr_raw_data: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReceiptView {
    #[serde(flatten)]
    pub receipt: PaymentReceipt,
    pub ocr_status_name: String,
}

impl From<PaymentReceipt> for ReceiptView {
    fn from(receipt: PaymentReceipt) -> Self {
        let ocr_status_name =
            label_or_unknown(ReceiptStatus::from_i8(receipt.ocr_status).map(|s| s.label()));
        Self {
            receipt,
            ocr_status_name,
        }
    }
}

/// A balance row settled by one receipt.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ReceiptSettlement {
    pub balance_id: i64,
    pub driver_name: Option<String>,
    pub vehicle_no: Option<String>,
    pub payable_amount: Decimal,
    pub settled_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReceiptDetail {
    #[serde(flatten)]
    pub receipt: ReceiptView,
    pub settlements: Vec<ReceiptSettlement>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettledItem {
    pub balance_id: i64,
    pub settled_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_amount: Decimal,
    pub payment_status: i8,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifyPaymentResult {
    pub receipt_id: i64,
    pub total_settled: Decimal,
    pub receipt_status: i8,
    pub items: Vec<SettledItem>,
}

/// Outstanding amounts grouped per payee.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct PayeeSummary {
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub bill_count: i64,
    pub total_payable: Decimal,
    pub total_paid: Decimal,
    pub total_balance: Decimal,
    pub contract_nos: Option<String>,
    pub vehicle_nos: Option<String>,
    pub pending_count: i64,
    pub partial_count: i64,
    pub settled_count: i64,
    pub latest_created_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_payment_status_for() {
        assert_eq!(payment_status_for(d("100"), d("0")), PaymentStatus::Pending);
        assert_eq!(payment_status_for(d("100"), d("40")), PaymentStatus::Partial);
        assert_eq!(payment_status_for(d("100"), d("100.00")), PaymentStatus::Settled);
        assert_eq!(PaymentStatus::Partial.label(), "部分支付");
    }

    #[test]
    fn test_cap_settlement() {
        assert_eq!(cap_settlement(d("500"), d("300")), d("300"));
        assert_eq!(cap_settlement(d("120"), d("300")), d("120"));
        assert_eq!(cap_settlement(d("120"), d("-5")), Decimal::ZERO);
        assert_eq!(cap_settlement(d("-1"), d("50")), Decimal::ZERO);
    }

    #[test]
    fn test_allocate_oldest_first() {
        let open = vec![(1, d("100")), (2, d("0")), (3, d("250")), (4, d("80"))];
        let items = allocate(d("300"), &open);
        assert_eq!(items, vec![(1, d("100")), (3, d("200"))]);

        let all = allocate(d("1000"), &open);
        assert_eq!(all.len(), 3);
        assert!(allocate(Decimal::ZERO, &open).is_empty());
    }

    #[test]
    fn test_payable_treats_missing_as_zero() {
        let row = UnbalancedWeighbill {
            weighbill_id: 1,
            contract_no: None,
            delivery_id: None,
            vehicle_no: None,
            net_weight: Some(d("31.255")),
            unit_price: None,
            driver_name: None,
            driver_phone: None,
        };
        assert_eq!(row.payable(), Decimal::ZERO);

        let priced = UnbalancedWeighbill {
            unit_price: Some(d("9200")),
            ..row
        };
        assert_eq!(priced.payable(), d("287546.00"));
    }

    #[test]
    fn test_receipt_status_labels() {
        assert_eq!(ReceiptStatus::from_i8(2).map(|s| s.label()), Some("已核销"));
        assert_eq!(ReceiptStatus::from_i8(7), None);
    }
}
