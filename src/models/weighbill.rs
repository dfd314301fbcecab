use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::constants::{PRODUCT_PRICE_ALIASES, UNION_FEE_WITHOUT_ORDER};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum WeighbillStatus {
    #[serde(rename = "待确认")]
    Pending,
    #[serde(rename = "已确认")]
    Confirmed,
    #[serde(rename = "已修正")]
    Corrected,
}

impl WeighbillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeighbillStatus::Pending => "待确认",
            WeighbillStatus::Confirmed => "已确认",
            WeighbillStatus::Corrected => "已修正",
        }
    }
}

impl FromStr for WeighbillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "待确认" => Ok(WeighbillStatus::Pending),
            "已确认" => Ok(WeighbillStatus::Confirmed),
            "已修正" => Ok(WeighbillStatus::Corrected),
            other => Err(format!("unknown weighbill status '{}'", other)),
        }
    }
}

/// Row of `pd_weighbills`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Weighbill {
    pub id: i64,
    pub weigh_date: Option<NaiveDate>,
    pub delivery_time: Option<NaiveDateTime>,
    pub weigh_ticket_no: Option<String>,
    pub contract_no: Option<String>,
    pub delivery_id: Option<i64>,
    pub vehicle_no: Option<String>,
    pub product_name: Option<String>,
    pub gross_weight: Option<Decimal>,
    pub tare_weight: Option<Decimal>,
    pub net_weight: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub weighbill_image: Option<String>,
    pub ocr_status: String,
    pub ocr_raw_data: Option<String>,
    pub is_manual_corrected: i8,
    pub uploader_id: Option<i64>,
    pub uploader_name: Option<String>,
    pub uploaded_at: Option<NaiveDateTime>,
    pub payment_schedule_date: Option<NaiveDate>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Weighbill with the shipper and payee of its linked delivery.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct WeighbillDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub weighbill: Weighbill,
    pub shipper: Option<String>,
    pub payee: Option<String>,
}

/// List row: weighbill plus the linked delivery's columns and the union fee.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct WeighbillListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub weighbill: Weighbill,
    pub delivery_report_date: Option<NaiveDate>,
    pub delivery_warehouse: Option<String>,
    pub delivery_target_factory_id: Option<i64>,
    pub delivery_target_factory_name: Option<String>,
    pub delivery_quantity: Option<Decimal>,
    pub delivery_driver_name: Option<String>,
    pub delivery_driver_phone: Option<String>,
    pub delivery_driver_id_card: Option<String>,
    pub delivery_has_delivery_order: Option<String>,
    pub delivery_order_image: Option<String>,
    pub delivery_source_type: Option<String>,
    pub delivery_shipper: Option<String>,
    pub delivery_payee: Option<String>,
    pub delivery_service_fee: Option<Decimal>,
    pub delivery_contract_no: Option<String>,
    pub delivery_contract_unit_price: Option<Decimal>,
    pub delivery_total_amount: Option<Decimal>,
    pub delivery_status: Option<String>,
    #[sqlx(skip)]
    pub union_fee: Decimal,
}

impl WeighbillListItem {
    pub fn with_union_fee(mut self) -> Self {
        self.union_fee = union_fee(
            self.delivery_has_delivery_order.as_deref(),
            self.delivery_service_fee,
        );
        self
    }
}

/// A contract product that carries a price.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct PricedProduct {
    pub product_name: String,
    pub unit_price: Decimal,
}

/// Picks the contract price for a weighbill product.
///
/// `products` must be in contract order. An exact name wins; otherwise the
/// first alias key contained in `product_name` maps to its candidate products;
/// otherwise the first priced product is used.
pub fn resolve_price<'a>(
    products: &'a [PricedProduct],
    product_name: &str,
) -> Option<&'a PricedProduct> {
    let priced: Vec<&PricedProduct> = products
        .iter()
        .filter(|p| p.unit_price > Decimal::ZERO)
        .collect();

    let wanted = product_name.trim();
    if let Some(exact) = priced.iter().find(|p| p.product_name == wanted) {
        return Some(*exact);
    }

    for (alias, candidates) in PRODUCT_PRICE_ALIASES {
        if !wanted.contains(*alias) {
            continue;
        }
        for candidate in candidates.iter() {
            if let Some(found) = priced.iter().find(|p| p.product_name == *candidate) {
                return Some(*found);
            }
        }
    }

    priced.first().copied()
}

/// Fee owed to the union for a delivery: a flat charge when it has no
/// delivery order, otherwise the delivery's own service fee.
pub fn union_fee(has_delivery_order: Option<&str>, service_fee: Option<Decimal>) -> Decimal {
    match has_delivery_order.map(str::trim) {
        Some("无") => Decimal::from(UNION_FEE_WITHOUT_ORDER),
        _ => service_fee.unwrap_or(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64) -> PricedProduct {
        PricedProduct {
            product_name: name.to_string(),
            unit_price: Decimal::from(price),
        }
    }

    #[test]
    fn test_exact_product_wins() {
        let products = vec![product("电动车", 9000), product("新能源", 9500)];
        assert_eq!(resolve_price(&products, "新能源").unwrap().unit_price, Decimal::from(9500));
    }

    #[test]
    fn test_alias_resolution() {
        let products = vec![product("黑皮", 8000), product("新能源", 9500), product("电动车", 9000)];
        // 废电瓶 prefers 电动车 even though 黑皮 comes first in the contract
        assert_eq!(resolve_price(&products, "废电瓶").unwrap().product_name, "电动车");
        assert_eq!(resolve_price(&products, "新能源电瓶").unwrap().product_name, "新能源");
    }

    #[test]
    fn test_falls_back_to_first_priced_product() {
        let products = vec![product("大白", 0), product("通信", 7000)];
        assert_eq!(resolve_price(&products, "铅块").unwrap().product_name, "通信");
        assert!(resolve_price(&[product("大白", 0)], "铅块").is_none());
    }

    #[test]
    fn test_union_fee() {
        assert_eq!(union_fee(Some("无"), Some(Decimal::from(80))), Decimal::from(150));
        assert_eq!(union_fee(Some("有"), Some(Decimal::from(80))), Decimal::from(80));
        assert_eq!(union_fee(Some("有"), None), Decimal::ZERO);
        assert_eq!(union_fee(None, None), Decimal::ZERO);
    }
}
