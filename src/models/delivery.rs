use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::constants::{DELIVERY_NOT_UPLOADED, DELIVERY_UPLOADED, UPLOADED_BY_COMPANY};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum DeliveryStatus {
    #[serde(rename = "待确认")]
    Pending,
    #[serde(rename = "已确认")]
    Confirmed,
    #[serde(rename = "已完成")]
    Completed,
    #[serde(rename = "已取消")]
    Cancelled,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "待确认",
            DeliveryStatus::Confirmed => "已确认",
            DeliveryStatus::Completed => "已完成",
            DeliveryStatus::Cancelled => "已取消",
        }
    }

    /// Final states are never moved by weighbill confirmation.
    pub fn is_final(&self) -> bool {
        matches!(self, DeliveryStatus::Completed | DeliveryStatus::Cancelled)
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "待确认" => Ok(DeliveryStatus::Pending),
            "已确认" => Ok(DeliveryStatus::Confirmed),
            "已完成" => Ok(DeliveryStatus::Completed),
            "已取消" => Ok(DeliveryStatus::Cancelled),
            other => Err(format!("unknown delivery status '{}'", other)),
        }
    }
}

/// Whether a delivery travels with a delivery order (联单).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum DeliveryOrderFlag {
    #[serde(rename = "有")]
    With,
    #[serde(rename = "无")]
    Without,
}

impl DeliveryOrderFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOrderFlag::With => "有",
            DeliveryOrderFlag::Without => "无",
        }
    }
}

impl FromStr for DeliveryOrderFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "有" => Ok(DeliveryOrderFlag::With),
            "无" => Ok(DeliveryOrderFlag::Without),
            other => Err(format!("has_delivery_order must be 有 or 无, got '{}'", other)),
        }
    }
}

/// Who brought the goods: the driver when they hold their own delivery order,
/// otherwise the company.
pub fn source_type_for(flag: DeliveryOrderFlag, uploaded_by: Option<&str>) -> &'static str {
    match flag {
        DeliveryOrderFlag::With if uploaded_by.map(str::trim) == Some(UPLOADED_BY_COMPANY) => {
            "公司"
        }
        DeliveryOrderFlag::With => "司机",
        DeliveryOrderFlag::Without => "公司",
    }
}

pub fn upload_status(delivery_order_image: Option<&str>) -> &'static str {
    match delivery_order_image.map(str::trim) {
        Some(path) if !path.is_empty() => DELIVERY_UPLOADED,
        _ => DELIVERY_NOT_UPLOADED,
    }
}

/// Row of `pd_deliveries`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Delivery {
    pub id: i64,
    pub report_date: Option<NaiveDate>,
    pub warehouse: Option<String>,
    pub target_factory_id: Option<i64>,
    pub target_factory_name: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<Decimal>,
    pub vehicle_no: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub driver_id_card: Option<String>,
    pub has_delivery_order: String,
    pub delivery_order_image: Option<String>,
    pub source_type: String,
    pub shipper: Option<String>,
    pub payee: Option<String>,
    pub service_fee: Option<Decimal>,
    pub contract_no: Option<String>,
    pub contract_unit_price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Delivery as returned by the API, with the derived upload status.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeliveryView {
    #[serde(flatten)]
    pub delivery: Delivery,
    pub delivery_order_upload_status: String,
}

impl From<Delivery> for DeliveryView {
    fn from(delivery: Delivery) -> Self {
        let delivery_order_upload_status =
            upload_status(delivery.delivery_order_image.as_deref()).to_string();
        Self {
            delivery,
            delivery_order_upload_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type() {
        assert_eq!(source_type_for(DeliveryOrderFlag::With, None), "司机");
        assert_eq!(source_type_for(DeliveryOrderFlag::With, Some("司机")), "司机");
        assert_eq!(source_type_for(DeliveryOrderFlag::With, Some("公司")), "公司");
        assert_eq!(source_type_for(DeliveryOrderFlag::Without, Some("司机")), "公司");
    }

    #[test]
    fn test_upload_status() {
        assert_eq!(upload_status(Some("uploads/a.jpg")), DELIVERY_UPLOADED);
        assert_eq!(upload_status(Some(" ")), DELIVERY_NOT_UPLOADED);
        assert_eq!(upload_status(None), DELIVERY_NOT_UPLOADED);
    }

    #[test]
    fn test_final_statuses() {
        assert!(DeliveryStatus::Completed.is_final());
        assert!(DeliveryStatus::Cancelled.is_final());
        assert!(!"待确认".parse::<DeliveryStatus>().unwrap().is_final());
        assert!("有".parse::<DeliveryOrderFlag>().is_ok());
        assert!("yes".parse::<DeliveryOrderFlag>().is_err());
    }
}
