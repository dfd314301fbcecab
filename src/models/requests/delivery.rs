//! Delivery request models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::validators::{validate_delivery_order_flag, validate_delivery_status};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDeliveryRequest {
    pub report_date: Option<NaiveDate>,
    pub warehouse: Option<String>,
    pub target_factory_id: Option<i64>,
    pub target_factory_name: Option<String>,
    #[schema(example = "电动车")]
    pub product_name: Option<String>,
    #[schema(value_type = Option<String>, example = "32.5")]
    pub quantity: Option<Decimal>,
    #[schema(example = "豫A12345")]
    pub vehicle_no: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    #[validate(length(max = 18, message = "ID card number must be at most 18 characters"))]
    pub driver_id_card: Option<String>,
    /// 有 or 无, defaults to 无
    #[validate(custom(function = "validate_delivery_order_flag"))]
    pub has_delivery_order: Option<String>,
    /// 公司 keeps a delivery with an order attributed to the company
    pub uploaded_by: Option<String>,
    pub delivery_order_image: Option<String>,
    /// Defaults to the current user's name
    pub shipper: Option<String>,
    pub payee: Option<String>,
    #[schema(value_type = Option<String>)]
    pub service_fee: Option<Decimal>,
    pub contract_no: Option<String>,
    #[validate(custom(function = "validate_delivery_status"))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDeliveryRequest {
    pub report_date: Option<NaiveDate>,
    pub warehouse: Option<String>,
    pub target_factory_id: Option<i64>,
    pub target_factory_name: Option<String>,
    pub product_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub quantity: Option<Decimal>,
    pub vehicle_no: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    #[validate(length(max = 18, message = "ID card number must be at most 18 characters"))]
    pub driver_id_card: Option<String>,
    #[validate(custom(function = "validate_delivery_order_flag"))]
    pub has_delivery_order: Option<String>,
    pub uploaded_by: Option<String>,
    pub delivery_order_image: Option<String>,
    pub shipper: Option<String>,
    pub payee: Option<String>,
    #[schema(value_type = Option<String>)]
    pub service_fee: Option<Decimal>,
    pub contract_no: Option<String>,
    #[schema(value_type = Option<String>)]
    pub contract_unit_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    #[validate(custom(function = "validate_delivery_status"))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub exact_target_factory_name: Option<String>,
    pub exact_status: Option<String>,
    pub exact_vehicle_no: Option<String>,
    pub exact_driver_name: Option<String>,
    pub exact_driver_phone: Option<String>,
    pub fuzzy_keywords: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}
