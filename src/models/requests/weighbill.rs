//! Weighbill request models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::validators::validate_weighbill_status;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWeighbillRequest {
    pub weigh_date: Option<NaiveDate>,
    pub delivery_time: Option<NaiveDateTime>,
    pub weigh_ticket_no: Option<String>,
    pub contract_no: Option<String>,
    pub delivery_id: Option<i64>,
    #[schema(example = "豫A12345")]
    pub vehicle_no: Option<String>,
    pub product_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub gross_weight: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub tare_weight: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "31.25")]
    pub net_weight: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    /// Computed from unit price and net weight when absent
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    pub weighbill_image: Option<String>,
    pub ocr_raw_data: Option<String>,
    /// Manually entered bills are stored as confirmed; defaults to true
    pub is_manual: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWeighbillRequest {
    pub weigh_date: Option<NaiveDate>,
    pub delivery_time: Option<NaiveDateTime>,
    pub weigh_ticket_no: Option<String>,
    pub contract_no: Option<String>,
    pub delivery_id: Option<i64>,
    pub vehicle_no: Option<String>,
    pub product_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub gross_weight: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub tare_weight: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub net_weight: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    pub weighbill_image: Option<String>,
}

/// Draft weighbill to complete from deliveries and contract prices.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AutoFillRequest {
    pub weigh_date: Option<NaiveDate>,
    pub vehicle_no: Option<String>,
    pub contract_no: Option<String>,
    pub product_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub net_weight: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct MatchDeliveryQuery {
    pub weigh_date: NaiveDate,
    pub vehicle_no: String,
}

#[derive(Debug, Deserialize)]
pub struct ContractPriceQuery {
    pub contract_no: String,
    pub product_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WeighbillListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    #[validate(custom(function = "validate_weighbill_status"))]
    pub exact_ocr_status: Option<String>,
    pub exact_vehicle_no: Option<String>,
    pub exact_contract_no: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub fuzzy_keywords: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentScheduleRequest {
    pub payment_schedule_date: NaiveDate,
}
