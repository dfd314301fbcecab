//! Weighbill operation results.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContractPriceResponse {
    pub contract_no: String,
    /// Product the price was requested for
    pub product_name: String,
    /// Contract product the price was taken from
    pub matched_product: String,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
}

/// A weighbill draft with the delivery and price details filled in.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct AutoFillResponse {
    pub weigh_date: Option<NaiveDate>,
    pub vehicle_no: Option<String>,
    pub contract_no: Option<String>,
    pub product_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub net_weight: Option<Decimal>,
    pub matched_delivery_id: Option<i64>,
    pub warehouse: Option<String>,
    pub target_factory_name: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub driver_id_card: Option<String>,
    pub match_message: Option<String>,
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    pub price_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConfirmWeighbillResponse {
    pub weighbill_id: i64,
    pub delivery_id: Option<i64>,
}
