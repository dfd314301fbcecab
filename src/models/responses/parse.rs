//! Results of rule-based extraction from recognised document text.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ParsedProduct {
    pub product_name: String,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
}

/// Contract fields found in the text; anything not found stays empty.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContractParseResult {
    pub contract_no: Option<String>,
    pub contract_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub smelter_company: Option<String>,
    #[schema(value_type = Option<String>)]
    pub total_quantity: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub truck_count: Option<Decimal>,
    #[schema(value_type = String)]
    pub arrival_payment_ratio: Decimal,
    #[schema(value_type = String)]
    pub final_payment_ratio: Decimal,
    pub products: Vec<ParsedProduct>,
    /// First positive product price
    #[schema(value_type = Option<String>)]
    pub contract_unit_price: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub remittance_unit_price: Option<Decimal>,
    /// Contract price net of the 1.3 tax factor
    #[schema(value_type = Option<String>)]
    pub unit_price: Option<Decimal>,
    pub raw_text: String,
    pub message: String,
}

/// Weighbill fields found in the text; anything not found stays empty.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeighbillParseResult {
    pub weigh_date: Option<NaiveDate>,
    pub weigh_ticket_no: Option<String>,
    pub contract_no: Option<String>,
    pub vehicle_no: Option<String>,
    pub product_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub gross_weight: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub tare_weight: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub net_weight: Option<Decimal>,
    pub delivery_unit: Option<String>,
    pub receive_unit: Option<String>,
    pub raw_text: String,
    pub message: String,
}
