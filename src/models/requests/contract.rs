//! Contract request models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::validators::validate_contract_status;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ContractProductInput {
    #[validate(length(min = 1, max = 64, message = "Product name must not be empty"))]
    #[schema(example = "电动车")]
    pub product_name: String,
    #[schema(value_type = Option<String>, example = "9200.00")]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateContractRequest {
    #[validate(length(min = 1, max = 64, message = "Contract number is required"))]
    #[schema(example = "HT-20250226")]
    pub contract_no: String,
    pub contract_date: Option<NaiveDate>,
    /// Ignored when `contract_date` is given
    pub end_date: Option<NaiveDate>,
    pub smelter_company: Option<String>,
    #[schema(value_type = Option<String>, example = "350")]
    pub total_quantity: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "0.9")]
    pub arrival_payment_ratio: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "0.1")]
    pub final_payment_ratio: Option<Decimal>,
    pub contract_image_path: Option<String>,
    #[validate(custom(function = "validate_contract_status"))]
    #[schema(example = "生效中")]
    pub status: Option<String>,
    pub remarks: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub products: Vec<ContractProductInput>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateContractRequest {
    #[validate(length(min = 1, max = 64, message = "Contract number must not be empty"))]
    pub contract_no: Option<String>,
    pub contract_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub smelter_company: Option<String>,
    #[schema(value_type = Option<String>)]
    pub total_quantity: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub arrival_payment_ratio: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub final_payment_ratio: Option<Decimal>,
    pub contract_image_path: Option<String>,
    #[validate(custom(function = "validate_contract_status"))]
    pub status: Option<String>,
    pub remarks: Option<String>,
    /// Replaces the whole product list when present
    #[validate(nested)]
    pub products: Option<Vec<ContractProductInput>>,
}

#[derive(Debug, Deserialize)]
pub struct ContractListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub exact_contract_no: Option<String>,
    pub exact_smelter_company: Option<String>,
    pub exact_status: Option<String>,
    /// Whitespace separated; any token may match
    pub fuzzy_keywords: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExportContractsRequest {
    /// Exports every contract when absent or empty
    pub contract_ids: Option<Vec<i64>>,
}

/// Recognised text lines submitted for rule-based extraction.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ParseTextRequest {
    #[validate(length(min = 1, message = "At least one text line is required"))]
    pub lines: Vec<String>,
}
