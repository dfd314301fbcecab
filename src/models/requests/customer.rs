//! Customer request models.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 128, message = "Smelter name is required"))]
    #[schema(example = "河南金利金铅集团有限公司")]
    pub smelter_name: String,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 128, message = "Smelter name must not be empty"))]
    pub smelter_name: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_address: Option<String>,
}

impl UpdateCustomerRequest {
    pub fn is_empty(&self) -> bool {
        self.smelter_name.is_none()
            && self.address.is_none()
            && self.contact_person.is_none()
            && self.contact_phone.is_none()
            && self.contact_address.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct CustomerListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Matches smelter name, contact person or contact phone
    pub keyword: Option<String>,
}
