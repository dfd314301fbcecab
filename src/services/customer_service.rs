//! Smelter customer management.

use log::{info, warn};

use crate::constants::ERR_CUSTOMER_NOT_FOUND;
use crate::errors::ApiError;
use crate::models::{
    CreateCustomerRequest, Customer, CustomerListQuery, Pagination, PaginatedResponse,
    UpdateCustomerRequest,
};
use crate::repositories::CustomerRepository;
use crate::validators::keyword_tokens;

pub struct CustomerService {
    repository: CustomerRepository,
}

impl CustomerService {
    pub fn new(repository: CustomerRepository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, req: CreateCustomerRequest) -> Result<Customer, ApiError> {
        let id = self.repository.insert(&req).await?;
        info!("Customer {} created: {}", id, req.smelter_name.trim());
        self.get(id).await
    }

    pub async fn list(&self, query: CustomerListQuery) -> Result<PaginatedResponse<Customer>, ApiError> {
        let pagination = Pagination::new(query.page, query.page_size);
        let tokens = keyword_tokens(query.keyword.as_deref());
        let (customers, total) = self.repository.list(&tokens, pagination).await?;
        Ok(PaginatedResponse::new(customers, total, pagination))
    }

    pub async fn get(&self, id: i64) -> Result<Customer, ApiError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(ERR_CUSTOMER_NOT_FOUND.to_string()))
    }

    /// Returns `None` when the request changes nothing.
    pub async fn update(
        &self,
        id: i64,
        req: UpdateCustomerRequest,
    ) -> Result<Option<Customer>, ApiError> {
        self.get(id).await?;
        if req.is_empty() {
            return Ok(None);
        }

        self.repository.update(id, req).await?;
        info!("Customer {} updated", id);
        self.get(id).await.map(Some)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        if self.repository.delete(id).await? == 0 {
            warn!("Delete failed: customer {} not found", id);
            return Err(ApiError::NotFound(ERR_CUSTOMER_NOT_FOUND.to_string()));
        }
        info!("Customer {} deleted", id);
        Ok(())
    }
}
