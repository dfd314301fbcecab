//! Smelter customer handlers.

use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::constants::{
    MSG_CUSTOMER_CREATED, MSG_CUSTOMER_DELETED, MSG_CUSTOMER_UPDATED, MSG_NOTHING_TO_UPDATE,
    MSG_OK,
};
use crate::errors::ApiError;
use crate::models::{
    ApiResponse, CreateCustomerRequest, Customer, CustomerListQuery, UpdateCustomerRequest,
};
use crate::services::CustomerService;
use crate::validators::validation_errors_to_api_error;

#[utoipa::path(
    post,
    path = "/api/v1/customers",
    tag = "Customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_customer(
    customer_service: web::Data<CustomerService>,
    body: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_errors_to_api_error)?;

    let customer = customer_service.create(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(MSG_CUSTOMER_CREATED, customer)))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers",
    tag = "Customers",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
        ("keyword" = Option<String>, Query, description = "Matches smelter name, contact person or phone")
    ),
    responses(
        (status = 200, description = "Paginated customers")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_customers(
    customer_service: web::Data<CustomerService>,
    query: web::Query<CustomerListQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(customer_service.list(query.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    params(
        ("id" = i64, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer", body = Customer),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_customer(
    customer_service: web::Data<CustomerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let customer = customer_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, customer)))
}

#[utoipa::path(
    put,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    params(
        ("id" = i64, Path, description = "Customer ID")
    ),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_customer(
    customer_service: web::Data<CustomerService>,
    path: web::Path<i64>,
    body: web::Json<UpdateCustomerRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_errors_to_api_error)?;

    match customer_service.update(path.into_inner(), body.into_inner()).await? {
        Some(customer) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_CUSTOMER_UPDATED, customer)))
        }
        None => Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_NOTHING_TO_UPDATE))),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    params(
        ("id" = i64, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer deleted"),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_customer(
    customer_service: web::Data<CustomerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    customer_service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_CUSTOMER_DELETED)))
}
