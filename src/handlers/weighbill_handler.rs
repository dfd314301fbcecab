//! Weighbill handlers and the delivery/price lookups used while entering one.

use actix_web::{web, HttpRequest, HttpResponse};
use log::debug;
use validator::Validate;

use crate::constants::{
    MSG_AUTO_FILLED, MSG_DELIVERY_MATCHED, MSG_OK, MSG_PAYMENT_SCHEDULED, MSG_PRICE_FOUND,
    MSG_WEIGHBILL_CONFIRMED, MSG_WEIGHBILL_CREATED, MSG_WEIGHBILL_DELETED, MSG_WEIGHBILL_UPDATED,
};
use crate::errors::ApiError;
use crate::middleware::require_auth;
use crate::models::{
    ApiResponse, AutoFillRequest, AutoFillResponse, ConfirmWeighbillResponse, ContractPriceQuery,
    ContractPriceResponse, CreateWeighbillRequest, Delivery, MatchDeliveryQuery, ParseTextRequest,
    PaymentScheduleRequest, UpdateWeighbillRequest, Weighbill, WeighbillDetail,
    WeighbillListQuery, WeighbillParseResult,
};
use crate::services::WeighbillService;
use crate::validators::validation_errors_to_api_error;

/// Find the delivery a vehicle reported for a weighing date
#[utoipa::path(
    get,
    path = "/api/v1/weighbills/match/delivery",
    tag = "Weighbills",
    params(
        ("weigh_date" = String, Query, description = "Weighing date (YYYY-MM-DD)"),
        ("vehicle_no" = String, Query, description = "Vehicle plate")
    ),
    responses(
        (status = 200, description = "Matching delivery", body = Delivery),
        (status = 404, description = "No matching delivery", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn match_delivery(
    weighbill_service: web::Data<WeighbillService>,
    query: web::Query<MatchDeliveryQuery>,
) -> Result<HttpResponse, ApiError> {
    let delivery = weighbill_service
        .match_delivery(&query.vehicle_no, query.weigh_date)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_DELIVERY_MATCHED, delivery)))
}

/// Look up a product's unit price on a contract
#[utoipa::path(
    get,
    path = "/api/v1/weighbills/contract/price",
    tag = "Weighbills",
    params(
        ("contract_no" = String, Query, description = "Contract number"),
        ("product_name" = Option<String>, Query, description = "Product (default: 废电瓶)")
    ),
    responses(
        (status = 200, description = "Unit price", body = ContractPriceResponse),
        (status = 404, description = "No priced product", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_contract_price(
    weighbill_service: web::Data<WeighbillService>,
    query: web::Query<ContractPriceQuery>,
) -> Result<HttpResponse, ApiError> {
    let price = weighbill_service
        .contract_price(&query.contract_no, query.product_name.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_PRICE_FOUND, price)))
}

/// Complete a draft weighbill from deliveries and contract prices
#[utoipa::path(
    post,
    path = "/api/v1/weighbills/auto-fill",
    tag = "Weighbills",
    request_body = AutoFillRequest,
    responses(
        (status = 200, description = "Filled draft", body = AutoFillResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn auto_fill_weighbill(
    weighbill_service: web::Data<WeighbillService>,
    body: web::Json<AutoFillRequest>,
) -> Result<HttpResponse, ApiError> {
    let draft = weighbill_service.auto_fill(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_AUTO_FILLED, draft)))
}

#[utoipa::path(
    post,
    path = "/api/v1/weighbills",
    tag = "Weighbills",
    request_body = CreateWeighbillRequest,
    responses(
        (status = 201, description = "Weighbill created", body = Weighbill),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_weighbill(
    weighbill_service: web::Data<WeighbillService>,
    req: HttpRequest,
    body: web::Json<CreateWeighbillRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    body.validate().map_err(validation_errors_to_api_error)?;

    let bill = weighbill_service.create(&claims, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(MSG_WEIGHBILL_CREATED, bill)))
}

#[utoipa::path(
    get,
    path = "/api/v1/weighbills",
    tag = "Weighbills",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
        ("exact_ocr_status" = Option<String>, Query, description = "待确认, 已确认 or 已修正"),
        ("exact_vehicle_no" = Option<String>, Query, description = "Exact vehicle number"),
        ("exact_contract_no" = Option<String>, Query, description = "Exact contract number"),
        ("date_from" = Option<String>, Query, description = "Weighing date lower bound"),
        ("date_to" = Option<String>, Query, description = "Weighing date upper bound"),
        ("fuzzy_keywords" = Option<String>, Query, description = "Whitespace separated keywords")
    ),
    responses(
        (status = 200, description = "Paginated weighbills with delivery details"),
        (status = 400, description = "Invalid status filter", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_weighbills(
    weighbill_service: web::Data<WeighbillService>,
    query: web::Query<WeighbillListQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate().map_err(validation_errors_to_api_error)?;
    Ok(HttpResponse::Ok().json(weighbill_service.list(query.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/weighbills/{id}",
    tag = "Weighbills",
    params(
        ("id" = i64, Path, description = "Weighbill ID")
    ),
    responses(
        (status = 200, description = "Weighbill with delivery details", body = WeighbillDetail),
        (status = 404, description = "Weighbill not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_weighbill(
    weighbill_service: web::Data<WeighbillService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let bill = weighbill_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, bill)))
}

/// Correct a weighbill; the bill is marked as manually corrected
#[utoipa::path(
    put,
    path = "/api/v1/weighbills/{id}",
    tag = "Weighbills",
    params(
        ("id" = i64, Path, description = "Weighbill ID")
    ),
    request_body = UpdateWeighbillRequest,
    responses(
        (status = 200, description = "Weighbill updated", body = Weighbill),
        (status = 404, description = "Weighbill not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_weighbill(
    weighbill_service: web::Data<WeighbillService>,
    path: web::Path<i64>,
    body: web::Json<UpdateWeighbillRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_errors_to_api_error)?;

    let bill = weighbill_service
        .update(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_WEIGHBILL_UPDATED, bill)))
}

/// Confirm a weighbill and complete its delivery
#[utoipa::path(
    post,
    path = "/api/v1/weighbills/{id}/confirm",
    tag = "Weighbills",
    params(
        ("id" = i64, Path, description = "Weighbill ID")
    ),
    responses(
        (status = 200, description = "Weighbill confirmed", body = ConfirmWeighbillResponse),
        (status = 404, description = "Weighbill not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn confirm_weighbill(
    weighbill_service: web::Data<WeighbillService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let result = weighbill_service.confirm(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_WEIGHBILL_CONFIRMED, result)))
}

#[utoipa::path(
    put,
    path = "/api/v1/weighbills/{id}/payment-schedule",
    tag = "Weighbills",
    params(
        ("id" = i64, Path, description = "Weighbill ID")
    ),
    request_body = PaymentScheduleRequest,
    responses(
        (status = 200, description = "Payment date set", body = Weighbill),
        (status = 404, description = "Weighbill not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_payment_schedule(
    weighbill_service: web::Data<WeighbillService>,
    path: web::Path<i64>,
    body: web::Json<PaymentScheduleRequest>,
) -> Result<HttpResponse, ApiError> {
    let bill = weighbill_service
        .set_payment_schedule(path.into_inner(), body.payment_schedule_date)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_PAYMENT_SCHEDULED, bill)))
}

/// Extract weighbill fields from recognised text lines
#[utoipa::path(
    post,
    path = "/api/v1/weighbills/parse",
    tag = "Weighbills",
    request_body = ParseTextRequest,
    responses(
        (status = 200, description = "Extracted fields", body = WeighbillParseResult),
        (status = 400, description = "No text lines", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn parse_weighbill_text(
    weighbill_service: web::Data<WeighbillService>,
    body: web::Json<ParseTextRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_errors_to_api_error)?;

    let result = weighbill_service.parse(&body.lines);
    debug!("Weighbill parse: {}", result.message);
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, result)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/weighbills/{id}",
    tag = "Weighbills",
    params(
        ("id" = i64, Path, description = "Weighbill ID")
    ),
    responses(
        (status = 200, description = "Weighbill deleted"),
        (status = 404, description = "Weighbill not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_weighbill(
    weighbill_service: web::Data<WeighbillService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    weighbill_service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_WEIGHBILL_DELETED)))
}
