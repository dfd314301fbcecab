//! Balance and payment receipt handlers.
//!
//! Generating balances, settling payments and recording receipts require the
//! finance role; the read endpoints are open to any signed-in user.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use super::image_response;
use crate::constants::{
    ERR_NO_IMAGE_FILE, MSG_BALANCES_GENERATED, MSG_BALANCE_RECALCULATED, MSG_IMAGE_UPLOADED,
    MSG_OK, MSG_PAYMENT_VERIFIED, MSG_RECEIPT_CREATED,
};
use crate::errors::ApiError;
use crate::middleware::{require_auth, require_finance};
use crate::models::{
    ApiResponse, BalanceDetail, BalanceListQuery, BalanceWithReceipts, BatchVerifyRequest,
    CreateReceiptRequest, GenerateBalanceQuery, GeneratedBalance, MatchPendingQuery,
    PayeeDetailsQuery, PayeeSummary, PayeeSummaryQuery, ReceiptDetail, ReceiptListQuery,
    ReceiptView, RecalculatedBalance, VerifyPaymentRequest, VerifyPaymentResult,
};
use crate::services::file_service::RECEIPTS;
use crate::services::{BalanceService, FileService};
use crate::validators::validation_errors_to_api_error;

/// Create balance rows for confirmed weighbills that have none
#[utoipa::path(
    post,
    path = "/api/v1/balances/generate",
    tag = "Balances",
    params(
        ("contract_no" = Option<String>, Query, description = "Limit to one contract"),
        ("delivery_id" = Option<i64>, Query, description = "Limit to one delivery"),
        ("weighbill_id" = Option<i64>, Query, description = "Limit to one weighbill")
    ),
    responses(
        (status = 200, description = "Generated balances", body = Vec<GeneratedBalance>),
        (status = 403, description = "Finance role required", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn generate_balances(
    balance_service: web::Data<BalanceService>,
    req: HttpRequest,
    query: web::Query<GenerateBalanceQuery>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_finance(&claims)?;

    let generated = balance_service.generate(&claims, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_BALANCES_GENERATED, generated)))
}

#[utoipa::path(
    get,
    path = "/api/v1/balances",
    tag = "Balances",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
        ("exact_contract_no" = Option<String>, Query, description = "Exact contract number"),
        ("exact_driver_name" = Option<String>, Query, description = "Exact driver name"),
        ("payment_status" = Option<i8>, Query, description = "0 pending, 1 partial, 2 settled"),
        ("fuzzy_keywords" = Option<String>, Query, description = "Whitespace separated keywords")
    ),
    responses(
        (status = 200, description = "Paginated balances")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_balances(
    balance_service: web::Data<BalanceService>,
    query: web::Query<BalanceListQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(balance_service.list(query.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/balances/{id}",
    tag = "Balances",
    params(
        ("id" = i64, Path, description = "Balance ID")
    ),
    responses(
        (status = 200, description = "Balance with its receipts", body = BalanceWithReceipts),
        (status = 404, description = "Balance not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_balance(
    balance_service: web::Data<BalanceService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let balance = balance_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, balance)))
}

/// Recompute paid and outstanding amounts from the receipt links
#[utoipa::path(
    post,
    path = "/api/v1/balances/{id}/recalculate",
    tag = "Balances",
    params(
        ("id" = i64, Path, description = "Balance ID")
    ),
    responses(
        (status = 200, description = "Recalculated balance", body = RecalculatedBalance),
        (status = 404, description = "Balance not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn recalculate_balance(
    balance_service: web::Data<BalanceService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let result = balance_service.recalculate(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_BALANCE_RECALCULATED, result)))
}

/// Candidate balances a payment to a payee could settle
#[utoipa::path(
    get,
    path = "/api/v1/balances/match/pending",
    tag = "Balances",
    params(
        ("payee_name" = String, Query, description = "Payee (driver) name"),
        ("amount" = String, Query, description = "Payment amount"),
        ("date_range" = Option<i64>, Query, description = "Look-back window in days (default: 7)")
    ),
    responses(
        (status = 200, description = "Candidate balances", body = Vec<BalanceDetail>)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn match_pending_balances(
    balance_service: web::Data<BalanceService>,
    query: web::Query<MatchPendingQuery>,
) -> Result<HttpResponse, ApiError> {
    let found = balance_service.match_pending(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, found)))
}

/// Settle balances against a payment receipt
///
/// Each amount is capped at what the balance still owes.
#[utoipa::path(
    post,
    path = "/api/v1/balances/verify-payment",
    tag = "Balances",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Settlement result", body = VerifyPaymentResult),
        (status = 400, description = "No settlement items", body = crate::errors::ErrorResponse),
        (status = 403, description = "Finance role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Receipt or balance not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn verify_payment(
    balance_service: web::Data<BalanceService>,
    req: HttpRequest,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_finance(&claims)?;

    let result = balance_service.verify_payment(&claims, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_PAYMENT_VERIFIED, result)))
}

/// Outstanding balances grouped by payee
#[utoipa::path(
    get,
    path = "/api/v1/balances/summary/by-payee",
    tag = "Balances",
    params(
        ("payee_name" = Option<String>, Query, description = "Exact payee"),
        ("driver_phone" = Option<String>, Query, description = "Exact driver phone"),
        ("fuzzy_keywords" = Option<String>, Query, description = "Whitespace separated keywords"),
        ("min_balance" = Option<String>, Query, description = "Hide smaller balances (default: 0.01)"),
        ("payment_status" = Option<i8>, Query, description = "0 pending, 1 partial, 2 settled")
    ),
    responses(
        (status = 200, description = "Per-payee totals", body = Vec<PayeeSummary>)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn payee_summary(
    balance_service: web::Data<BalanceService>,
    query: web::Query<PayeeSummaryQuery>,
) -> Result<HttpResponse, ApiError> {
    let summary = balance_service.payee_summary(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, summary)))
}

#[utoipa::path(
    get,
    path = "/api/v1/balances/summary/by-payee/{payee_name}/details",
    tag = "Balances",
    params(
        ("payee_name" = String, Path, description = "Payee (driver) name"),
        ("driver_phone" = Option<String>, Query, description = "Exact driver phone"),
        ("payment_status" = Option<i8>, Query, description = "0 pending, 1 partial, 2 settled")
    ),
    responses(
        (status = 200, description = "The payee's balances", body = Vec<BalanceDetail>)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn payee_details(
    balance_service: web::Data<BalanceService>,
    path: web::Path<String>,
    query: web::Query<PayeeDetailsQuery>,
) -> Result<HttpResponse, ApiError> {
    let details = balance_service
        .payee_details(&path.into_inner(), query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, details)))
}

/// Spend one receipt across a payee's open balances, oldest first
#[utoipa::path(
    post,
    path = "/api/v1/balances/summary/by-payee/{payee_name}/batch-verify",
    tag = "Balances",
    params(
        ("payee_name" = String, Path, description = "Payee (driver) name")
    ),
    request_body = BatchVerifyRequest,
    responses(
        (status = 200, description = "Settlement result", body = VerifyPaymentResult),
        (status = 400, description = "Receipt verified or nothing to settle", body = crate::errors::ErrorResponse),
        (status = 403, description = "Finance role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Receipt not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn batch_verify(
    balance_service: web::Data<BalanceService>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<BatchVerifyRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_finance(&claims)?;

    let result = balance_service
        .batch_verify(&claims, &path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_PAYMENT_VERIFIED, result)))
}

#[utoipa::path(
    post,
    path = "/api/v1/balances/payment-receipts",
    tag = "Payment receipts",
    request_body = CreateReceiptRequest,
    responses(
        (status = 201, description = "Receipt saved", body = ReceiptView),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 403, description = "Finance role required", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_receipt(
    balance_service: web::Data<BalanceService>,
    req: HttpRequest,
    body: web::Json<CreateReceiptRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_finance(&claims)?;
    body.validate().map_err(validation_errors_to_api_error)?;

    let receipt = balance_service.create_receipt(&claims, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(MSG_RECEIPT_CREATED, receipt)))
}

#[utoipa::path(
    get,
    path = "/api/v1/balances/payment-receipts",
    tag = "Payment receipts",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
        ("exact_payee_name" = Option<String>, Query, description = "Exact payee"),
        ("ocr_status" = Option<i8>, Query, description = "0 pending, 1 confirmed, 2 verified"),
        ("date_from" = Option<String>, Query, description = "Payment date lower bound"),
        ("date_to" = Option<String>, Query, description = "Payment date upper bound"),
        ("fuzzy_keywords" = Option<String>, Query, description = "Whitespace separated keywords")
    ),
    responses(
        (status = 200, description = "Paginated receipts")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_receipts(
    balance_service: web::Data<BalanceService>,
    query: web::Query<ReceiptListQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(balance_service.list_receipts(query.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/balances/payment-receipts/{id}",
    tag = "Payment receipts",
    params(
        ("id" = i64, Path, description = "Receipt ID")
    ),
    responses(
        (status = 200, description = "Receipt with its settlements", body = ReceiptDetail),
        (status = 404, description = "Receipt not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_receipt(
    balance_service: web::Data<BalanceService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let receipt = balance_service.get_receipt(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, receipt)))
}

/// Upload or replace the photo of a bank receipt (finance roles)
#[utoipa::path(
    post,
    path = "/api/v1/balances/payment-receipts/{id}/image",
    tag = "Payment receipts",
    params(
        ("id" = i64, Path, description = "Receipt ID")
    ),
    request_body(content_type = "multipart/form-data", description = "Photo in the `image` part"),
    responses(
        (status = 200, description = "Photo stored", body = ReceiptView),
        (status = 400, description = "Missing or invalid image", body = crate::errors::ErrorResponse),
        (status = 403, description = "Finance role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Receipt not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_receipt_image(
    balance_service: web::Data<BalanceService>,
    file_service: web::Data<FileService>,
    req: HttpRequest,
    path: web::Path<i64>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_finance(&claims)?;

    let id = path.into_inner();
    let form = file_service
        .read_form(&mut payload, RECEIPTS, &format!("receipt_{}", id))
        .await?;
    let image = form
        .image
        .ok_or_else(|| ApiError::BadRequest(ERR_NO_IMAGE_FILE.to_string()))?;

    let receipt = balance_service.attach_receipt_image(id, image).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_IMAGE_UPLOADED, receipt)))
}

/// View the photo of a bank receipt
#[utoipa::path(
    get,
    path = "/api/v1/balances/payment-receipts/{id}/image",
    tag = "Payment receipts",
    params(
        ("id" = i64, Path, description = "Receipt ID")
    ),
    responses(
        (status = 200, description = "Image bytes", body = Vec<u8>, content_type = "image/jpeg"),
        (status = 404, description = "Receipt, photo or file not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_receipt_image(
    balance_service: web::Data<BalanceService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let image = balance_service.receipt_image(id).await?;
    Ok(image_response(image, &format!("receipt_{}", id)))
}
