//! Contract handlers, including CSV export, the expiry trigger, text parsing
//! and the contract scan.

use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use validator::Validate;

use super::image_response;
use crate::config::CONFIG;
use crate::constants::{
    ERR_NO_IMAGE_FILE, ERR_ONLY_ADMINS, MSG_CONTRACTS_EXPIRED, MSG_CONTRACT_CREATED,
    MSG_CONTRACT_DELETED, MSG_CONTRACT_PARSED, MSG_CONTRACT_UPDATED, MSG_IMAGE_UPLOADED,
    MSG_NOTHING_TO_UPDATE, MSG_OK,
};
use crate::errors::ApiError;
use crate::middleware::{require_admin, require_auth};
use crate::models::{
    AffectedResponse, ApiResponse, ContractDetail, ContractListQuery, ContractParseResult,
    CreateContractRequest, ExportContractsRequest, ParseTextRequest, UpdateContractRequest,
};
use crate::services::file_service::CONTRACTS;
use crate::services::{ContractService, FileService};
use crate::validators::validation_errors_to_api_error;

/// Create a contract with its products
///
/// The end date is signing date + 5 days whenever a signing date is given.
#[utoipa::path(
    post,
    path = "/api/v1/contracts",
    tag = "Contracts",
    request_body = CreateContractRequest,
    responses(
        (status = 201, description = "Contract created", body = ContractDetail),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate contract or number", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_contract(
    contract_service: web::Data<ContractService>,
    req: HttpRequest,
    body: web::Json<CreateContractRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    body.validate().map_err(validation_errors_to_api_error)?;

    let contract = contract_service.create(body.into_inner()).await?;
    info!("User {} created contract {}", claims.sub, contract.contract.id);
    Ok(HttpResponse::Created().json(ApiResponse::success(MSG_CONTRACT_CREATED, contract)))
}

#[utoipa::path(
    get,
    path = "/api/v1/contracts",
    tag = "Contracts",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
        ("exact_contract_no" = Option<String>, Query, description = "Exact contract number"),
        ("exact_smelter_company" = Option<String>, Query, description = "Exact smelter"),
        ("exact_status" = Option<String>, Query, description = "Exact status"),
        ("fuzzy_keywords" = Option<String>, Query, description = "Whitespace separated keywords")
    ),
    responses(
        (status = 200, description = "Paginated contracts with product counts")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_contracts(
    contract_service: web::Data<ContractService>,
    query: web::Query<ContractListQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(contract_service.list(query.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}",
    tag = "Contracts",
    params(
        ("id" = i64, Path, description = "Contract ID")
    ),
    responses(
        (status = 200, description = "Contract with products", body = ContractDetail),
        (status = 404, description = "Contract not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_contract(
    contract_service: web::Data<ContractService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let contract = contract_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, contract)))
}

#[utoipa::path(
    get,
    path = "/api/v1/contracts/by-no/{contract_no}",
    tag = "Contracts",
    params(
        ("contract_no" = String, Path, description = "Contract number")
    ),
    responses(
        (status = 200, description = "Contract with products", body = ContractDetail),
        (status = 404, description = "Contract not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_contract_by_no(
    contract_service: web::Data<ContractService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let contract = contract_service.get_by_no(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, contract)))
}

/// Partially update a contract
///
/// A `products` array replaces the whole product list.
#[utoipa::path(
    put,
    path = "/api/v1/contracts/{id}",
    tag = "Contracts",
    params(
        ("id" = i64, Path, description = "Contract ID")
    ),
    request_body = UpdateContractRequest,
    responses(
        (status = 200, description = "Contract updated", body = ContractDetail),
        (status = 404, description = "Contract not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Contract number taken", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_contract(
    contract_service: web::Data<ContractService>,
    path: web::Path<i64>,
    body: web::Json<UpdateContractRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_errors_to_api_error)?;

    match contract_service.update(path.into_inner(), body.into_inner()).await? {
        Some(contract) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_CONTRACT_UPDATED, contract)))
        }
        None => Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_NOTHING_TO_UPDATE))),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/contracts/{id}",
    tag = "Contracts",
    params(
        ("id" = i64, Path, description = "Contract ID")
    ),
    responses(
        (status = 200, description = "Contract deleted"),
        (status = 404, description = "Contract not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_contract(
    contract_service: web::Data<ContractService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    contract_service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_CONTRACT_DELETED)))
}

/// Export contracts and their products as CSV (UTF-8 with BOM)
#[utoipa::path(
    post,
    path = "/api/v1/contracts/export",
    tag = "Contracts",
    request_body = ExportContractsRequest,
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn export_contracts(
    contract_service: web::Data<ContractService>,
    body: Option<web::Json<ExportContractsRequest>>,
) -> Result<HttpResponse, ApiError> {
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    let (file_name, csv) = contract_service.export(request).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(csv))
}

/// Lapse active contracts past their grace period (administrators only)
#[utoipa::path(
    post,
    path = "/api/v1/contracts/expire",
    tag = "Contracts",
    responses(
        (status = 200, description = "Number of contracts lapsed", body = AffectedResponse),
        (status = 403, description = "Administrator role required", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn expire_contracts(
    contract_service: web::Data<ContractService>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    require_admin(&claims, ERR_ONLY_ADMINS)?;

    let affected = contract_service.expire(CONFIG.contract_grace_days).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MSG_CONTRACTS_EXPIRED,
        AffectedResponse { affected },
    )))
}

/// Extract contract fields from recognised text lines
#[utoipa::path(
    post,
    path = "/api/v1/contracts/parse",
    tag = "Contracts",
    request_body = ParseTextRequest,
    responses(
        (status = 200, description = "Extracted fields", body = ContractParseResult),
        (status = 400, description = "No text lines", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn parse_contract_text(
    contract_service: web::Data<ContractService>,
    body: web::Json<ParseTextRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_errors_to_api_error)?;

    let result = contract_service.parse(&body.lines);
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_CONTRACT_PARSED, result)))
}

/// Upload or replace the scanned contract
#[utoipa::path(
    post,
    path = "/api/v1/contracts/{id}/image",
    tag = "Contracts",
    params(
        ("id" = i64, Path, description = "Contract ID")
    ),
    request_body(content_type = "multipart/form-data", description = "Scan in the `image` part"),
    responses(
        (status = 200, description = "Scan stored", body = ContractDetail),
        (status = 400, description = "Missing or invalid image", body = crate::errors::ErrorResponse),
        (status = 404, description = "Contract not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_contract_image(
    contract_service: web::Data<ContractService>,
    file_service: web::Data<FileService>,
    path: web::Path<i64>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let form = file_service
        .read_form(&mut payload, CONTRACTS, &format!("contract_{}", id))
        .await?;
    let image = form
        .image
        .ok_or_else(|| ApiError::BadRequest(ERR_NO_IMAGE_FILE.to_string()))?;

    let contract = contract_service.attach_image(id, image).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_IMAGE_UPLOADED, contract)))
}

/// View the scanned contract
#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}/image",
    tag = "Contracts",
    params(
        ("id" = i64, Path, description = "Contract ID")
    ),
    responses(
        (status = 200, description = "Image bytes", body = Vec<u8>, content_type = "image/jpeg"),
        (status = 404, description = "Contract, scan or file not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_contract_image(
    contract_service: web::Data<ContractService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let (contract_no, image) = contract_service.image(path.into_inner()).await?;
    Ok(image_response(image, &format!("contract_{}", contract_no)))
}
