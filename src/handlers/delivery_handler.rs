//! Delivery report handlers.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use log::warn;
use validator::Validate;

use super::image_response;
use crate::constants::{
    ERR_INVALID_FORM, ERR_NO_IMAGE_FILE, MSG_DELIVERY_CREATED, MSG_DELIVERY_DELETED,
    MSG_DELIVERY_UPDATED, MSG_IMAGE_DELETED, MSG_IMAGE_UPLOADED, MSG_NOTHING_TO_UPDATE, MSG_OK,
    UPLOADED_BY_COMPANY,
};
use crate::errors::ApiError;
use crate::middleware::require_auth;
use crate::models::{
    ApiResponse, CreateDeliveryRequest, DeliveryListQuery, DeliveryView, UpdateDeliveryRequest,
};
use crate::services::file_service::{UploadForm, DELIVERY_ORDERS};
use crate::services::{DeliveryService, FileService};
use crate::validators::validation_errors_to_api_error;

/// Form fields of a delivery report that carry integers.
const NUMERIC_FORM_FIELDS: &[&str] = &["target_factory_id"];

/// Report a delivery
///
/// When the target factory is a known customer with a contract in force,
/// the contract number and unit price are filled from that contract. The same
/// fields may be sent as `multipart/form-data` with an `image` part holding
/// the delivery order photo.
#[utoipa::path(
    post,
    path = "/api/v1/deliveries",
    tag = "Deliveries",
    request_body = CreateDeliveryRequest,
    responses(
        (status = 201, description = "Delivery created", body = DeliveryView),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_delivery(
    delivery_service: web::Data<DeliveryService>,
    req: HttpRequest,
    body: web::Json<CreateDeliveryRequest>,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    body.validate().map_err(validation_errors_to_api_error)?;

    let delivery = delivery_service.create(&claims, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(MSG_DELIVERY_CREATED, delivery)))
}

/// Report a delivery as a multipart form.
///
/// Routed for `multipart/form-data` bodies on the same path as
/// `create_delivery`. The photo is kept only when `has_delivery_order` is 有.
pub async fn create_delivery_form(
    delivery_service: web::Data<DeliveryService>,
    file_service: web::Data<FileService>,
    req: HttpRequest,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let claims = require_auth(&req)?;
    let form = file_service
        .read_form(&mut payload, DELIVERY_ORDERS, "order")
        .await?;

    let body = match delivery_from_form(&form) {
        Ok(body) => body,
        Err(e) => {
            if let Some(image) = form.image.as_deref() {
                file_service.delete_file(image);
            }
            return Err(e);
        }
    };

    let delivery = delivery_service
        .create_with_image(&claims, body, form.image)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(MSG_DELIVERY_CREATED, delivery)))
}

fn delivery_from_form(form: &UploadForm) -> Result<CreateDeliveryRequest, ApiError> {
    let body: CreateDeliveryRequest = serde_json::from_value(form.fields_as_json(NUMERIC_FORM_FIELDS))
        .map_err(|e| {
            warn!("Rejected delivery form: {}", e);
            ApiError::BadRequest(format!("{}: {}", ERR_INVALID_FORM, e))
        })?;
    body.validate().map_err(validation_errors_to_api_error)?;
    Ok(body)
}

#[utoipa::path(
    get,
    path = "/api/v1/deliveries",
    tag = "Deliveries",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
        ("exact_target_factory_name" = Option<String>, Query, description = "Exact factory"),
        ("exact_status" = Option<String>, Query, description = "Exact status"),
        ("exact_vehicle_no" = Option<String>, Query, description = "Exact vehicle number"),
        ("exact_driver_name" = Option<String>, Query, description = "Exact driver name"),
        ("exact_driver_phone" = Option<String>, Query, description = "Exact driver phone"),
        ("date_from" = Option<String>, Query, description = "Report date lower bound"),
        ("date_to" = Option<String>, Query, description = "Report date upper bound"),
        ("fuzzy_keywords" = Option<String>, Query, description = "Whitespace separated keywords")
    ),
    responses(
        (status = 200, description = "Paginated deliveries")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_deliveries(
    delivery_service: web::Data<DeliveryService>,
    query: web::Query<DeliveryListQuery>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(delivery_service.list(query.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/deliveries/{id}",
    tag = "Deliveries",
    params(
        ("id" = i64, Path, description = "Delivery ID")
    ),
    responses(
        (status = 200, description = "Delivery", body = DeliveryView),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_delivery(
    delivery_service: web::Data<DeliveryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let delivery = delivery_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_OK, delivery)))
}

#[utoipa::path(
    put,
    path = "/api/v1/deliveries/{id}",
    tag = "Deliveries",
    params(
        ("id" = i64, Path, description = "Delivery ID")
    ),
    request_body = UpdateDeliveryRequest,
    responses(
        (status = 200, description = "Delivery updated", body = DeliveryView),
        (status = 400, description = "Validation error", body = crate::errors::ErrorResponse),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_delivery(
    delivery_service: web::Data<DeliveryService>,
    path: web::Path<i64>,
    body: web::Json<UpdateDeliveryRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate().map_err(validation_errors_to_api_error)?;

    match delivery_service.update(path.into_inner(), body.into_inner()).await? {
        Some(delivery) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_DELIVERY_UPDATED, delivery)))
        }
        None => Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_NOTHING_TO_UPDATE))),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/deliveries/{id}",
    tag = "Deliveries",
    params(
        ("id" = i64, Path, description = "Delivery ID")
    ),
    responses(
        (status = 200, description = "Delivery deleted"),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_delivery(
    delivery_service: web::Data<DeliveryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    delivery_service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_DELIVERY_DELETED)))
}

/// Upload or replace a delivery's order photo
///
/// Multipart parts: `image` (required), `has_delivery_order` (有/无,
/// optional) and `uploaded_by` (default 公司). When `has_delivery_order` is
/// sent the flag is updated and the source type derived again.
#[utoipa::path(
    post,
    path = "/api/v1/deliveries/{id}/upload-order",
    tag = "Deliveries",
    params(
        ("id" = i64, Path, description = "Delivery ID")
    ),
    request_body(content_type = "multipart/form-data", description = "`image` part plus optional flag fields"),
    responses(
        (status = 200, description = "Photo stored", body = DeliveryView),
        (status = 400, description = "Missing or invalid image", body = crate::errors::ErrorResponse),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_delivery_order(
    delivery_service: web::Data<DeliveryService>,
    file_service: web::Data<FileService>,
    path: web::Path<i64>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let form = file_service
        .read_form(&mut payload, DELIVERY_ORDERS, &format!("delivery_{}", id))
        .await?;

    let Some(image) = form.image.clone() else {
        return Err(ApiError::BadRequest(ERR_NO_IMAGE_FILE.to_string()));
    };
    let uploaded_by = form.field("uploaded_by").unwrap_or(UPLOADED_BY_COMPANY);

    let delivery = delivery_service
        .attach_order_image(id, image, form.field("has_delivery_order"), Some(uploaded_by))
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_IMAGE_UPLOADED, delivery)))
}

/// View a delivery's order photo
#[utoipa::path(
    get,
    path = "/api/v1/deliveries/{id}/image",
    tag = "Deliveries",
    params(
        ("id" = i64, Path, description = "Delivery ID")
    ),
    responses(
        (status = 200, description = "Image bytes", body = Vec<u8>, content_type = "image/jpeg"),
        (status = 404, description = "Delivery, photo or file not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_delivery_image(
    delivery_service: web::Data<DeliveryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let image = delivery_service.order_image(id).await?;
    Ok(image_response(image, &format!("delivery_{}", id)))
}

/// Delete a delivery's order photo; the order flag is kept
#[utoipa::path(
    delete,
    path = "/api/v1/deliveries/{id}/image",
    tag = "Deliveries",
    params(
        ("id" = i64, Path, description = "Delivery ID")
    ),
    responses(
        (status = 200, description = "Photo removed"),
        (status = 404, description = "Delivery not found", body = crate::errors::ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_delivery_image(
    delivery_service: web::Data<DeliveryService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    delivery_service.remove_order_image(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(MSG_IMAGE_DELETED)))
}
