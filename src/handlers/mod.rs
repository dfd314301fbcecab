//! HTTP request handlers organized by domain.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::HttpResponse;

use crate::services::file_service::StoredImage;
use crate::validators::extension_for_content_type;

pub mod auth_handler;
pub mod balance_handler;
pub mod contract_handler;
pub mod customer_handler;
pub mod delivery_handler;
pub mod health_handler;
pub mod user_handler;
pub mod weighbill_handler;

pub use auth_handler::*;
pub use balance_handler::*;
pub use contract_handler::*;
pub use customer_handler::*;
pub use delivery_handler::*;
pub use health_handler::*;
pub use user_handler::*;
pub use weighbill_handler::*;

/// Serves a stored image inline as `<stem>.<ext>`.
pub(crate) fn image_response(image: StoredImage, stem: &str) -> HttpResponse {
    let file_name = format!(
        "{}.{}",
        stem,
        extension_for_content_type(Some(image.content_type))
    );
    HttpResponse::Ok()
        .content_type(image.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(image.bytes)
}
