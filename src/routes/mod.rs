use actix_governor::Governor;
use actix_web::guard::{self, GuardContext};
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpResponse};
use utoipa::OpenApi;

use crate::handlers;
use crate::middleware::rate_limiter::AuthGovernorConfig;
use crate::middleware::AuthMiddleware;
use crate::openapi::ApiDoc;
use crate::services::TokenBlacklist;

pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    blacklist: &TokenBlacklist,
    governor: &AuthGovernorConfig,
) {
    let auth = || AuthMiddleware::new(blacklist.clone());

    cfg
        // Liveness, no database access
        .route("/healthz", web::get().to(handlers::health_check))
        .route("/api-docs/openapi.json", web::get().to(openapi_json))
        .service(
            web::scope("/api/v1")
                // Auth routes (rate limited; login is public)
                .service(
                    web::scope("/auth")
                        .wrap(Governor::new(governor))
                        .route("/login", web::post().to(handlers::login))
                        .service(
                            web::resource("/logout")
                                .wrap(auth())
                                .route(web::post().to(handlers::logout)),
                        )
                        .service(
                            web::resource("/refresh")
                                .wrap(auth())
                                .route(web::post().to(handlers::refresh_token)),
                        ),
                )
                // Current user
                .service(
                    web::scope("/me")
                        .wrap(auth())
                        .route("", web::get().to(handlers::get_current_user))
                        .route("", web::put().to(handlers::update_current_user))
                        .route("/password", web::put().to(handlers::change_own_password)),
                )
                // User administration
                .service(
                    web::scope("/users")
                        .wrap(auth())
                        .route("", web::post().to(handlers::create_user))
                        .route("", web::get().to(handlers::list_users))
                        .route("/{id}", web::get().to(handlers::get_user))
                        .route("/{id}", web::put().to(handlers::update_user))
                        .route("/{id}", web::delete().to(handlers::delete_user))
                        .route("/{id}/reset-password", web::post().to(handlers::reset_password))
                        .route("/{id}/freeze", web::put().to(handlers::freeze_user))
                        .route("/{id}/unfreeze", web::put().to(handlers::unfreeze_user)),
                )
                .service(
                    web::scope("/roles")
                        .wrap(auth())
                        .route("", web::get().to(handlers::list_roles)),
                )
                .service(
                    web::scope("/customers")
                        .wrap(auth())
                        .route("", web::post().to(handlers::create_customer))
                        .route("", web::get().to(handlers::list_customers))
                        .route("/{id}", web::get().to(handlers::get_customer))
                        .route("/{id}", web::put().to(handlers::update_customer))
                        .route("/{id}", web::delete().to(handlers::delete_customer)),
                )
                // Fixed segments must be registered before /{id}
                .service(
                    web::scope("/contracts")
                        .wrap(auth())
                        .route("", web::post().to(handlers::create_contract))
                        .route("", web::get().to(handlers::list_contracts))
                        .route("/by-no/{contract_no}", web::get().to(handlers::get_contract_by_no))
                        .route("/export", web::post().to(handlers::export_contracts))
                        .route("/expire", web::post().to(handlers::expire_contracts))
                        .route("/parse", web::post().to(handlers::parse_contract_text))
                        .route("/{id}/image", web::get().to(handlers::get_contract_image))
                        .route("/{id}/image", web::post().to(handlers::upload_contract_image))
                        .route("/{id}", web::get().to(handlers::get_contract))
                        .route("/{id}", web::put().to(handlers::update_contract))
                        .route("/{id}", web::delete().to(handlers::delete_contract)),
                )
                .service(
                    web::scope("/deliveries")
                        .wrap(auth())
                        .route(
                            "",
                            web::post()
                                .guard(guard::fn_guard(is_multipart))
                                .to(handlers::create_delivery_form),
                        )
                        .route("", web::post().to(handlers::create_delivery))
                        .route("", web::get().to(handlers::list_deliveries))
                        .route("/{id}/upload-order", web::post().to(handlers::upload_delivery_order))
                        .route("/{id}/image", web::get().to(handlers::get_delivery_image))
                        .route("/{id}/image", web::delete().to(handlers::delete_delivery_image))
                        .route("/{id}", web::get().to(handlers::get_delivery))
                        .route("/{id}", web::put().to(handlers::update_delivery))
                        .route("/{id}", web::delete().to(handlers::delete_delivery)),
                )
                .service(
                    web::scope("/weighbills")
                        .wrap(auth())
                        .route("/match/delivery", web::get().to(handlers::match_delivery))
                        .route("/contract/price", web::get().to(handlers::get_contract_price))
                        .route("/auto-fill", web::post().to(handlers::auto_fill_weighbill))
                        .route("/parse", web::post().to(handlers::parse_weighbill_text))
                        .route("", web::post().to(handlers::create_weighbill))
                        .route("", web::get().to(handlers::list_weighbills))
                        .route("/{id}", web::get().to(handlers::get_weighbill))
                        .route("/{id}", web::put().to(handlers::update_weighbill))
                        .route("/{id}", web::delete().to(handlers::delete_weighbill))
                        .route("/{id}/confirm", web::post().to(handlers::confirm_weighbill))
                        .route(
                            "/{id}/payment-schedule",
                            web::put().to(handlers::set_payment_schedule),
                        ),
                )
                .service(
                    web::scope("/balances")
                        .wrap(auth())
                        .route("/generate", web::post().to(handlers::generate_balances))
                        .route("/match/pending", web::get().to(handlers::match_pending_balances))
                        .route("/verify-payment", web::post().to(handlers::verify_payment))
                        .route("/summary/by-payee", web::get().to(handlers::payee_summary))
                        .route(
                            "/summary/by-payee/{payee_name}/details",
                            web::get().to(handlers::payee_details),
                        )
                        .route(
                            "/summary/by-payee/{payee_name}/batch-verify",
                            web::post().to(handlers::batch_verify),
                        )
                        .route("/payment-receipts", web::post().to(handlers::create_receipt))
                        .route("/payment-receipts", web::get().to(handlers::list_receipts))
                        .route("/payment-receipts/{id}", web::get().to(handlers::get_receipt))
                        .route(
                            "/payment-receipts/{id}/image",
                            web::get().to(handlers::get_receipt_image),
                        )
                        .route(
                            "/payment-receipts/{id}/image",
                            web::post().to(handlers::upload_receipt_image),
                        )
                        .route("", web::get().to(handlers::list_balances))
                        .route("/{id}", web::get().to(handlers::get_balance))
                        .route("/{id}/recalculate", web::post().to(handlers::recalculate_balance)),
                ),
        );
}

fn is_multipart(ctx: &GuardContext<'_>) -> bool {
    ctx.head()
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
