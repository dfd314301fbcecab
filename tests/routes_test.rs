mod common;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use serde_json::json;

use pd_logistics_api::models::Role;

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn test_login_is_routed_and_validates_body() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .peer_addr(common::peer())
        .set_json(json!({ "account": "", "password": "" }))
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .peer_addr(common::peer())
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_protected_routes_require_token() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    for uri in [
        "/api/v1/me",
        "/api/v1/users",
        "/api/v1/roles",
        "/api/v1/customers",
        "/api/v1/contracts",
        "/api/v1/deliveries",
        "/api/v1/weighbills",
        "/api/v1/balances",
        "/api/v1/balances/payment-receipts",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_eq!(
            common::status_of(&app, req).await,
            StatusCode::UNAUTHORIZED,
            "{}",
            uri
        );
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_revokes_token() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = common::token_for(Role::Admin);

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(5));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/logout")
        .peer_addr(common::peer())
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_role_checks_run_before_database_access() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let warehouse = common::token_for(Role::WarehouseManager);

    let req = test::TestRequest::post()
        .uri("/api/v1/contracts/expire")
        .insert_header(bearer(&warehouse))
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/balances/generate")
        .insert_header(bearer(&warehouse))
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/users")
        .insert_header(bearer(&warehouse))
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(bearer(&warehouse))
        .set_json(json!({
            "name": "新管理员",
            "account": "newadmin",
            "password": "secret123",
            "role": "管理员"
        }))
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_non_managers_cannot_edit_themselves_through_user_admin() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    for role in [Role::Finance, Role::Accountant, Role::WarehouseManager] {
        let token = common::token_for(role);
        let req = test::TestRequest::put()
            .uri("/api/v1/users/7")
            .insert_header(bearer(&token))
            .set_json(json!({ "name": "改名" }))
            .to_request();
        assert_eq!(
            common::status_of(&app, req).await,
            StatusCode::FORBIDDEN,
            "{}",
            role
        );
    }
}

#[actix_web::test]
async fn test_text_parsing_endpoints() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = common::token_for(Role::WarehouseManager);

    let req = test::TestRequest::post()
        .uri("/api/v1/weighbills/parse")
        .insert_header(bearer(&token))
        .set_json(json!({ "lines": ["日期：2025年3月4日", "车号：豫A12345", "净重：33.24"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["vehicle_no"], "豫A12345");
    assert_eq!(body["data"]["weigh_date"], "2025-03-04");

    let req = test::TestRequest::post()
        .uri("/api/v1/contracts/parse")
        .insert_header(bearer(&token))
        .set_json(json!({ "lines": [] }))
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::BAD_REQUEST);
}

const BOUNDARY: &str = "pd-test-boundary";

/// Multipart body of `(name, content type, value)` parts; a content type
/// marks a file part.
fn multipart(parts: &[(&str, Option<&str>, &str)]) -> (String, String) {
    let mut body = String::new();
    for (name, content_type, value) in parts {
        body.push_str(&format!("--{}\r\n", BOUNDARY));
        match content_type {
            Some(ct) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}.bin\"\r\nContent-Type: {}\r\n\r\n",
                name, name, ct
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                name
            )),
        }
        body.push_str(value);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

#[actix_web::test]
async fn test_image_uploads_are_checked_before_storage() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = common::token_for(Role::WarehouseManager);

    let (content_type, body) = multipart(&[("has_delivery_order", None, "有")]);
    let req = test::TestRequest::post()
        .uri("/api/v1/deliveries/5/upload-order")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::BAD_REQUEST);

    let (content_type, body) = multipart(&[("image", Some("application/pdf"), "%PDF-1.4")]);
    let req = test::TestRequest::post()
        .uri("/api/v1/contracts/5/image")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::BAD_REQUEST);

    let (content_type, body) = multipart(&[("image", Some("image/jpeg"), "jpeg")]);
    let req = test::TestRequest::post()
        .uri("/api/v1/balances/payment-receipts/5/image")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/deliveries/5/image")
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_multipart_delivery_report_is_validated() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let token = common::token_for(Role::WarehouseManager);

    let (content_type, body) = multipart(&[
        ("vehicle_no", None, "豫A12345"),
        ("has_delivery_order", None, "maybe"),
    ]);
    let req = test::TestRequest::post()
        .uri("/api/v1/deliveries")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::BAD_REQUEST);

    let (content_type, body) = multipart(&[("target_factory_id", None, "three")]);
    let req = test::TestRequest::post()
        .uri("/api/v1/deliveries")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    assert_eq!(common::status_of(&app, req).await, StatusCode::BAD_REQUEST);
}
