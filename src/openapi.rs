use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::errors::ErrorResponse;
use crate::models::{
    AffectedResponse, AutoFillRequest, AutoFillResponse, BalanceDetail, BalanceListItem,
    BalanceReceipt, BalanceWithReceipts, BatchVerifyRequest, ChangePasswordRequest,
    ConfirmWeighbillResponse, Contract, ContractDetail, ContractListItem, ContractParseResult,
    ContractPriceResponse, ContractProduct, ContractProductInput, ContractStatus,
    CreateContractRequest, CreateCustomerRequest, CreateDeliveryRequest, CreateReceiptRequest,
    CreateUserRequest, CreateWeighbillRequest, Customer, Delivery, DeliveryOrderFlag,
    DeliveryStatus, DeliveryView, ExportContractsRequest, GeneratedBalance, HealthResponse,
    LoginRequest, LoginResponse, LoginUser, ParseTextRequest, ParsedProduct, PayeeSummary,
    PaymentReceipt, PaymentScheduleRequest, PaymentStatus, RecalculatedBalance, ReceiptDetail,
    ReceiptSettlement, ReceiptStatus, ReceiptView, ResetPasswordRequest, Role, RoleInfo,
    SettledItem, SettlementItem, UpdateContractRequest, UpdateCustomerRequest,
    UpdateDeliveryRequest, UpdateProfileRequest, UpdateUserRequest, UpdateWeighbillRequest,
    UserResponse, UserStatus, VerifyPaymentRequest, VerifyPaymentResult, Weighbill,
    WeighbillDetail, WeighbillListItem, WeighbillParseResult, WeighbillStatus,
};

/// OpenAPI document served at `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "PD Logistics API",
        version = "0.1.0",
        description = "Back-office API for scrap-battery logistics: users, smelter customers, contracts, deliveries, weighbills, balances and payment receipts.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "Health", description = "Liveness check"),
        (name = "Authentication", description = "Login, logout and token refresh"),
        (name = "Current user", description = "Profile and password of the signed-in user"),
        (name = "Users", description = "User administration and roles"),
        (name = "Customers", description = "Smelter customers"),
        (name = "Contracts", description = "Contracts, products, export and text parsing"),
        (name = "Deliveries", description = "Delivery reports"),
        (name = "Weighbills", description = "Weighbills, delivery matching and contract prices"),
        (name = "Balances", description = "Driver balances and settlement"),
        (name = "Payment receipts", description = "Bank receipts settled against balances")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::login,
        crate::handlers::logout,
        crate::handlers::refresh_token,
        crate::handlers::get_current_user,
        crate::handlers::update_current_user,
        crate::handlers::change_own_password,
        crate::handlers::create_user,
        crate::handlers::list_users,
        crate::handlers::get_user,
        crate::handlers::update_user,
        crate::handlers::delete_user,
        crate::handlers::reset_password,
        crate::handlers::freeze_user,
        crate::handlers::unfreeze_user,
        crate::handlers::list_roles,
        crate::handlers::create_customer,
        crate::handlers::list_customers,
        crate::handlers::get_customer,
        crate::handlers::update_customer,
        crate::handlers::delete_customer,
        crate::handlers::create_contract,
        crate::handlers::list_contracts,
        crate::handlers::get_contract,
        crate::handlers::get_contract_by_no,
        crate::handlers::update_contract,
        crate::handlers::delete_contract,
        crate::handlers::export_contracts,
        crate::handlers::expire_contracts,
        crate::handlers::parse_contract_text,
        crate::handlers::upload_contract_image,
        crate::handlers::get_contract_image,
        crate::handlers::create_delivery,
        crate::handlers::list_deliveries,
        crate::handlers::get_delivery,
        crate::handlers::update_delivery,
        crate::handlers::delete_delivery,
        crate::handlers::upload_delivery_order,
        crate::handlers::get_delivery_image,
        crate::handlers::delete_delivery_image,
        crate::handlers::match_delivery,
        crate::handlers::get_contract_price,
        crate::handlers::auto_fill_weighbill,
        crate::handlers::create_weighbill,
        crate::handlers::list_weighbills,
        crate::handlers::get_weighbill,
        crate::handlers::update_weighbill,
        crate::handlers::confirm_weighbill,
        crate::handlers::set_payment_schedule,
        crate::handlers::parse_weighbill_text,
        crate::handlers::delete_weighbill,
        crate::handlers::generate_balances,
        crate::handlers::list_balances,
        crate::handlers::get_balance,
        crate::handlers::recalculate_balance,
        crate::handlers::match_pending_balances,
        crate::handlers::verify_payment,
        crate::handlers::payee_summary,
        crate::handlers::payee_details,
        crate::handlers::batch_verify,
        crate::handlers::create_receipt,
        crate::handlers::list_receipts,
        crate::handlers::get_receipt,
        crate::handlers::upload_receipt_image,
        crate::handlers::get_receipt_image
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            LoginUser,
            CreateUserRequest,
            UpdateProfileRequest,
            UpdateUserRequest,
            ChangePasswordRequest,
            ResetPasswordRequest,
            Role,
            RoleInfo,
            UserStatus,
            UserResponse,
            Customer,
            CreateCustomerRequest,
            UpdateCustomerRequest,
            Contract,
            ContractProduct,
            ContractProductInput,
            ContractStatus,
            ContractDetail,
            ContractListItem,
            CreateContractRequest,
            UpdateContractRequest,
            ExportContractsRequest,
            ParseTextRequest,
            ParsedProduct,
            ContractParseResult,
            Delivery,
            DeliveryView,
            DeliveryStatus,
            DeliveryOrderFlag,
            CreateDeliveryRequest,
            UpdateDeliveryRequest,
            Weighbill,
            WeighbillDetail,
            WeighbillListItem,
            WeighbillStatus,
            CreateWeighbillRequest,
            UpdateWeighbillRequest,
            AutoFillRequest,
            AutoFillResponse,
            ContractPriceResponse,
            ConfirmWeighbillResponse,
            PaymentScheduleRequest,
            WeighbillParseResult,
            BalanceDetail,
            BalanceListItem,
            BalanceReceipt,
            BalanceWithReceipts,
            GeneratedBalance,
            RecalculatedBalance,
            PaymentStatus,
            PaymentReceipt,
            ReceiptView,
            ReceiptStatus,
            ReceiptSettlement,
            ReceiptDetail,
            SettlementItem,
            SettledItem,
            VerifyPaymentRequest,
            VerifyPaymentResult,
            BatchVerifyRequest,
            CreateReceiptRequest,
            PayeeSummary,
            AffectedResponse,
            HealthResponse,
            ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security configuration for Bearer token authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_scope() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthz",
            "/api/v1/auth/login",
            "/api/v1/me",
            "/api/v1/users/{id}/freeze",
            "/api/v1/contracts/export",
            "/api/v1/deliveries/{id}",
            "/api/v1/deliveries/{id}/upload-order",
            "/api/v1/contracts/{id}/image",
            "/api/v1/weighbills/auto-fill",
            "/api/v1/balances/summary/by-payee/{payee_name}/batch-verify",
            "/api/v1/balances/payment-receipts/{id}",
            "/api/v1/balances/payment-receipts/{id}/image",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth")));
    }
}
