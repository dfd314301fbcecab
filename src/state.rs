//! Services shared by every worker.

use actix_web::web;
use sqlx::MySqlPool;

use crate::middleware::create_auth_rate_limiter_config;
use crate::middleware::rate_limiter::AuthGovernorConfig;
use crate::repositories::{
    BalanceRepository, ContractRepository, CustomerRepository, DeliveryRepository,
    UserRepository, WeighbillRepository,
};
use crate::routes;
use crate::services::{
    AuthService, BalanceService, ContractService, CustomerService, DeliveryService,
    FileService, TokenBlacklist, UserService, WeighbillService,
};

/// Built once at startup and cloned into each worker's `App`.
#[derive(Clone)]
pub struct AppState {
    pub token_blacklist: TokenBlacklist,
    auth_governor: AuthGovernorConfig,
    auth_service: web::Data<AuthService>,
    user_service: web::Data<UserService>,
    customer_service: web::Data<CustomerService>,
    contract_service: web::Data<ContractService>,
    delivery_service: web::Data<DeliveryService>,
    weighbill_service: web::Data<WeighbillService>,
    balance_service: web::Data<BalanceService>,
    file_service: web::Data<FileService>,
}

impl AppState {
    pub fn new(pool: MySqlPool) -> Self {
        let users = UserRepository::new(pool.clone());
        let customers = CustomerRepository::new(pool.clone());
        let contracts = ContractRepository::new(pool.clone());
        let deliveries = DeliveryRepository::new(pool.clone());
        let weighbills = WeighbillRepository::new(pool.clone());
        let balances = BalanceRepository::new(pool);
        let files = FileService::new();

        Self {
            token_blacklist: TokenBlacklist::new(),
            auth_governor: create_auth_rate_limiter_config(),
            auth_service: web::Data::new(AuthService::new(users.clone())),
            user_service: web::Data::new(UserService::new(users)),
            customer_service: web::Data::new(CustomerService::new(customers.clone())),
            contract_service: web::Data::new(ContractService::new(contracts.clone(), files.clone())),
            delivery_service: web::Data::new(DeliveryService::new(
                deliveries.clone(),
                contracts.clone(),
                customers,
                files.clone(),
            )),
            weighbill_service: web::Data::new(WeighbillService::new(
                weighbills, deliveries, contracts,
            )),
            balance_service: web::Data::new(BalanceService::new(balances, files.clone())),
            file_service: web::Data::new(files),
        }
    }

    /// Registers the shared services and every route on an `App`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.token_blacklist.clone()))
            .app_data(self.auth_service.clone())
            .app_data(self.user_service.clone())
            .app_data(self.customer_service.clone())
            .app_data(self.contract_service.clone())
            .app_data(self.delivery_service.clone())
            .app_data(self.weighbill_service.clone())
            .app_data(self.balance_service.clone())
            .app_data(self.file_service.clone());

        routes::configure_routes(cfg, &self.token_blacklist, &self.auth_governor);
    }
}
