//! Services organized by domain concern.

pub mod auth_service;
pub mod balance_service;
pub mod contract_parser;
pub mod contract_service;
pub mod customer_service;
pub mod delivery_service;
pub mod file_service;
pub mod token_blacklist;
pub mod user_service;
pub mod weighbill_parser;
pub mod weighbill_service;

pub use auth_service::AuthService;
pub use balance_service::BalanceService;
pub use contract_service::{spawn_contract_expiry, ContractService};
pub use customer_service::CustomerService;
pub use delivery_service::DeliveryService;
pub use file_service::FileService;
pub use token_blacklist::TokenBlacklist;
pub use user_service::UserService;
pub use weighbill_service::WeighbillService;
