//! One-shot schema setup: creates the database, applies the migrations and
//! optionally seeds the first administrator.

use log::{error, info, warn};
use std::env;

use pd_logistics_api::config::CONFIG;
use pd_logistics_api::db::{self, DatabaseUrl};
use pd_logistics_api::errors::ApiError;
use pd_logistics_api::models::Role;
use pd_logistics_api::repositories::UserRepository;
use pd_logistics_api::services::auth_service::hash_password;
use pd_logistics_api::utils::mask_account;

const DEFAULT_ADMIN_NAME: &str = "管理员";

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    if let Err(e) = run().await {
        error!("Schema setup failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let url = DatabaseUrl::parse(&CONFIG.database_url)?;
    db::ensure_database(&url).await?;

    let pool = db::connect(&url, 1).await?;
    db::run_migrations(&pool).await?;
    db::verify_schema(&pool).await?;
    info!("Schema ready on {}", url.redacted());

    match (env::var("PD_ADMIN_ACCOUNT"), env::var("PD_ADMIN_PASSWORD")) {
        (Ok(account), Ok(password)) if !account.trim().is_empty() && !password.is_empty() => {
            let name = env::var("PD_ADMIN_NAME").unwrap_or_else(|_| DEFAULT_ADMIN_NAME.to_string());
            seed_admin(UserRepository::new(pool.clone()), account.trim(), &password, &name)
                .await
                .map_err(|e| format!("admin seed failed: {}", e))?;
        }
        _ => info!("PD_ADMIN_ACCOUNT/PD_ADMIN_PASSWORD not set, skipping admin seed"),
    }

    pool.close().await;
    Ok(())
}

async fn seed_admin(
    users: UserRepository,
    account: &str,
    password: &str,
    name: &str,
) -> Result<(), ApiError> {
    if users.account_exists(account).await? {
        warn!("Account {} already exists, admin not seeded", mask_account(account));
        return Ok(());
    }

    let hash = hash_password(password)?;
    let id = users
        .insert(name, account, &hash, Role::Admin.as_str(), None, None)
        .await?;
    info!("Seeded administrator {} as user {}", mask_account(account), id);
    Ok(())
}
