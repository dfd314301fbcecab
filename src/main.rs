use actix_web::{middleware::Logger, App, HttpServer};
use log::{error, info};

use pd_logistics_api::config::CONFIG;
use pd_logistics_api::db::{self, DatabaseUrl, DbError};
use pd_logistics_api::repositories::ContractRepository;
use pd_logistics_api::services::spawn_contract_expiry;
use pd_logistics_api::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment variables and logger
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let pool = match connect_database().await {
        Ok(pool) => pool,
        Err(e) => {
            error!("{} failed to start: {}", CONFIG.app_name, e);
            std::process::exit(1);
        }
    };

    let _expiry = spawn_contract_expiry(
        ContractRepository::new(pool.clone()),
        CONFIG.contract_grace_days,
        CONFIG.contract_expiry_interval_secs,
    );

    let state = AppState::new(pool);

    let server_addr = format!("{}:{}", CONFIG.server_host, CONFIG.server_port);
    info!("Starting {} at http://{}", CONFIG.app_name, server_addr);

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| state.configure(cfg))
    })
    .bind(&server_addr)?
    .run()
    .await
}

async fn connect_database() -> Result<sqlx::MySqlPool, DbError> {
    let url = DatabaseUrl::parse(&CONFIG.database_url)?;
    let pool = db::connect(&url, CONFIG.database_max_connections).await?;
    db::verify_schema(&pool).await?;
    info!("Connected to {}", url.redacted());
    Ok(pool)
}
