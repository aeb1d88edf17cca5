mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::db::db::DBClient;
use service::{
    connect_service::ConnectAccountService,
    escrow_service::EscrowService,
    payment_processor::{PaymentProcessor, StripeProcessor},
    webhook_service::WebhookService,
};

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    // Services
    pub connect_service: Arc<ConnectAccountService<DBClient>>,
    pub escrow_service: Arc<EscrowService<DBClient>>,
    pub webhook_service: Arc<WebhookService<DBClient>>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config, processor: Arc<dyn PaymentProcessor>) -> Self {
        let db_client_arc = Arc::new(db_client);

        let connect_service = Arc::new(ConnectAccountService::new(
            db_client_arc.clone(),
            processor.clone(),
            config.app_url.clone(),
        ));

        let escrow_service = Arc::new(EscrowService::new(
            db_client_arc.clone(),
            processor.clone(),
            config.platform_fee_bps,
            config.currency.clone(),
        ));

        let webhook_service = Arc::new(WebhookService::new(
            db_client_arc.clone(),
            config.processor_webhook_secret.clone(),
        ));

        Self {
            env: config,
            db_client: db_client_arc,
            connect_service,
            escrow_service,
            webhook_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    // Connect to PostgreSQL
    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            println!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            println!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let processor: Arc<dyn PaymentProcessor> = match StripeProcessor::new(&config) {
        Ok(processor) => Arc::new(processor),
        Err(err) => {
            println!("🔥 Failed to initialize the payment processor client: {:?}", err);
            std::process::exit(1);
        }
    };

    let allowed_origins = vec![
        config.app_url.parse::<HeaderValue>().expect("APP_URL must be a valid origin"),
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:8000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let app_state = Arc::new(AppState::new(DBClient::new(pool), config.clone(), processor));

    let app = create_router(app_state.clone()).layer(cors);

    println!("🚀 Server is running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
