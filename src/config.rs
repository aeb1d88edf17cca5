// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub port: u16,
    // Payment processor configuration
    pub processor_api_url: String,
    pub processor_secret_key: String,
    pub processor_webhook_secret: String,
    pub platform_fee_bps: i64,
    pub currency: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let app_url = std::env::var("APP_URL").expect("APP_URL must be set");

        // Payment processor configuration (with defaults)
        let processor_api_url = std::env::var("PROCESSOR_API_URL")
            .unwrap_or_else(|_| "https://api.stripe.com".to_string());
        let processor_secret_key = std::env::var("PROCESSOR_SECRET_KEY")
            .unwrap_or_else(|_| "test_secret_key".to_string());
        let processor_webhook_secret = std::env::var("PROCESSOR_WEBHOOK_SECRET")
            .unwrap_or_else(|_| "test_webhook_secret".to_string());
        let platform_fee_bps = std::env::var("PLATFORM_FEE_BPS")
            .unwrap_or_else(|_| "500".to_string())
            .parse::<i64>()
            .expect("PLATFORM_FEE_BPS must be an integer");
        let currency = std::env::var("CURRENCY").unwrap_or_else(|_| "aud".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .expect("PORT must be a number");

        Config {
            database_url,
            app_url,
            port,
            processor_api_url,
            processor_secret_key,
            processor_webhook_secret,
            platform_fee_bps,
            currency,
        }
    }
}
