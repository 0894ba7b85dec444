use crate::sync::CrmConfig;

/// Server configuration
///
/// # Environment variables
///
/// Every setting can be overridden through the environment:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | INBOUND_API_KEY | (unset) | Key expected in X-CRM-API-Key on inbound requests |
/// | CRM_CUSTOMER_WEBHOOK_URL | (unset) | Customer-number webhook endpoint |
/// | CRM_CUSTOMER_WEBHOOK_API_KEY | (unset) | Customer-number webhook shared secret |
/// | CRM_INVOICE_STATUS_WEBHOOK_URL | (unset) | Invoice-status webhook endpoint |
/// | CRM_INVOICE_STATUS_WEBHOOK_API_KEY | (unset) | Invoice-status webhook shared secret (optional) |
/// | CRM_PAYMENT_WEBHOOK_URL | (unset) | Legacy payment-event endpoint (optional) |
/// | CRM_PAYMENT_WEBHOOK_TOKEN | (unset) | Bearer token for the payment endpoint |
/// | WEBHOOK_TIMEOUT_SECS | 15 | Outbound request timeout |
/// | LOG_DIR | (unset) | Directory for daily-rolling log files |
///
/// Unset webhook variables are surfaced as configuration errors at call
/// time, not at startup; the inbound API can run while outbound endpoints
/// are still being provisioned.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Shared secret expected on inbound requests; None means inbound
    /// auth is unconfigured and every authenticated route answers 500
    pub inbound_api_key: Option<String>,
    /// Outbound CRM endpoint configuration
    pub crm: CrmConfig,
    /// Outbound request timeout in seconds
    pub webhook_timeout_secs: u64,
    /// Optional log file directory
    pub log_dir: Option<String>,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables, with defaults for
    /// anything unset
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            inbound_api_key: env_opt("INBOUND_API_KEY"),
            crm: CrmConfig {
                customer_endpoint: env_opt("CRM_CUSTOMER_WEBHOOK_URL"),
                customer_api_key: env_opt("CRM_CUSTOMER_WEBHOOK_API_KEY"),
                invoice_status_endpoint: env_opt("CRM_INVOICE_STATUS_WEBHOOK_URL"),
                invoice_status_api_key: env_opt("CRM_INVOICE_STATUS_WEBHOOK_API_KEY"),
                payment_endpoint: env_opt("CRM_PAYMENT_WEBHOOK_URL"),
                payment_bearer_token: env_opt("CRM_PAYMENT_WEBHOOK_TOKEN"),
            },
            webhook_timeout_secs: std::env::var("WEBHOOK_TIMEOUT_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15),
            log_dir: env_opt("LOG_DIR"),
        }
    }

    /// Whether this is the production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
