use serde::Deserialize;

/// Marketplace service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct MarketplaceConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 8000).
    #[serde(default = "default_port")]
    pub port: u16,
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// Cookie domain attribute; host-only cookies when unset.
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default = "default_true")]
    pub cookie_secure: bool,

    pub stripe_secret: String,
    #[serde(default = "default_stripe_api_url")]
    pub stripe_api_url: String,
    /// Onboarding refresh and return URL.
    pub stripe_redirect_url: String,
    /// Checkout success base; the course id is appended as a path segment.
    pub stripe_success_url: String,
    pub stripe_cancel_url: String,

    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    pub s3_bucket: String,
    /// Path-style endpoint for S3-compatible stores (e.g. "http://minio:9000").
    #[serde(default)]
    pub s3_endpoint: Option<String>,
    #[serde(default)]
    pub ses_endpoint: Option<String>,
    /// Sender address of password reset mail.
    pub email_from: String,

    /// Timeout for every call to the payment, storage and email APIs.
    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,
}

impl edemy_core::Config for MarketplaceConfig {}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

fn default_stripe_api_url() -> String {
    "https://api.stripe.com".to_owned()
}

fn default_upstream_timeout() -> u64 {
    10
}
