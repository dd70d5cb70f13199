use sea_orm::Database;
use tracing::info;

use edemy_auth_types::cookie::CookieSettings;
use edemy_auth_types::session::SessionKey;
use edemy_core::Config;
use edemy_core::tracing::init_tracing;

use edemy_marketplace::config::MarketplaceConfig;
use edemy_marketplace::infra::http::build_http_client;
use edemy_marketplace::infra::s3::S3ObjectStore;
use edemy_marketplace::infra::ses::SesMailer;
use edemy_marketplace::infra::sigv4::AwsCredentials;
use edemy_marketplace::infra::stripe::{StripeClient, StripeUrls};
use edemy_marketplace::router::build_router;
use edemy_marketplace::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = MarketplaceConfig::from_env().expect("failed to load config from environment");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let http =
        build_http_client(config.upstream_timeout_secs).expect("failed to build http client");

    let aws = AwsCredentials {
        access_key_id: config.aws_access_key_id,
        secret_access_key: config.aws_secret_access_key,
        region: config.aws_region,
    };

    let state = AppState {
        db,
        session_key: SessionKey::new(config.jwt_secret),
        cookies: CookieSettings {
            domain: config.cookie_domain,
            secure: config.cookie_secure,
        },
        payments: StripeClient::new(
            http.clone(),
            config.stripe_secret,
            StripeUrls {
                api: config.stripe_api_url,
                redirect: config.stripe_redirect_url,
                success: config.stripe_success_url,
                cancel: config.stripe_cancel_url,
            },
        ),
        storage: S3ObjectStore::new(
            http.clone(),
            aws.clone(),
            config.s3_bucket,
            config.s3_endpoint,
        ),
        mailer: SesMailer::new(http, aws, config.ses_endpoint, config.email_from),
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("marketplace service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
