use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use serde_json::json;

use edemy_domain::id::CourseId;
use edemy_marketplace::domain::repository::PaymentGateway;
use edemy_marketplace::domain::types::{CheckoutRequest, PaymentStatus};
use edemy_marketplace::error::MarketplaceError;
use edemy_marketplace::infra::http::build_http_client;
use edemy_marketplace::infra::stripe::{StripeClient, StripeUrls};

/// (path, authorization, content type, form fields)
type Captured = Arc<Mutex<Vec<(String, String, String, HashMap<String, String>)>>>;

fn capture(captured: &Captured, path: &str, headers: &HeaderMap, body: &str) {
    let header = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned()
    };
    let form = url::form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect();
    captured.lock().unwrap().push((
        path.to_owned(),
        header(header::AUTHORIZATION),
        header(header::CONTENT_TYPE),
        form,
    ));
}

async fn fake_stripe(course_id: CourseId) -> (StripeClient, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/v1/accounts",
            post(
                |State(c): State<Captured>, headers: HeaderMap, body: String| async move {
                    capture(&c, "/v1/accounts", &headers, &body);
                    axum::Json(json!({"id": "acct_new", "object": "account"}))
                },
            ),
        )
        .route(
            "/v1/accounts/{id}",
            get(|Path(id): Path<String>| async move {
                if id == "acct_missing" {
                    return (
                        StatusCode::NOT_FOUND,
                        axum::Json(json!({"error": {"message": "No such account"}})),
                    );
                }
                (
                    StatusCode::OK,
                    axum::Json(json!({"id": id, "charges_enabled": true})),
                )
            }),
        )
        .route(
            "/v1/account_links",
            post(
                |State(c): State<Captured>, headers: HeaderMap, body: String| async move {
                    capture(&c, "/v1/account_links", &headers, &body);
                    axum::Json(json!({"url": "https://connect.stripe.test/setup/acct_new"}))
                },
            ),
        )
        .route(
            "/v1/checkout/sessions",
            post(
                move |State(c): State<Captured>, headers: HeaderMap, body: String| async move {
                    capture(&c, "/v1/checkout/sessions", &headers, &body);
                    axum::Json(json!({
                        "id": "cs_test_a1",
                        "payment_status": "unpaid",
                        "metadata": {"course_id": course_id.to_string()},
                    }))
                },
            ),
        )
        .route(
            "/v1/checkout/sessions/{id}",
            get(move |Path(id): Path<String>| async move {
                axum::Json(json!({
                    "id": id,
                    "payment_status": "paid",
                    "metadata": {"course_id": course_id.to_string()},
                }))
            }),
        )
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = StripeClient::new(
        build_http_client(5).unwrap(),
        "sk_test_123".to_owned(),
        StripeUrls {
            api: format!("http://{addr}"),
            redirect: "http://localhost:3000/stripe/callback".to_owned(),
            success: "http://localhost:3000/stripe/success".to_owned(),
            cancel: "http://localhost:3000/stripe/cancel".to_owned(),
        },
    );
    (client, captured)
}

#[tokio::test]
async fn should_create_express_account_and_onboarding_link() {
    let (stripe, captured) = fake_stripe(CourseId::new()).await;

    let account_id = stripe.create_account("ana@x.com").await.unwrap();
    let link = stripe.create_account_link(&account_id).await.unwrap();

    assert_eq!(account_id, "acct_new");
    assert_eq!(link, "https://connect.stripe.test/setup/acct_new");

    let captured = captured.lock().unwrap();
    let (_, auth, content_type, form) = &captured[0];
    assert_eq!(auth, "Bearer sk_test_123");
    assert_eq!(content_type, "application/x-www-form-urlencoded");
    assert_eq!(form["type"], "express");
    assert_eq!(form["email"], "ana@x.com");

    let (path, _, _, form) = &captured[1];
    assert_eq!(path, "/v1/account_links");
    assert_eq!(form["account"], "acct_new");
    assert_eq!(form["type"], "account_onboarding");
    assert_eq!(form["refresh_url"], "http://localhost:3000/stripe/callback");
    assert_eq!(form["return_url"], "http://localhost:3000/stripe/callback");
}

#[tokio::test]
async fn should_send_checkout_with_fee_and_destination() {
    let course_id = CourseId::new();
    let (stripe, captured) = fake_stripe(course_id).await;

    let session = stripe
        .create_checkout(&CheckoutRequest {
            course_id,
            course_title: "Intro to Rust".to_owned(),
            amount_cents: 10_000,
            fee_cents: 3_000,
            destination_account: "acct_instructor".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(session.id, "cs_test_a1");
    assert_eq!(session.payment_status, PaymentStatus::Unpaid);
    assert_eq!(session.course_id, Some(course_id));

    let captured = captured.lock().unwrap();
    let (_, _, _, form) = &captured[0];
    assert_eq!(form["mode"], "payment");
    assert_eq!(form["payment_intent_data[application_fee_amount]"], "3000");
    assert_eq!(
        form["payment_intent_data[transfer_data][destination]"],
        "acct_instructor"
    );
    assert_eq!(form["metadata[course_id]"], course_id.to_string());
    assert_eq!(
        form["success_url"],
        format!("http://localhost:3000/stripe/success/{course_id}")
    );
    assert_eq!(form["cancel_url"], "http://localhost:3000/stripe/cancel");
    let amount = form
        .iter()
        .find(|(k, _)| k.ends_with("[price_data][unit_amount]"))
        .map(|(_, v)| v.as_str());
    assert_eq!(amount, Some("10000"));
    let name = form
        .iter()
        .find(|(k, _)| k.ends_with("[price_data][product_data][name]"))
        .map(|(_, v)| v.as_str());
    assert_eq!(name, Some("Intro to Rust"));
}

#[tokio::test]
async fn should_read_paid_session() {
    let course_id = CourseId::new();
    let (stripe, _) = fake_stripe(course_id).await;

    let session = stripe.retrieve_checkout("cs_test_a1").await.unwrap();
    assert_eq!(session.id, "cs_test_a1");
    assert_eq!(session.payment_status, PaymentStatus::Paid);
    assert_eq!(session.course_id, Some(course_id));
}

#[tokio::test]
async fn should_map_account_lookup_and_api_errors() {
    let (stripe, _) = fake_stripe(CourseId::new()).await;

    let account = stripe.retrieve_account("acct_ok").await.unwrap();
    assert_eq!(account.id, "acct_ok");
    assert!(account.charges_enabled);
    assert_eq!(account.raw["charges_enabled"], true);

    let err = stripe.retrieve_account("acct_missing").await.unwrap_err();
    assert!(matches!(err, MarketplaceError::Upstream(_)));
}
