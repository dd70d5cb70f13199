//! Stripe REST adapter: connected accounts and hosted checkout.
//!
//! Request bodies are form-encoded with bracket notation
//! (`line_items[0][price_data][currency]=usd`) via `serde_qs`.

use std::collections::HashMap;

use anyhow::Context as _;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::domain::repository::PaymentGateway;
use crate::domain::types::{CheckoutRequest, CheckoutSession, PaymentAccount, PaymentStatus};
use crate::error::MarketplaceError;
use crate::infra::http::read_json;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const CURRENCY: &str = "usd";

#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    secret: String,
    api_url: String,
    redirect_url: String,
    success_url: String,
    cancel_url: String,
}

pub struct StripeUrls {
    pub api: String,
    /// Onboarding refresh and return URL.
    pub redirect: String,
    pub success: String,
    pub cancel: String,
}

// ── Request forms ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CreateAccountForm<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    email: &'a str,
}

#[derive(Serialize)]
struct AccountLinkForm<'a> {
    account: &'a str,
    refresh_url: &'a str,
    return_url: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct CheckoutForm<'a> {
    mode: &'static str,
    line_items: Vec<LineItem<'a>>,
    payment_intent_data: PaymentIntentData<'a>,
    metadata: CheckoutMetadata,
    success_url: String,
    cancel_url: &'a str,
}

#[derive(Serialize)]
struct LineItem<'a> {
    price_data: PriceData<'a>,
    quantity: u32,
}

#[derive(Serialize)]
struct PriceData<'a> {
    currency: &'static str,
    unit_amount: i64,
    product_data: ProductData<'a>,
}

#[derive(Serialize)]
struct ProductData<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct PaymentIntentData<'a> {
    application_fee_amount: i64,
    transfer_data: TransferData<'a>,
}

#[derive(Serialize)]
struct TransferData<'a> {
    destination: &'a str,
}

#[derive(Serialize)]
struct CheckoutMetadata {
    course_id: String,
}

// ── Responses ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct UrlResponse {
    url: String,
}

#[derive(Deserialize)]
struct CheckoutSessionResponse {
    id: String,
    payment_status: PaymentStatus,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl From<CheckoutSessionResponse> for CheckoutSession {
    fn from(r: CheckoutSessionResponse) -> Self {
        let course_id = r.metadata.get("course_id").and_then(|id| id.parse().ok());
        CheckoutSession {
            id: r.id,
            payment_status: r.payment_status,
            course_id,
        }
    }
}

fn account_from_json(raw: serde_json::Value) -> Result<PaymentAccount, MarketplaceError> {
    let id = raw
        .get("id")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            MarketplaceError::upstream(anyhow::anyhow!("account has no id"), "stripe account")
        })?;
    let charges_enabled = raw
        .get("charges_enabled")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    Ok(PaymentAccount {
        id,
        charges_enabled,
        raw,
    })
}

impl StripeClient {
    pub fn new(client: reqwest::Client, secret: String, urls: StripeUrls) -> Self {
        Self {
            client,
            secret,
            api_url: urls.api.trim_end_matches('/').to_owned(),
            redirect_url: urls.redirect,
            success_url: urls.success.trim_end_matches('/').to_owned(),
            cancel_url: urls.cancel,
        }
    }

    fn checkout_form<'a>(&'a self, request: &'a CheckoutRequest) -> CheckoutForm<'a> {
        CheckoutForm {
            mode: "payment",
            line_items: vec![LineItem {
                price_data: PriceData {
                    currency: CURRENCY,
                    unit_amount: request.amount_cents,
                    product_data: ProductData {
                        name: &request.course_title,
                    },
                },
                quantity: 1,
            }],
            payment_intent_data: PaymentIntentData {
                application_fee_amount: request.fee_cents,
                transfer_data: TransferData {
                    destination: &request.destination_account,
                },
            },
            metadata: CheckoutMetadata {
                course_id: request.course_id.to_string(),
            },
            success_url: format!("{}/{}", self.success_url, request.course_id),
            cancel_url: &self.cancel_url,
        }
    }

    async fn post_form<F: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &F,
        context: &'static str,
    ) -> Result<T, MarketplaceError> {
        let body = serde_qs::to_string(form).context("encode stripe form")?;
        let response = self
            .client
            .post(format!("{}{path}", self.api_url))
            .bearer_auth(&self.secret)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| MarketplaceError::upstream(e, context))?;
        read_json(response, context).await
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        context: &'static str,
    ) -> Result<T, MarketplaceError> {
        let response = self
            .client
            .get(format!("{}{path}", self.api_url))
            .bearer_auth(&self.secret)
            .send()
            .await
            .map_err(|e| MarketplaceError::upstream(e, context))?;
        read_json(response, context).await
    }
}

impl PaymentGateway for StripeClient {
    async fn create_account(&self, email: &str) -> Result<String, MarketplaceError> {
        let form = CreateAccountForm {
            kind: "express",
            email,
        };
        let account: IdResponse = self
            .post_form("/v1/accounts", &form, "stripe create account")
            .await?;
        Ok(account.id)
    }

    async fn create_account_link(&self, account_id: &str) -> Result<String, MarketplaceError> {
        let form = AccountLinkForm {
            account: account_id,
            refresh_url: &self.redirect_url,
            return_url: &self.redirect_url,
            kind: "account_onboarding",
        };
        let link: UrlResponse = self
            .post_form("/v1/account_links", &form, "stripe create account link")
            .await?;
        Ok(link.url)
    }

    async fn retrieve_account(&self, account_id: &str) -> Result<PaymentAccount, MarketplaceError> {
        let raw: serde_json::Value = self
            .get(&format!("/v1/accounts/{account_id}"), "stripe retrieve account")
            .await?;
        account_from_json(raw)
    }

    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, MarketplaceError> {
        let session: CheckoutSessionResponse = self
            .post_form(
                "/v1/checkout/sessions",
                &self.checkout_form(request),
                "stripe create checkout",
            )
            .await?;
        Ok(session.into())
    }

    async fn retrieve_checkout(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, MarketplaceError> {
        let session: CheckoutSessionResponse = self
            .get(
                &format!("/v1/checkout/sessions/{session_id}"),
                "stripe retrieve checkout",
            )
            .await?;
        Ok(session.into())
    }
}
