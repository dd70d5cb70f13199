use anyhow::Context as _;
use chrono::Utc;
use serde::Serialize;
use url::Url;

use crate::domain::repository::Mailer;
use crate::domain::types::EmailMessage;
use crate::error::MarketplaceError;
use crate::infra::http::read_success;
use crate::infra::sigv4::{self, AwsCredentials};

const SEND_EMAIL_PATH: &str = "/v2/email/outbound-emails";
const CHARSET: &str = "UTF-8";

/// SES v2 `SendEmail` client.
#[derive(Clone)]
pub struct SesMailer {
    client: reqwest::Client,
    credentials: AwsCredentials,
    endpoint: String,
    from: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from_email_address: &'a str,
    destination: Destination<'a>,
    content: Content<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Destination<'a> {
    to_addresses: [&'a str; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Content<'a> {
    simple: Simple<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Simple<'a> {
    subject: Part<'a>,
    body: Body<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Body<'a> {
    html: Part<'a>,
    text: Part<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Part<'a> {
    data: &'a str,
    charset: &'static str,
}

fn part(data: &str) -> Part<'_> {
    Part {
        data,
        charset: CHARSET,
    }
}

impl SesMailer {
    pub fn new(
        client: reqwest::Client,
        credentials: AwsCredentials,
        endpoint: Option<String>,
        from: String,
    ) -> Self {
        let endpoint = endpoint
            .unwrap_or_else(|| format!("https://email.{}.amazonaws.com", credentials.region));
        Self {
            client,
            credentials,
            endpoint,
            from,
        }
    }

    fn payload(&self, message: &EmailMessage) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&SendEmailRequest {
            from_email_address: &self.from,
            destination: Destination {
                to_addresses: [message.to.as_str()],
            },
            content: Content {
                simple: Simple {
                    subject: part(&message.subject),
                    body: Body {
                        html: part(&message.html),
                        text: part(&message.text),
                    },
                },
            },
        })
    }
}

impl Mailer for SesMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MarketplaceError> {
        let url = Url::parse(&format!(
            "{}{SEND_EMAIL_PATH}",
            self.endpoint.trim_end_matches('/')
        ))
        .context("build ses url")?;
        let payload = self.payload(message).context("encode email")?;
        let content_type = "application/json";
        let signed = sigv4::sign(
            &self.credentials,
            "ses",
            "POST",
            &url,
            Some(content_type),
            &payload,
            Utc::now(),
        )?;

        let response = self
            .client
            .post(url)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .header(reqwest::header::AUTHORIZATION, signed.authorization)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(payload)
            .send()
            .await
            .map_err(|e| MarketplaceError::upstream(e, "ses send email"))?;
        read_success(response, "ses send email").await?;
        tracing::info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}
