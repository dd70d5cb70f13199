use anyhow::Context as _;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::domain::repository::ObjectStore;
use crate::domain::types::StoredObject;
use crate::error::MarketplaceError;
use crate::infra::http::read_success;
use crate::infra::sigv4::{self, AwsCredentials};

/// S3 REST client for one bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: reqwest::Client,
    credentials: AwsCredentials,
    bucket: String,
    /// Path-style base (`{endpoint}/{bucket}/{key}`); virtual-host AWS URLs when unset.
    endpoint: Option<String>,
}

impl S3ObjectStore {
    pub fn new(
        client: reqwest::Client,
        credentials: AwsCredentials,
        bucket: String,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            bucket,
            endpoint,
        }
    }

    pub fn object_url(&self, key: &str) -> Result<Url, url::ParseError> {
        match &self.endpoint {
            Some(endpoint) => Url::parse(&format!(
                "{}/{}/{key}",
                endpoint.trim_end_matches('/'),
                self.bucket
            )),
            None => Url::parse(&format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                self.bucket, self.credentials.region
            )),
        }
    }

    async fn send(
        &self,
        method: reqwest::Method,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
        context: &'static str,
    ) -> Result<Url, MarketplaceError> {
        let url = self
            .object_url(key)
            .context("build object url")?;
        let signed = sigv4::sign(
            &self.credentials,
            "s3",
            method.as_str(),
            &url,
            content_type,
            &body,
            Utc::now(),
        )?;

        let mut request = self
            .client
            .request(method, url.clone())
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .header(reqwest::header::AUTHORIZATION, signed.authorization);
        if let Some(ct) = content_type {
            request = request.header(CONTENT_TYPE, ct);
        }
        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| MarketplaceError::upstream(e, context))?;
        read_success(response, context).await?;
        Ok(url)
    }
}

impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, MarketplaceError> {
        let url = self
            .send(
                reqwest::Method::PUT,
                key,
                body,
                Some(content_type),
                "s3 put object",
            )
            .await?;
        tracing::debug!(bucket = %self.bucket, key, "object stored");
        Ok(StoredObject {
            bucket: self.bucket.clone(),
            key: key.to_owned(),
            url: url.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), MarketplaceError> {
        self.send(
            reqwest::Method::DELETE,
            key,
            Bytes::new(),
            None,
            "s3 delete object",
        )
        .await?;
        tracing::debug!(bucket = %self.bucket, key, "object deleted");
        Ok(())
    }
}
