///! BotMaker API client for fetching WhatsApp message templates
use super::error::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use botmaker_common::RawTemplate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const ACCESS_TOKEN_HEADER: &str = "access-token";

/// Anything that can produce the raw template list.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch_templates(&self) -> std::result::Result<Vec<RawTemplate>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct TemplateEnvelope {
    #[serde(default)]
    items: Option<Vec<RawTemplate>>,
}

/// Parse the `{"items": [...]}` envelope. A missing or null `items` is an empty list.
pub fn parse_envelope(body: &str) -> std::result::Result<Vec<RawTemplate>, FetchError> {
    let envelope: TemplateEnvelope = serde_json::from_str(body)?;
    Ok(envelope.items.unwrap_or_default())
}

/// HTTP client for the templates endpoint.
pub struct ApiClient {
    client: Client,
    url: String,
    access_token: String,
}

impl ApiClient {
    pub fn new(url: impl Into<String>, access_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            access_token: access_token.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TemplateSource for ApiClient {
    async fn fetch_templates(&self) -> std::result::Result<Vec<RawTemplate>, FetchError> {
        tracing::info!("Fetching templates from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let body = response.text().await?;
        let templates = parse_envelope(&body)?;

        tracing::debug!("Fetched {} templates", templates.len());
        Ok(templates)
    }
}
