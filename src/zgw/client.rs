use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ZgwConfig;
use crate::errors::{GatewayError, Result};
use crate::zgw::model::{TranslationRequest, TranslationResult, ZgwOperation};

/// Synchronous (single-pass, no retry) call against the target protocol.
/// Retry and backoff, when wanted, belong to the deployment in front of the
/// ZGW registry, not to this client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZgwClient: Send + Sync {
    async fn invoke(&self, request: &TranslationRequest) -> Result<TranslationResult>;
}

/// reqwest-backed client. Transport failures and server faults (5xx) raise;
/// well-formed error responses (4xx) flow back as data for the converter to
/// encode.
pub struct HttpZgwClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpZgwClient {
    pub fn new(config: &ZgwConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Configuration(format!("ZGW client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl ZgwClient for HttpZgwClient {
    async fn invoke(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let url = format!("{}/{}", self.base_url, request.resource);
        let method = match request.operation {
            ZgwOperation::Generate | ZgwOperation::Create => Method::POST,
            ZgwOperation::Retrieve => Method::GET,
        };

        debug!(
            referentienummer = %request.referentienummer,
            %method,
            %url,
            "invoking ZGW"
        );

        let mut builder = self
            .http
            .request(method, &url)
            .header("X-Request-Id", &request.referentienummer)
            .header("Accept-Crs", "EPSG:4326");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(payload) = &request.payload {
            builder = builder.json(payload);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if status >= 500 {
            warn!(referentienummer = %request.referentienummer, status, "ZGW server fault");
            return Err(GatewayError::Downstream(format!(
                "ZGW returned {} for {}",
                status, request.resource
            )));
        }

        Ok(TranslationResult { status, body })
    }
}
