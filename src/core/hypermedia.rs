use crate::core::uri_template;
use crate::domain::model::{RelRequest, Resource, Schema};
use crate::domain::ports::{ConfigProvider, Navigator};
use crate::utils::error::{FunctionsError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// 從 `Content-Type` 取出 `profile` 參數
pub fn parse_profile(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("profile"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// 跟隨 JSON hyper-schema links 的 HTTP 客戶端
pub struct HypermediaClient {
    client: Client,
    timeout: Duration,
    retry_attempts: u32,
    retry_delay: Duration,
    headers: HashMap<String, String>,
    schema_cache: Mutex<HashMap<String, Schema>>,
}

struct RawResponse {
    url: String,
    content_type: Option<String>,
    data: serde_json::Value,
}

impl HypermediaClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(30),
            retry_attempts: 0,
            retry_delay: Duration::from_secs(1),
            headers: HashMap::new(),
            schema_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self::new()
            .with_timeout(Duration::from_secs(config.timeout_seconds()))
            .with_retry(
                config.retry_attempts(),
                Duration::from_secs(config.retry_delay_seconds()),
            )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// `retryable` 為 false 時只送一次（run / runDefine 不能重送）
    async fn send_with_retry(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&serde_json::Value>,
        retryable: bool,
    ) -> Result<RawResponse> {
        let max_retries = if retryable { self.retry_attempts } else { 0 };
        let mut attempt = 0;
        loop {
            match self.send_once(method, url, body).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "⚠️ {} {} failed ({}), retry {}/{} in {:?}",
                        method,
                        url,
                        e,
                        attempt,
                        self.retry_attempts,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&serde_json::Value>,
    ) -> Result<RawResponse> {
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json")
            .timeout(self.timeout);

        // 添加自定義標頭
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!("📡 {} {}", method, url);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("📡 Response status: {}", status);

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let final_url = response.url().to_string();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(FunctionsError::HttpStatus {
                status: status.as_u16(),
                url: final_url,
                message: error_message(&text),
            });
        }

        Ok(RawResponse {
            url: final_url,
            content_type,
            data: parse_body(&text),
        })
    }

    async fn schema(&self, profile_url: &str) -> Result<Schema> {
        if let Some(schema) = self.schema_cache.lock().await.get(profile_url) {
            return Ok(schema.clone());
        }

        let url = Url::parse(profile_url)?;
        let raw = self.send_with_retry(&Method::GET, &url, None, true).await?;
        let schema: Schema =
            serde_json::from_value(raw.data).map_err(|e| FunctionsError::SchemaError {
                url: profile_url.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            "📐 Loaded schema {} with relations {:?}",
            profile_url,
            schema.relations()
        );
        self.schema_cache
            .lock()
            .await
            .insert(profile_url.to_string(), schema.clone());
        Ok(schema)
    }

    async fn into_resource(&self, raw: RawResponse) -> Result<Resource> {
        let schema = match raw.content_type.as_deref().and_then(parse_profile) {
            Some(profile) => {
                let profile_url = Url::parse(&raw.url)?.join(&profile)?;
                Some(self.schema(profile_url.as_str()).await?)
            }
            None => None,
        };

        Ok(Resource {
            url: raw.url,
            data: raw.data,
            schema,
        })
    }
}

impl Default for HypermediaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Navigator for HypermediaClient {
    async fn resource(&self, url: &str) -> Result<Resource> {
        let url = Url::parse(url)?;
        let raw = self.send_with_retry(&Method::GET, &url, None, true).await?;
        self.into_resource(raw).await
    }

    async fn rel(&self, resource: &Resource, rel: &str, request: RelRequest) -> Result<Resource> {
        let link = resource
            .link(rel)
            .ok_or_else(|| FunctionsError::RelationNotFound {
                rel: rel.to_string(),
                url: resource.url.clone(),
            })?;

        let method = Method::from_bytes(link.method.to_uppercase().as_bytes()).map_err(|_| {
            FunctionsError::SchemaError {
                url: resource.url.clone(),
                message: format!("Link '{}' has invalid method '{}'", rel, link.method),
            }
        })?;

        let url = uri_template::resolve(&resource.url, &link.href, &request.params, |name| {
            resource.template_value(name)
        })?;

        let retryable = method == Method::GET || request.idempotent;
        tracing::info!("🔗 Following '{}': {} {}", rel, method, url);
        let raw = self
            .send_with_retry(&method, &url, request.data.as_ref(), retryable)
            .await?;
        self.into_resource(raw).await
    }
}

fn parse_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

/// 服務錯誤通常是 `{"error": "..."}`，否則用原始 body
fn error_message(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| text.trim().to_string())
}
