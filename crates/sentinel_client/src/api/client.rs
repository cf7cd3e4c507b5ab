use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use http::Extensions;
use log::{debug, error, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, Proxy, Request, Response, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{ClientError, Result};

/// In-memory bearer token shared by the HTTP middleware and the session manager.
#[derive(Debug, Clone, Default)]
pub struct TokenSlot {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }

    pub async fn set(&self, token: impl Into<String>) {
        *self.inner.write().await = Some(token.into());
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    pub async fn is_set(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

/// Attaches `Authorization: Bearer <token>` whenever the slot holds a token.
#[derive(Debug, Clone)]
struct BearerAuth {
    token: TokenSlot,
}

#[async_trait]
impl Middleware for BearerAuth {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if let Some(token) = self.token.get().await {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(reqwest_middleware::Error::middleware)?;
            req.headers_mut().insert(AUTHORIZATION, value);
        }
        next.run(req, extensions).await
    }
}

/// Shared HTTP client for every backend call.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Arc<ClientWithMiddleware>,
    base_url: Url,
    token: TokenSlot,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_token_slot(config, TokenSlot::new())
    }

    pub fn with_token_slot(config: &Config, token: TokenSlot) -> Result<Self> {
        let base_url = Url::parse(config.api_base.trim_end_matches('/'))
            .map_err(|e| ClientError::Config(format!("invalid api_base {:?}: {e}", config.api_base)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "api_base {:?} cannot be used as a base URL",
                config.api_base
            )));
        }

        let client = Self::build_http_client(config)?;
        let client = ClientBuilder::new(client)
            .with(BearerAuth {
                token: token.clone(),
            })
            .build();

        Ok(Self {
            client: Arc::new(client),
            base_url,
            token,
        })
    }

    fn build_http_client(config: &Config) -> Result<Client> {
        let mut builder = Client::builder()
            .default_headers(Self::default_headers())
            .timeout(config.request_timeout());
        if !config.http_proxy.is_empty() {
            let proxy = Proxy::http(&config.http_proxy)
                .map_err(|e| ClientError::Config(format!("invalid http_proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        if !config.https_proxy.is_empty() {
            let proxy = Proxy::https(&config.https_proxy)
                .map_err(|e| ClientError::Config(format!("invalid https_proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        builder
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("sentinel-client/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }

    pub fn token_slot(&self) -> &TokenSlot {
        &self.token
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config("api_base cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Sends the request and maps non-2xx statuses onto [`ClientError`].
    pub(crate) async fn execute(&self, method: Method, url: Url, builder: RequestBuilder) -> Result<Response> {
        debug!("Sending {} request to {}", method, url);
        let start_time = Instant::now();

        let response = builder.send().await.map_err(|e| {
            error!("Failed HTTP request to {}: {}", url, e);
            ClientError::from(e)
        })?;

        let status = response.status();
        info!("{} {} -> {} in {:?}", method, url.path(), status, start_time.elapsed());
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let err = ClientError::from_status(status, &body);
        warn!("{} {} failed: {}", method, url.path(), err);
        Err(err)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice::<T>(&body)?)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.get_json_with_query(segments, &[]).await
    }

    pub(crate) async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        let mut builder = self.request(Method::GET, url.clone());
        if !params.is_empty() {
            builder = builder.query(params);
        }
        let response = self.execute(Method::GET, url, builder).await?;
        Self::decode(response).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send_with_body(method, segments, body).await?;
        Self::decode(response).await
    }

    /// Sends a JSON body and discards whatever the backend answers with.
    pub(crate) async fn send_unit<B>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let mut builder = self.request(method.clone(), url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(method, url, builder).await?;
        Ok(())
    }

    pub(crate) async fn post_for_bytes<B>(&self, segments: &[&str], body: &B) -> Result<Bytes>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send_with_body(Method::POST, segments, body).await?;
        Ok(response.bytes().await?)
    }

    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        let builder = self.request(Method::POST, url.clone()).form(form);
        let response = self.execute(Method::POST, url, builder).await?;
        Self::decode(response).await
    }

    async fn send_with_body<B>(&self, method: Method, segments: &[&str], body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let builder = self.request(method.clone(), url.clone()).json(body);
        self.execute(method, url, builder).await
    }
}
