use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::transport;
use percent_encoding::percent_decode_str;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method, Request};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Executes JSON requests against one backend on behalf of one request
/// context (one token). Holds no mutable state; clones share the
/// connection pool.
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    http: HttpClient,
    auth: Option<HeaderValue>,
    max_response_bytes: usize,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("auth", &self.auth.as_ref().map(|_| "<redacted>"))
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url))
    }

    pub fn new_with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::from_config(&ClientConfig::new(base_url).with_timeout(timeout))
    }

    /// Builds a client with its own session. The timeout bounds both
    /// connection setup and the whole exchange.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(Error::unexpected)?;
        Self::with_session(config, http)
    }

    /// Builds a client on top of an existing session. The session's own
    /// timeout and redirect settings apply; `config.timeout` is ignored.
    pub fn with_session(config: &ClientConfig, http: HttpClient) -> Result<Self> {
        let mut base_url =
            Url::parse(&config.base_url).map_err(|_| Error::invalid_url(&config.base_url))?;
        Self::validate_base_url(&base_url)?;
        Self::normalize_base_url(&mut base_url);
        let auth = config.token.as_deref().map(Self::bearer).transpose()?;
        Ok(Self {
            base_url,
            http,
            auth,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Same backend and session, different credentials.
    pub fn with_token(&self, token: &str) -> Result<Self> {
        Ok(Self {
            auth: Some(Self::bearer(token)?),
            ..self.clone()
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn bearer(token: &str) -> Result<HeaderValue> {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(Error::unexpected)?;
        value.set_sensitive(true);
        Ok(value)
    }

    fn validate_base_url(base_url: &Url) -> Result<()> {
        if base_url.query().is_some() || base_url.fragment().is_some() {
            return Err(Error::invalid_url(base_url.as_str()));
        }
        let host = base_url.host_str().unwrap_or_default();
        if host.is_empty() {
            return Err(Error::invalid_url(base_url.as_str()));
        }
        match base_url.scheme() {
            "https" => Ok(()),
            "http" if Self::is_loopback_host(base_url.host_str()) => Ok(()),
            _ => Err(Error::invalid_url(base_url.as_str())),
        }
    }

    fn is_loopback_host(host: Option<&str>) -> bool {
        match host {
            Some(h) if h.eq_ignore_ascii_case("localhost") => true,
            Some(h) => h
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<IpAddr>()
                .map(|ip| ip.is_loopback())
                .unwrap_or(false),
            None => false,
        }
    }

    fn normalize_base_url(base_url: &mut Url) {
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
    }

    /// Resolves the endpoint's path against the base URL.
    pub fn build_url<E: Endpoint + ?Sized>(&self, endpoint: &E) -> Result<Url> {
        let raw = endpoint.path();
        let path = raw.trim_start_matches('/');
        if path.contains("://") {
            return Err(Error::invalid_url(raw));
        }
        let segments = path.split(['?', '#']).next().unwrap_or_default();
        if segments.split('/').any(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            matches!(decoded.as_ref(), "." | "..")
                || decoded.contains('/')
                || decoded.contains('\\')
        }) {
            return Err(Error::invalid_url(raw));
        }
        // `./` keeps a colon in the first segment from reading as a scheme.
        let url = self
            .base_url
            .join(&format!("./{path}"))
            .map_err(|_| Error::invalid_url(&raw))?;
        if url.origin() != self.base_url.origin() || !url.path().starts_with(self.base_url.path())
        {
            return Err(Error::invalid_url(raw));
        }
        Ok(url)
    }

    /// Assembles the outgoing request. `Authorization` is present only
    /// when the client carries a token.
    pub fn make_request(&self, url: Url, method: Method, body: Option<Vec<u8>>) -> Request {
        let mut request = Request::new(method, url);
        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        if let Some(auth) = &self.auth {
            headers.insert(AUTHORIZATION, auth.clone());
        }
        if let Some(bytes) = body {
            *request.body_mut() = Some(bytes.into());
        }
        request
    }

    fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>> {
        serde_json::to_vec(body).map_err(|err| {
            error!(error = %err, "failed to encode request body");
            Error::EncodingFailed(err)
        })
    }

    async fn read_body_limited(&self, mut res: reqwest::Response) -> Result<Vec<u8>> {
        let limit = self.max_response_bytes;
        if res.content_length().is_some_and(|len| len > limit as u64) {
            return Err(Error::unexpected(format!(
                "response body exceeds {limit} bytes"
            )));
        }
        let mut body = Vec::new();
        while let Some(chunk) = res.chunk().await.map_err(transport::classify)? {
            if body.len() + chunk.len() > limit {
                return Err(Error::unexpected(format!(
                    "response body exceeds {limit} bytes"
                )));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn execute<T, B, E>(&self, method: Method, endpoint: &E, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
        E: Endpoint + ?Sized,
    {
        let url = self.build_url(endpoint)?;
        let body = body.map(Self::encode_body).transpose()?;
        let request = self.make_request(url.clone(), method.clone(), body);

        debug!(
            method = %method,
            url = %url,
            authenticated = self.auth.is_some(),
            "sending request"
        );
        let res = match self.http.execute(request).await {
            Ok(res) => res,
            Err(err) => {
                error!(method = %method, url = %url, error = %err, "request failed");
                return Err(transport::classify(err));
            }
        };

        let status = res.status();
        let bytes = self.read_body_limited(res).await?;
        debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            bytes = bytes.len(),
            "received response"
        );

        if !status.is_success() {
            warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                "non-success status"
            );
            return Err(Error::request_failed(status.as_u16(), bytes));
        }
        serde_json::from_slice::<T>(&bytes).map_err(Error::DecodingFailed)
    }

    pub async fn get<T, E>(&self, endpoint: &E) -> Result<T>
    where
        T: DeserializeOwned,
        E: Endpoint + ?Sized,
    {
        self.execute(Method::GET, endpoint, Option::<&()>::None)
            .await
    }

    pub async fn post<T, B, E>(&self, endpoint: &E, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
        E: Endpoint + ?Sized,
    {
        self.execute(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put<T, B, E>(&self, endpoint: &E, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
        E: Endpoint + ?Sized,
    {
        self.execute(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete<T, E>(&self, endpoint: &E) -> Result<T>
    where
        T: DeserializeOwned,
        E: Endpoint + ?Sized,
    {
        self.execute(Method::DELETE, endpoint, Option::<&()>::None)
            .await
    }

    // The untyped variants decode into `Value`, which accepts any
    // well-formed JSON document.

    pub async fn get_json<E: Endpoint + ?Sized>(&self, endpoint: &E) -> Result<Value> {
        self.get(endpoint).await
    }

    pub async fn post_json<B, E>(&self, endpoint: &E, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
        E: Endpoint + ?Sized,
    {
        self.post(endpoint, body).await
    }

    pub async fn put_json<B, E>(&self, endpoint: &E, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
        E: Endpoint + ?Sized,
    {
        self.put(endpoint, body).await
    }

    pub async fn delete_json<E: Endpoint + ?Sized>(&self, endpoint: &E) -> Result<Value> {
        self.delete(endpoint).await
    }
}
