//! Authenticated HTTP transport.
//!
//! Obtains a bearer token, attaches it with the fixed headers the API
//! expects, sends the request, and classifies the response: `200` decodes
//! into the caller's type, any other status decodes into a provider error.
//! Nothing is retried.

use crate::config::{ClientConfig, TokenPolicy};
use crate::errors::{MpesaError, Result};
use crate::types::{BearerToken, ProviderErrorBody};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Path of the OAuth token endpoint, relative to the API root.
pub const TOKEN_PATH: &str = "oauth/v1/generate?grant_type=client_credentials";

/// A cached token is dropped this long before the provider says it expires.
pub const TOKEN_EXPIRY_SKEW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// HTTP transport bound to one API root and one set of app credentials.
///
/// Cheap to clone; clones share the connection pool and token cache.
#[derive(Clone)]
pub struct Transport {
    http: Client,
    base_url: String,
    app_key: String,
    app_secret: String,
    policy: TokenPolicy,
    cache: Arc<RwLock<Option<CachedToken>>>,
}

impl Transport {
    /// Builds the HTTP client (TLS verification on, one overall timeout per
    /// call, bounded idle pool) for a validated configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(config.max_idle_connections())
            .build()
            .map_err(|e| MpesaError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            app_key: config.app_key().to_string(),
            app_secret: config.app_secret().to_string(),
            policy: config.token_policy(),
            cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Sends requests to a different API root, e.g. a mock server or an
    /// egress proxy. The root is not checked against the provider URLs.
    #[doc(hidden)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// The API root requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Requests a new token from the OAuth endpoint.
    pub async fn fetch_token(&self) -> Result<BearerToken> {
        let url = self.build_url(TOKEN_PATH);
        debug!(url = %url, "fetching bearer token");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.app_key, Some(&self.app_secret))
            .send()
            .await?;

        classify(response).await
    }

    /// Returns a token usable for the next call, per the token policy.
    pub async fn token(&self) -> Result<String> {
        if self.policy == TokenPolicy::FetchEveryCall {
            return Ok(self.fetch_token().await?.access_token);
        }

        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.is_valid() {
                debug!("using cached bearer token");
                return Ok(cached.access_token.clone());
            }
        }

        let token = self.fetch_token().await?;
        let lifetime = token
            .expiry_seconds()
            .map(Duration::from_secs)
            .and_then(|d| d.checked_sub(TOKEN_EXPIRY_SKEW))
            .filter(|d| !d.is_zero());

        let mut cache = self.cache.write().await;
        *cache = lifetime
            .and_then(|lifetime| Instant::now().checked_add(lifetime))
            .map(|expires_at| CachedToken {
                access_token: token.access_token.clone(),
                expires_at,
            });
        Ok(token.access_token)
    }

    /// Drops any cached token.
    pub async fn invalidate_token(&self) {
        *self.cache.write().await = None;
    }

    /// POSTs a serialized JSON body to `path` with a bearer token.
    pub async fn post<R: DeserializeOwned>(&self, path: &str, body: Vec<u8>) -> Result<R> {
        let token = self.token().await?;
        let url = self.build_url(path);
        debug!(url = %url, "sending request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .body(body)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
        }

        classify(response).await
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("app_key", &self.app_key)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Decodes a 200 body into `R`, anything else into [`MpesaError::Provider`].
pub async fn classify<R: DeserializeOwned>(response: Response) -> Result<R> {
    let status = response.status();
    let body = response.bytes().await?;
    debug!(status = status.as_u16(), "classifying response");

    if status == StatusCode::OK {
        return serde_json::from_slice(&body).map_err(|source| MpesaError::Decode {
            status: status.as_u16(),
            source,
        });
    }

    let error: ProviderErrorBody =
        serde_json::from_slice(&body).map_err(|source| MpesaError::Decode {
            status: status.as_u16(),
            source,
        })?;

    Err(MpesaError::Provider {
        request_id: error.request_id,
        code: error.error_code,
        message: error.error_message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseEnvelope;

    // base64("key:secret")
    const BASIC: &str = "Basic a2V5OnNlY3JldA==";

    async fn transport(server: &mockito::Server, policy: TokenPolicy) -> Transport {
        let config = ClientConfig::builder("key", "secret")
            .with_token_policy(policy)
            .build()
            .unwrap();
        Transport::new(&config).unwrap().with_base_url(server.url())
    }

    async fn mock_token(
        server: &mut mockito::Server,
        expires_in: &str,
        hits: usize,
    ) -> mockito::Mock {
        server
            .mock("GET", "/oauth/v1/generate")
            .match_query(mockito::Matcher::UrlEncoded(
                "grant_type".into(),
                "client_credentials".into(),
            ))
            .match_header("authorization", BASIC)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"access_token":"tok","expires_in":"{}"}}"#,
                expires_in
            ))
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_success_decodes() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server, "3599", 1).await;
        let call = server
            .mock("POST", "/mpesa/b2c/v1/paymentrequest")
            .match_header("authorization", "Bearer tok")
            .match_header("content-type", "application/json")
            .match_header("cache-control", "no-cache")
            .with_status(200)
            .with_body(r#"{"ConversationID":"AG_1","OriginatorConversationID":"1","ResponseCode":"0","ResponseDescription":"Accept the service request successfully."}"#)
            .create_async()
            .await;

        let transport = transport(&server, TokenPolicy::FetchEveryCall).await;
        let response: ResponseEnvelope = transport
            .post("mpesa/b2c/v1/paymentrequest", b"{}".to_vec())
            .await
            .unwrap();

        assert_eq!(response.response_code, "0");
        assert_eq!(response.conversation_id, "AG_1");
        token.assert_async().await;
        call.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_surfaces_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token(&mut server, "3599", 1).await;
        let _call = server
            .mock("POST", "/mpesa/b2c/v1/paymentrequest")
            .with_status(500)
            .with_body(r#"{"requestId":"r1","errorCode":"400.002.02","errorMessage":"bad"}"#)
            .create_async()
            .await;

        let transport = transport(&server, TokenPolicy::FetchEveryCall).await;
        let err = transport
            .post::<ResponseEnvelope>("mpesa/b2c/v1/paymentrequest", b"{}".to_vec())
            .await
            .unwrap_err();

        match err {
            MpesaError::Provider {
                request_id,
                code,
                message,
            } => {
                assert_eq!(request_id, "r1");
                assert_eq!(code, "400.002.02");
                assert_eq!(message, "bad");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_decode_errors() {
        let mut server = mockito::Server::new_async().await;
        let _token = mock_token(&mut server, "3599", 2).await;
        let _ok = server
            .mock("POST", "/ok")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;
        let _err = server
            .mock("POST", "/err")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let transport = transport(&server, TokenPolicy::FetchEveryCall).await;
        let err = transport
            .post::<ResponseEnvelope>("ok", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MpesaError::Decode { status: 200, .. }));

        let err = transport
            .post::<ResponseEnvelope>("err", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MpesaError::Decode { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_token_error_stops_the_call() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("GET", "/oauth/v1/generate")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"requestId":"","errorCode":"400.008.01","errorMessage":"Invalid Authentication passed"}"#)
            .create_async()
            .await;
        let call = server
            .mock("POST", "/mpesa/b2c/v1/paymentrequest")
            .expect(0)
            .create_async()
            .await;

        let transport = transport(&server, TokenPolicy::FetchEveryCall).await;
        let err = transport
            .post::<ResponseEnvelope>("mpesa/b2c/v1/paymentrequest", Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MpesaError::Provider { ref code, .. } if code == "400.008.01"));
        call.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_every_call() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server, "3599", 2).await;

        let transport = transport(&server, TokenPolicy::FetchEveryCall).await;
        assert_eq!(transport.token().await.unwrap(), "tok");
        assert_eq!(transport.token().await.unwrap(), "tok");
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_cache_until_expiry() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server, "3599", 1).await;

        let transport = transport(&server, TokenPolicy::CacheUntilExpiry).await;
        assert_eq!(transport.token().await.unwrap(), "tok");
        assert_eq!(transport.clone().token().await.unwrap(), "tok");
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_short_lived_token_is_not_cached() {
        let mut server = mockito::Server::new_async().await;
        // shorter than the expiry skew
        let token = mock_token(&mut server, "30", 2).await;

        let transport = transport(&server, TokenPolicy::CacheUntilExpiry).await;
        transport.token().await.unwrap();
        transport.token().await.unwrap();
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_unrepresentable_expiry_is_not_cached() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server, "18446744073709551615", 2).await;

        let transport = transport(&server, TokenPolicy::CacheUntilExpiry).await;
        assert_eq!(transport.token().await.unwrap(), "tok");
        assert_eq!(transport.token().await.unwrap(), "tok");
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_clears_cache() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server, "3599", 2).await;
        let _call = server
            .mock("POST", "/mpesa/accountbalance/v1/query")
            .with_status(401)
            .with_body(r#"{"requestId":"r2","errorCode":"404.001.03","errorMessage":"Invalid Access Token"}"#)
            .create_async()
            .await;

        let transport = transport(&server, TokenPolicy::CacheUntilExpiry).await;
        let err = transport
            .post::<ResponseEnvelope>("mpesa/accountbalance/v1/query", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MpesaError::Provider { .. }));

        // the next call must fetch again
        transport.token().await.unwrap();
        token.assert_async().await;
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = ClientConfig::builder("key", "very-secret").build().unwrap();
        let transport = Transport::new(&config).unwrap();
        assert!(!format!("{:?}", transport).contains("very-secret"));
    }
}
