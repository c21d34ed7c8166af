//! HTTP transport shared by every resource endpoint.

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::Credentials;
use crate::config::Config;
use crate::errors::{ApiError, SESSION_EXPIRED};
use crate::models::{RefreshRequest, TokenPair};

/// Query string pairs appended to a request.
pub type QueryParams<'a> = [(&'a str, String)];

const NO_BODY: Option<&()> = None;

/// Typed client for the membership REST backend.
///
/// Clones share the connection pool and the credential store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| {
            ApiError::Config(format!("Invalid API base URL {:?}: {}", base_url, e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            credentials: Credentials::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams<'_>,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, query, NO_BODY).await
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams<'_>,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, query, Some(body)).await
    }

    pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self.request(Method::DELETE, path, &[], NO_BODY).await?;
        Ok(())
    }

    /// Send an authenticated request, refreshing the session and retrying once on 401.
    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams<'_>,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let sent_with = self.credentials.access_token();
        let response = self
            .dispatch(method.clone(), path, query, body, true)
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        self.reauthenticate(sent_with.as_deref()).await?;

        tracing::debug!("Retrying {} {} after reauthentication", method, path);
        let retried = self.dispatch(method, path, query, body, true).await?;
        decode(retried).await
    }

    /// Send an unauthenticated request; 401 responses are returned as errors untouched.
    pub(crate) async fn post_anonymous<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .dispatch(Method::POST, path, &[], Some(body), false)
            .await?;
        decode(response).await
    }

    async fn dispatch<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams<'_>,
        body: Option<&B>,
        authorize: bool,
    ) -> Result<Response, ApiError> {
        let mut builder = self.http.request(method.clone(), self.url(path));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if authorize {
            if let Some(header) = self.credentials.authorization_header() {
                builder = builder.header(AUTHORIZATION, header);
            }
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        tracing::debug!("{} {} -> {}", method, path, response.status());
        Ok(response)
    }

    /// Renew the access token after a 401.
    ///
    /// `sent_with` is the token the rejected request carried. When another caller
    /// has already rotated it, the refresh is skipped and the caller just retries.
    async fn reauthenticate(&self, sent_with: Option<&str>) -> Result<(), ApiError> {
        let _gate = self.credentials.lock_refresh().await;

        let current = self.credentials.access_token();
        if current.is_some() && current.as_deref() != sent_with {
            tracing::debug!("Access token already rotated by a concurrent refresh");
            return Ok(());
        }

        let Some(refresh_token) = self.credentials.refresh_token() else {
            tracing::warn!("Received 401 without a refresh token, clearing credentials");
            self.credentials.clear();
            return Err(ApiError::Unauthorized(SESSION_EXPIRED.to_string()));
        };

        let request = RefreshRequest { refresh_token };
        match self
            .post_anonymous::<_, TokenPair>("/auth/refresh", &request)
            .await
        {
            Ok(tokens) => {
                self.credentials.store(tokens);
                tracing::info!("Access token refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Token refresh failed, clearing credentials: {}", e);
                self.credentials.clear();
                Err(ApiError::Unauthorized(SESSION_EXPIRED.to_string()))
            }
        }
    }
}

/// Decode a response body, mapping non-success statuses onto [`ApiError`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let error = ApiError::from_response(status.as_u16(), &body);
        tracing::debug!("Request failed: {}", error);
        return Err(error);
    }

    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    Ok(serde_json::from_str(body)?)
}
