/**
 * REST API Client
 *
 * HTTP calls against the backend: login, user lookup, signup, password
 * reset, profile, and the recommendations feed.
 *
 * Every request except login and signup is decorated with
 * `Authorization: Bearer <access token>`. The token is read from the
 * token store each time a request is built.
 */

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::client::config::Config;
use crate::client::error::ApiError;
use crate::client::token_store::TokenStore;
use crate::shared::{
    CreateRecommendation, Credentials, ForgotPasswordRequest, LoginRequest, LoginResponse,
    Recommendation, SignupRequest, UserRecord,
};

/// Whether a request carries the stored bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Anonymous,
    Bearer,
}

/// Client for the backend REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Config,
    client: Client,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(config: Config, tokens: TokenStore) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            client,
            tokens,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Token store used for request decoration
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// `POST /auth/login`
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        tracing::info!("[AUTH] Logging in as '{}'", credentials.identifier);
        let request = self
            .request(Method::POST, self.config.api_url("/auth/login"), Auth::Anonymous)
            .json(&LoginRequest::from(credentials));
        let response = send(request).await?;
        decode(response).await
    }

    /// `GET /auth/{id}`
    pub async fn fetch_user_detail(&self, user_id: &str) -> Result<UserRecord, ApiError> {
        tracing::info!("[AUTH] Fetching user details for '{}'", user_id);
        let url = self.endpoint(&["auth", user_id])?;
        let response = send(self.request(Method::GET, url, Auth::Bearer)).await?;
        decode(response).await
    }

    /// `POST /auth/signup`
    pub async fn sign_up(&self, form: &SignupRequest) -> Result<UserRecord, ApiError> {
        tracing::info!("[AUTH] Registering '{}'", form.username);
        let request = self
            .request(Method::POST, self.config.api_url("/auth/signup"), Auth::Anonymous)
            .json(form);
        let response = send(request).await?;
        decode(response).await
    }

    /// `POST /auth/forgot-password`; any 2xx counts, the body is ignored
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        tracing::info!("[AUTH] Requesting password reset");
        let request = self
            .request(Method::POST, self.config.api_url("/auth/forgot-password"), Auth::Bearer)
            .json(&ForgotPasswordRequest {
                email: email.to_string(),
            });
        send(request).await?;
        Ok(())
    }

    /// `GET /auth/profile`
    pub async fn profile(&self) -> Result<UserRecord, ApiError> {
        let request = self.request(Method::GET, self.config.api_url("/auth/profile"), Auth::Bearer);
        let response = send(request).await?;
        decode(response).await
    }

    /// `GET /recommendations`
    pub async fn recommendations(&self) -> Result<Vec<Recommendation>, ApiError> {
        let request = self.request(Method::GET, self.config.api_url("/recommendations"), Auth::Bearer);
        let response = send(request).await?;
        decode(response).await
    }

    /// `POST /recommendations`
    pub async fn create_recommendation(
        &self,
        recommendation: &CreateRecommendation,
    ) -> Result<Recommendation, ApiError> {
        let request = self
            .request(Method::POST, self.config.api_url("/recommendations"), Auth::Bearer)
            .json(recommendation);
        let response = send(request).await?;
        decode(response).await
    }

    /// Server URL with percent-encoded path segments appended
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let server_url = self.config.server_url();
        let mut url = Url::parse(server_url)
            .map_err(|e| ApiError::network(format!("Invalid server URL '{}': {}", server_url, e)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::network(format!("Server URL '{}' cannot take a path", server_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request<U: reqwest::IntoUrl>(&self, method: Method, url: U, auth: Auth) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match (auth, self.tokens.access_token()) {
            (Auth::Bearer, Some(token)) => builder.bearer_auth(token),
            _ => builder,
        }
    }
}

/// Send a request, turning transport failures and non-2xx statuses into errors
async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(|e| {
        tracing::warn!("[AUTH] Request failed before a response arrived: {}", e);
        ApiError::from(e)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("Unknown status").to_string()
    } else {
        body
    };
    tracing::warn!("[AUTH] {} - {}", status, message);
    Err(ApiError::http(status.as_u16(), message))
}

/// Decode a 2xx body; an empty or `null` body is `EmptyResponseBody`
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(ApiError::from)?;
    let trimmed = bytes.trim_ascii();
    if trimmed.is_empty() || trimmed == b"null" {
        return Err(ApiError::EmptyResponseBody);
    }
    serde_json::from_slice(trimmed)
        .map_err(|e| ApiError::network(format!("Failed to parse response: {}", e)))
}
