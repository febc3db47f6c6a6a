//! RestClient - reqwest adapter for the EduSmart backend.
//!
//! Implements every backend port from `edusmart-core`. The bearer token is
//! attached to each request while a session is active.

use crate::endpoints;
use async_trait::async_trait;
use edusmart_core::academic::{AcademicAdminApi, AcademicApi, AcademicYear, Campus, NewAcademicYear};
use edusmart_core::config::ClientConfig;
use edusmart_core::error::{EduError, Result};
use edusmart_core::resource::ResourceReader;
use edusmart_core::session::{AuthApi, Credentials, Session};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::RwLock;

/// HTTP client for the EduSmart REST API.
pub struct RestClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl RestClient {
    /// Builds a client using the base URL and timeout from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| EduError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `endpoint` onto the base URL. Absolute URLs pass through.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub fn has_token(&self) -> bool {
        self.current_token().is_some()
    }

    fn current_token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(endpoint));
        match self.current_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and maps transport failures and non-2xx statuses.
    async fn send(&self, builder: RequestBuilder, endpoint: &str) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| map_transport_error(e, endpoint))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            "[RestClient] {} answered {}: {}",
            endpoint,
            status,
            body.chars().take(200).collect::<String>()
        );
        Err(map_http_error(status, &body, endpoint))
    }

    async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(e, endpoint))?;
        serde_json::from_slice(&bytes).map_err(EduError::from)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&'static str, String)]) -> Result<T> {
        tracing::debug!("[RestClient] GET {} {:?}", endpoint, query);
        let builder = self.request(Method::GET, endpoint).query(query);
        let response = self.send(builder, endpoint).await?;
        Self::decode(response, endpoint).await
    }
}

/// Maps reqwest transport errors onto the shared taxonomy.
fn map_transport_error(err: reqwest::Error, endpoint: &str) -> EduError {
    if err.is_timeout() {
        EduError::Timeout(endpoint.to_string())
    } else if err.is_decode() {
        EduError::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    } else {
        EduError::Network(format!("{}: {}", endpoint, err))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps a non-success status, preferring the server's `message` field.
fn map_http_error(status: StatusCode, body: &str, endpoint: &str) -> EduError {
    match status {
        StatusCode::UNAUTHORIZED => EduError::Unauthenticated,
        StatusCode::FORBIDDEN => EduError::unauthorized("current user", endpoint),
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .map(|wrapper| wrapper.message)
                .unwrap_or_else(|_| body.trim().to_string());
            let message = if message.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                message
            };
            EduError::http(status.as_u16(), message)
        }
    }
}

/// `/campuses` answers with either a bare array or `{ "campuses": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CampusList {
    Bare(Vec<Campus>),
    Wrapped {
        #[serde(default)]
        campuses: Vec<Campus>,
    },
}

impl From<CampusList> for Vec<Campus> {
    fn from(list: CampusList) -> Self {
        match list {
            CampusList::Bare(campuses) | CampusList::Wrapped { campuses } => campuses,
        }
    }
}

#[async_trait]
impl AuthApi for RestClient {
    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        tracing::debug!("[RestClient] POST {}", endpoints::AUTH_LOGIN);
        let builder = self
            .client
            .post(self.url(endpoints::AUTH_LOGIN))
            .json(credentials);
        let response = self.send(builder, endpoints::AUTH_LOGIN).await?;
        Self::decode(response, endpoints::AUTH_LOGIN).await
    }

    fn set_bearer_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

#[async_trait]
impl AcademicApi for RestClient {
    async fn list_years(&self) -> Result<Vec<AcademicYear>> {
        self.get(endpoints::ACADEMIC_YEARS, &[]).await
    }

    async fn list_campuses(&self) -> Result<Vec<Campus>> {
        let list: CampusList = self.get(endpoints::CAMPUSES, &[]).await?;
        Ok(list.into())
    }
}

#[async_trait]
impl AcademicAdminApi for RestClient {
    async fn create_year(&self, year: &NewAcademicYear) -> Result<()> {
        let endpoint = endpoints::CREATE_ACADEMIC_YEAR;
        tracing::debug!("[RestClient] POST {}", endpoint);
        let builder = self.request(Method::POST, endpoint).json(year);
        self.send(builder, endpoint).await?;
        Ok(())
    }

    async fn set_current_year(&self, year_id: &str) -> Result<()> {
        let endpoint = endpoints::set_current_year(year_id);
        tracing::debug!("[RestClient] PATCH {}", endpoint);
        let builder = self.request(Method::PATCH, &endpoint);
        self.send(builder, &endpoint).await?;
        Ok(())
    }
}

#[async_trait]
impl ResourceReader for RestClient {
    async fn get_json(&self, endpoint: &str, query: &[(&'static str, String)]) -> Result<Value> {
        self.get(endpoint, query).await
    }
}
