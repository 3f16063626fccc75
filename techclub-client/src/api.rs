/// Typed HTTP client for the club API
///
/// Wraps every application endpoint plus login and logout. The bearer token
/// lives in memory only; `logout` clears it even when the request fails.
///
/// Application lists are cached per request URL (query included) for five
/// minutes. Any change to an application drops every cached list.
///
/// # Example
///
/// ```no_run
/// use techclub_client::api::{ApiClient, ApplicationsApi};
/// use techclub_shared::models::application::{ApplicationFilter, ApplicationStatus};
///
/// # async fn example() -> Result<(), techclub_client::error::ClientError> {
/// let client = ApiClient::new("http://localhost:3000/api")?;
/// client.login("2023/00042", "secret").await?;
///
/// let filter = ApplicationFilter {
///     status: Some(ApplicationStatus::Pending),
///     ..Default::default()
/// };
/// let pending = client.list_applications(&filter).await?;
/// println!("{} pending", pending.len());
/// # Ok(())
/// # }
/// ```

use crate::cache::{ResponseCache, DEFAULT_TTL};
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use techclub_shared::models::application::{
    Application, ApplicationFilter, ApplicationStatus, ApplicationSubmission, DepartmentDemand,
    StatusCounts,
};
use techclub_shared::models::user::UserSummary;
use tokio::sync::RwLock;

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Review operations the dashboard depends on
#[async_trait]
pub trait ApplicationsApi: Send + Sync {
    /// Lists applications matching `filter`
    async fn list_applications(&self, filter: &ApplicationFilter) -> ClientResult<Vec<Application>>;

    /// Changes the status; `password` is the review passphrase
    async fn update_status(
        &self,
        id: i32,
        status: ApplicationStatus,
        password: &str,
    ) -> ClientResult<ApplicationStatus>;

    /// Sets or clears the reviewer comment, returning the stored value
    async fn update_comment(&self, id: i32, comment: Option<String>) -> ClientResult<Option<String>>;

    async fn delete_application(&self, id: i32) -> ClientResult<()>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct ApplicationList {
    data: Vec<Application>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: UserSummary,
}

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: ApplicationStatus,
}

#[derive(Debug, Deserialize)]
struct CommentChange {
    comment: Option<String>,
}

/// Returned after submitting an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedApplication {
    pub application_id: i32,
    pub university_id: String,
    pub status: ApplicationStatus,
}

/// Review dashboard statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub status: StatusCounts,
    pub departments: Vec<DepartmentDemand>,
}

/// API client
pub struct ApiClient {
    http: reqwest::Client,

    /// Base URL including the `/api` prefix, without a trailing slash
    base_url: String,

    token: RwLock<Option<String>>,
    lists: ResponseCache<Vec<Application>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_cache_ttl(base_url, DEFAULT_TTL)
    }

    pub fn with_cache_ttl(base_url: impl Into<String>, ttl: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(ApiClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
            lists: ResponseCache::new(ttl),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current bearer token
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    async fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = self.authorized(builder).await.send().await?;
        decode(response).await
    }

    /// Logs in with a university ID and stores the returned token
    pub async fn login(&self, university_id: &str, password: &str) -> ClientResult<UserSummary> {
        let body = json!({ "university_id": university_id, "password": password });
        let response: LoginResponse = decode(
            self.http
                .post(self.url("/auth/login"))
                .json(&body)
                .send()
                .await?,
        )
        .await?;

        self.set_token(Some(response.token)).await;
        self.lists.clear().await;

        tracing::debug!(user_id = response.user.user_id, "Logged in");
        Ok(response.user)
    }

    /// Ends the session; the local token and cache are cleared regardless of the outcome
    pub async fn logout(&self) -> ClientResult<()> {
        let result = match self.token().await {
            Some(_) => self
                .send::<serde_json::Value>(self.http.post(self.url("/auth/logout")))
                .await
                .map(|_| ()),
            None => Ok(()),
        };

        self.set_token(None).await;
        self.lists.clear().await;

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Logout request failed; local session cleared");
        }
        result
    }

    /// Submits a membership application
    pub async fn submit_application(
        &self,
        submission: &ApplicationSubmission,
    ) -> ClientResult<CreatedApplication> {
        let created: Envelope<CreatedApplication> = self
            .send(self.http.post(self.url("/applications")).json(submission))
            .await?;

        self.invalidate_lists().await;
        Ok(created.data)
    }

    pub async fn get_application(&self, id: i32) -> ClientResult<Application> {
        let found: Envelope<Application> = self
            .send(self.http.get(self.url(&format!("/applications/{}", id))))
            .await?;
        Ok(found.data)
    }

    pub async fn application_stats(&self) -> ClientResult<ApplicationStats> {
        let stats: Envelope<ApplicationStats> = self
            .send(self.http.get(self.url("/applications/stats")))
            .await?;
        Ok(stats.data)
    }

    async fn invalidate_lists(&self) {
        let removed = self.lists.invalidate_prefix(&self.url("/applications")).await;
        if removed > 0 {
            tracing::trace!(removed, "Dropped cached application lists");
        }
    }
}

#[async_trait]
impl ApplicationsApi for ApiClient {
    async fn list_applications(&self, filter: &ApplicationFilter) -> ClientResult<Vec<Application>> {
        let request = self
            .authorized(self.http.get(self.url("/applications")).query(filter))
            .await
            .build()?;
        let key = request.url().to_string();

        if let Some(cached) = self.lists.get(&key).await {
            tracing::trace!(%key, "Application list served from cache");
            return Ok(cached);
        }

        let list: ApplicationList = decode(self.http.execute(request).await?).await?;
        self.lists.insert(key, list.data.clone()).await;

        Ok(list.data)
    }

    async fn update_status(
        &self,
        id: i32,
        status: ApplicationStatus,
        password: &str,
    ) -> ClientResult<ApplicationStatus> {
        let body = json!({ "status": status, "password": password });
        let result = self
            .send::<Envelope<StatusChange>>(
                self.http
                    .put(self.url(&format!("/applications/{}/status", id)))
                    .json(&body),
            )
            .await;

        self.invalidate_lists().await;
        Ok(result?.data.status)
    }

    async fn update_comment(&self, id: i32, comment: Option<String>) -> ClientResult<Option<String>> {
        let body = json!({ "comment": comment });
        let changed: Envelope<CommentChange> = self
            .send(
                self.http
                    .put(self.url(&format!("/applications/{}/comment", id)))
                    .json(&body),
            )
            .await?;

        self.invalidate_lists().await;
        Ok(changed.data.comment)
    }

    async fn delete_application(&self, id: i32) -> ClientResult<()> {
        self.send::<serde_json::Value>(self.http.delete(self.url(&format!("/applications/{}", id))))
            .await?;

        self.invalidate_lists().await;
        Ok(())
    }
}

/// Decodes a success body, or turns an error body into [`ClientError::Api`]
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    tracing::debug!(status = status.as_u16(), %message, "API request failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
