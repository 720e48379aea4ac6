//! Async client for the broker's `/db` store API.
//!
//! [`StoreClient`] talks to the store collection with the broker admin
//! credentials; each [`StoreConnection`] talks to one store with that
//! store's own credentials.

mod connection;
mod error;

pub use connection::StoreConnection;
pub use error::{ClientError, Result};

use broker_api::StoreView;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};

pub struct StoreClient {
    http: Client,
    base_url: String,
    user: String,
    password: String,
}

impl StoreClient {
    /// `base_url` is the store collection, e.g. `http://localhost:8080/db`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: String::new(),
            password: String::new(),
        }
    }

    /// Admin credentials sent with every collection request.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a store with a broker-assigned id.
    pub async fn create(&self) -> Result<StoreConnection> {
        let request = self.request(Method::POST, self.base_url.as_str());
        self.create_from(request).await
    }

    /// Creates a store under `id`; fails with a 409 status if it exists.
    pub async fn create_with_id(&self, id: &str) -> Result<StoreConnection> {
        let url = join_url(&self.base_url, id)?;
        self.create_from(self.request(Method::PUT, url)).await
    }

    async fn create_from(&self, request: RequestBuilder) -> Result<StoreConnection> {
        let body = expect(request, StatusCode::CREATED).await?;
        let view: StoreView = serde_json::from_slice(&body)?;
        if view.url.is_empty() {
            return Err(ClientError::MissingUrl(
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }
        debug!("Created store {} at {}", view.id, view.url);
        Ok(StoreConnection::from_view(self.http.clone(), view))
    }

    pub async fn list(&self) -> Result<Vec<StoreConnection>> {
        let request = self.request(Method::GET, self.base_url.as_str());
        let body = expect(request, StatusCode::OK).await?;
        let views: Vec<StoreView> = serde_json::from_slice(&body)?;
        Ok(views
            .into_iter()
            .map(|v| StoreConnection::from_view(self.http.clone(), v))
            .collect())
    }

    /// Fetches a store's description with explicit credentials.
    pub async fn get(&self, id: &str, user: &str, password: &str) -> Result<StoreConnection> {
        let url = join_url(&self.base_url, id)?;
        let request = authorize(self.http.request(Method::GET, url), user, password);
        let body = expect(request, StatusCode::OK).await?;
        let view: StoreView = serde_json::from_slice(&body)?;
        Ok(StoreConnection::from_view(self.http.clone(), view))
    }

    /// Deletes a store using the admin credentials.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = join_url(&self.base_url, id)?;
        expect(self.request(Method::DELETE, url), StatusCode::OK).await?;
        Ok(())
    }

    fn request(&self, method: Method, url: impl reqwest::IntoUrl) -> RequestBuilder {
        authorize(self.http.request(method, url), &self.user, &self.password)
    }
}

/// Appends `segment` to `base` as one percent-encoded path segment.
pub(crate) fn join_url(base: &str, segment: &str) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| ClientError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

/// Adds basic auth unless `user` is empty.
pub(crate) fn authorize(request: RequestBuilder, user: &str, password: &str) -> RequestBuilder {
    if user.is_empty() {
        return request;
    }
    request.basic_auth(user, Some(password))
}

/// Sends `request` and returns the body if the status is `expected`.
pub(crate) async fn expect(request: RequestBuilder, expected: StatusCode) -> Result<Vec<u8>> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.bytes().await?.to_vec();

    if status != expected {
        return Err(ClientError::Status {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(body)
}
