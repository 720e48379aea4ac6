use crate::{authorize, expect, join_url, Result};
use broker_api::StoreView;
use reqwest::{Client, Method, RequestBuilder, StatusCode};

/// Handle on one store, carrying that store's url and owner credentials.
#[derive(Debug, Clone)]
pub struct StoreConnection {
    http: Client,
    pub url: String,
    pub user: String,
    pub password: String,
}

impl StoreConnection {
    pub fn new(url: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            user: user.into(),
            password: password.into(),
        }
    }

    pub(crate) fn from_view(http: Client, view: StoreView) -> Self {
        Self {
            http,
            url: view.url.trim_end_matches('/').to_string(),
            user: view.user,
            password: view.password,
        }
    }

    /// The store id, i.e. the last segment of its url.
    pub fn id(&self) -> &str {
        match self.url.rsplit_once('/') {
            Some((_, id)) => id,
            None => "",
        }
    }

    pub async fn get_bytes(&self, key: &str) -> Result<Vec<u8>> {
        expect(self.request(Method::GET, Some(key))?, StatusCode::OK).await
    }

    pub async fn get(&self, key: &str) -> Result<String> {
        Ok(String::from_utf8(self.get_bytes(key).await?)?)
    }

    pub async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<()> {
        expect(self.request(Method::PUT, Some(key))?.body(value), StatusCode::OK).await?;
        Ok(())
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_bytes(key, value.as_bytes().to_vec()).await
    }

    pub async fn delete_key(&self, key: &str) -> Result<()> {
        expect(self.request(Method::DELETE, Some(key))?, StatusCode::OK).await?;
        Ok(())
    }

    /// Deletes the whole store with its owner credentials.
    pub async fn delete(&self) -> Result<()> {
        expect(self.request(Method::DELETE, None)?, StatusCode::OK).await?;
        Ok(())
    }

    /// The key travels as a single percent-encoded path segment.
    fn request(&self, method: Method, key: Option<&str>) -> Result<RequestBuilder> {
        let request = match key {
            Some(key) => self.http.request(method, join_url(&self.url, key)?),
            None => self.http.request(method, &self.url),
        };
        Ok(authorize(request, &self.user, &self.password))
    }
}
