//! HTTP remote backed by reqwest.

use super::{RemoteError, RemoteSource};
use async_trait::async_trait;
use breed_store::config::RemoteConfig;
use breed_types::Breed;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-api-key";

/// Client for the breeds REST API.
///
/// - `GET {base}/breeds?limit=&page=`
/// - `GET {base}/breeds/search?q=`
#[derive(Debug, Clone)]
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpRemote {
    /// Build a client from configuration.
    ///
    /// The API key, when set, is sent as `x-api-key` on every request.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| RemoteError::Request(format!("invalid base url {base}: {e}")))?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| RemoteError::Request(format!("invalid api key: {e}")))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteError::Request(format!("invalid endpoint {path}: {e}")))
    }

    async fn fetch(&self, url: Url) -> Result<Vec<Breed>, RemoteError> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        Breed::list_from_json(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// URL of one page of the listing.
    pub fn page_url(&self, limit: u32, page: i64) -> Result<Url, RemoteError> {
        let mut url = self.endpoint("breeds")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    /// URL of a name search.
    pub fn search_url(&self, name: &str) -> Result<Url, RemoteError> {
        let mut url = self.endpoint("breeds/search")?;
        url.query_pairs_mut().append_pair("q", name);
        Ok(url)
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn get_page(&self, limit: u32, page: i64) -> Result<Vec<Breed>, RemoteError> {
        let url = self.page_url(limit, page)?;
        self.fetch(url).await
    }

    async fn search(&self, name: &str) -> Result<Vec<Breed>, RemoteError> {
        let url = self.search_url(name)?;
        self.fetch(url).await
    }
}
