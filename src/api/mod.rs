use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::feed::cursor::{Cursor, CursorStrategy};
use crate::feed::source::LogSource;
use crate::feed::types::{DateGroup, LogPage};
use crate::inventory::types::{Herb, HerbRegister, HerbUpdate};

pub mod config;
mod error;

pub use config::ApiConfig;
pub use error::{ApiError, ErrorKind, ErrorReport, RenderHint};

/// Client for the herb inventory server.
#[derive(Clone, Debug)]
pub struct HerbApi {
    http: HttpClient,
    base: Url,
    range: Option<(NaiveDate, NaiveDate)>,
}

impl HerbApi {
    pub fn new(cfg: &ApiConfig) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(ApiError::from_reqwest)?;
        // a trailing slash keeps any path prefix when joining endpoints
        let base = Url::parse(&format!("{}/", cfg.base_url.trim_end_matches('/')))?;
        Ok(Self { http, base, range: None })
    }

    /// Restrict log pages to `from..=to`.
    pub fn with_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.range = Some((from, to));
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    pub async fn list_herbs(&self) -> Result<Vec<Herb>, ApiError> {
        let url = self.endpoint("api/herb")?;
        decode(send(self.http.get(url)).await?)
    }

    pub async fn herb_names(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("api/herb/all/name")?;
        decode(send(self.http.get(url)).await?)
    }

    pub async fn update_herbs(&self, updates: &[HerbUpdate]) -> Result<(), ApiError> {
        let url = self.endpoint("herb")?;
        send(self.http.put(url).json(updates)).await.map(drop)
    }

    pub async fn register_herb(&self, herb: &HerbRegister) -> Result<(), ApiError> {
        let url = self.endpoint("herb")?;
        send(self.http.post(url).json(herb)).await.map(drop)
    }

    pub async fn delete_herb(&self, herb: &Herb) -> Result<(), ApiError> {
        let url = self.endpoint("herb")?;
        send(self.http.delete(url).json(herb)).await.map(drop)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLogPage {
    #[serde(default)]
    data: Vec<DateGroup>,
    #[serde(default)]
    has_next_page: bool,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

#[async_trait]
impl LogSource for HerbApi {
    async fn fetch_page(
        &self,
        strategy: &dyn CursorStrategy,
        cursor: Option<&Cursor>,
    ) -> Result<LogPage, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(c) = cursor {
            query.push((strategy.query_param(), c.to_string()));
        }
        if let Some((from, to)) = self.range {
            query.push(("from", from.format("%Y-%m-%d").to_string()));
            query.push(("to", to.format("%Y-%m-%d").to_string()));
        }

        let url = self.endpoint("api/herb/log")?;
        let body = send(self.http.get(url).query(&query)).await?;
        let page: ApiLogPage = serde_json::from_slice(&body)?;
        let next = strategy.decode(page.rest.get(strategy.response_field()).unwrap_or(&Value::Null))?;
        Ok(LogPage { data: page.data, cursor: next, has_next_page: page.has_next_page })
    }
}

async fn send(req: RequestBuilder) -> Result<Bytes, ApiError> {
    let resp = req.send().await.map_err(ApiError::from_reqwest)?;
    let status = resp.status();
    let is_html = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("text/html"))
        .unwrap_or(false);
    let bytes = resp.bytes().await.map_err(ApiError::from_reqwest)?;
    if !status.is_success() {
        return Err(ApiError::from_response(status, is_html, &bytes));
    }
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(bytes: Bytes) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(&bytes)?)
}
