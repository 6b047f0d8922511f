// Client for the replay backend

pub mod loader;

use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::ReplayError;
use crate::session::{RoundInfo, Session, SessionRequest};

pub use loader::{LoaderEvent, RequestKind, RequestTracker, SessionLoader};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
/// Building a session on the backend can take minutes on a cold cache
pub const DEFAULT_REQUEST_TIMEOUT_S: u64 = 300;

/// Source of selectable seasons, rounds and session payloads
pub trait ReplayApi: Send + Sync {
    fn years(&self) -> Result<Vec<i32>, ReplayError>;

    fn rounds(&self, year: i32) -> Result<Vec<RoundInfo>, ReplayError>;

    fn session(&self, request: &SessionRequest) -> Result<Session, ReplayError>;
}

/// [`ReplayApi`] over HTTP
pub struct HttpReplayApi {
    base_url: String,
    client: Client,
}

impl HttpReplayApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ReplayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReplayError::HttpClientError { source: e })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ReplayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| ReplayError::RequestError {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let detail = error_detail(status, &body);
            warn!("GET {} returned {}: {}", url, status, detail);
            return Err(ReplayError::ServerResponse {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<T>()
            .map_err(|e| ReplayError::InvalidPayload { url, source: e })
    }
}

impl ReplayApi for HttpReplayApi {
    fn years(&self) -> Result<Vec<i32>, ReplayError> {
        self.get("/api/years", &[])
    }

    fn rounds(&self, year: i32) -> Result<Vec<RoundInfo>, ReplayError> {
        self.get("/api/rounds", &[("year", year.to_string())])
    }

    fn session(&self, request: &SessionRequest) -> Result<Session, ReplayError> {
        self.get(
            "/api/session",
            &[
                ("year", request.year.to_string()),
                ("round_number", request.round_number.to_string()),
                ("session_type", request.session_type.code().to_string()),
            ],
        )
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Message for a failed request: the server's `detail` when the body carries
/// one, the status reason phrase otherwise.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|detail| match detail {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s),
            // validation errors come back as structured JSON
            other => Some(other.to_string()),
        });

    detail.unwrap_or_else(|| {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string())
    })
}
