use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::endpoints::Endpoints;
use crate::types::{QueryParams, ScanResult};

/// Why a `/scan` call produced no usable result. Callers show all variants the same way.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend answered {0}")]
    Status(StatusCode),

    #[error("response is not a scan result: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The one call the controller makes against the search backend.
pub trait ScanApi: Send + Sync {
    fn scan(&self, params: QueryParams) -> impl Future<Output = Result<ScanResult, ScanError>> + Send;
}

/// `ScanApi` over HTTP using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpScanApi {
    http: Client,
    endpoints: Endpoints,
}

impl HttpScanApi {
    /// Build a client with an optional overall request timeout.
    pub fn new(endpoints: Endpoints, timeout: Option<Duration>) -> Result<Self, ScanError> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self::with_client(builder.build()?, endpoints))
    }

    pub fn with_client(http: Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn http(&self) -> &Client {
        &self.http
    }
}

impl ScanApi for HttpScanApi {
    async fn scan(&self, params: QueryParams) -> Result<ScanResult, ScanError> {
        let url = self.endpoints.scan_url(&params);
        debug!(%url, "GET scan");

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScanError::Status(status));
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
