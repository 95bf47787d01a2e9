//! Blocking HTTP adapter for the customer collection endpoint.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use tracing::debug;

use crate::domain::{FetchResult, NetworkError, PageResponse, QueryState, Record};

/// Source of customer pages.
///
/// Implementations must not retry on their own. A call may run to completion
/// after its result has become irrelevant; the caller discards it by token.
pub trait CustomerClient: Send + Sync {
    fn fetch_page(&self, query: &QueryState) -> FetchResult<Vec<Record>>;
}

/// `GET {base}/customer?search=..&age=..&page=..` over reqwest.
#[derive(Debug, Clone)]
pub struct HttpCustomerClient {
    client: Client,
    endpoint: Url,
}

impl HttpCustomerClient {
    pub fn new(base_url: &Url, timeout: Duration) -> FetchResult<Self> {
        let endpoint = base_url
            .join("customer")
            .map_err(|e| NetworkError::new(format!("Invalid endpoint: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl CustomerClient for HttpCustomerClient {
    fn fetch_page(&self, query: &QueryState) -> FetchResult<Vec<Record>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&query.params())
            .send()?;

        let status = response.status();
        debug!(url = %response.url(), %status, "customer page response");
        if status != StatusCode::OK {
            return Err(NetworkError::new(format!("HTTP {status}")));
        }

        let page: PageResponse = response.json()?;
        Ok(page.data)
    }
}
