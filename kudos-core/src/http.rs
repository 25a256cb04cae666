//! HTTP client abstraction for the roster backend.
//!
//! The store adapter talks to the backend through [`HttpClient`] so tests can
//! swap in a mock instead of making real network requests. The default
//! implementation wraps reqwest.

use async_trait::async_trait;
use reqwest::{self, Response, StatusCode};
use crate::Error;

/// A minimal JSON-over-HTTP client. Bodies go in and come out as strings;
/// (de)serialization is the caller's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: String) -> Result<String, Error>;
    async fn post(&self, url: String, body: String) -> Result<String, Error>;
    async fn put(&self, url: String, body: String) -> Result<String, Error>;
}

/// 404 becomes [`Error::NotFound`]; other non-success statuses become
/// [`Error::Http`].
fn check_status(url: &str, response: Response) -> Result<Response, Error> {
    not_found(url, response.status())?;
    Ok(response.error_for_status()?)
}

fn not_found(url: &str, status: StatusCode) -> Result<(), Error> {
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(url.to_string()));
    }
    Ok(())
}

#[derive(Clone, Default)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn get(&self, url: String) -> Result<String, Error> {
        let response = self.client
            .get(&url)
            .send()
            .await?;
        Ok(check_status(&url, response)?.text().await?)
    }

    async fn post(&self, url: String, body: String) -> Result<String, Error> {
        let response = self.client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        Ok(check_status(&url, response)?.text().await?)
    }

    async fn put(&self, url: String, body: String) -> Result<String, Error> {
        let response = self.client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        Ok(check_status(&url, response)?.text().await?)
    }
}
