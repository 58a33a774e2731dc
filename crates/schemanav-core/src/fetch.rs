//! Schema byte fetching for `file:`, `http:` and `https:` locations
//!
//! Redirects are followed by hand so the hop count can be capped and
//! reported as its own error.
//!
//! Copyright (c) 2025 Schemanav Team
//! Licensed under the Apache-2.0 license

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches schema text from local files and HTTP(S) servers
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_redirects: usize,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .redirect(Policy::none())
            .user_agent(config.user_agent.clone());

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| Error::Http {
            message: format!("Failed to create HTTP client: {}", e),
            status_code: None,
            source: Some(e.into()),
        })?;

        Ok(Self {
            client,
            max_redirects: config.max_redirects,
        })
    }

    /// Fetch the text at `location`, dispatching on its scheme
    pub async fn fetch(&self, location: &Url) -> Result<String> {
        match location.scheme() {
            "file" => self.read_file(location).await,
            "http" | "https" => self.fetch_http(location).await,
            scheme => Err(Error::UnsupportedScheme {
                scheme: scheme.to_string(),
                location: location.to_string(),
            }),
        }
    }

    #[tracing::instrument(skip(self), fields(location = %location))]
    async fn read_file(&self, location: &Url) -> Result<String> {
        let path = location
            .to_file_path()
            .map_err(|_| Error::invalid_reference(location.as_str(), "not a local file path"))?;
        let bytes = tokio::fs::read(&path).await?;
        decode_utf8(location, bytes)
    }

    /// GET with at most `max_redirects` redirect hops.
    ///
    /// Relative `Location` headers are resolved against the originally
    /// requested URL.
    #[tracing::instrument(skip(self), fields(location = %location))]
    async fn fetch_http(&self, location: &Url) -> Result<String> {
        let mut current = location.clone();
        let mut redirects = 0;

        loop {
            let response = self.client.get(current.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                if let Some(target) = response.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
                    if redirects >= self.max_redirects {
                        return Err(Error::TooManyRedirects {
                            url: location.to_string(),
                            limit: self.max_redirects,
                        });
                    }
                    let next = location
                        .join(target)
                        .map_err(|e| Error::invalid_reference(target, e.to_string()))?;
                    tracing::debug!(status = status.as_u16(), from = %current, to = %next, "following redirect");
                    current = next;
                    redirects += 1;
                    continue;
                }
            }

            if !status.is_success() {
                return Err(Error::http(
                    format!("GET {} returned {}", current, status),
                    Some(status.as_u16()),
                ));
            }

            let bytes = response.bytes().await?;
            tracing::debug!(status = status.as_u16(), bytes = bytes.len(), "fetched schema");
            return decode_utf8(&current, bytes.to_vec());
        }
    }
}

fn decode_utf8(location: &Url, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|source| Error::Utf8 {
        location: location.to_string(),
        source,
    })
}
