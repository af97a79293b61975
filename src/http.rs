//! HTTP fetch capability.
//!
//! One shared `reqwest::Client` per manager, configured from settings:
//! per-request timeout and an optional `host:port` proxy with optional
//! credentials.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::{keys, Config};
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let timeout = config.get_u64(keys::TIMEOUT)?;
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("driver-manager/", env!("CARGO_PKG_VERSION")));
        if timeout > 0 {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        if let Some(address) = config.get(keys::PROXY) {
            let address = if address.contains("://") {
                address
            } else {
                format!("http://{address}")
            };
            let mut proxy = reqwest::Proxy::all(&address)?;
            if let Some(user) = config.get(keys::PROXY_USER) {
                let pass = config.get(keys::PROXY_PASS).unwrap_or_default();
                proxy = proxy.basic_auth(&user, &pass);
            }
            builder = builder.proxy(proxy);
        }
        Ok(HttpClient {
            client: builder.build()?,
        })
    }

    pub async fn get_text(&self, url: &Url) -> Result<String, Error> {
        debug!(url = %url, "GET");
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    pub async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, Error> {
        debug!(url = %url, "GET (bytes)");
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, Error> {
        let text = self.get_text(url).await?;
        serde_json::from_str(&text).map_err(|e| Error::JsonParse {
            url: url.to_string(),
            source: e,
        })
    }

    /// Existence check: HEAD request, true on any success status.
    pub async fn exists(&self, url: &Url) -> bool {
        match self.client.head(url.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
