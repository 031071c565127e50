//! HTTP range-fetch backend

use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use std::future::Future;
use tracing::{debug, trace, warn};
use url::Url;

use crate::{Error, RangeRead, Result};

/// Remote archive reached over HTTP `Range` requests
///
/// Holds its own [`reqwest::Client`] (connection pooling included); pass a
/// preconfigured client through [`HttpStore::with_client`] to control
/// timeouts, proxies or retry middleware.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    url: Url,
}

impl HttpStore {
    /// Create a store for `url` with a default HTTP client
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        Self::with_client(client, url)
    }

    /// Create a store for `url` using a caller-supplied client
    pub fn with_client(client: Client, url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|_| Error::InvalidUrl {
            url: url.to_string(),
        })?;
        debug!("HTTP store for {url}");
        Ok(Self { client, url })
    }

    /// The archive URL this store reads from
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RangeRead for HttpStore {
    fn read_range(
        &self,
        offset: u64,
        length: u64,
    ) -> impl Future<Output = Result<Bytes>> + Send {
        let client = self.client.clone();
        let url = self.url.clone();

        async move {
            if length == 0 {
                return Ok(Bytes::new());
            }
            let Some(end) = offset.checked_add(length - 1) else {
                return Err(Error::RangeOverflow { offset, length });
            };
            trace!("GET {url} bytes={offset}-{end}");

            let response = client
                .get(url)
                .header(header::RANGE, format!("bytes={offset}-{end}"))
                .send()
                .await?
                .error_for_status()?;

            match response.status() {
                StatusCode::PARTIAL_CONTENT => {
                    let body = response.bytes().await?;
                    if body.len() as u64 != length {
                        return Err(Error::SizeMismatch {
                            expected: length,
                            actual: body.len() as u64,
                        });
                    }
                    Ok(body)
                }
                // Server ignored the Range header and sent the whole
                // archive; serve the slice if the body covers it
                StatusCode::OK => {
                    warn!("server ignored range request, received full body");
                    let body = response.bytes().await?;
                    let start = usize::try_from(offset)
                        .map_err(|_| Error::PartialContentNotSupported)?;
                    let len = length as usize;
                    if start + len > body.len() {
                        return Err(Error::PartialContentNotSupported);
                    }
                    Ok(body.slice(start..start + len))
                }
                status => Err(Error::UnexpectedStatus(status.as_u16())),
            }
        }
    }
}
