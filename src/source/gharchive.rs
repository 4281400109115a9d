//! GH Archive download client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use super::{ArchiveHour, EventSource, SourceError, decode_archive};
use crate::models::RawEvent;

pub const DEFAULT_BASE_URL: &str = "https://data.gharchive.org/";

/// Downloads one hourly partition over HTTP.
#[derive(Debug, Clone)]
pub struct GhArchiveClient {
    http: Client,
    base_url: Url,
    hour: ArchiveHour,
}

impl GhArchiveClient {
    pub fn new(base_url: Url, hour: ArchiveHour, timeout: Duration) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            hour,
        })
    }

    pub fn hour(&self) -> ArchiveHour {
        self.hour
    }

    pub fn archive_url(&self) -> Result<Url, SourceError> {
        Ok(self.hour.url(&self.base_url)?)
    }
}

#[async_trait]
impl EventSource for GhArchiveClient {
    fn describe(&self) -> String {
        format!("gharchive partition {}", self.hour)
    }

    async fn fetch_events(&self) -> Result<Vec<RawEvent>, SourceError> {
        let url = self.archive_url()?;
        info!(%url, "Downloading archive partition");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Archive download rejected");
            return Err(SourceError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        info!(%url, bytes = body.len(), "Archive downloaded");

        let events = tokio::task::spawn_blocking(move || decode_archive(&body[..]))
            .await
            .map_err(|err| SourceError::Stream(std::io::Error::other(err)))??;

        info!(events = events.len(), "Decoded archive partition");
        Ok(events)
    }
}
