use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::{debug, info, instrument};

use crate::domain::error::InstanceDataError;
use crate::domain::models::{InstanceCatalog, InstanceTypeInfo};
use crate::domain::ports::InstanceDataSource;

const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Where the reference dataset lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    Http(String),
    File(PathBuf),
}

impl DataLocation {
    /// `http(s)://` locations are downloaded, anything else is a local path
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Http(location.to_string())
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            Self::File(PathBuf::from(path))
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Http(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Loads the instance type dataset from a URL or a local JSON file
pub struct InstanceDataFetcher {
    http_client: ReqwestClient,
    location: DataLocation,
}

impl InstanceDataFetcher {
    /// Create a fetcher for `location`
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(location: &str) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            location: DataLocation::parse(location),
        })
    }

    pub fn location(&self) -> &DataLocation {
        &self.location
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, InstanceDataError> {
        match self.location {
            DataLocation::Http(ref url) => {
                let response = self.http_client.get(url).send().await.map_err(|source| {
                    InstanceDataError::Download {
                        url: url.clone(),
                        source,
                    }
                })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(InstanceDataError::HttpStatus {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|source| InstanceDataError::Download {
                        url: url.clone(),
                        source,
                    })?;
                Ok(body.to_vec())
            }
            DataLocation::File(ref path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| InstanceDataError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
        }
    }
}

#[async_trait]
impl InstanceDataSource for InstanceDataFetcher {
    #[instrument(skip(self), fields(location = %self.location.describe()))]
    async fn load(&self) -> Result<InstanceCatalog, InstanceDataError> {
        let body = self.read_bytes().await?;
        debug!(bytes = body.len(), "instance data fetched");

        let entries: Vec<InstanceTypeInfo> = serde_json::from_slice(&body)?;
        let catalog = InstanceCatalog::new(entries);
        if catalog.is_empty() {
            return Err(InstanceDataError::Empty(self.location.describe()));
        }

        info!(
            instance_types = catalog.len(),
            regions = catalog.regions().count(),
            "instance data loaded"
        );
        Ok(catalog)
    }
}
