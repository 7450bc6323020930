//! Server version discovery and API generation selection
//!
//! Some endpoints changed shape between server generations. The
//! [`VersionGate`] discovers the server version once per client, caches the
//! raw string, and resolves it to an [`ApiGeneration`] for every
//! version-sensitive operation.

use crate::error::{ApiError, Result};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::debug;

/// First major version serving the current API shape
pub const CURRENT_API_MAJOR: u64 = 2;

/// Parsed server version
///
/// Accepts an optional `v` prefix and one or more numeric segments, and
/// ignores any pre-release (`-rc.1`) or build (`+sha`) suffix. Segments past
/// the third are validated but not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ServerVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FromStr for ServerVersion {
    type Err = ApiError;

    fn from_str(raw: &str) -> Result<Self> {
        let parse_error = || ApiError::VersionParse {
            version: raw.to_string(),
        };

        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let core = trimmed
            .split(['-', '+'])
            .next()
            .filter(|core| !core.is_empty())
            .ok_or_else(parse_error)?;

        let segments = core
            .split('.')
            .map(|segment| segment.parse::<u64>().map_err(|_| parse_error()))
            .collect::<Result<Vec<_>>>()?;

        match segments.as_slice() {
            [major] => Ok(Self::new(*major, 0, 0)),
            [major, minor] => Ok(Self::new(*major, *minor, 0)),
            [major, minor, patch, ..] => Ok(Self::new(*major, *minor, *patch)),
            [] => Err(parse_error()),
        }
    }
}

impl ServerVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn api_generation(&self) -> ApiGeneration {
        if self.major < CURRENT_API_MAJOR {
            ApiGeneration::Legacy
        } else {
            ApiGeneration::Current
        }
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Shape of version-sensitive endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiGeneration {
    /// Servers before 2.0: `/api/v1/permissions` keyed by credential name
    Legacy,
    /// Servers from 2.0: `/api/v2/permissions` keyed by path and uuid
    Current,
}

/// Something that can report the server version string
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn server_version(&self) -> Result<String>;
}

/// Lazily populated, never invalidated cache of the server version
#[derive(Debug, Default)]
pub struct VersionGate {
    cached: Mutex<Option<String>>,
}

impl VersionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate seeded with a known version, skipping discovery
    pub fn with_cached(version: impl Into<String>) -> Self {
        Self {
            cached: Mutex::new(Some(version.into())),
        }
    }

    /// Cached raw version string, if discovery has happened
    pub async fn cached(&self) -> Option<String> {
        self.cached.lock().await.clone()
    }

    /// Discover the version on first use, then parse the cached string
    pub async fn resolve_version(&self, source: &dyn VersionSource) -> Result<ServerVersion> {
        let raw = {
            let mut cached = self.cached.lock().await;
            match cached.as_ref() {
                Some(raw) => raw.clone(),
                None => {
                    let discovered = source.server_version().await?;
                    debug!("Discovered server version {}", discovered);
                    *cached = Some(discovered.clone());
                    discovered
                }
            }
        };
        raw.parse()
    }

    pub async fn resolve_api_generation(
        &self,
        source: &dyn VersionSource,
    ) -> Result<ApiGeneration> {
        Ok(self.resolve_version(source).await?.api_generation())
    }
}
