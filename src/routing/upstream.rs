//! Compiled upstream settings.
//!
//! Built once from [`UpstreamConfig`] at startup and shared read-only by
//! every request handler.

use std::time::Duration;

use url::Url;

use crate::config::schema::UpstreamConfig;
use crate::config::validation::ValidationError;
use crate::security::BearerCredential;

/// Immutable runtime view of the upstream configuration.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    base: Url,
    credential: Option<BearerCredential>,
    connect_timeout: Duration,
}

impl UpstreamSettings {
    /// Compile a (validated) upstream configuration.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, ValidationError> {
        let mut base = Url::parse(&config.base_url).map_err(|e| ValidationError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        let trimmed = base.path().trim_end_matches('/').to_string();
        base.set_path(&trimmed);

        let credential = config
            .bearer_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(BearerCredential::new)
            .transpose()?;

        Ok(Self {
            base,
            credential,
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        })
    }

    /// Base URL with any trailing slash removed from its path.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn credential(&self) -> Option<&BearerCredential> {
        self.credential.as_ref()
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Base path without trailing slash; empty when the base is a bare host.
    pub(crate) fn base_path(&self) -> &str {
        self.base.path().trim_end_matches('/')
    }
}
