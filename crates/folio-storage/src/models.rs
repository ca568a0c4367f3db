use folio_core::{PortfolioConfiguration, Version, VersionSummary};
use serde::Serialize;
use time::OffsetDateTime;

use crate::Result;

/// The configuration an owner currently edits and serves
#[derive(Debug, Clone, Serialize)]
pub struct CurrentConfiguration {
    pub config: PortfolioConfiguration,
    /// Version the configuration was last saved as or restored from.
    /// `None` until the first save.
    pub version_id: Option<String>,
    pub content_hash: Option<String>,
    pub published: bool,
    #[serde(with = "time::serde::timestamp::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl CurrentConfiguration {
    pub(crate) fn empty() -> Self {
        Self {
            config: PortfolioConfiguration::default(),
            version_id: None,
            content_hash: None,
            published: false,
            updated_at: None,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CurrentRow {
    pub config_json: String,
    pub version_id: String,
    pub content_hash: String,
    pub published_json: Option<String>,
    pub updated_at: i64,
}

impl CurrentRow {
    pub fn config(&self) -> Result<PortfolioConfiguration> {
        Ok(serde_json::from_str(&self.config_json)?)
    }

    pub fn into_current(self) -> Result<CurrentConfiguration> {
        Ok(CurrentConfiguration {
            config: self.config()?,
            version_id: Some(self.version_id),
            content_hash: Some(self.content_hash),
            published: self.published_json.is_some(),
            updated_at: Some(OffsetDateTime::from_unix_timestamp(self.updated_at)?),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VersionRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub config_json: String,
    pub content_hash: String,
    pub created_at: i64,
}

impl VersionRow {
    pub fn into_version(self) -> Result<Version> {
        Ok(Version {
            config: serde_json::from_str(&self.config_json)?,
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            content_hash: self.content_hash,
            created_at: OffsetDateTime::from_unix_timestamp(self.created_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VersionSummaryRow {
    pub id: String,
    pub name: String,
    pub content_hash: String,
    pub created_at: i64,
}

impl VersionSummaryRow {
    pub fn into_summary(self) -> Result<VersionSummary> {
        Ok(VersionSummary {
            id: self.id,
            name: self.name,
            content_hash: self.content_hash,
            created_at: OffsetDateTime::from_unix_timestamp(self.created_at)?,
        })
    }
}
