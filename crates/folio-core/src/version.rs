//! Version domain model

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::model::PortfolioConfiguration;

/// Immutable snapshot of a saved configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub config: PortfolioConfiguration,
    pub content_hash: String,
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

/// Version listing entry without the configuration payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: String,
    pub name: String,
    pub content_hash: String,
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

impl Version {
    pub fn new(
        owner_id: impl Into<String>,
        config: PortfolioConfiguration,
        label: Option<String>,
    ) -> crate::Result<Self> {
        let created_at = OffsetDateTime::now_utc();
        let name = label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| default_name(created_at));
        let content_hash = config.content_hash()?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name,
            config,
            content_hash,
            created_at,
        })
    }

    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            content_hash: self.content_hash.clone(),
            created_at: self.created_at,
        }
    }
}

/// Name used when a save carries no label, e.g. `Version 2024-05-01 13:45:10`
pub fn default_name(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    match at.format(format) {
        Ok(stamp) => format!("Version {}", stamp),
        Err(_) => format!("Version {}", at.unix_timestamp()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_default_name_from_timestamp() {
        let at = datetime!(2024-05-01 13:45:10 UTC);
        assert_eq!(default_name(at), "Version 2024-05-01 13:45:10");
    }

    #[test]
    fn test_blank_label_falls_back_to_default_name() {
        let version = Version::new("owner", PortfolioConfiguration::default(), Some("  ".into()))
            .unwrap();
        assert!(version.name.starts_with("Version "));

        let labeled = Version::new("owner", PortfolioConfiguration::default(), Some("Launch".into()))
            .unwrap();
        assert_eq!(labeled.name, "Launch");
        assert_eq!(labeled.summary().content_hash, labeled.content_hash);
    }
}
