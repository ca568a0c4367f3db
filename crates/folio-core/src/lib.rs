//! Core domain models and logic for folio
//!
//! This crate contains:
//! - Domain models (PortfolioConfiguration, Section, Version)
//! - Section templates and save-time validation
//! - Editor operations and the undo/redo editor session

pub mod edit;
pub mod error;
pub mod history;
pub mod model;
pub mod session;
pub mod template;
pub mod validate;
pub mod version;

pub use edit::{Applied, Edit};
pub use error::{CoreError, Result};
pub use history::{DEFAULT_HISTORY_LIMIT, EditHistory};
pub use model::{
    PortfolioConfiguration, Section, SectionContent, SectionKind, SectionSettings, Seo, SeoPatch,
    SettingValue, SiteSettings, Theme,
};
pub use session::{EditorSession, SessionChange, SessionEvent};
pub use template::SectionTemplate;
pub use validate::validate_configuration;
pub use version::{Version, VersionSummary};
