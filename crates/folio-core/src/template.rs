//! Section templates used when adding sections

use serde::{Deserialize, Serialize};

use crate::model::{Section, SectionContent, SectionKind, SectionSettings, SettingValue};

/// Blueprint for a new section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTemplate {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub name: String,
    #[serde(default)]
    pub settings: SectionSettings,
    #[serde(default)]
    pub content: SectionContent,
}

impl SectionTemplate {
    /// Default template for a section kind
    pub fn for_kind(kind: SectionKind) -> Self {
        Self {
            kind,
            name: kind.display_name().to_string(),
            settings: kind.default_settings(),
            content: SectionContent::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// All built-in templates, one per kind
    pub fn catalog() -> Vec<SectionTemplate> {
        SectionKind::all()
            .iter()
            .copied()
            .map(SectionTemplate::for_kind)
            .collect()
    }

    /// Instantiate the template as a visible, unlocked section
    pub fn instantiate(&self, id: String) -> Section {
        Section {
            id,
            name: self.name.clone(),
            kind: self.kind,
            visible: true,
            locked: false,
            settings: self.settings.clone(),
            content: self.content.clone(),
        }
    }
}

impl SectionKind {
    /// Settings schema for this kind, with default values.
    ///
    /// The value types here are binding: a saved configuration may not store
    /// a different scalar type under one of these keys.
    pub fn default_settings(self) -> SectionSettings {
        let pairs: Vec<(&str, SettingValue)> = match self {
            SectionKind::Hero => vec![
                ("layout", "centered".into()),
                ("show_avatar", true.into()),
                ("show_cta", true.into()),
                ("background_overlay", 0.5.into()),
            ],
            SectionKind::About => vec![
                ("show_image", true.into()),
                ("image_position", "left".into()),
                ("show_resume_link", false.into()),
            ],
            SectionKind::Skills => vec![
                ("display", "bars".into()),
                ("columns", 3.into()),
                ("show_levels", true.into()),
                ("group_by_category", true.into()),
            ],
            SectionKind::PortfolioGrid => vec![
                ("columns", 3.into()),
                ("show_filters", true.into()),
                ("items_per_page", 9.into()),
                ("hover_effect", "zoom".into()),
            ],
            SectionKind::Timeline => vec![
                ("orientation", "vertical".into()),
                ("show_dates", true.into()),
                ("alternate", true.into()),
            ],
            SectionKind::Contact => vec![
                ("show_form", true.into()),
                ("show_social_links", true.into()),
                ("show_map", false.into()),
                ("email", "".into()),
            ],
            SectionKind::Testimonials => vec![
                ("autoplay", true.into()),
                ("interval_ms", 5000.into()),
                ("show_avatars", true.into()),
            ],
            SectionKind::Gallery => vec![
                ("columns", 4.into()),
                ("lightbox", true.into()),
                ("gap", 8.into()),
            ],
            SectionKind::Custom => Vec::new(),
        };

        pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_kind() {
        let catalog = SectionTemplate::catalog();
        assert_eq!(catalog.len(), SectionKind::all().len());
        assert!(catalog.iter().all(|t| !t.name.is_empty()));
    }

    #[test]
    fn test_instantiate_clones_defaults() {
        let template = SectionTemplate::for_kind(SectionKind::Skills).with_name("Tech Stack");
        let section = template.instantiate("abc".to_string());

        assert_eq!(section.id, "abc");
        assert_eq!(section.name, "Tech Stack");
        assert_eq!(section.kind, SectionKind::Skills);
        assert!(section.visible);
        assert_eq!(section.settings["columns"], SettingValue::Number(3.0));
        assert_eq!(section.settings, SectionKind::Skills.default_settings());
    }
}
