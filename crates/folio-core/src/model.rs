//! Portfolio configuration domain model

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The full description of one portfolio page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioConfiguration {
    /// Sections in render order
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub seo: Seo,
    #[serde(default)]
    pub settings: SiteSettings,
}

impl PortfolioConfiguration {
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    pub fn contains_section(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Sections that are rendered on the public page
    pub fn visible_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.visible)
    }

    /// The configuration as served publicly: hidden sections are left out
    pub fn public_view(&self) -> PortfolioConfiguration {
        PortfolioConfiguration {
            sections: self.visible_sections().cloned().collect(),
            theme: self.theme.clone(),
            seo: self.seo.clone(),
            settings: self.settings.clone(),
        }
    }

    /// BLAKE3 digest of the serialized configuration.
    ///
    /// All maps in the model are ordered, so equal configurations hash equally.
    pub fn content_hash(&self) -> crate::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

/// One content block of the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Edit protection hint for the UI. Nothing in the model enforces it.
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub settings: SectionSettings,
    #[serde(default)]
    pub content: SectionContent,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    Hero,
    About,
    Skills,
    PortfolioGrid,
    Timeline,
    Contact,
    Testimonials,
    Gallery,
    Custom,
}

impl SectionKind {
    pub fn all() -> &'static [SectionKind] {
        &[
            SectionKind::Hero,
            SectionKind::About,
            SectionKind::Skills,
            SectionKind::PortfolioGrid,
            SectionKind::Timeline,
            SectionKind::Contact,
            SectionKind::Testimonials,
            SectionKind::Gallery,
            SectionKind::Custom,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Hero => "hero",
            SectionKind::About => "about",
            SectionKind::Skills => "skills",
            SectionKind::PortfolioGrid => "portfolio-grid",
            SectionKind::Timeline => "timeline",
            SectionKind::Contact => "contact",
            SectionKind::Testimonials => "testimonials",
            SectionKind::Gallery => "gallery",
            SectionKind::Custom => "custom",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SectionKind::Hero => "Hero Section",
            SectionKind::About => "About Me",
            SectionKind::Skills => "Skills",
            SectionKind::PortfolioGrid => "Portfolio Grid",
            SectionKind::Timeline => "Experience Timeline",
            SectionKind::Contact => "Contact",
            SectionKind::Testimonials => "Testimonials",
            SectionKind::Gallery => "Gallery",
            SectionKind::Custom => "Custom Section",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown section type '{}'", s))
    }
}

/// Per-section settings. Values are restricted to scalars.
pub type SectionSettings = BTreeMap<String, SettingValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SettingValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "boolean",
            SettingValue::Number(_) => "number",
            SettingValue::Text(_) => "string",
        }
    }

    pub fn same_type(&self, other: &SettingValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// JSON has no NaN or infinity; serde_json writes them as `null`, which
    /// cannot be read back as a setting.
    pub fn is_representable(&self) -> bool {
        match self {
            SettingValue::Number(n) => n.is_finite(),
            _ => true,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Number(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Number(f64::from(value))
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

/// Free-form section content with `title`, `description` and `data` keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionContent(Map<String, Value>);

impl SectionContent {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("title".to_string(), Value::String(title.into()));
        fields.insert("description".to_string(), Value::String(description.into()));
        fields.insert("data".to_string(), Value::Object(Map::new()));
        Self(fields)
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    pub fn data(&self) -> Option<&Value> {
        self.0.get("data")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Shallow merge: top-level keys of `partial` replace existing ones
    pub fn merge(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            self.0.insert(key, value);
        }
    }
}

impl Default for SectionContent {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// Named style tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(BTreeMap<String, String>);

impl Theme {
    pub fn get(&self, token: &str) -> Option<&str> {
        self.0.get(token).map(String::as_str)
    }

    pub fn set(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.0.insert(token.into(), value.into());
    }

    pub fn tokens(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn merge(&mut self, partial: BTreeMap<String, String>) {
        self.0.extend(partial);
    }
}

impl Default for Theme {
    fn default() -> Self {
        let tokens = [
            ("primary_color", "#3b82f6"),
            ("secondary_color", "#8b5cf6"),
            ("background_color", "#ffffff"),
            ("text_color", "#1f2937"),
            ("heading_font", "Inter"),
            ("body_font", "Inter"),
        ];
        Self(
            tokens
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Search engine and social preview metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for Seo {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            description: String::new(),
            keywords: BTreeSet::new(),
            og_image: None,
            extra: BTreeMap::new(),
        }
    }
}

impl Seo {
    pub fn merge(&mut self, patch: SeoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(keywords) = patch.keywords {
            self.keywords = keywords;
        }
        // An empty image reference clears the preview image
        if let Some(image) = patch.og_image {
            self.og_image = (!image.is_empty()).then_some(image);
        }
        self.extra.extend(patch.extra);
    }
}

/// Partial update for [`Seo`]. Unknown keys land in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Site-wide boolean feature flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteSettings(BTreeMap<String, bool>);

impl SiteSettings {
    pub fn enabled(&self, flag: &str) -> bool {
        self.0.get(flag).copied().unwrap_or(false)
    }

    pub fn flags(&self) -> &BTreeMap<String, bool> {
        &self.0
    }

    pub fn merge(&mut self, partial: BTreeMap<String, bool>) {
        self.0.extend(partial);
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        let flags = [
            ("animations_enabled", true),
            ("smooth_scroll", true),
            ("dark_mode", false),
            ("show_scroll_progress", false),
        ];
        Self(flags.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}
