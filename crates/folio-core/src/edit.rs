//! Editor operations as pure transforms over a configuration
//!
//! Every operation takes the current configuration by reference and returns
//! a new one, so a failed edit never leaves a half-applied state behind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{PortfolioConfiguration, SectionSettings, SeoPatch};
use crate::template::SectionTemplate;
use crate::{CoreError, Result};

/// A single editor operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    AddSection { template: SectionTemplate },
    RemoveSection { id: String },
    ToggleSectionVisibility { id: String },
    ToggleSectionLock { id: String },
    RenameSection { id: String, name: String },
    DuplicateSection { id: String },
    ReorderSections { from: usize, to: usize },
    UpdateTheme { theme: BTreeMap<String, String> },
    UpdateSeo { seo: SeoPatch },
    UpdateSettings { settings: BTreeMap<String, bool> },
    UpdateSectionContent { id: String, content: Map<String, Value> },
    UpdateSectionSettings { id: String, settings: SectionSettings },
    ReplaceConfiguration { config: Box<PortfolioConfiguration> },
}

/// Result of applying an [`Edit`] that changed something
#[derive(Debug, Clone)]
pub struct Applied {
    pub config: PortfolioConfiguration,
    /// Id of the section created by the edit, if it created one
    pub section_id: Option<String>,
}

impl Applied {
    fn new(config: PortfolioConfiguration) -> Self {
        Self {
            config,
            section_id: None,
        }
    }
}

impl Edit {
    pub fn name(&self) -> &'static str {
        match self {
            Edit::AddSection { .. } => "add_section",
            Edit::RemoveSection { .. } => "remove_section",
            Edit::ToggleSectionVisibility { .. } => "toggle_section_visibility",
            Edit::ToggleSectionLock { .. } => "toggle_section_lock",
            Edit::RenameSection { .. } => "rename_section",
            Edit::DuplicateSection { .. } => "duplicate_section",
            Edit::ReorderSections { .. } => "reorder_sections",
            Edit::UpdateTheme { .. } => "update_theme",
            Edit::UpdateSeo { .. } => "update_seo",
            Edit::UpdateSettings { .. } => "update_settings",
            Edit::UpdateSectionContent { .. } => "update_section_content",
            Edit::UpdateSectionSettings { .. } => "update_section_settings",
            Edit::ReplaceConfiguration { .. } => "replace_configuration",
        }
    }

    /// Apply the edit to `config`.
    ///
    /// Returns `Ok(None)` when the edit is a no-op (reordering a section onto
    /// its own position).
    pub fn apply(&self, config: &PortfolioConfiguration) -> Result<Option<Applied>> {
        let applied = match self {
            Edit::AddSection { template } => {
                let (config, id) = add_section(config, template);
                Applied {
                    config,
                    section_id: Some(id),
                }
            }
            Edit::RemoveSection { id } => Applied::new(remove_section(config, id)?),
            Edit::ToggleSectionVisibility { id } => Applied::new(with_section(config, id, |s| {
                s.visible = !s.visible;
            })?),
            Edit::ToggleSectionLock { id } => Applied::new(with_section(config, id, |s| {
                s.locked = !s.locked;
            })?),
            Edit::RenameSection { id, name } => Applied::new(with_section(config, id, |s| {
                s.name = name.clone();
            })?),
            Edit::DuplicateSection { id } => {
                let (config, new_id) = duplicate_section(config, id)?;
                Applied {
                    config,
                    section_id: Some(new_id),
                }
            }
            Edit::ReorderSections { from, to } => match reorder_sections(config, *from, *to)? {
                Some(config) => Applied::new(config),
                None => return Ok(None),
            },
            Edit::UpdateTheme { theme } => {
                let mut next = config.clone();
                next.theme.merge(theme.clone());
                Applied::new(next)
            }
            Edit::UpdateSeo { seo } => {
                let mut next = config.clone();
                next.seo.merge(seo.clone());
                Applied::new(next)
            }
            Edit::UpdateSettings { settings } => {
                let mut next = config.clone();
                next.settings.merge(settings.clone());
                Applied::new(next)
            }
            Edit::UpdateSectionContent { id, content } => {
                Applied::new(with_section(config, id, |s| s.content.merge(content.clone()))?)
            }
            Edit::UpdateSectionSettings { id, settings } => {
                Applied::new(with_section(config, id, |s| {
                    s.settings.extend(settings.clone());
                })?)
            }
            Edit::ReplaceConfiguration { config } => Applied::new((**config).clone()),
        };

        Ok(Some(applied))
    }
}

/// Generate a section id that is not used in `config`
pub fn fresh_section_id(config: &PortfolioConfiguration) -> String {
    loop {
        let id = uuid::Uuid::new_v4().to_string();
        if !config.contains_section(&id) {
            return id;
        }
    }
}

pub fn add_section(
    config: &PortfolioConfiguration,
    template: &SectionTemplate,
) -> (PortfolioConfiguration, String) {
    let id = fresh_section_id(config);
    let mut next = config.clone();
    next.sections.push(template.instantiate(id.clone()));
    (next, id)
}

pub fn remove_section(config: &PortfolioConfiguration, id: &str) -> Result<PortfolioConfiguration> {
    let index = config
        .position(id)
        .ok_or_else(|| CoreError::section_not_found(id))?;
    let mut next = config.clone();
    next.sections.remove(index);
    Ok(next)
}

pub fn duplicate_section(
    config: &PortfolioConfiguration,
    id: &str,
) -> Result<(PortfolioConfiguration, String)> {
    let index = config
        .position(id)
        .ok_or_else(|| CoreError::section_not_found(id))?;

    let new_id = fresh_section_id(config);
    let mut copy = config.sections[index].clone();
    copy.id = new_id.clone();
    copy.name = format!("{} (Copy)", copy.name);

    let mut next = config.clone();
    next.sections.insert(index + 1, copy);
    Ok((next, new_id))
}

/// Move the section at `from` to `to`. `None` means nothing moved.
pub fn reorder_sections(
    config: &PortfolioConfiguration,
    from: usize,
    to: usize,
) -> Result<Option<PortfolioConfiguration>> {
    let len = config.sections.len();
    for index in [from, to] {
        if index >= len {
            return Err(CoreError::Range { index, len });
        }
    }
    if from == to {
        return Ok(None);
    }

    let mut next = config.clone();
    let section = next.sections.remove(from);
    next.sections.insert(to, section);
    Ok(Some(next))
}

fn with_section<F>(config: &PortfolioConfiguration, id: &str, f: F) -> Result<PortfolioConfiguration>
where
    F: FnOnce(&mut crate::model::Section),
{
    let mut next = config.clone();
    let section = next
        .section_mut(id)
        .ok_or_else(|| CoreError::section_not_found(id))?;
    f(section);
    Ok(next)
}
