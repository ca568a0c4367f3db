//! Structural validation applied before a configuration is stored

use std::collections::HashSet;

use crate::model::{PortfolioConfiguration, Section};
use crate::{CoreError, Result};

/// Check that `config` is well formed.
///
/// `previous` is the configuration currently stored for the owner, if any.
/// Sections that exist in both must keep their type, and settings keys they
/// share must keep their scalar type.
pub fn validate_configuration(
    config: &PortfolioConfiguration,
    previous: Option<&PortfolioConfiguration>,
) -> Result<()> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (index, section) in config.sections.iter().enumerate() {
        if section.id.trim().is_empty() {
            issues.push(format!("section at position {} has an empty id", index));
        } else if !seen.insert(section.id.as_str()) {
            issues.push(format!("duplicate section id '{}'", section.id));
        }

        check_content(section, &mut issues);
        check_scalars(section, &mut issues);
        check_schema(section, &mut issues);

        if let Some(before) = previous.and_then(|p| p.section(&section.id)) {
            check_stability(before, section, &mut issues);
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation { issues })
    }
}

fn check_content(section: &Section, issues: &mut Vec<String>) {
    for field in ["title", "description"] {
        match section.content.get(field) {
            Some(value) if value.is_string() => {}
            Some(_) => issues.push(format!(
                "section '{}': content.{} must be a string",
                section.id, field
            )),
            None => issues.push(format!(
                "section '{}': content.{} is missing",
                section.id, field
            )),
        }
    }
}

fn check_scalars(section: &Section, issues: &mut Vec<String>) {
    for (key, value) in &section.settings {
        if !value.is_representable() {
            issues.push(format!(
                "section '{}': setting '{}' must be a finite number",
                section.id, key
            ));
        }
    }
}

fn check_schema(section: &Section, issues: &mut Vec<String>) {
    let schema = section.kind.default_settings();
    for (key, value) in &section.settings {
        if let Some(expected) = schema.get(key)
            && !expected.same_type(value)
        {
            issues.push(format!(
                "section '{}': setting '{}' must be a {} for {} sections, got {}",
                section.id,
                key,
                expected.type_name(),
                section.kind,
                value.type_name()
            ));
        }
    }
}

fn check_stability(before: &Section, after: &Section, issues: &mut Vec<String>) {
    if before.kind != after.kind {
        issues.push(format!(
            "section '{}': type cannot change from {} to {}",
            after.id, before.kind, after.kind
        ));
    }

    for (key, value) in &after.settings {
        if let Some(old) = before.settings.get(key)
            && !old.same_type(value)
        {
            issues.push(format!(
                "section '{}': setting '{}' changed type from {} to {}",
                after.id,
                key,
                old.type_name(),
                value.type_name()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SectionKind, SettingValue};
    use crate::template::SectionTemplate;

    fn config_with(sections: Vec<Section>) -> PortfolioConfiguration {
        PortfolioConfiguration {
            sections,
            ..Default::default()
        }
    }

    fn section(id: &str, kind: SectionKind) -> Section {
        SectionTemplate::for_kind(kind).instantiate(id.to_string())
    }

    #[test]
    fn test_valid_configuration_passes() {
        let config = config_with(vec![
            section("a", SectionKind::Hero),
            section("b", SectionKind::Contact),
        ]);
        assert!(validate_configuration(&config, None).is_ok());
    }

    #[test]
    fn test_duplicate_and_empty_ids_are_reported() {
        let config = config_with(vec![
            section("a", SectionKind::Hero),
            section("a", SectionKind::About),
            section(" ", SectionKind::Skills),
        ]);

        match validate_configuration(&config, None) {
            Err(CoreError::Validation { issues }) => {
                assert_eq!(issues.len(), 2);
                assert!(issues.iter().any(|i| i.contains("duplicate section id 'a'")));
                assert!(issues.iter().any(|i| i.contains("empty id")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_type_mismatch_is_rejected() {
        let mut hero = section("a", SectionKind::Hero);
        hero.settings
            .insert("show_avatar".to_string(), SettingValue::Text("yes".into()));
        // Unknown keys are free-form
        hero.settings
            .insert("tagline_style".to_string(), SettingValue::Number(2.0));

        let err = validate_configuration(&config_with(vec![hero]), None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("show_avatar"));
        assert!(!message.contains("tagline_style"));
    }

    #[test]
    fn test_settings_types_are_stable_across_saves() {
        let mut before = section("a", SectionKind::Custom);
        before
            .settings
            .insert("accent".to_string(), SettingValue::Bool(true));
        let previous = config_with(vec![before.clone()]);

        let mut after = before;
        after
            .settings
            .insert("accent".to_string(), SettingValue::Text("red".into()));

        let result = validate_configuration(&config_with(vec![after]), Some(&previous));
        assert!(matches!(result, Err(CoreError::Validation { .. })));
    }

    #[test]
    fn test_section_type_is_immutable() {
        let previous = config_with(vec![section("a", SectionKind::Hero)]);
        let mut changed = section("a", SectionKind::Hero);
        changed.kind = SectionKind::About;

        let result = validate_configuration(&config_with(vec![changed]), Some(&previous));
        assert!(result.unwrap_err().to_string().contains("type cannot change"));
    }

    #[test]
    fn test_content_title_must_be_a_string() {
        let mut hero = section("a", SectionKind::Hero);
        let mut partial = serde_json::Map::new();
        partial.insert("title".to_string(), serde_json::json!(42));
        hero.content.merge(partial);

        let result = validate_configuration(&config_with(vec![hero]), None);
        assert!(result.unwrap_err().to_string().contains("content.title"));
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut custom = section("c", SectionKind::Custom);
            custom
                .settings
                .insert("ratio".to_string(), SettingValue::Number(bad));

            match validate_configuration(&config_with(vec![custom]), None) {
                Err(CoreError::Validation { issues }) => {
                    assert_eq!(issues.len(), 1);
                    assert!(issues[0].contains("'ratio' must be a finite number"));
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }

        let mut custom = section("c", SectionKind::Custom);
        custom
            .settings
            .insert("ratio".to_string(), SettingValue::Number(1.5));
        assert!(validate_configuration(&config_with(vec![custom]), None).is_ok());
    }
}
