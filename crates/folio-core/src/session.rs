//! Editor session: the client-side working copy
//!
//! The session owns an undo/redo history of full configuration snapshots and
//! a Clean/Dirty flag. It performs no I/O; callers load snapshots fetched from
//! the store and report successful saves back through [`EditorSession::mark_saved`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::edit::{self, Edit};
use crate::history::{DEFAULT_HISTORY_LIMIT, EditHistory};
use crate::model::{PortfolioConfiguration, SectionSettings, SeoPatch};
use crate::template::SectionTemplate;
use crate::{CoreError, Result};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    Edited(&'static str),
    Undo,
    Redo,
    Loaded,
    Saved,
}

/// Emitted after every change to the session
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub revision: u64,
    pub change: SessionChange,
    pub dirty: bool,
}

pub struct EditorSession {
    history: EditHistory,
    dirty: bool,
    saved_version_id: Option<String>,
    revision: u64,
    events: broadcast::Sender<SessionEvent>,
}

impl EditorSession {
    pub fn new(config: PortfolioConfiguration) -> Self {
        Self::with_history_limit(config, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(config: PortfolioConfiguration, limit: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            history: EditHistory::new(config, limit),
            dirty: false,
            saved_version_id: None,
            revision: 0,
            events,
        }
    }

    /// The working copy
    pub fn config(&self) -> &PortfolioConfiguration {
        self.history.current()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Version id the working copy was last loaded from or saved as
    pub fn saved_version_id(&self) -> Option<&str> {
        self.saved_version_id.as_deref()
    }

    /// Receive a [`SessionEvent`] after each change
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Apply an edit, returning the id of the section it created, if any
    pub fn apply(&mut self, edit: Edit) -> Result<Option<String>> {
        match edit.apply(self.config())? {
            Some(applied) => {
                self.commit(applied.config, edit.name());
                Ok(applied.section_id)
            }
            None => Ok(None),
        }
    }

    pub fn add_section(&mut self, template: &SectionTemplate) -> String {
        let (next, id) = edit::add_section(self.config(), template);
        self.commit(next, "add_section");
        id
    }

    pub fn remove_section(&mut self, id: &str) -> Result<()> {
        let next = edit::remove_section(self.config(), id)?;
        self.commit(next, "remove_section");
        Ok(())
    }

    pub fn toggle_section_visibility(&mut self, id: &str) -> Result<()> {
        self.apply(Edit::ToggleSectionVisibility { id: id.to_string() })
            .map(drop)
    }

    pub fn toggle_section_lock(&mut self, id: &str) -> Result<()> {
        self.apply(Edit::ToggleSectionLock { id: id.to_string() })
            .map(drop)
    }

    pub fn rename_section(&mut self, id: &str, name: impl Into<String>) -> Result<()> {
        self.apply(Edit::RenameSection {
            id: id.to_string(),
            name: name.into(),
        })
        .map(drop)
    }

    pub fn duplicate_section(&mut self, id: &str) -> Result<String> {
        let (next, new_id) = edit::duplicate_section(self.config(), id)?;
        self.commit(next, "duplicate_section");
        Ok(new_id)
    }

    /// Move one section. Equal indices leave the session untouched.
    pub fn reorder_sections(&mut self, from: usize, to: usize) -> Result<()> {
        if let Some(next) = edit::reorder_sections(self.config(), from, to)? {
            self.commit(next, "reorder_sections");
        }
        Ok(())
    }

    pub fn update_theme(&mut self, partial: BTreeMap<String, String>) -> Result<()> {
        self.apply(Edit::UpdateTheme { theme: partial }).map(drop)
    }

    pub fn update_seo(&mut self, partial: SeoPatch) -> Result<()> {
        self.apply(Edit::UpdateSeo { seo: partial }).map(drop)
    }

    pub fn update_settings(&mut self, partial: BTreeMap<String, bool>) -> Result<()> {
        self.apply(Edit::UpdateSettings { settings: partial })
            .map(drop)
    }

    pub fn update_section_content(&mut self, id: &str, partial: Map<String, Value>) -> Result<()> {
        self.apply(Edit::UpdateSectionContent {
            id: id.to_string(),
            content: partial,
        })
        .map(drop)
    }

    pub fn update_section_settings(&mut self, id: &str, partial: SectionSettings) -> Result<()> {
        self.apply(Edit::UpdateSectionSettings {
            id: id.to_string(),
            settings: partial,
        })
        .map(drop)
    }

    /// Step back one snapshot. Returns false at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo();
        if moved {
            self.dirty = true;
            self.notify(SessionChange::Undo);
        }
        moved
    }

    /// Step forward one snapshot. Returns false at the newest entry.
    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo();
        if moved {
            self.dirty = true;
            self.notify(SessionChange::Redo);
        }
        moved
    }

    /// Replace the working copy and reset history. The session becomes clean.
    pub fn load_snapshot(&mut self, config: PortfolioConfiguration) {
        self.history.reset(config);
        self.dirty = false;
        self.saved_version_id = None;
        self.notify(SessionChange::Loaded);
    }

    /// Like [`load_snapshot`](Self::load_snapshot) for a configuration that
    /// came out of the store as `version_id`
    pub fn load_version(&mut self, config: PortfolioConfiguration, version_id: impl Into<String>) {
        self.load_snapshot(config);
        self.saved_version_id = Some(version_id.into());
    }

    /// Record a successful save of `saved` as `version_id`.
    ///
    /// The session only becomes clean if the working copy still equals what
    /// was saved; edits made while the save was in flight keep it dirty.
    pub fn mark_saved(&mut self, version_id: impl Into<String>, saved: &PortfolioConfiguration) -> bool {
        self.saved_version_id = Some(version_id.into());
        let clean = self.config() == saved;
        if clean {
            self.dirty = false;
        }
        self.notify(SessionChange::Saved);
        clean
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.config())?)
    }

    /// Replace the working copy with a JSON document. Counts as an edit.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let config: PortfolioConfiguration =
            serde_json::from_str(text).map_err(CoreError::Parse)?;
        self.commit(config, "import_json");
        Ok(())
    }

    fn commit(&mut self, next: PortfolioConfiguration, op: &'static str) {
        self.history.push(next);
        self.dirty = true;
        self.notify(SessionChange::Edited(op));
    }

    fn notify(&mut self, change: SessionChange) {
        self.revision += 1;
        // No subscribers is fine
        let _ = self.events.send(SessionEvent {
            revision: self.revision,
            change,
            dirty: self.dirty,
        });
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(PortfolioConfiguration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SectionKind, SettingValue};

    fn session_with_abc() -> (EditorSession, [String; 3]) {
        let mut session = EditorSession::default();
        let a = session.add_section(&SectionTemplate::for_kind(SectionKind::Hero).with_name("A"));
        let b = session.add_section(&SectionTemplate::for_kind(SectionKind::About).with_name("B"));
        let c = session.add_section(&SectionTemplate::for_kind(SectionKind::Contact).with_name("C"));
        let config = session.config().clone();
        session.load_snapshot(config);
        (session, [a, b, c])
    }

    fn names(session: &EditorSession) -> Vec<&str> {
        session.config().sections.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_reorder_toggle_then_undo_twice() {
        let (mut session, [_, _, c]) = session_with_abc();

        session.reorder_sections(0, 2).unwrap();
        assert_eq!(names(&session), vec!["B", "C", "A"]);

        session.toggle_section_visibility(&c).unwrap();
        assert!(!session.config().section(&c).unwrap().visible);
        assert_eq!(names(&session), vec!["B", "C", "A"]);

        assert!(session.undo());
        assert!(session.undo());
        assert_eq!(names(&session), vec!["A", "B", "C"]);
        assert!(session.config().sections.iter().all(|s| s.visible));
    }

    #[test]
    fn test_n_mutations_then_n_undos_restores_original() {
        let (mut session, [a, b, _]) = session_with_abc();
        let original = session.config().clone();

        session.rename_section(&a, "Intro").unwrap();
        session.duplicate_section(&b).unwrap();
        session.reorder_sections(3, 0).unwrap();
        session
            .update_theme(BTreeMap::from([("primary_color".to_string(), "#111".to_string())]))
            .unwrap();
        session
            .update_settings(BTreeMap::from([("dark_mode".to_string(), true)]))
            .unwrap();
        session.remove_section(&a).unwrap();

        for _ in 0..6 {
            assert!(session.undo());
        }
        assert!(!session.can_undo());
        assert_eq!(session.config(), &original);
    }

    #[test]
    fn test_undo_then_redo_restores_latest() {
        let (mut session, [a, b, c]) = session_with_abc();
        session.toggle_section_lock(&a).unwrap();
        session.remove_section(&b).unwrap();
        session
            .update_section_settings(&c, SectionSettings::from([("show_map".to_string(), SettingValue::Bool(true))]))
            .unwrap();
        let latest = session.config().clone();

        for m in 1..=3 {
            for _ in 0..m {
                session.undo();
            }
            for _ in 0..m {
                session.redo();
            }
            assert_eq!(session.config(), &latest);
        }
    }

    #[test]
    fn test_mutation_after_undo_clears_redo() {
        let (mut session, [a, b, _]) = session_with_abc();
        session.rename_section(&a, "one").unwrap();
        session.rename_section(&b, "two").unwrap();
        session.undo();
        session.toggle_section_visibility(&a).unwrap();

        assert!(!session.can_redo());
        let before = session.config().clone();
        assert!(!session.redo());
        assert_eq!(session.config(), &before);
    }

    #[test]
    fn test_undo_redo_at_boundaries_are_noops() {
        let mut session = EditorSession::default();
        assert!(!session.undo());
        assert!(!session.redo());
        assert!(!session.is_dirty());
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn test_remove_unknown_section_leaves_config() {
        let (mut session, _) = session_with_abc();
        let err = session.remove_section("missing").unwrap_err();

        assert!(matches!(err, CoreError::NotFound { .. }));
        assert_eq!(session.config().sections.len(), 3);
        assert!(!session.is_dirty());
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_reorder_same_index_pushes_nothing() {
        let (mut session, _) = session_with_abc();
        session.reorder_sections(1, 1).unwrap();

        assert_eq!(names(&session), vec!["A", "B", "C"]);
        assert_eq!(session.history_len(), 1);
        assert!(!session.is_dirty());

        let err = session.reorder_sections(0, 3).unwrap_err();
        assert!(matches!(err, CoreError::Range { index: 3, len: 3 }));
    }

    #[test]
    fn test_export_import_round_trip() {
        let (mut session, [a, _, _]) = session_with_abc();
        let mut content = Map::new();
        content.insert("title".to_string(), Value::String("Hi, I'm Jane".into()));
        content.insert("data".to_string(), serde_json::json!({"links": ["gh", "li"]}));
        session.update_section_content(&a, content).unwrap();
        session
            .update_seo(SeoPatch {
                keywords: Some(["rust".to_string(), "design".to_string()].into()),
                ..Default::default()
            })
            .unwrap();

        let exported = session.export_json().unwrap();
        let mut other = EditorSession::default();
        other.import_json(&exported).unwrap();

        assert_eq!(other.config(), session.config());
        assert!(other.is_dirty());
    }

    #[test]
    fn test_import_malformed_json_keeps_working_copy() {
        let (mut session, _) = session_with_abc();
        let before = session.config().clone();

        let err = session.import_json("{ not json").unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
        assert_eq!(session.config(), &before);
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_clean_dirty_transitions() {
        let (mut session, [a, _, _]) = session_with_abc();
        assert!(!session.is_dirty());

        session.toggle_section_visibility(&a).unwrap();
        assert!(session.is_dirty());

        let saved = session.config().clone();
        assert!(session.mark_saved("v1", &saved));
        assert!(!session.is_dirty());
        assert_eq!(session.saved_version_id(), Some("v1"));

        session.undo();
        assert!(session.is_dirty());

        session.load_version(saved, "v1");
        assert!(!session.is_dirty());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_mark_saved_with_stale_snapshot_stays_dirty() {
        let (mut session, [a, b, _]) = session_with_abc();
        session.rename_section(&a, "first").unwrap();
        let in_flight = session.config().clone();
        session.rename_section(&b, "second").unwrap();

        assert!(!session.mark_saved("v2", &in_flight));
        assert!(session.is_dirty());
    }

    #[test]
    fn test_subscribers_receive_events() {
        let (mut session, [a, _, _]) = session_with_abc();
        let mut rx = session.subscribe();

        session.toggle_section_visibility(&a).unwrap();
        session.undo();

        let first = rx.try_recv().unwrap();
        assert_eq!(first.change, SessionChange::Edited("toggle_section_visibility"));
        assert!(first.dirty);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.change, SessionChange::Undo);
        assert_eq!(second.revision, first.revision + 1);
    }

    #[test]
    fn test_apply_add_section_returns_new_id() {
        let mut session = EditorSession::default();
        let id = session
            .apply(Edit::AddSection {
                template: SectionTemplate::for_kind(SectionKind::Gallery),
            })
            .unwrap()
            .unwrap();

        let section = session.config().section(&id).unwrap();
        assert_eq!(section.kind, SectionKind::Gallery);
        assert_eq!(section.settings, SectionKind::Gallery.default_settings());
    }

    #[test]
    fn test_locked_sections_remain_editable() {
        let (mut session, [a, _, _]) = session_with_abc();
        session.toggle_section_lock(&a).unwrap();
        session.rename_section(&a, "Still editable").unwrap();
        assert_eq!(session.config().section(&a).unwrap().name, "Still editable");
    }
}
