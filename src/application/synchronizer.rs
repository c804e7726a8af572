//! In-memory editing copy of a profile document and its save state machine.
//!
//! Edits only touch the draft. A save snapshots the draft into a [`SaveTicket`], the caller writes
//! the snapshot to the store without holding the draft, and reports the outcome back through
//! [`ProfileSynchronizer::complete_save`] or [`ProfileSynchronizer::fail_save`].

use chrono::Utc;
use serde::Serialize;

use crate::application::app_error::{AppError, AppResult};
use crate::domain::entities::profile::{
    BuiltInSection, CustomSection, MoveDirection, NewCustomSection, ProfileDocument, ProfileUpdate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Clean,
    Dirty,
    Saving,
    DirtyWithError,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Clean => "clean",
            SyncStatus::Dirty => "dirty",
            SyncStatus::Saving => "saving",
            SyncStatus::DirtyWithError => "dirty_with_error",
        }
    }
}

/// Snapshot handed out by [`ProfileSynchronizer::begin_save`].
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub document: ProfileDocument,
    revision: u64,
    deletions: Vec<String>,
}

#[derive(Debug)]
pub struct ProfileSynchronizer {
    document: ProfileDocument,
    revision: u64,
    saved_revision: u64,
    saving: bool,
    last_error: Option<String>,
    /// Stored media detached from the draft, deleted once a save no longer references it.
    pending_deletions: Vec<String>,
}

impl ProfileSynchronizer {
    pub fn new(document: ProfileDocument) -> Self {
        Self {
            document,
            revision: 0,
            saved_revision: 0,
            saving: false,
            last_error: None,
            pending_deletions: Vec::new(),
        }
    }

    pub fn document(&self) -> &ProfileDocument {
        &self.document
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn pending_deletions(&self) -> &[String] {
        &self.pending_deletions
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status(&self) -> SyncStatus {
        if self.saving {
            SyncStatus::Saving
        } else if !self.has_unsaved_changes() {
            SyncStatus::Clean
        } else if self.last_error.is_some() {
            SyncStatus::DirtyWithError
        } else {
            SyncStatus::Dirty
        }
    }

    /// Shallow merge of `update` into the draft. An invalid update leaves the draft as it was.
    pub fn apply_edit(&mut self, update: ProfileUpdate) -> AppResult<()> {
        if update.is_empty() {
            return Ok(());
        }
        self.document = self.document.merged(update)?;
        self.revision += 1;
        Ok(())
    }

    pub fn remove_section(&mut self, section_id: &str) -> AppResult<()> {
        let update = self.document.removal_update(section_id)?;
        self.apply_edit(update)
    }

    /// Returns `false` when the section sits at the boundary or is not in the order.
    pub fn move_section(&mut self, section_id: &str, direction: MoveDirection) -> AppResult<bool> {
        match self.document.move_update(section_id, direction) {
            Some(update) => {
                self.apply_edit(update)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn add_custom_section(&mut self, new_section: NewCustomSection) -> AppResult<CustomSection> {
        let (update, section) = self.document.custom_section_update(new_section);
        self.apply_edit(update)?;
        Ok(section)
    }

    pub fn set_section_visibility(&mut self, section: BuiltInSection, visible: bool) -> AppResult<()> {
        let update = self.document.visibility_update(section, visible);
        self.apply_edit(update)
    }

    /// Removes `url` from a custom section. With `delete_blob` the stored object is queued for
    /// deletion after the next successful save.
    pub fn detach_media(&mut self, section_id: &str, url: &str, delete_blob: bool) -> AppResult<()> {
        let update = self.document.section_media_update(section_id, |section| {
            section.images.retain(|u| u != url);
            section.videos.retain(|u| u != url);
        })?;
        self.apply_edit(update)?;
        if delete_blob && !self.pending_deletions.iter().any(|u| u == url) {
            self.pending_deletions.push(url.to_string());
        }
        Ok(())
    }

    /// `Ok(None)` when there is nothing to persist.
    pub fn begin_save(&mut self) -> AppResult<Option<SaveTicket>> {
        if self.saving {
            return Err(AppError::SaveInProgress);
        }
        if !self.has_unsaved_changes() {
            return Ok(None);
        }
        self.saving = true;
        let mut document = self.document.clone();
        document.updated_at = Utc::now();
        Ok(Some(SaveTicket {
            document,
            revision: self.revision,
            deletions: self.pending_deletions.clone(),
        }))
    }

    /// Edits made while the ticket was out keep the draft dirty. Returns the detached media that
    /// neither the saved document nor the draft references anymore.
    pub fn complete_save(&mut self, ticket: SaveTicket) -> Vec<String> {
        self.saving = false;
        self.last_error = None;
        self.saved_revision = ticket.revision;
        self.document.updated_at = ticket.document.updated_at;

        self.pending_deletions.retain(|url| !ticket.deletions.contains(url));
        ticket
            .deletions
            .into_iter()
            .filter(|url| !ticket.document.references_media(url) && !self.document.references_media(url))
            .collect()
    }

    pub fn fail_save(&mut self, message: impl Into<String>) {
        self.saving = false;
        self.last_error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use crate::application::app_error::AppError;
    use crate::application::synchronizer::{ProfileSynchronizer, SyncStatus};
    use crate::domain::entities::handle::Handle;
    use crate::domain::entities::profile::{
        BuiltInSection, MoveDirection, NewCustomSection, ProfileDocument, ProfileUpdate, SectionKind,
    };

    #[fixture]
    fn synchronizer() -> ProfileSynchronizer {
        let document = ProfileDocument::new_default(Handle::parse("jdoe").unwrap(), "owner".to_string(), "John");
        ProfileSynchronizer::new(document)
    }

    fn description(value: &str) -> ProfileUpdate {
        ProfileUpdate {
            description: Some(value.to_string()),
            ..ProfileUpdate::default()
        }
    }

    #[rstest]
    fn test_new_draft_is_clean(synchronizer: ProfileSynchronizer) {
        assert_eq!(synchronizer.status(), SyncStatus::Clean);
        assert!(!synchronizer.has_unsaved_changes());
    }

    #[rstest]
    fn test_edit_marks_dirty(mut synchronizer: ProfileSynchronizer) {
        synchronizer.apply_edit(description("Hi")).unwrap();
        assert_eq!(synchronizer.status(), SyncStatus::Dirty);
        assert_eq!(synchronizer.document().description, "Hi");
    }

    #[rstest]
    fn test_empty_edit_is_ignored(mut synchronizer: ProfileSynchronizer) {
        synchronizer.apply_edit(ProfileUpdate::default()).unwrap();
        assert_eq!(synchronizer.status(), SyncStatus::Clean);
    }

    #[rstest]
    fn test_invalid_edit_keeps_state(mut synchronizer: ProfileSynchronizer) {
        let update = ProfileUpdate {
            section_order: Some(vec!["nope".to_string()]),
            ..ProfileUpdate::default()
        };
        let err = synchronizer.apply_edit(update).unwrap_err();
        assert!(matches!(err, AppError::InvalidProfile(_)));
        assert_eq!(synchronizer.status(), SyncStatus::Clean);
    }

    #[rstest]
    fn test_save_of_clean_draft_is_noop(mut synchronizer: ProfileSynchronizer) {
        assert!(synchronizer.begin_save().unwrap().is_none());
        assert_eq!(synchronizer.status(), SyncStatus::Clean);
    }

    #[rstest]
    fn test_successful_save_cleans(mut synchronizer: ProfileSynchronizer) {
        synchronizer.apply_edit(description("Hi")).unwrap();
        let ticket = synchronizer.begin_save().unwrap().unwrap();
        assert_eq!(synchronizer.status(), SyncStatus::Saving);
        assert_eq!(ticket.document.description, "Hi");

        synchronizer.complete_save(ticket);
        assert_eq!(synchronizer.status(), SyncStatus::Clean);
        assert!(synchronizer.last_error().is_none());
    }

    #[rstest]
    fn test_second_save_is_suppressed(mut synchronizer: ProfileSynchronizer) {
        synchronizer.apply_edit(description("Hi")).unwrap();
        let _ticket = synchronizer.begin_save().unwrap();
        assert!(matches!(synchronizer.begin_save(), Err(AppError::SaveInProgress)));
    }

    #[rstest]
    fn test_failed_save_keeps_document(mut synchronizer: ProfileSynchronizer) {
        synchronizer.apply_edit(description("Hi")).unwrap();
        let before = synchronizer.document().clone();
        let _ticket = synchronizer.begin_save().unwrap().unwrap();

        synchronizer.fail_save("store unavailable");

        assert_eq!(synchronizer.status(), SyncStatus::DirtyWithError);
        assert!(synchronizer.has_unsaved_changes());
        assert_eq!(synchronizer.last_error(), Some("store unavailable"));
        assert_eq!(synchronizer.document(), &before);
    }

    #[rstest]
    fn test_edit_during_save_stays_dirty(mut synchronizer: ProfileSynchronizer) {
        synchronizer.apply_edit(description("first")).unwrap();
        let ticket = synchronizer.begin_save().unwrap().unwrap();
        synchronizer.apply_edit(description("second")).unwrap();

        synchronizer.complete_save(ticket);

        assert_eq!(synchronizer.status(), SyncStatus::Dirty);
        assert_eq!(synchronizer.document().description, "second");
    }

    #[rstest]
    fn test_retry_after_failure(mut synchronizer: ProfileSynchronizer) {
        synchronizer.apply_edit(description("Hi")).unwrap();
        let _ = synchronizer.begin_save().unwrap().unwrap();
        synchronizer.fail_save("boom");

        let ticket = synchronizer.begin_save().unwrap().unwrap();
        synchronizer.complete_save(ticket);
        assert_eq!(synchronizer.status(), SyncStatus::Clean);
    }

    #[rstest]
    fn test_add_custom_section_in_one_edit(mut synchronizer: ProfileSynchronizer) {
        let section = synchronizer
            .add_custom_section(NewCustomSection {
                title: "Awards".to_string(),
                content: "Best newcomer".to_string(),
                kind: SectionKind::Text,
            })
            .unwrap();

        let document = synchronizer.document();
        assert_eq!(document.custom_sections.len(), 1);
        assert_eq!(document.section_order.last(), Some(&section.section_id));
        assert!(document.visibility_flags.show_custom_sections);
        assert_eq!(synchronizer.status(), SyncStatus::Dirty);
    }

    #[rstest]
    fn test_remove_and_move(mut synchronizer: ProfileSynchronizer) {
        assert!(!synchronizer.move_section("strengths", MoveDirection::Up).unwrap());
        assert_eq!(synchronizer.status(), SyncStatus::Clean);

        assert!(synchronizer.move_section("strengths", MoveDirection::Down).unwrap());
        assert_eq!(synchronizer.document().section_order, vec!["socialLinks", "strengths"]);

        synchronizer.remove_section("socialLinks").unwrap();
        assert_eq!(synchronizer.document().section_order, vec!["strengths"]);
        assert!(matches!(
            synchronizer.remove_section("custom_x"),
            Err(AppError::SectionNotFound(_))
        ));
    }

    #[rstest]
    fn test_set_visibility(mut synchronizer: ProfileSynchronizer) {
        synchronizer.set_section_visibility(BuiltInSection::Strengths, false).unwrap();
        assert!(!synchronizer.document().visibility_flags.show_strengths);
        assert_eq!(synchronizer.document().layout(), vec!["socialLinks"]);
    }

    fn with_gallery(synchronizer: &mut ProfileSynchronizer, urls: &[&str]) -> String {
        let section = synchronizer
            .add_custom_section(NewCustomSection {
                title: "Gallery".to_string(),
                content: String::new(),
                kind: SectionKind::Image,
            })
            .unwrap();
        let update = synchronizer
            .document()
            .section_media_update(&section.section_id, |s| s.images = urls.iter().map(|u| u.to_string()).collect())
            .unwrap();
        synchronizer.apply_edit(update).unwrap();
        let ticket = synchronizer.begin_save().unwrap().unwrap();
        synchronizer.complete_save(ticket);
        section.section_id
    }

    #[rstest]
    fn test_detached_media_is_deleted_after_save(mut synchronizer: ProfileSynchronizer) {
        let section_id = with_gallery(&mut synchronizer, &["a.png", "b.png"]);

        synchronizer.detach_media(&section_id, "a.png", true).unwrap();
        assert_eq!(synchronizer.status(), SyncStatus::Dirty);
        assert_eq!(synchronizer.pending_deletions(), ["a.png".to_string()]);

        let ticket = synchronizer.begin_save().unwrap().unwrap();
        let deletions = synchronizer.complete_save(ticket);

        assert_eq!(deletions, vec!["a.png".to_string()]);
        assert!(synchronizer.pending_deletions().is_empty());
        assert_eq!(synchronizer.document().custom_section(&section_id).unwrap().images, vec!["b.png"]);
    }

    #[rstest]
    fn test_failed_save_keeps_pending_deletions(mut synchronizer: ProfileSynchronizer) {
        let section_id = with_gallery(&mut synchronizer, &["a.png"]);
        synchronizer.detach_media(&section_id, "a.png", true).unwrap();

        let _ticket = synchronizer.begin_save().unwrap().unwrap();
        synchronizer.fail_save("store unavailable");

        assert_eq!(synchronizer.pending_deletions(), ["a.png".to_string()]);
    }

    #[rstest]
    fn test_reattached_media_is_not_deleted(mut synchronizer: ProfileSynchronizer) {
        let section_id = with_gallery(&mut synchronizer, &["a.png"]);
        synchronizer.detach_media(&section_id, "a.png", true).unwrap();
        let update = synchronizer
            .document()
            .section_media_update(&section_id, |s| s.images.push("a.png".to_string()))
            .unwrap();
        synchronizer.apply_edit(update).unwrap();

        let ticket = synchronizer.begin_save().unwrap().unwrap();
        assert!(synchronizer.complete_save(ticket).is_empty());
    }

    #[rstest]
    fn test_foreign_media_is_only_detached(mut synchronizer: ProfileSynchronizer) {
        let section_id = with_gallery(&mut synchronizer, &["https://elsewhere.example.com/a.png"]);

        synchronizer
            .detach_media(&section_id, "https://elsewhere.example.com/a.png", false)
            .unwrap();

        assert!(synchronizer.pending_deletions().is_empty());
        let ticket = synchronizer.begin_save().unwrap().unwrap();
        assert!(synchronizer.complete_save(ticket).is_empty());
    }
}
