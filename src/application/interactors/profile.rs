use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::app_error::{AppError, AppResult};
use crate::application::drafts::{DraftRegistry, SharedDraft};
use crate::application::dto::profile::{
    AddCustomSectionDTO, AddedCustomSectionDTO, DraftAccessDTO, DraftDTO, EditDraftDTO, GetProfileDTO,
    MoveSectionDTO, PublicProfileDTO, RemoveSectionDTO, SetSectionVisibilityDTO,
};
use crate::application::interface::db::DBSession;
use crate::application::interface::gateway::profile::{ProfileReader, ProfileWriter};
use crate::application::interface::s3::BlobStore;
use crate::domain::entities::handle::Handle;

const SAVE_FAILED: &str = "Failed to save profile";

#[derive(Clone)]
pub struct GetPublicProfileInteractor {
    profile_reader: Arc<dyn ProfileReader>,
}

impl GetPublicProfileInteractor {
    pub fn new(profile_reader: Arc<dyn ProfileReader>) -> Self {
        Self { profile_reader }
    }

    /// Reads the last saved version; open drafts are not visible to visitors.
    pub async fn execute(&self, dto: GetProfileDTO) -> AppResult<PublicProfileDTO> {
        let handle = Handle::parse(&dto.handle).map_err(|_| AppError::ProfileNotFound)?;
        let profile = self
            .profile_reader
            .find_by_handle(&handle)
            .await?
            .ok_or(AppError::ProfileNotFound)?;
        let is_owner = dto.viewer_id.as_deref() == Some(profile.owner_id.as_str());
        Ok(PublicProfileDTO {
            layout: profile.layout(),
            profile,
            is_owner,
        })
    }
}

/// Dependencies shared by every interactor that works on an owner's draft.
#[derive(Clone)]
pub struct DraftContext {
    drafts: Arc<DraftRegistry>,
    profile_reader: Arc<dyn ProfileReader>,
}

impl DraftContext {
    pub fn new(drafts: Arc<DraftRegistry>, profile_reader: Arc<dyn ProfileReader>) -> Self {
        Self { drafts, profile_reader }
    }

    pub async fn open(&self, access: &DraftAccessDTO) -> AppResult<SharedDraft> {
        self.drafts
            .open_owned(self.profile_reader.as_ref(), &access.handle, &access.user_id)
            .await
    }
}

#[derive(Clone)]
pub struct OpenDraftInteractor {
    context: DraftContext,
}

impl OpenDraftInteractor {
    pub fn new(context: DraftContext) -> Self {
        Self { context }
    }

    pub async fn execute(&self, access: DraftAccessDTO) -> AppResult<DraftDTO> {
        let draft = self.context.open(&access).await?;
        let synchronizer = draft.lock().await;
        Ok(DraftDTO::from(&*synchronizer))
    }
}

#[derive(Clone)]
pub struct EditDraftInteractor {
    context: DraftContext,
}

impl EditDraftInteractor {
    pub fn new(context: DraftContext) -> Self {
        Self { context }
    }

    pub async fn execute(&self, dto: EditDraftDTO) -> AppResult<DraftDTO> {
        let draft = self.context.open(&dto.access).await?;
        let mut synchronizer = draft.lock().await;
        synchronizer.apply_edit(dto.update)?;
        Ok(DraftDTO::from(&*synchronizer))
    }
}

#[derive(Clone)]
pub struct MoveSectionInteractor {
    context: DraftContext,
}

impl MoveSectionInteractor {
    pub fn new(context: DraftContext) -> Self {
        Self { context }
    }

    pub async fn execute(&self, dto: MoveSectionDTO) -> AppResult<DraftDTO> {
        let draft = self.context.open(&dto.access).await?;
        let mut synchronizer = draft.lock().await;
        synchronizer.move_section(&dto.section_id, dto.direction)?;
        Ok(DraftDTO::from(&*synchronizer))
    }
}

#[derive(Clone)]
pub struct RemoveSectionInteractor {
    context: DraftContext,
}

impl RemoveSectionInteractor {
    pub fn new(context: DraftContext) -> Self {
        Self { context }
    }

    pub async fn execute(&self, dto: RemoveSectionDTO) -> AppResult<DraftDTO> {
        let draft = self.context.open(&dto.access).await?;
        let mut synchronizer = draft.lock().await;
        synchronizer.remove_section(&dto.section_id)?;
        Ok(DraftDTO::from(&*synchronizer))
    }
}

#[derive(Clone)]
pub struct AddCustomSectionInteractor {
    context: DraftContext,
}

impl AddCustomSectionInteractor {
    pub fn new(context: DraftContext) -> Self {
        Self { context }
    }

    pub async fn execute(&self, dto: AddCustomSectionDTO) -> AppResult<AddedCustomSectionDTO> {
        let draft = self.context.open(&dto.access).await?;
        let mut synchronizer = draft.lock().await;
        let section = synchronizer.add_custom_section(dto.section)?;
        Ok(AddedCustomSectionDTO {
            section,
            draft: DraftDTO::from(&*synchronizer),
        })
    }
}

#[derive(Clone)]
pub struct SetSectionVisibilityInteractor {
    context: DraftContext,
}

impl SetSectionVisibilityInteractor {
    pub fn new(context: DraftContext) -> Self {
        Self { context }
    }

    pub async fn execute(&self, dto: SetSectionVisibilityDTO) -> AppResult<DraftDTO> {
        let draft = self.context.open(&dto.access).await?;
        let mut synchronizer = draft.lock().await;
        synchronizer.set_section_visibility(dto.section, dto.visible)?;
        Ok(DraftDTO::from(&*synchronizer))
    }
}

#[derive(Clone)]
pub struct DiscardDraftInteractor {
    context: DraftContext,
}

impl DiscardDraftInteractor {
    pub fn new(context: DraftContext) -> Self {
        Self { context }
    }

    /// Drops unsaved edits; the next access reloads the stored document.
    pub async fn execute(&self, access: DraftAccessDTO) -> AppResult<()> {
        self.context.open(&access).await?;
        self.context.drafts.remove(&access.handle).await;
        info!("Draft of {} discarded", access.handle);
        Ok(())
    }
}

#[derive(Clone)]
pub struct SaveDraftInteractor {
    context: DraftContext,
    db_session: Arc<dyn DBSession>,
    profile_writer: Arc<dyn ProfileWriter>,
    blob_store: Arc<dyn BlobStore>,
}

impl SaveDraftInteractor {
    pub fn new(
        context: DraftContext,
        db_session: Arc<dyn DBSession>,
        profile_writer: Arc<dyn ProfileWriter>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            context,
            db_session,
            profile_writer,
            blob_store,
        }
    }

    /// Persists the draft. The write runs in its own task so the outcome is recorded on the draft
    /// even if the caller goes away; a second save while one is running fails with
    /// `SaveInProgress`. Media detached before the save is deleted from storage afterwards, and
    /// a draft left clean is released from memory.
    pub async fn execute(&self, access: DraftAccessDTO) -> AppResult<DraftDTO> {
        let draft = self.context.open(&access).await?;
        let ticket = {
            let mut synchronizer = draft.lock().await;
            match synchronizer.begin_save()? {
                Some(ticket) => ticket,
                None => return Ok(DraftDTO::from(&*synchronizer)),
            }
        };

        let db_session = self.db_session.clone();
        let profile_writer = self.profile_writer.clone();
        let blob_store = self.blob_store.clone();
        let handle = access.handle.clone();
        let task = tokio::spawn(async move {
            let result = match profile_writer.replace(ticket.document.clone()).await {
                Ok(()) => db_session.commit().await,
                Err(err) => Err(err),
            };
            if let Err(err) = &result {
                error!("Saving profile {} failed: {}", handle, err);
                if let Err(rollback_err) = db_session.rollback().await {
                    warn!("Rollback after failed save of {} failed: {}", handle, rollback_err);
                }
            }

            let (outcome, deletions) = {
                let mut synchronizer = draft.lock().await;
                match result {
                    Ok(()) => {
                        let deletions = synchronizer.complete_save(ticket);
                        info!("Profile {} saved", handle);
                        (Ok(DraftDTO::from(&*synchronizer)), deletions)
                    }
                    Err(_) => {
                        synchronizer.fail_save(SAVE_FAILED);
                        (Err(AppError::PersistenceError(SAVE_FAILED.to_string())), Vec::new())
                    }
                }
            };

            for url in deletions {
                match blob_store.delete(&url).await {
                    Ok(()) => info!("Detached media {} of {} deleted", url, handle),
                    Err(err) => warn!("Detached media {} of {} left in storage: {}", url, handle, err),
                }
            }
            outcome
        });

        let outcome = task.await.map_err(|e| AppError::PersistenceError(e.to_string()))?;
        if outcome.is_ok() && self.context.drafts.release(&access.handle).await {
            debug!("Draft of {} released after save", access.handle);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use mockall::mock;
    use rstest::{fixture, rstest};

    use crate::application::app_error::{AppError, AppResult};
    use crate::application::drafts::DraftRegistry;
    use crate::application::dto::profile::{
        AddCustomSectionDTO, DraftAccessDTO, EditDraftDTO, GetProfileDTO, MoveSectionDTO, RemoveSectionDTO,
        SetSectionVisibilityDTO,
    };
    use crate::application::interactors::profile::{
        AddCustomSectionInteractor, DiscardDraftInteractor, DraftContext, EditDraftInteractor,
        GetPublicProfileInteractor, MoveSectionInteractor, OpenDraftInteractor, RemoveSectionInteractor,
        SaveDraftInteractor, SetSectionVisibilityInteractor,
    };
    use crate::application::interface::db::DBSession;
    use crate::application::interface::gateway::profile::{ProfileReader, ProfileWriter};
    use crate::application::interface::s3::BlobStore;
    use crate::application::synchronizer::SyncStatus;
    use crate::domain::entities::handle::Handle;
    use crate::domain::entities::profile::{
        BuiltInSection, CustomSection, MoveDirection, NewCustomSection, ProfileDocument, ProfileUpdate, SectionKind,
    };

    // Mocks
    mock! {
        pub DBSessionMock {}

        #[async_trait]
        impl DBSession for DBSessionMock {
            async fn commit(&self) -> AppResult<()>;
            async fn rollback(&self) -> AppResult<()>;
        }
    }

    mock! {
        pub ProfileReaderMock {}

        #[async_trait]
        impl ProfileReader for ProfileReaderMock {
            async fn find_by_handle(&self, handle: &Handle) -> AppResult<Option<ProfileDocument>>;
            async fn exists(&self, handle: &Handle) -> AppResult<bool>;
        }
    }

    mock! {
        pub BlobStoreMock {}

        #[async_trait]
        impl BlobStore for BlobStoreMock {
            async fn put(&self, path: &str, data: bytes::Bytes, content_type: &str) -> AppResult<String>;
            async fn delete(&self, url: &str) -> AppResult<()>;
            fn key_of(&self, url: &str) -> Option<String>;
        }
    }

    mock! {
        pub ProfileWriterMock {}

        #[async_trait]
        impl ProfileWriter for ProfileWriterMock {
            async fn insert_if_absent(&self, document: ProfileDocument) -> AppResult<bool>;
            async fn replace(&self, document: ProfileDocument) -> AppResult<()>;
        }
    }

    // Constants
    const OWNER_ID: &str = "019c47ec-183d-744e-b11d-cd409015bf13";
    const OTHER_ID: &str = "019c47ec-2160-7e53-bf7e-06db2a1bad85";
    const HANDLE: &str = "jdoe";

    // Fixtures
    #[fixture]
    fn access() -> DraftAccessDTO {
        DraftAccessDTO {
            handle: HANDLE.to_string(),
            user_id: OWNER_ID.to_string(),
        }
    }

    fn document() -> ProfileDocument {
        ProfileDocument::new_default(Handle::parse(HANDLE).unwrap(), OWNER_ID.to_string(), "John")
    }

    fn stored_reader() -> MockProfileReaderMock {
        let mut reader = MockProfileReaderMock::new();
        reader.expect_find_by_handle().returning(|_| Ok(Some(document())));
        reader
    }

    fn context(reader: MockProfileReaderMock) -> DraftContext {
        DraftContext::new(Arc::new(DraftRegistry::new()), Arc::new(reader))
    }

    fn description(value: &str) -> ProfileUpdate {
        ProfileUpdate {
            description: Some(value.to_string()),
            ..ProfileUpdate::default()
        }
    }

    // GetPublicProfileInteractor tests
    #[rstest]
    #[case(Some(OWNER_ID), true)]
    #[case(Some(OTHER_ID), false)]
    #[case(None, false)]
    #[tokio::test]
    async fn test_public_profile(#[case] viewer: Option<&str>, #[case] is_owner: bool) {
        let interactor = GetPublicProfileInteractor::new(Arc::new(stored_reader()));
        let result = interactor
            .execute(GetProfileDTO {
                handle: HANDLE.to_string(),
                viewer_id: viewer.map(str::to_string),
            })
            .await
            .unwrap();

        assert_eq!(result.is_owner, is_owner);
        assert_eq!(result.layout, vec!["strengths", "socialLinks"]);
    }

    #[rstest]
    #[case("ghost")]
    #[case("-bad-")]
    #[tokio::test]
    async fn test_public_profile_not_found(#[case] handle: &str) {
        let mut reader = MockProfileReaderMock::new();
        reader.expect_find_by_handle().returning(|_| Ok(None));

        let result = GetPublicProfileInteractor::new(Arc::new(reader))
            .execute(GetProfileDTO {
                handle: handle.to_string(),
                viewer_id: None,
            })
            .await;
        assert!(matches!(result.unwrap_err(), AppError::ProfileNotFound));
    }

    // Draft editing tests
    #[rstest]
    #[tokio::test]
    async fn test_open_draft_is_clean(access: DraftAccessDTO) {
        let draft = OpenDraftInteractor::new(context(stored_reader()))
            .execute(access)
            .await
            .unwrap();
        assert_eq!(draft.status, SyncStatus::Clean);
        assert!(!draft.has_unsaved_changes);
    }

    #[rstest]
    #[tokio::test]
    async fn test_open_draft_of_someone_else(mut access: DraftAccessDTO) {
        access.user_id = OTHER_ID.to_string();
        let result = OpenDraftInteractor::new(context(stored_reader())).execute(access).await;
        assert!(matches!(result.unwrap_err(), AppError::AccessDenied));
    }

    #[rstest]
    #[tokio::test]
    async fn test_edit_then_open_reflects_merge(access: DraftAccessDTO) {
        let context = context(stored_reader());
        let edited = EditDraftInteractor::new(context.clone())
            .execute(EditDraftDTO {
                access: access.clone(),
                update: description("Hello there"),
            })
            .await
            .unwrap();
        assert_eq!(edited.status, SyncStatus::Dirty);

        let reopened = OpenDraftInteractor::new(context).execute(access).await.unwrap();
        let mut expected = document();
        expected.description = "Hello there".to_string();
        expected.created_at = reopened.profile.created_at;
        expected.updated_at = reopened.profile.updated_at;
        assert_eq!(reopened.profile, expected);
        assert!(reopened.has_unsaved_changes);
    }

    #[rstest]
    #[tokio::test]
    async fn test_invalid_edit_rejected(access: DraftAccessDTO) {
        let result = EditDraftInteractor::new(context(stored_reader()))
            .execute(EditDraftDTO {
                access,
                update: ProfileUpdate {
                    section_order: Some(vec!["strengths".to_string(), "strengths".to_string()]),
                    ..ProfileUpdate::default()
                },
            })
            .await;
        assert!(matches!(result.unwrap_err(), AppError::InvalidProfile(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn test_add_then_remove_custom_section(access: DraftAccessDTO) {
        let context = context(stored_reader());
        let added = AddCustomSectionInteractor::new(context.clone())
            .execute(AddCustomSectionDTO {
                access: access.clone(),
                section: NewCustomSection {
                    title: "Awards".to_string(),
                    content: "Best newcomer".to_string(),
                    kind: SectionKind::Text,
                },
            })
            .await
            .unwrap();
        assert_eq!(added.draft.profile.custom_sections.len(), 1);
        assert!(added.draft.profile.section_order.contains(&added.section.section_id));
        assert!(added.draft.profile.visibility_flags.show_custom_sections);

        let removed = RemoveSectionInteractor::new(context)
            .execute(RemoveSectionDTO {
                access,
                section_id: added.section.section_id.clone(),
            })
            .await
            .unwrap();
        assert!(removed.profile.custom_sections.is_empty());
        assert!(!removed.profile.section_order.contains(&added.section.section_id));
    }

    #[rstest]
    #[case(MoveDirection::Up, vec!["strengths", "socialLinks"], SyncStatus::Clean)]
    #[case(MoveDirection::Down, vec!["socialLinks", "strengths"], SyncStatus::Dirty)]
    #[tokio::test]
    async fn test_move_section(
        access: DraftAccessDTO,
        #[case] direction: MoveDirection,
        #[case] expected: Vec<&str>,
        #[case] status: SyncStatus,
    ) {
        let draft = MoveSectionInteractor::new(context(stored_reader()))
            .execute(MoveSectionDTO {
                access,
                section_id: "strengths".to_string(),
                direction,
            })
            .await
            .unwrap();
        assert_eq!(draft.profile.section_order, expected);
        assert_eq!(draft.status, status);
    }

    #[rstest]
    #[tokio::test]
    async fn test_set_section_visibility(access: DraftAccessDTO) {
        let draft = SetSectionVisibilityInteractor::new(context(stored_reader()))
            .execute(SetSectionVisibilityDTO {
                access,
                section: BuiltInSection::SocialLinks,
                visible: false,
            })
            .await
            .unwrap();
        assert!(!draft.profile.visibility_flags.show_social_links);
        assert_eq!(draft.profile.section_order, vec!["strengths"]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_discard_reloads(access: DraftAccessDTO) {
        let mut reader = MockProfileReaderMock::new();
        reader
            .expect_find_by_handle()
            .times(2)
            .returning(|_| Ok(Some(document())));
        let context = context(reader);
        EditDraftInteractor::new(context.clone())
            .execute(EditDraftDTO {
                access: access.clone(),
                update: description("draft only"),
            })
            .await
            .unwrap();

        DiscardDraftInteractor::new(context.clone())
            .execute(access.clone())
            .await
            .unwrap();
        let reopened = OpenDraftInteractor::new(context).execute(access).await.unwrap();

        assert_eq!(reopened.status, SyncStatus::Clean);
        assert_eq!(reopened.profile.description, document().description);
    }

    // SaveDraftInteractor tests
    async fn dirty_context(access: &DraftAccessDTO) -> DraftContext {
        let context = context(stored_reader());
        EditDraftInteractor::new(context.clone())
            .execute(EditDraftDTO {
                access: access.clone(),
                update: description("to be saved"),
            })
            .await
            .unwrap();
        context
    }

    #[rstest]
    #[tokio::test]
    async fn test_save_success(access: DraftAccessDTO) {
        let context = dirty_context(&access).await;
        let mut db_session = MockDBSessionMock::new();
        let mut writer = MockProfileWriterMock::new();
        writer
            .expect_replace()
            .withf(|doc| doc.description == "to be saved")
            .times(1)
            .returning(|_| Ok(()));
        db_session.expect_commit().times(1).returning(|| Ok(()));

        let interactor = SaveDraftInteractor::new(
            context.clone(),
            Arc::new(db_session),
            Arc::new(writer),
            Arc::new(MockBlobStoreMock::new()),
        );
        let draft = interactor.execute(access).await.unwrap();

        assert_eq!(draft.status, SyncStatus::Clean);
        assert!(!draft.has_unsaved_changes);
        assert!(draft.last_error.is_none());
        assert_eq!(context.drafts.open_count().await, 0);
    }

    #[rstest]
    #[case(Ok(()))]
    #[case(Err(AppError::UploadError("bucket unavailable".to_string())))]
    #[tokio::test]
    async fn test_save_deletes_detached_media(access: DraftAccessDTO, #[case] deleted: AppResult<()>) {
        const URL: &str = "https://cdn.example.com/custom-sections/jdoe/custom_1/images/a.png";
        let context = context(stored_reader());
        {
            let draft = context.open(&access).await.unwrap();
            let mut synchronizer = draft.lock().await;
            synchronizer
                .apply_edit(ProfileUpdate {
                    custom_sections: Some(vec![CustomSection {
                        id: "1".to_string(),
                        section_id: "custom_1".to_string(),
                        title: "Gallery".to_string(),
                        content: String::new(),
                        kind: SectionKind::Image,
                        images: vec![URL.to_string()],
                        videos: vec![],
                        order: 0,
                    }]),
                    ..ProfileUpdate::default()
                })
                .unwrap();
            synchronizer.detach_media("custom_1", URL, true).unwrap();
        }
        let mut db_session = MockDBSessionMock::new();
        db_session.expect_commit().returning(|| Ok(()));
        let mut writer = MockProfileWriterMock::new();
        writer
            .expect_replace()
            .withf(|doc| !doc.references_media(URL))
            .returning(|_| Ok(()));
        let mut blob_store = MockBlobStoreMock::new();
        let mut deleted = Some(deleted);
        blob_store
            .expect_delete()
            .withf(|url| url == URL)
            .times(1)
            .returning(move |_| deleted.take().unwrap_or(Ok(())));

        let interactor =
            SaveDraftInteractor::new(context.clone(), Arc::new(db_session), Arc::new(writer), Arc::new(blob_store));
        let draft = interactor.execute(access).await.unwrap();

        assert_eq!(draft.status, SyncStatus::Clean);
        assert_eq!(context.drafts.open_count().await, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn test_save_clean_draft_is_noop(access: DraftAccessDTO) {
        let mut writer = MockProfileWriterMock::new();
        writer.expect_replace().never();

        let interactor = SaveDraftInteractor::new(
            context(stored_reader()),
            Arc::new(MockDBSessionMock::new()),
            Arc::new(writer),
            Arc::new(MockBlobStoreMock::new()),
        );
        let draft = interactor.execute(access).await.unwrap();
        assert_eq!(draft.status, SyncStatus::Clean);
    }

    #[rstest]
    #[tokio::test]
    async fn test_save_failure_keeps_draft(access: DraftAccessDTO) {
        let context = dirty_context(&access).await;
        let mut db_session = MockDBSessionMock::new();
        let mut writer = MockProfileWriterMock::new();
        writer
            .expect_replace()
            .returning(|_| Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut)));
        db_session.expect_commit().never();
        db_session.expect_rollback().returning(|| Ok(()));

        let mut blob_store = MockBlobStoreMock::new();
        blob_store.expect_delete().never();
        let interactor =
            SaveDraftInteractor::new(context.clone(), Arc::new(db_session), Arc::new(writer), Arc::new(blob_store));
        let result = interactor.execute(access.clone()).await;
        assert!(matches!(result.unwrap_err(), AppError::PersistenceError(_)));

        let draft = OpenDraftInteractor::new(context).execute(access).await.unwrap();
        assert_eq!(draft.status, SyncStatus::DirtyWithError);
        assert!(draft.has_unsaved_changes);
        assert_eq!(draft.profile.description, "to be saved");
        assert!(draft.last_error.is_some());
    }
}
