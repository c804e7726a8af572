use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::app_error::{AppError, AppResult};
use crate::application::dto::media::{
    DeleteSectionMediaDTO, ProfileImageDTO, SectionMediaDTO, UploadProfileImageDTO, UploadSectionMediaDTO,
};
use crate::application::dto::profile::DraftDTO;
use crate::application::interactors::profile::DraftContext;
use crate::application::interface::media::{DetectedMedia, MediaInspector, MediaKind};
use crate::application::interface::s3::BlobStore;
use crate::domain::entities::profile::{ProfileUpdate, SectionKind};
use crate::domain::palette::dominant_colors;

fn blob_name(media: &DetectedMedia) -> String {
    format!("{}-{}.{}", Utc::now().timestamp_millis(), Uuid::now_v7().simple(), media.ext)
}

/// Folder holding the uploads of one custom section. The handle keeps sections of different
/// owners apart even when their ids collide.
fn section_folder(handle: &str, section_id: &str) -> String {
    format!("custom-sections/{}/{}/", handle, section_id)
}

#[derive(Clone)]
pub struct UploadProfileImageInteractor {
    context: DraftContext,
    blob_store: Arc<dyn BlobStore>,
    inspector: Arc<dyn MediaInspector>,
}

impl UploadProfileImageInteractor {
    pub fn new(context: DraftContext, blob_store: Arc<dyn BlobStore>, inspector: Arc<dyn MediaInspector>) -> Self {
        Self {
            context,
            blob_store,
            inspector,
        }
    }

    /// Stores a new profile picture, points the draft at it and suggests a palette from its pixels.
    pub async fn execute(&self, dto: UploadProfileImageDTO) -> AppResult<ProfileImageDTO> {
        let draft = self.context.open(&dto.access).await?;
        if dto.data.len() > dto.max_bytes {
            return Err(AppError::PayloadTooLarge(dto.max_bytes));
        }
        let media = self
            .inspector
            .detect(&dto.data)
            .filter(|media| media.kind == MediaKind::Image)
            .ok_or(AppError::UnsupportedMediaType)?;

        let inspector = self.inspector.clone();
        let data = dto.data.clone();
        let stride = dto.palette_stride;
        let palette = tokio::task::spawn_blocking(move || {
            inspector
                .decode_rgba(&data)
                .map(|rgba| dominant_colors(&rgba, stride))
        })
        .await
        .map_err(|e| AppError::ImageDecodeError(e.to_string()))??;

        let path = format!("profiles/{}/image/{}", dto.access.handle, blob_name(&media));
        let image_url = self.blob_store.put(&path, dto.data, media.content_type).await?;
        info!("Profile image of {} stored at {}", dto.access.handle, path);

        let mut synchronizer = draft.lock().await;
        synchronizer.apply_edit(ProfileUpdate {
            image_url: Some(Some(image_url.clone())),
            ..ProfileUpdate::default()
        })?;
        Ok(ProfileImageDTO {
            image_url,
            palette,
            draft: DraftDTO::from(&*synchronizer),
        })
    }
}

#[derive(Clone)]
pub struct UploadSectionMediaInteractor {
    context: DraftContext,
    blob_store: Arc<dyn BlobStore>,
    inspector: Arc<dyn MediaInspector>,
}

impl UploadSectionMediaInteractor {
    pub fn new(context: DraftContext, blob_store: Arc<dyn BlobStore>, inspector: Arc<dyn MediaInspector>) -> Self {
        Self {
            context,
            blob_store,
            inspector,
        }
    }

    /// Appends an image or video to a custom section. The upload happens without holding the draft,
    /// so a section removed in the meantime leaves the stored blob behind.
    pub async fn execute(&self, dto: UploadSectionMediaDTO) -> AppResult<SectionMediaDTO> {
        let draft = self.context.open(&dto.access).await?;
        let section_kind = {
            let synchronizer = draft.lock().await;
            synchronizer
                .document()
                .custom_section(&dto.section_id)
                .map(|section| section.kind)
                .ok_or_else(|| AppError::SectionNotFound(dto.section_id.clone()))?
        };

        let (expected, limit, folder) = match section_kind {
            SectionKind::Image => (MediaKind::Image, dto.max_image_bytes, "images"),
            SectionKind::Video => (MediaKind::Video, dto.max_video_bytes, "videos"),
            SectionKind::Text => {
                return Err(AppError::invalid_field("sectionId", "text sections do not hold media"));
            }
        };
        if dto.data.len() > limit {
            return Err(AppError::PayloadTooLarge(limit));
        }
        let media = self
            .inspector
            .detect(&dto.data)
            .filter(|media| media.kind == expected)
            .ok_or(AppError::UnsupportedMediaType)?;

        let path = format!(
            "{}{}/{}",
            section_folder(&dto.access.handle, &dto.section_id),
            folder,
            blob_name(&media)
        );
        let url = self.blob_store.put(&path, dto.data, media.content_type).await?;
        info!("Media for {} stored at {}", dto.section_id, path);

        let mut synchronizer = draft.lock().await;
        let update = synchronizer.document().section_media_update(&dto.section_id, |section| {
            match expected {
                MediaKind::Image => section.images.push(url.clone()),
                MediaKind::Video => section.videos.push(url.clone()),
            }
        });
        let update = match update {
            Ok(update) => update,
            Err(err) => {
                warn!("Section {} vanished during upload, orphaned {}", dto.section_id, url);
                return Err(err.into());
            }
        };
        synchronizer.apply_edit(update)?;
        Ok(SectionMediaDTO {
            url,
            draft: DraftDTO::from(&*synchronizer),
        })
    }
}

#[derive(Clone)]
pub struct DeleteSectionMediaInteractor {
    context: DraftContext,
    blob_store: Arc<dyn BlobStore>,
}

impl DeleteSectionMediaInteractor {
    pub fn new(context: DraftContext, blob_store: Arc<dyn BlobStore>) -> Self {
        Self { context, blob_store }
    }

    /// Detaches media from a section. The stored object is removed after the next successful save,
    /// and only when it was uploaded into this section; other URLs are just unlinked.
    pub async fn execute(&self, dto: DeleteSectionMediaDTO) -> AppResult<DraftDTO> {
        let draft = self.context.open(&dto.access).await?;
        let mut synchronizer = draft.lock().await;
        let section = synchronizer
            .document()
            .custom_section(&dto.section_id)
            .ok_or_else(|| AppError::SectionNotFound(dto.section_id.clone()))?;
        if !section.images.contains(&dto.url) && !section.videos.contains(&dto.url) {
            return Err(AppError::invalid_field("url", "not attached to this section"));
        }

        let folder = section_folder(&dto.access.handle, &dto.section_id);
        let owned = self
            .blob_store
            .key_of(&dto.url)
            .is_some_and(|key| key.starts_with(&folder));
        if !owned {
            warn!("Media {} was not uploaded into {}, unlinking only", dto.url, dto.section_id);
        }
        synchronizer.detach_media(&dto.section_id, &dto.url, owned)?;
        info!("Media {} detached from {}", dto.url, dto.section_id);
        Ok(DraftDTO::from(&*synchronizer))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;
    use mockall::mock;
    use rstest::{fixture, rstest};

    use crate::application::app_error::{AppError, AppResult};
    use crate::application::drafts::DraftRegistry;
    use crate::application::dto::media::{DeleteSectionMediaDTO, UploadProfileImageDTO, UploadSectionMediaDTO};
    use crate::application::dto::profile::{AddCustomSectionDTO, DraftAccessDTO, EditDraftDTO};
    use crate::application::interactors::media::{
        DeleteSectionMediaInteractor, UploadProfileImageInteractor, UploadSectionMediaInteractor,
    };
    use crate::application::interactors::profile::{
        AddCustomSectionInteractor, DiscardDraftInteractor, DraftContext, EditDraftInteractor,
    };
    use crate::application::interface::gateway::profile::ProfileReader;
    use crate::application::interface::media::{DetectedMedia, MediaInspector, MediaKind};
    use crate::application::interface::s3::BlobStore;
    use crate::application::synchronizer::SyncStatus;
    use crate::domain::entities::handle::Handle;
    use crate::domain::entities::profile::{NewCustomSection, ProfileDocument, SectionKind};

    // Mocks
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
            async fn put(&self, path: &str, data: Bytes, content_type: &str) -> AppResult<String>;
            async fn delete(&self, url: &str) -> AppResult<()>;
            fn key_of(&self, url: &str) -> Option<String>;
        }
    }

    mock! {
        pub MediaInspectorMock {}

        impl MediaInspector for MediaInspectorMock {
            fn detect(&self, data: &[u8]) -> Option<DetectedMedia>;
            fn decode_rgba(&self, data: &[u8]) -> AppResult<Vec<u8>>;
        }
    }

    // Constants
    const OWNER_ID: &str = "019c47ec-183d-744e-b11d-cd409015bf13";
    const HANDLE: &str = "jdoe";
    const PUBLIC_URL: &str = "https://cdn.example.com";
    const PNG: DetectedMedia = DetectedMedia {
        kind: MediaKind::Image,
        content_type: "image/png",
        ext: "png",
    };
    const MP4: DetectedMedia = DetectedMedia {
        kind: MediaKind::Video,
        content_type: "video/mp4",
        ext: "mp4",
    };

    // Fixtures
    #[fixture]
    fn access() -> DraftAccessDTO {
        DraftAccessDTO {
            handle: HANDLE.to_string(),
            user_id: OWNER_ID.to_string(),
        }
    }

    #[fixture]
    fn context() -> DraftContext {
        let mut reader = MockProfileReaderMock::new();
        reader.expect_find_by_handle().returning(|_| {
            Ok(Some(ProfileDocument::new_default(
                Handle::parse(HANDLE).unwrap(),
                OWNER_ID.to_string(),
                "John",
            )))
        });
        DraftContext::new(Arc::new(DraftRegistry::new()), Arc::new(reader))
    }

    fn storing_blob_store() -> MockBlobStoreMock {
        let mut blob_store = MockBlobStoreMock::new();
        blob_store
            .expect_put()
            .returning(|path, _, _| Ok(format!("{}/{}", PUBLIC_URL, path)));
        blob_store
            .expect_key_of()
            .returning(|url| url.strip_prefix(PUBLIC_URL)?.strip_prefix('/').map(str::to_string));
        blob_store
    }

    fn inspector(detected: Option<DetectedMedia>) -> MockMediaInspectorMock {
        let mut inspector = MockMediaInspectorMock::new();
        inspector.expect_detect().returning(move |_| detected);
        inspector
            .expect_decode_rgba()
            .returning(|_| Ok([[255, 0, 0, 255], [255, 0, 0, 255], [0, 0, 255, 255]].concat()));
        inspector
    }

    async fn add_section(context: &DraftContext, access: &DraftAccessDTO, kind: SectionKind) -> String {
        AddCustomSectionInteractor::new(context.clone())
            .execute(AddCustomSectionDTO {
                access: access.clone(),
                section: NewCustomSection {
                    title: "Gallery".to_string(),
                    content: String::new(),
                    kind,
                },
            })
            .await
            .unwrap()
            .section
            .section_id
    }

    fn image_upload(access: DraftAccessDTO, size: usize) -> UploadProfileImageDTO {
        UploadProfileImageDTO {
            access,
            data: Bytes::from(vec![0u8; size]),
            max_bytes: 16,
            palette_stride: 1,
        }
    }

    // UploadProfileImageInteractor tests
    #[rstest]
    #[tokio::test]
    async fn test_upload_profile_image(context: DraftContext, access: DraftAccessDTO) {
        let interactor =
            UploadProfileImageInteractor::new(context, Arc::new(storing_blob_store()), Arc::new(inspector(Some(PNG))));

        let result = interactor.execute(image_upload(access, 8)).await.unwrap();

        assert!(result.image_url.starts_with("https://cdn.example.com/profiles/jdoe/image/"));
        assert!(result.image_url.ends_with(".png"));
        assert_eq!(result.palette[0].hex, "#ff0000");
        assert_eq!(result.draft.profile.image_url.as_deref(), Some(result.image_url.as_str()));
        assert_eq!(result.draft.status, SyncStatus::Dirty);
    }

    #[rstest]
    #[case(Some(MP4))]
    #[case(None)]
    #[tokio::test]
    async fn test_upload_profile_image_rejects_non_images(
        context: DraftContext,
        access: DraftAccessDTO,
        #[case] detected: Option<DetectedMedia>,
    ) {
        let mut blob_store = MockBlobStoreMock::new();
        blob_store.expect_put().never();
        let interactor = UploadProfileImageInteractor::new(context, Arc::new(blob_store), Arc::new(inspector(detected)));

        let result = interactor.execute(image_upload(access, 8)).await;
        assert!(matches!(result.unwrap_err(), AppError::UnsupportedMediaType));
    }

    #[rstest]
    #[tokio::test]
    async fn test_upload_profile_image_too_large(context: DraftContext, access: DraftAccessDTO) {
        let interactor = UploadProfileImageInteractor::new(
            context,
            Arc::new(MockBlobStoreMock::new()),
            Arc::new(inspector(Some(PNG))),
        );

        let result = interactor.execute(image_upload(access, 17)).await;
        assert!(matches!(result.unwrap_err(), AppError::PayloadTooLarge(16)));
    }

    #[rstest]
    #[tokio::test]
    async fn test_undecodable_image_is_not_stored(context: DraftContext, access: DraftAccessDTO) {
        let mut inspector = MockMediaInspectorMock::new();
        inspector.expect_detect().returning(|_| Some(PNG));
        inspector
            .expect_decode_rgba()
            .returning(|_| Err(AppError::ImageDecodeError("truncated".to_string())));
        let mut blob_store = MockBlobStoreMock::new();
        blob_store.expect_put().never();
        let interactor = UploadProfileImageInteractor::new(context, Arc::new(blob_store), Arc::new(inspector));

        let result = interactor.execute(image_upload(access, 8)).await;
        assert!(matches!(result.unwrap_err(), AppError::ImageDecodeError(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn test_failed_upload_leaves_draft_clean(context: DraftContext, access: DraftAccessDTO) {
        let mut blob_store = MockBlobStoreMock::new();
        blob_store
            .expect_put()
            .returning(|_, _, _| Err(AppError::UploadError("bucket unavailable".to_string())));
        let interactor =
            UploadProfileImageInteractor::new(context.clone(), Arc::new(blob_store), Arc::new(inspector(Some(PNG))));

        let result = interactor.execute(image_upload(access.clone(), 8)).await;
        assert!(matches!(result.unwrap_err(), AppError::UploadError(_)));

        let draft = context.open(&access).await.unwrap();
        assert_eq!(draft.lock().await.status(), SyncStatus::Clean);
    }

    // UploadSectionMediaInteractor tests
    #[rstest]
    #[case(SectionKind::Image, PNG, "images")]
    #[case(SectionKind::Video, MP4, "videos")]
    #[tokio::test]
    async fn test_upload_section_media(
        context: DraftContext,
        access: DraftAccessDTO,
        #[case] kind: SectionKind,
        #[case] detected: DetectedMedia,
        #[case] folder: &str,
    ) {
        let section_id = add_section(&context, &access, kind).await;
        let interactor =
            UploadSectionMediaInteractor::new(context, Arc::new(storing_blob_store()), Arc::new(inspector(Some(detected))));

        let result = interactor
            .execute(UploadSectionMediaDTO {
                access,
                section_id: section_id.clone(),
                data: Bytes::from_static(b"media"),
                max_image_bytes: 16,
                max_video_bytes: 32,
            })
            .await
            .unwrap();

        let prefix = format!("{}/custom-sections/{}/{}/{}/", PUBLIC_URL, HANDLE, section_id, folder);
        assert!(result.url.starts_with(&prefix));
        let section = result.draft.profile.custom_section(&section_id).unwrap();
        let urls = match kind {
            SectionKind::Video => &section.videos,
            _ => &section.images,
        };
        assert_eq!(urls, &vec![result.url.clone()]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_upload_section_media_kind_mismatch(context: DraftContext, access: DraftAccessDTO) {
        let section_id = add_section(&context, &access, SectionKind::Image).await;
        let interactor =
            UploadSectionMediaInteractor::new(context, Arc::new(MockBlobStoreMock::new()), Arc::new(inspector(Some(MP4))));

        let result = interactor
            .execute(UploadSectionMediaDTO {
                access,
                section_id,
                data: Bytes::from_static(b"media"),
                max_image_bytes: 16,
                max_video_bytes: 32,
            })
            .await;
        assert!(matches!(result.unwrap_err(), AppError::UnsupportedMediaType));
    }

    #[rstest]
    #[tokio::test]
    async fn test_upload_into_text_section(context: DraftContext, access: DraftAccessDTO) {
        let section_id = add_section(&context, &access, SectionKind::Text).await;
        let interactor =
            UploadSectionMediaInteractor::new(context, Arc::new(MockBlobStoreMock::new()), Arc::new(inspector(Some(PNG))));

        let result = interactor
            .execute(UploadSectionMediaDTO {
                access,
                section_id,
                data: Bytes::from_static(b"media"),
                max_image_bytes: 16,
                max_video_bytes: 32,
            })
            .await;
        assert!(matches!(result.unwrap_err(), AppError::InvalidField { field, .. } if field == "sectionId"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_upload_into_missing_section(context: DraftContext, access: DraftAccessDTO) {
        let interactor =
            UploadSectionMediaInteractor::new(context, Arc::new(MockBlobStoreMock::new()), Arc::new(inspector(Some(PNG))));

        let result = interactor
            .execute(UploadSectionMediaDTO {
                access,
                section_id: "custom_missing".to_string(),
                data: Bytes::from_static(b"media"),
                max_image_bytes: 16,
                max_video_bytes: 32,
            })
            .await;
        assert!(matches!(result.unwrap_err(), AppError::SectionNotFound(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn test_uploads_in_same_millisecond_get_distinct_urls(context: DraftContext, access: DraftAccessDTO) {
        let section_id = add_section(&context, &access, SectionKind::Image).await;
        let interactor =
            UploadSectionMediaInteractor::new(context, Arc::new(storing_blob_store()), Arc::new(inspector(Some(PNG))));

        let mut urls = Vec::new();
        for _ in 0..5 {
            let result = interactor
                .execute(UploadSectionMediaDTO {
                    access: access.clone(),
                    section_id: section_id.clone(),
                    data: Bytes::from_static(b"media"),
                    max_image_bytes: 16,
                    max_video_bytes: 32,
                })
                .await
                .unwrap();
            urls.push(result.url);
        }

        let unique: HashSet<&String> = urls.iter().collect();
        assert_eq!(unique.len(), urls.len());
    }

    // DeleteSectionMediaInteractor tests
    async fn uploaded_image(context: &DraftContext, access: &DraftAccessDTO) -> (String, String) {
        let section_id = add_section(context, access, SectionKind::Image).await;
        let uploaded = UploadSectionMediaInteractor::new(
            context.clone(),
            Arc::new(storing_blob_store()),
            Arc::new(inspector(Some(PNG))),
        )
        .execute(UploadSectionMediaDTO {
            access: access.clone(),
            section_id: section_id.clone(),
            data: Bytes::from_static(b"media"),
            max_image_bytes: 16,
            max_video_bytes: 32,
        })
        .await
        .unwrap();
        (section_id, uploaded.url)
    }

    fn untouched_blob_store() -> MockBlobStoreMock {
        let mut blob_store = storing_blob_store();
        blob_store.expect_delete().never();
        blob_store
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_section_media_waits_for_save(context: DraftContext, access: DraftAccessDTO) {
        let (section_id, url) = uploaded_image(&context, &access).await;

        let draft = DeleteSectionMediaInteractor::new(context.clone(), Arc::new(untouched_blob_store()))
            .execute(DeleteSectionMediaDTO {
                access: access.clone(),
                section_id: section_id.clone(),
                url: url.clone(),
            })
            .await
            .unwrap();

        assert!(draft.profile.custom_section(&section_id).unwrap().images.is_empty());
        let shared = context.open(&access).await.unwrap();
        assert_eq!(shared.lock().await.pending_deletions(), [url]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_then_discard_keeps_blob(context: DraftContext, access: DraftAccessDTO) {
        let (section_id, url) = uploaded_image(&context, &access).await;

        DeleteSectionMediaInteractor::new(context.clone(), Arc::new(untouched_blob_store()))
            .execute(DeleteSectionMediaDTO {
                access: access.clone(),
                section_id,
                url,
            })
            .await
            .unwrap();
        DiscardDraftInteractor::new(context.clone()).execute(access.clone()).await.unwrap();

        let reopened = context.open(&access).await.unwrap();
        assert!(reopened.lock().await.pending_deletions().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_foreign_media_only_unlinks(context: DraftContext, access: DraftAccessDTO) {
        let section_id = add_section(&context, &access, SectionKind::Image).await;
        let foreign = [
            format!("{}/profiles/victim/image/1.png", PUBLIC_URL),
            format!("{}/custom-sections/victim/{}/images/1.png", PUBLIC_URL, section_id),
            "https://elsewhere.example.com/a.png".to_string(),
        ];
        let update = context
            .open(&access)
            .await
            .unwrap()
            .lock()
            .await
            .document()
            .section_media_update(&section_id, |section| section.images = foreign.to_vec())
            .unwrap();
        EditDraftInteractor::new(context.clone())
            .execute(EditDraftDTO {
                access: access.clone(),
                update,
            })
            .await
            .unwrap();

        let interactor = DeleteSectionMediaInteractor::new(context.clone(), Arc::new(untouched_blob_store()));
        for url in &foreign {
            interactor
                .execute(DeleteSectionMediaDTO {
                    access: access.clone(),
                    section_id: section_id.clone(),
                    url: url.clone(),
                })
                .await
                .unwrap();
        }

        let draft = context.open(&access).await.unwrap();
        let synchronizer = draft.lock().await;
        assert!(synchronizer.document().custom_section(&section_id).unwrap().images.is_empty());
        assert!(synchronizer.pending_deletions().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_unknown_media(context: DraftContext, access: DraftAccessDTO) {
        let section_id = add_section(&context, &access, SectionKind::Image).await;
        let result = DeleteSectionMediaInteractor::new(context, Arc::new(untouched_blob_store()))
            .execute(DeleteSectionMediaDTO {
                access,
                section_id,
                url: format!("{}/elsewhere.png", PUBLIC_URL),
            })
            .await;
        assert!(matches!(result.unwrap_err(), AppError::InvalidField { field, .. } if field == "url"));
    }
}
