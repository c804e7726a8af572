use crate::application::synchronizer::{ProfileSynchronizer, SyncStatus};
use crate::domain::entities::profile::{
    BuiltInSection, CustomSection, MoveDirection, NewCustomSection, ProfileDocument, ProfileUpdate,
};

/// Identifies the draft an owner is working on.
#[derive(Debug, Clone)]
pub struct DraftAccessDTO {
    pub handle: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct GetProfileDTO {
    pub handle: String,
    pub viewer_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PublicProfileDTO {
    pub profile: ProfileDocument,
    pub layout: Vec<String>,
    pub is_owner: bool,
}

#[derive(Debug, Clone)]
pub struct DraftDTO {
    pub profile: ProfileDocument,
    pub status: SyncStatus,
    pub has_unsaved_changes: bool,
    pub last_error: Option<String>,
}

impl From<&ProfileSynchronizer> for DraftDTO {
    fn from(synchronizer: &ProfileSynchronizer) -> Self {
        Self {
            profile: synchronizer.document().clone(),
            status: synchronizer.status(),
            has_unsaved_changes: synchronizer.has_unsaved_changes(),
            last_error: synchronizer.last_error().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditDraftDTO {
    pub access: DraftAccessDTO,
    pub update: ProfileUpdate,
}

#[derive(Debug, Clone)]
pub struct MoveSectionDTO {
    pub access: DraftAccessDTO,
    pub section_id: String,
    pub direction: MoveDirection,
}

#[derive(Debug, Clone)]
pub struct RemoveSectionDTO {
    pub access: DraftAccessDTO,
    pub section_id: String,
}

#[derive(Debug, Clone)]
pub struct AddCustomSectionDTO {
    pub access: DraftAccessDTO,
    pub section: NewCustomSection,
}

#[derive(Debug, Clone)]
pub struct AddedCustomSectionDTO {
    pub section: CustomSection,
    pub draft: DraftDTO,
}

#[derive(Debug, Clone)]
pub struct SetSectionVisibilityDTO {
    pub access: DraftAccessDTO,
    pub section: BuiltInSection,
    pub visible: bool,
}
