use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::dto::profile::{AddedCustomSectionDTO, DraftDTO, PublicProfileDTO};
use crate::application::synchronizer::SyncStatus;
use crate::domain::entities::color::{Color, Theme};
use crate::domain::entities::profile::{
    CustomSection, MoveDirection, ProfileDocument, ProfileUpdate, SectionKind, SocialLink, Strength, VisibilityFlags,
};

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StrengthSchema {
    pub id: String,
    #[validate(length(min = 1, max = 100, message = "Strength title must be between 1 and 100 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Strength description must be at most 1000 characters"))]
    pub description: String,
}

impl From<Strength> for StrengthSchema {
    fn from(strength: Strength) -> Self {
        Self {
            id: strength.id,
            title: strength.title,
            description: strength.description,
        }
    }
}

impl From<StrengthSchema> for Strength {
    fn from(schema: StrengthSchema) -> Self {
        Self {
            id: schema.id,
            title: schema.title,
            description: schema.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SocialLinkSchema {
    pub id: String,
    #[validate(length(min = 1, max = 50, message = "Platform must be between 1 and 50 characters"))]
    pub platform: String,
    #[validate(length(min = 1, max = 2048, message = "Link must be between 1 and 2048 characters"))]
    pub url: String,
    #[serde(default)]
    pub icon: String,
}

impl From<SocialLink> for SocialLinkSchema {
    fn from(link: SocialLink) -> Self {
        Self {
            id: link.id,
            platform: link.platform,
            url: link.url,
            icon: link.icon,
        }
    }
}

impl From<SocialLinkSchema> for SocialLink {
    fn from(schema: SocialLinkSchema) -> Self {
        Self {
            id: schema.id,
            platform: schema.platform,
            url: schema.url,
            icon: schema.icon,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SectionKindSchema {
    Text,
    Image,
    Video,
}

impl From<SectionKind> for SectionKindSchema {
    fn from(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Text => SectionKindSchema::Text,
            SectionKind::Image => SectionKindSchema::Image,
            SectionKind::Video => SectionKindSchema::Video,
        }
    }
}

impl From<SectionKindSchema> for SectionKind {
    fn from(kind: SectionKindSchema) -> Self {
        match kind {
            SectionKindSchema::Text => SectionKind::Text,
            SectionKindSchema::Image => SectionKind::Image,
            SectionKindSchema::Video => SectionKind::Video,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomSectionSchema {
    pub id: String,
    /// `custom_<id>`; filled in by the server when empty.
    #[serde(default)]
    pub section_id: String,
    #[validate(length(min = 1, max = 100, message = "Section title must be between 1 and 100 characters"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub kind: SectionKindSchema,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub order: i64,
}

impl From<CustomSection> for CustomSectionSchema {
    fn from(section: CustomSection) -> Self {
        Self {
            id: section.id,
            section_id: section.section_id,
            title: section.title,
            content: section.content,
            kind: section.kind.into(),
            images: section.images,
            videos: section.videos,
            order: section.order,
        }
    }
}

impl From<CustomSectionSchema> for CustomSection {
    fn from(schema: CustomSectionSchema) -> Self {
        Self {
            id: schema.id,
            section_id: schema.section_id,
            title: schema.title,
            content: schema.content,
            kind: schema.kind.into(),
            images: schema.images,
            videos: schema.videos,
            order: schema.order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityFlagsSchema {
    #[serde(default = "enabled")]
    pub show_strengths: bool,
    #[serde(default = "enabled")]
    pub show_social_links: bool,
    #[serde(default)]
    pub show_custom_sections: bool,
}

impl From<VisibilityFlags> for VisibilityFlagsSchema {
    fn from(flags: VisibilityFlags) -> Self {
        Self {
            show_strengths: flags.show_strengths,
            show_social_links: flags.show_social_links,
            show_custom_sections: flags.show_custom_sections,
        }
    }
}

impl From<VisibilityFlagsSchema> for VisibilityFlags {
    fn from(schema: VisibilityFlagsSchema) -> Self {
        Self {
            show_strengths: schema.show_strengths,
            show_social_links: schema.show_social_links,
            show_custom_sections: schema.show_custom_sections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ColorSchema {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[schema(example = "#3b82f6")]
    pub hex: String,
}

impl From<Color> for ColorSchema {
    fn from(color: Color) -> Self {
        Self {
            r: color.r,
            g: color.g,
            b: color.b,
            hex: color.hex,
        }
    }
}

impl From<ColorSchema> for Color {
    fn from(schema: ColorSchema) -> Self {
        Self {
            r: schema.r,
            g: schema.g,
            b: schema.b,
            hex: schema.hex,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSchema {
    pub primary_color: ColorSchema,
    pub secondary_color: ColorSchema,
    pub accent_color: ColorSchema,
}

impl From<Theme> for ThemeSchema {
    fn from(theme: Theme) -> Self {
        Self {
            primary_color: theme.primary_color.into(),
            secondary_color: theme.secondary_color.into(),
            accent_color: theme.accent_color.into(),
        }
    }
}

impl From<ThemeSchema> for Theme {
    fn from(schema: ThemeSchema) -> Self {
        Self {
            primary_color: schema.primary_color.into(),
            secondary_color: schema.secondary_color.into(),
            accent_color: schema.accent_color.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSchema {
    pub handle: String,
    pub owner_id: String,
    pub display_title: String,
    pub display_name: String,
    pub description: String,
    pub welcome_message: String,
    pub welcome_subtitle: String,
    pub image_url: Option<String>,
    pub strengths_title: String,
    pub strengths: Vec<StrengthSchema>,
    pub social_links: Vec<SocialLinkSchema>,
    pub custom_sections: Vec<CustomSectionSchema>,
    pub visibility_flags: VisibilityFlagsSchema,
    pub section_order: Vec<String>,
    pub theme: ThemeSchema,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileDocument> for ProfileSchema {
    fn from(document: ProfileDocument) -> Self {
        Self {
            handle: document.handle.as_str().to_string(),
            owner_id: document.owner_id,
            display_title: document.display_title,
            display_name: document.display_name,
            description: document.description,
            welcome_message: document.welcome_message,
            welcome_subtitle: document.welcome_subtitle,
            image_url: document.image_url,
            strengths_title: document.strengths_title,
            strengths: document.strengths.into_iter().map(Into::into).collect(),
            social_links: document.social_links.into_iter().map(Into::into).collect(),
            custom_sections: document.custom_sections.into_iter().map(Into::into).collect(),
            visibility_flags: document.visibility_flags.into(),
            section_order: document.section_order,
            theme: document.theme.into(),
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatusSchema {
    Clean,
    Dirty,
    Saving,
    DirtyWithError,
}

impl From<SyncStatus> for SyncStatusSchema {
    fn from(status: SyncStatus) -> Self {
        match status {
            SyncStatus::Clean => SyncStatusSchema::Clean,
            SyncStatus::Dirty => SyncStatusSchema::Dirty,
            SyncStatus::Saving => SyncStatusSchema::Saving,
            SyncStatus::DirtyWithError => SyncStatusSchema::DirtyWithError,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub profile: ProfileSchema,
    pub status: SyncStatusSchema,
    pub has_unsaved_changes: bool,
    pub last_error: Option<String>,
}

impl From<DraftDTO> for DraftResponse {
    fn from(dto: DraftDTO) -> Self {
        Self {
            profile: dto.profile.into(),
            status: dto.status.into(),
            has_unsaved_changes: dto.has_unsaved_changes,
            last_error: dto.last_error,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfileResponse {
    pub profile: ProfileSchema,
    /// Visible sections in render order.
    pub layout: Vec<String>,
    pub is_owner: bool,
}

impl From<PublicProfileDTO> for PublicProfileResponse {
    fn from(dto: PublicProfileDTO) -> Self {
        Self {
            profile: dto.profile.into(),
            layout: dto.layout,
            is_owner: dto.is_owner,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddedCustomSectionResponse {
    pub section: CustomSectionSchema,
    pub draft: DraftResponse,
}

impl From<AddedCustomSectionDTO> for AddedCustomSectionResponse {
    fn from(dto: AddedCustomSectionDTO) -> Self {
        Self {
            section: dto.section.into(),
            draft: dto.draft.into(),
        }
    }
}

/// Shallow patch: each present field replaces the draft's value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdateRequest {
    #[validate(length(max = 100, message = "Display title must be at most 100 characters"))]
    pub display_title: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Display name must be between 1 and 50 characters"))]
    pub display_name: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 200, message = "Welcome message must be at most 200 characters"))]
    pub welcome_message: Option<String>,
    #[validate(length(max = 200, message = "Welcome subtitle must be at most 200 characters"))]
    pub welcome_subtitle: Option<String>,
    /// `null` removes the picture.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub image_url: Option<Option<String>>,
    #[validate(length(max = 100, message = "Strengths title must be at most 100 characters"))]
    pub strengths_title: Option<String>,
    #[validate(nested)]
    pub strengths: Option<Vec<StrengthSchema>>,
    #[validate(nested)]
    pub social_links: Option<Vec<SocialLinkSchema>>,
    #[validate(nested)]
    pub custom_sections: Option<Vec<CustomSectionSchema>>,
    pub visibility_flags: Option<VisibilityFlagsSchema>,
    pub section_order: Option<Vec<String>>,
    pub theme: Option<ThemeSchema>,
}

impl From<ProfileUpdateRequest> for ProfileUpdate {
    fn from(request: ProfileUpdateRequest) -> Self {
        Self {
            display_title: request.display_title,
            display_name: request.display_name,
            description: request.description,
            welcome_message: request.welcome_message,
            welcome_subtitle: request.welcome_subtitle,
            image_url: request.image_url,
            strengths_title: request.strengths_title,
            strengths: request.strengths.map(|items| items.into_iter().map(Into::into).collect()),
            social_links: request.social_links.map(|items| items.into_iter().map(Into::into).collect()),
            custom_sections: request.custom_sections.map(|items| items.into_iter().map(Into::into).collect()),
            visibility_flags: request.visibility_flags.map(Into::into),
            section_order: request.section_order,
            theme: request.theme.map(Into::into),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCustomSectionRequest {
    #[validate(custom(function = "non_blank_title"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub kind: SectionKindSchema,
}

fn non_blank_title(title: &str) -> Result<(), validator::ValidationError> {
    let len = title.trim().chars().count();
    if (1..=100).contains(&len) {
        return Ok(());
    }
    Err(validator::ValidationError::new("title_length")
        .with_message("Section title must be between 1 and 100 characters".into()))
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirectionSchema {
    Up,
    Down,
}

impl From<MoveDirectionSchema> for MoveDirection {
    fn from(direction: MoveDirectionSchema) -> Self {
        match direction {
            MoveDirectionSchema::Up => MoveDirection::Up,
            MoveDirectionSchema::Down => MoveDirection::Down,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveSectionRequest {
    pub direction: MoveDirectionSchema,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VisibilityRequest {
    pub visible: bool,
}
