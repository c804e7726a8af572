use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::color::Theme;
use crate::domain::entities::handle::Handle;

pub const STRENGTHS_SECTION: &str = "strengths";
pub const SOCIAL_LINKS_SECTION: &str = "socialLinks";
pub const CUSTOM_SECTION_PREFIX: &str = "custom_";
pub const DEFAULT_STRENGTHS_TITLE: &str = "My Strengths";
pub const DEFAULT_DESCRIPTION: &str = "Write a few words to introduce yourself!";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("section `{0}` appears more than once in the section order")]
    DuplicateSection(String),
    #[error("section `{0}` is not a known section")]
    UnknownSection(String),
    #[error("custom section `{0}` is invalid: {1}")]
    InvalidCustomSection(String, &'static str),
    #[error("theme color `{0}` does not match its rgb channels")]
    InvalidColor(String),
    #[error("section `{0}` does not exist")]
    SectionNotFound(String),
}

impl ProfileError {
    /// Document field the error belongs to, so clients can show it next to the input.
    pub fn field(&self) -> &'static str {
        match self {
            ProfileError::DuplicateSection(_) | ProfileError::UnknownSection(_) => "sectionOrder",
            ProfileError::InvalidCustomSection(..) => "customSections",
            ProfileError::InvalidColor(_) => "theme",
            ProfileError::SectionNotFound(_) => "sectionId",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strength {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: String,
    pub platform: String,
    pub url: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Text,
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSection {
    pub id: String,
    #[serde(default)]
    pub section_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub order: i64,
}

impl CustomSection {
    pub fn section_id_for(id: &str) -> String {
        format!("{}{}", CUSTOM_SECTION_PREFIX, id)
    }
}

#[derive(Debug, Clone)]
pub struct NewCustomSection {
    pub title: String,
    pub content: String,
    pub kind: SectionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityFlags {
    #[serde(default = "enabled")]
    pub show_strengths: bool,
    #[serde(default = "enabled")]
    pub show_social_links: bool,
    #[serde(default)]
    pub show_custom_sections: bool,
}

fn enabled() -> bool {
    true
}

impl Default for VisibilityFlags {
    fn default() -> Self {
        Self {
            show_strengths: true,
            show_social_links: true,
            show_custom_sections: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuiltInSection {
    #[serde(rename = "strengths")]
    Strengths,
    #[serde(rename = "socialLinks")]
    SocialLinks,
}

impl BuiltInSection {
    pub fn identifier(&self) -> &'static str {
        match self {
            BuiltInSection::Strengths => STRENGTHS_SECTION,
            BuiltInSection::SocialLinks => SOCIAL_LINKS_SECTION,
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            STRENGTHS_SECTION => Some(BuiltInSection::Strengths),
            SOCIAL_LINKS_SECTION => Some(BuiltInSection::SocialLinks),
            _ => None,
        }
    }
}

/// Deserializes a field, falling back to its default when the stored value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn default_strengths_title() -> String {
    DEFAULT_STRENGTHS_TITLE.to_string()
}

pub fn default_section_order() -> Vec<String> {
    vec![STRENGTHS_SECTION.to_string(), SOCIAL_LINKS_SECTION.to_string()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    pub handle: Handle,
    pub owner_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub display_title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub welcome_message: String,
    #[serde(default, deserialize_with = "lenient")]
    pub welcome_subtitle: String,
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
    #[serde(default = "default_strengths_title", deserialize_with = "lenient")]
    pub strengths_title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub strengths: Vec<Strength>,
    #[serde(default, deserialize_with = "lenient")]
    pub social_links: Vec<SocialLink>,
    #[serde(default, deserialize_with = "lenient")]
    pub custom_sections: Vec<CustomSection>,
    #[serde(default, deserialize_with = "lenient")]
    pub visibility_flags: VisibilityFlags,
    #[serde(default, deserialize_with = "lenient")]
    pub section_order: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub theme: Theme,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Top-level partial update; every `Some` replaces the whole field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub display_title: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub welcome_message: Option<String>,
    pub welcome_subtitle: Option<String>,
    pub image_url: Option<Option<String>>,
    pub strengths_title: Option<String>,
    pub strengths: Option<Vec<Strength>>,
    pub social_links: Option<Vec<SocialLink>>,
    pub custom_sections: Option<Vec<CustomSection>>,
    pub visibility_flags: Option<VisibilityFlags>,
    pub section_order: Option<Vec<String>>,
    pub theme: Option<Theme>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

impl ProfileDocument {
    /// Document created at signup.
    pub fn new_default(handle: Handle, owner_id: String, display_name: &str) -> Self {
        let now = Utc::now();
        Self {
            handle,
            owner_id,
            display_title: format!("{}'s Promotion Page", display_name),
            display_name: display_name.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            welcome_message: String::new(),
            welcome_subtitle: String::new(),
            image_url: None,
            strengths_title: default_strengths_title(),
            strengths: Vec::new(),
            social_links: Vec::new(),
            custom_sections: Vec::new(),
            visibility_flags: VisibilityFlags::default(),
            section_order: default_section_order(),
            theme: Theme::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Reads a stored document, filling absent or malformed optional fields with defaults.
    pub fn from_stored(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let document: ProfileDocument = serde_json::from_value(value)?;
        Ok(document.normalized())
    }

    fn normalized(mut self) -> Self {
        if self.strengths_title.trim().is_empty() {
            self.strengths_title = default_strengths_title();
        }
        for section in &mut self.custom_sections {
            if section.section_id.is_empty() {
                section.section_id = CustomSection::section_id_for(&section.id);
            }
        }
        let mut seen = HashSet::new();
        let known = self.custom_section_ids();
        self.section_order.retain(|identifier| {
            let valid = BuiltInSection::from_identifier(identifier).is_some() || known.contains(identifier);
            valid && seen.insert(identifier.clone())
        });
        if self.section_order.is_empty() {
            self.section_order = default_section_order();
        }
        self
    }

    fn custom_section_ids(&self) -> HashSet<String> {
        self.custom_sections.iter().map(|s| s.section_id.clone()).collect()
    }

    pub fn custom_section(&self, section_id: &str) -> Option<&CustomSection> {
        self.custom_sections.iter().find(|s| s.section_id == section_id)
    }

    pub fn references_media(&self, url: &str) -> bool {
        self.image_url.as_deref() == Some(url)
            || self
                .custom_sections
                .iter()
                .any(|s| s.images.iter().chain(&s.videos).any(|u| u == url))
    }

    /// Merges `update` into a copy of the document and validates the result.
    ///
    /// Custom sections carried by the update but missing from the section order are appended to
    /// it and turn `showCustomSections` on. `custom_*` identifiers left without a section are dropped from the
    /// order. On error `self` is untouched.
    pub fn merged(&self, update: ProfileUpdate) -> Result<ProfileDocument, ProfileError> {
        let mut next = self.clone();

        if let Some(v) = update.display_title {
            next.display_title = v;
        }
        if let Some(v) = update.display_name {
            next.display_name = v;
        }
        if let Some(v) = update.description {
            next.description = v;
        }
        if let Some(v) = update.welcome_message {
            next.welcome_message = v;
        }
        if let Some(v) = update.welcome_subtitle {
            next.welcome_subtitle = v;
        }
        if let Some(v) = update.image_url {
            next.image_url = v;
        }
        if let Some(v) = update.strengths_title {
            next.strengths_title = v;
        }
        if let Some(v) = update.strengths {
            next.strengths = v;
        }
        if let Some(v) = update.social_links {
            next.social_links = v;
        }
        if let Some(v) = update.visibility_flags {
            next.visibility_flags = v;
        }
        if let Some(v) = update.section_order {
            next.section_order = v;
        }
        if let Some(v) = update.theme {
            next.theme = v;
        }

        if let Some(mut sections) = update.custom_sections {
            for section in &mut sections {
                if section.section_id.is_empty() {
                    section.section_id = CustomSection::section_id_for(&section.id);
                }
            }
            let mut registered = false;
            for section in &sections {
                if !next.section_order.contains(&section.section_id) {
                    next.section_order.push(section.section_id.clone());
                    registered = true;
                }
            }
            if registered {
                next.visibility_flags.show_custom_sections = true;
            }
            next.custom_sections = sections;
        }

        next.validate()?;
        let known = next.custom_section_ids();
        next.section_order
            .retain(|identifier| !identifier.starts_with(CUSTOM_SECTION_PREFIX) || known.contains(identifier));
        Ok(next)
    }

    fn validate(&self) -> Result<(), ProfileError> {
        let mut section_ids = HashSet::new();
        for section in &self.custom_sections {
            if section.id.trim().is_empty() {
                return Err(ProfileError::InvalidCustomSection(section.section_id.clone(), "id is empty"));
            }
            if section.section_id != CustomSection::section_id_for(&section.id) {
                return Err(ProfileError::InvalidCustomSection(
                    section.section_id.clone(),
                    "sectionId must be `custom_` followed by the section id",
                ));
            }
            if !section_ids.insert(section.section_id.as_str()) {
                return Err(ProfileError::InvalidCustomSection(section.section_id.clone(), "duplicate sectionId"));
            }
        }

        let mut seen = HashSet::new();
        for identifier in &self.section_order {
            if !seen.insert(identifier.as_str()) {
                return Err(ProfileError::DuplicateSection(identifier.clone()));
            }
            let known = BuiltInSection::from_identifier(identifier).is_some() || identifier.starts_with(CUSTOM_SECTION_PREFIX);
            if !known {
                return Err(ProfileError::UnknownSection(identifier.clone()));
            }
        }

        for color in [&self.theme.primary_color, &self.theme.secondary_color, &self.theme.accent_color] {
            if !color.is_consistent() {
                return Err(ProfileError::InvalidColor(color.hex.clone()));
            }
        }
        Ok(())
    }

    /// Single edit removing a section from the order; custom sections lose their entry too and
    /// built-in sections get their visibility flag cleared.
    pub fn removal_update(&self, section_id: &str) -> Result<ProfileUpdate, ProfileError> {
        let in_order = self.section_order.iter().any(|s| s == section_id);
        let order: Vec<String> = self.section_order.iter().filter(|s| *s != section_id).cloned().collect();
        let mut update = ProfileUpdate {
            section_order: Some(order),
            ..ProfileUpdate::default()
        };

        match BuiltInSection::from_identifier(section_id) {
            Some(built_in) => {
                let mut flags = self.visibility_flags;
                match built_in {
                    BuiltInSection::Strengths => flags.show_strengths = false,
                    BuiltInSection::SocialLinks => flags.show_social_links = false,
                }
                update.visibility_flags = Some(flags);
            }
            None => {
                if self.custom_section(section_id).is_none() && !in_order {
                    return Err(ProfileError::SectionNotFound(section_id.to_string()));
                }
                let remaining = self
                    .custom_sections
                    .iter()
                    .filter(|s| s.section_id != section_id)
                    .cloned()
                    .collect();
                update.custom_sections = Some(remaining);
            }
        }
        Ok(update)
    }

    /// Swap with the neighbour; `None` when the move is a no-op.
    pub fn move_update(&self, section_id: &str, direction: MoveDirection) -> Option<ProfileUpdate> {
        let index = self.section_order.iter().position(|s| s == section_id)?;
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1)?,
            MoveDirection::Down => index + 1,
        };
        if target >= self.section_order.len() {
            return None;
        }
        let mut order = self.section_order.clone();
        order.swap(index, target);
        Some(ProfileUpdate {
            section_order: Some(order),
            ..ProfileUpdate::default()
        })
    }

    pub fn custom_section_update(&self, new_section: NewCustomSection) -> (ProfileUpdate, CustomSection) {
        let id = Uuid::now_v7().simple().to_string();
        let order = self.custom_sections.iter().map(|s| s.order).max().map_or(0, |max| max + 1);
        let section = CustomSection {
            section_id: CustomSection::section_id_for(&id),
            id,
            title: new_section.title.trim().to_string(),
            content: new_section.content.trim().to_string(),
            kind: new_section.kind,
            images: Vec::new(),
            videos: Vec::new(),
            order,
        };
        let mut sections = self.custom_sections.clone();
        sections.push(section.clone());
        let update = ProfileUpdate {
            custom_sections: Some(sections),
            ..ProfileUpdate::default()
        };
        (update, section)
    }

    /// Toggles a built-in section, keeping its identifier in the order in step with the flag.
    pub fn visibility_update(&self, section: BuiltInSection, visible: bool) -> ProfileUpdate {
        let mut flags = self.visibility_flags;
        match section {
            BuiltInSection::Strengths => flags.show_strengths = visible,
            BuiltInSection::SocialLinks => flags.show_social_links = visible,
        }
        let identifier = section.identifier();
        let mut order = self.section_order.clone();
        if visible && !order.iter().any(|s| s == identifier) {
            order.push(identifier.to_string());
        } else if !visible {
            order.retain(|s| s != identifier);
        }
        ProfileUpdate {
            visibility_flags: Some(flags),
            section_order: Some(order),
            ..ProfileUpdate::default()
        }
    }

    /// Edit replacing one custom section's media list.
    pub fn section_media_update(
        &self,
        section_id: &str,
        edit: impl FnOnce(&mut CustomSection),
    ) -> Result<ProfileUpdate, ProfileError> {
        let mut sections = self.custom_sections.clone();
        let section = sections
            .iter_mut()
            .find(|s| s.section_id == section_id)
            .ok_or_else(|| ProfileError::SectionNotFound(section_id.to_string()))?;
        edit(section);
        Ok(ProfileUpdate {
            custom_sections: Some(sections),
            ..ProfileUpdate::default()
        })
    }

    /// Identifiers of the sections a visitor sees, in render order.
    pub fn layout(&self) -> Vec<String> {
        let flags = &self.visibility_flags;
        self.section_order
            .iter()
            .filter(|identifier| match BuiltInSection::from_identifier(identifier) {
                Some(BuiltInSection::Strengths) => flags.show_strengths,
                Some(BuiltInSection::SocialLinks) => flags.show_social_links,
                None => flags.show_custom_sections && self.custom_section(identifier).is_some(),
            })
            .cloned()
            .collect()
    }
}
