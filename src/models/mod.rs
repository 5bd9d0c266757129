use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::theme::AnimationType;

#[derive(Debug, Serialize, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub last_login_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
    pub created_at: String,
}

/// Author fields joined onto public post and project listings.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct AuthorSummary {
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<&Profile> for AuthorSummary {
    fn from(p: &Profile) -> Self {
        Self {
            username: p.username.clone(),
            display_name: p.display_name.clone(),
            avatar_url: p.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PostMetadata {
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a writer controls; everything else on [`PostMetadata`] is managed by storage.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub featured: bool,
}

impl From<&PostMetadata> for PostDraft {
    fn from(m: &PostMetadata) -> Self {
        Self {
            title: m.title.clone(),
            slug: m.slug.clone(),
            excerpt: m.excerpt.clone(),
            cover_image_url: m.cover_image_url.clone(),
            tags: m.tags.clone(),
            published: m.published,
            featured: m.featured,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct FullPost {
    pub id: String,
    pub metadata: PostMetadata,
    /// Opaque body: an encoded block list, or legacy plain text.
    pub content: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct PostSummary {
    pub id: String,
    pub metadata: PostMetadata,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Project {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub cover_image_url: Option<String>,
    pub video_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub tech_stack: Vec<String>,
    pub images: Vec<String>,
    pub featured: bool,
    pub sort_order: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProjectDraft {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub cover_image_url: Option<String>,
    pub video_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sort_order: i64,
}

impl From<&Project> for ProjectDraft {
    fn from(p: &Project) -> Self {
        Self {
            title: p.title.clone(),
            slug: p.slug.clone(),
            description: p.description.clone(),
            long_description: p.long_description.clone(),
            cover_image_url: p.cover_image_url.clone(),
            video_url: p.video_url.clone(),
            github_url: p.github_url.clone(),
            live_url: p.live_url.clone(),
            tech_stack: p.tech_stack.clone(),
            images: p.images.clone(),
            featured: p.featured,
            sort_order: p.sort_order,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Document
        }
    }

    pub fn from_stored(value: &str) -> Self {
        match value {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            _ => MediaKind::Document,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct MediaObject {
    pub id: String,
    pub author_id: String,
    pub file_name: String,
    pub file_url: String,
    pub file_type: MediaKind,
    /// Key under the object storage bucket.
    #[serde(skip_serializing)]
    pub storage_path: String,
    pub alt_text: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct AnimationOption {
    pub id: AnimationType,
    pub label: String,
    pub description: String,
    pub preview_url: Option<String>,
}

pub mod db_operations;
