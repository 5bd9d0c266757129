use crate::config::Config;
use crate::content::{self, BlockEditor, ContentBlock, TitleResolver};
use crate::helper::form_helpers::{optional_text, optional_url, parse_comma_list};
use crate::helper::sanitization_helpers::clean_text;
use crate::helper::storage_helpers::{self, StorageError, UploadForm, UploadedFile};
use crate::models::db_operations::{posts_db_operations, projects_db_operations, users_db_operations, DbError};
use crate::models::{FullPost, MediaObject, PostDraft, PostSummary, Profile, Project, ProjectDraft};
use crate::DbPool;
use actix_web::{http::StatusCode, HttpResponse};
use chrono::Utc;
use redb::Database;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

pub const UNTITLED_POST: &str = "Untitled Post";
pub const UNTITLED_PROJECT: &str = "Untitled Project";
const UNTITLED_SLUG_PREFIX: &str = "untitled-";
const MAX_BIO_CHARS: usize = 500;
const RECENT_ITEMS: usize = 5;

#[derive(Error, Debug)]
pub enum HelperError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found.")]
    NotFound(String),
    #[error("You do not have permission to modify this {0}.")]
    Forbidden(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(DbError),
    #[error("R2D2 Pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("{0}")]
    Storage(#[from] StorageError),
}

impl From<DbError> for HelperError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => HelperError::NotFound(what),
            DbError::Conflict(msg) if msg.contains("slug") => {
                HelperError::Conflict("That slug is already in use.".to_string())
            }
            DbError::Conflict(msg) => HelperError::Conflict(msg),
            DbError::Uuid(_) => HelperError::NotFound("Record".to_string()),
            other => HelperError::Database(other),
        }
    }
}

impl From<rusqlite::Error> for HelperError {
    fn from(e: rusqlite::Error) -> Self {
        DbError::from(e).into()
    }
}

impl HelperError {
    pub fn status(&self) -> StatusCode {
        match self {
            HelperError::Validation(_) => StatusCode::BAD_REQUEST,
            HelperError::NotFound(_) => StatusCode::NOT_FOUND,
            HelperError::Forbidden(_) => StatusCode::FORBIDDEN,
            HelperError::Conflict(_) => StatusCode::CONFLICT,
            HelperError::Storage(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON error body; server-side failures are logged and reported generically.
    pub fn to_response(&self) -> HttpResponse {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
            return HttpResponse::build(status)
                .json(json!({"success": false, "error": "An internal error occurred. Please try again."}));
        }
        HttpResponse::build(status).json(json!({"success": false, "error": self.to_string()}))
    }
}

fn validation(msg: impl Into<String>) -> HelperError {
    HelperError::Validation(msg.into())
}

// --- Slugs ---

pub fn untitled_slug() -> String {
    format!("{}{}", UNTITLED_SLUG_PREFIX, Utc::now().timestamp_millis())
}

/// Placeholder `untitled-` slugs (and empty ones) follow the title; anything else
/// the writer chose is kept.
pub fn resolve_slug(current: &str, title: &str) -> String {
    let current = current.trim();
    if current.is_empty() || current.starts_with(UNTITLED_SLUG_PREFIX) {
        let generated = content::generate_slug(title);
        if !generated.is_empty() {
            return generated;
        }
    }
    if current.is_empty() {
        untitled_slug()
    } else {
        current.to_string()
    }
}

/// Media links may be absolute http(s) URLs or site-relative object URLs.
fn media_url(field: &str, value: Option<&str>) -> Result<Option<String>, HelperError> {
    match optional_text(value) {
        Some(url) if url.starts_with("/media/") && !url.contains("..") => Ok(Some(url)),
        other => optional_url(field, other.as_deref()).map_err(HelperError::Validation),
    }
}

/// Block links end up in public `href`/`src` attributes. Placeholder images
/// (empty url) are allowed here and dropped by the editor.
fn validate_blocks(blocks: &[ContentBlock]) -> Result<(), HelperError> {
    for (index, block) in blocks.iter().enumerate() {
        match block {
            ContentBlock::Video { url, title } => {
                if !content::is_http_url(url.trim()) {
                    return Err(validation(format!("Block {}: video links must be http(s) URLs.", index + 1)));
                }
                if title.trim().is_empty() {
                    return Err(validation(format!("Block {}: video links need a title.", index + 1)));
                }
            }
            ContentBlock::Image { url, .. } if !url.trim().is_empty() => {
                media_url(&format!("Block {} image URL", index + 1), Some(url))?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn plain_or_default(value: &str, default: &str) -> String {
    let cleaned = clean_text(value);
    if cleaned.is_empty() {
        default.to_string()
    } else {
        cleaned
    }
}

fn record_media(pool: &DbPool, media: &MediaObject) -> Result<(), HelperError> {
    let conn = pool.get()?;
    users_db_operations::add_media(&conn, media)?;
    Ok(())
}

fn single_image(mut form: UploadForm, what: &str) -> Result<UploadedFile, HelperError> {
    if form.files.is_empty() {
        return Err(StorageError::NoFile.into());
    }
    let file = form.files.swap_remove(0);
    if !file.is_image() {
        return Err(validation(format!("Only image files can be used as {}.", what)));
    }
    Ok(file)
}

// --- Overview ---

#[derive(Serialize, Debug)]
pub struct DashboardOverview {
    pub profile: Option<Profile>,
    pub post_count: usize,
    pub published_count: usize,
    pub draft_count: usize,
    pub project_count: usize,
    pub recent_posts: Vec<PostSummary>,
    pub recent_projects: Vec<Project>,
}

pub fn overview(db: &Database, pool: &DbPool, user_id: &str) -> Result<DashboardOverview, HelperError> {
    let posts = posts_db_operations::read_post_summaries_by_author(db, user_id, true)?;
    let conn = pool.get()?;
    let projects = projects_db_operations::read_projects_by_author(&conn, user_id)?;
    let profile = users_db_operations::read_profile_by_id(&conn, user_id)?;

    let published_count = posts.iter().filter(|p| p.metadata.published).count();
    Ok(DashboardOverview {
        profile,
        post_count: posts.len(),
        published_count,
        draft_count: posts.len() - published_count,
        project_count: projects.len(),
        recent_posts: posts.into_iter().take(RECENT_ITEMS).collect(),
        recent_projects: projects.into_iter().take(RECENT_ITEMS).collect(),
    })
}

// --- Posts ---

/// A post as the editor sees it: the stored record plus its decoded body.
#[derive(Serialize, Debug)]
pub struct EditablePost {
    pub post: FullPost,
    pub blocks: Vec<ContentBlock>,
}

impl EditablePost {
    fn new(post: FullPost) -> Self {
        let mut editor = BlockEditor::new(content::deserialize_blocks(&post.content));
        editor.ensure_first_block();
        Self {
            blocks: editor.into_blocks(),
            post,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct PostUpdate {
    pub title: String,
    pub blocks: Vec<ContentBlock>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub featured: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct LinkRequest {
    pub input: String,
    /// Block the link is inserted after; defaults to the last block.
    #[serde(default)]
    pub after_index: Option<usize>,
    #[serde(default = "default_as_block")]
    pub as_block: bool,
}

fn default_as_block() -> bool {
    true
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct LinkPreview {
    pub url: String,
    pub title: String,
}

pub fn require_post_owner(db: &Database, user_id: &str, post_id: &str) -> Result<FullPost, HelperError> {
    let post = posts_db_operations::read_post(db, post_id)
        .ok_or_else(|| HelperError::NotFound("Post".to_string()))?;
    if post.metadata.author_id != user_id {
        return Err(HelperError::Forbidden("post"));
    }
    Ok(post)
}

pub fn list_my_posts(db: &Database, user_id: &str) -> Result<Vec<PostSummary>, HelperError> {
    Ok(posts_db_operations::read_post_summaries_by_author(db, user_id, true)?)
}

pub fn load_post_for_editing(db: &Database, user_id: &str, post_id: &str) -> Result<EditablePost, HelperError> {
    require_post_owner(db, user_id, post_id).map(EditablePost::new)
}

/// New unpublished draft with an empty body and a placeholder slug.
pub fn create_untitled_post(db: &Database, user_id: &str) -> Result<FullPost, HelperError> {
    let draft = PostDraft {
        title: UNTITLED_POST.to_string(),
        slug: untitled_slug(),
        ..Default::default()
    };
    Ok(posts_db_operations::create_post(db, user_id, &draft, "")?)
}

/// Saves title, body and publish state. Fields the request leaves out keep
/// their stored values.
pub fn save_post(db: &Database, user_id: &str, post_id: &str, update: PostUpdate) -> Result<EditablePost, HelperError> {
    let post = require_post_owner(db, user_id, post_id)?;
    validate_blocks(&update.blocks)?;

    let mut editor = BlockEditor::new(update.blocks);
    editor.discard_pending_images();
    editor.ensure_first_block();
    let body = content::serialize_blocks(editor.blocks());

    let mut draft = PostDraft::from(&post.metadata);
    draft.title = plain_or_default(&update.title, UNTITLED_POST);
    draft.slug = resolve_slug(&post.metadata.slug, &draft.title);
    draft.published = update.published;
    if let Some(excerpt) = update.excerpt {
        draft.excerpt = optional_text(Some(&clean_text(&excerpt)));
    }
    if let Some(cover) = update.cover_image_url {
        draft.cover_image_url = media_url("Cover image URL", Some(&cover))?;
    }
    if let Some(tags) = update.tags {
        draft.tags = tags.iter().map(|t| clean_text(t)).collect();
    }
    if let Some(featured) = update.featured {
        draft.featured = featured;
    }

    let saved = posts_db_operations::update_post(db, post_id, &draft, &body)?;
    log::info!("Post {} saved by {} (published: {}).", post_id, user_id, saved.metadata.published);
    Ok(EditablePost::new(saved))
}

pub fn delete_post(db: &Database, user_id: &str, post_id: &str) -> Result<(), HelperError> {
    require_post_owner(db, user_id, post_id)?;
    if !posts_db_operations::delete_post(db, post_id)? {
        return Err(HelperError::NotFound("Post".to_string()));
    }
    log::info!("Post {} deleted by {}.", post_id, user_id);
    Ok(())
}

/// Parses the link directive and fills in a missing title from the lookup
/// service. Only http(s) targets are accepted.
pub async fn resolve_link(resolver: &TitleResolver, input: &str) -> Result<LinkPreview, HelperError> {
    let directive = content::parse_link_syntax(input);
    if !content::is_http_url(&directive.url) {
        return Err(validation("Links must be http(s) URLs."));
    }
    let title = match directive.title {
        Some(title) => title,
        None => resolver.fetch_video_title(&directive.url).await,
    };
    Ok(LinkPreview {
        url: directive.url,
        title,
    })
}

pub async fn add_link_to_post(
    db: &Database,
    resolver: &TitleResolver,
    user_id: &str,
    post_id: &str,
    request: LinkRequest,
) -> Result<EditablePost, HelperError> {
    require_post_owner(db, user_id, post_id)?;
    let link = if request.as_block {
        resolve_link(resolver, &request.input).await?
    } else {
        let directive = content::parse_link_syntax(&request.input);
        if !content::is_http_url(&directive.url) {
            return Err(validation("Links must be http(s) URLs."));
        }
        LinkPreview {
            url: directive.url,
            title: String::new(),
        }
    };

    // Re-read after the lookup so edits saved meanwhile are not overwritten.
    let post = require_post_owner(db, user_id, post_id)?;
    let mut editor = BlockEditor::new(content::deserialize_blocks(&post.content));
    editor.ensure_first_block();
    let last = editor.blocks().len() - 1;
    let index = request.after_index.unwrap_or(last).min(last);
    if request.as_block {
        editor.insert_link_block(index, &link.url, &link.title);
    } else {
        editor.append_link_text(index, &link.url);
    }

    let body = content::serialize_blocks(editor.blocks());
    posts_db_operations::update_post_content(db, post_id, &body)?;
    Ok(EditablePost {
        blocks: editor.into_blocks(),
        post: FullPost { content: body, ..post },
    })
}

/// Uploads an image to `posts/<id>/img-<millis>-<name>` and appends it to the body
/// as an image block followed by a text block.
pub async fn add_image_to_post(
    db: &Database,
    pool: &DbPool,
    config: &Config,
    user_id: &str,
    post_id: &str,
    form: UploadForm,
) -> Result<(EditablePost, MediaObject), HelperError> {
    require_post_owner(db, user_id, post_id)?;
    let caption = form.field("caption").map(clean_text);
    let file = single_image(form, "post images")?;

    let object_path = format!("posts/{}/img-{}-{}", post_id, Utc::now().timestamp_millis(), file.safe_name());
    let media = storage_helpers::store_upload(config, user_id, &object_path, file, caption.clone()).await?;
    record_media(pool, &media)?;

    let post = require_post_owner(db, user_id, post_id)?;
    let mut editor = BlockEditor::new(content::deserialize_blocks(&post.content));
    editor.discard_pending_images();
    editor.ensure_first_block();
    editor.insert_pending_image();
    if let (Some(index), Some(caption)) = (editor.resolve_pending_image(&media.file_url), caption.as_deref()) {
        editor.update_caption(index, caption);
    }

    let body = content::serialize_blocks(editor.blocks());
    posts_db_operations::update_post_content(db, post_id, &body)?;
    Ok((
        EditablePost {
            blocks: editor.into_blocks(),
            post: FullPost { content: body, ..post },
        },
        media,
    ))
}

// --- Projects ---

#[derive(Deserialize, Debug)]
pub struct ProjectUpdate {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub cover_image_url: Option<String>,
    pub video_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    /// Comma separated, as typed into the editor.
    #[serde(default)]
    pub tech_stack: String,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sort_order: i64,
}

pub fn require_project_owner(pool: &DbPool, user_id: &str, project_id: &str) -> Result<Project, HelperError> {
    let conn = pool.get()?;
    let project = projects_db_operations::read_project_by_id(&conn, project_id)?
        .ok_or_else(|| HelperError::NotFound("Project".to_string()))?;
    if project.author_id != user_id {
        return Err(HelperError::Forbidden("project"));
    }
    Ok(project)
}

pub fn list_my_projects(pool: &DbPool, user_id: &str) -> Result<Vec<Project>, HelperError> {
    let conn = pool.get()?;
    Ok(projects_db_operations::read_projects_by_author(&conn, user_id)?)
}

pub fn create_untitled_project(pool: &DbPool, user_id: &str) -> Result<Project, HelperError> {
    let conn = pool.get()?;
    let draft = ProjectDraft {
        title: UNTITLED_PROJECT.to_string(),
        slug: untitled_slug(),
        ..Default::default()
    };
    Ok(projects_db_operations::create_project(&conn, user_id, &draft)?)
}

pub fn save_project(
    pool: &DbPool,
    user_id: &str,
    project_id: &str,
    update: ProjectUpdate,
) -> Result<Project, HelperError> {
    let existing = require_project_owner(pool, user_id, project_id)?;

    let title = plain_or_default(&update.title, UNTITLED_PROJECT);
    let requested_slug = content::generate_slug(&update.slug);
    let images = match update.images {
        Some(images) => images
            .iter()
            .map(|url| media_url("Gallery image URL", Some(url)))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect(),
        None => existing.images,
    };

    let draft = ProjectDraft {
        slug: resolve_slug(&requested_slug, &title),
        title,
        description: optional_text(update.description.as_deref().map(clean_text).as_deref()),
        long_description: optional_text(update.long_description.as_deref()),
        cover_image_url: media_url("Cover image URL", update.cover_image_url.as_deref())?,
        video_url: optional_url("Video URL", update.video_url.as_deref()).map_err(HelperError::Validation)?,
        github_url: optional_url("GitHub URL", update.github_url.as_deref()).map_err(HelperError::Validation)?,
        live_url: optional_url("Live URL", update.live_url.as_deref()).map_err(HelperError::Validation)?,
        tech_stack: parse_comma_list(&update.tech_stack),
        images,
        featured: update.featured,
        sort_order: update.sort_order,
    };

    let conn = pool.get()?;
    let saved = projects_db_operations::update_project(&conn, project_id, &draft)?;
    log::info!("Project {} saved by {}.", project_id, user_id);
    Ok(saved)
}

/// Uploads the cover to `projects/<id>/cover-<name>`, replacing any earlier
/// upload with the same name.
pub async fn set_project_cover(
    pool: &DbPool,
    config: &Config,
    user_id: &str,
    project_id: &str,
    form: UploadForm,
) -> Result<Project, HelperError> {
    require_project_owner(pool, user_id, project_id)?;
    let alt_text = form.field("alt_text").map(clean_text);
    let file = single_image(form, "a cover")?;

    let object_path = format!("projects/{}/cover-{}", project_id, file.safe_name());
    let media = storage_helpers::store_upload(config, user_id, &object_path, file, alt_text).await?;
    record_media(pool, &media)?;

    let project = require_project_owner(pool, user_id, project_id)?;
    let mut draft = ProjectDraft::from(&project);
    draft.cover_image_url = Some(media.file_url);
    let conn = pool.get()?;
    Ok(projects_db_operations::update_project(&conn, project_id, &draft)?)
}

/// Uploads every file to `projects/<id>/gallery-<millis>-<name>` and appends
/// the URLs to the gallery in upload order.
pub async fn add_project_gallery_images(
    pool: &DbPool,
    config: &Config,
    user_id: &str,
    project_id: &str,
    form: UploadForm,
) -> Result<Project, HelperError> {
    require_project_owner(pool, user_id, project_id)?;
    if form.files.is_empty() {
        return Err(StorageError::NoFile.into());
    }
    if form.files.iter().any(|f| !f.is_image()) {
        return Err(validation("Only image files can be added to a gallery."));
    }

    let mut urls = Vec::with_capacity(form.files.len());
    for file in form.files {
        let object_path = format!(
            "projects/{}/gallery-{}-{}",
            project_id,
            Utc::now().timestamp_millis(),
            file.safe_name()
        );
        let media = storage_helpers::store_upload(config, user_id, &object_path, file, None).await?;
        record_media(pool, &media)?;
        urls.push(media.file_url);
    }

    let project = require_project_owner(pool, user_id, project_id)?;
    let mut draft = ProjectDraft::from(&project);
    draft.images.extend(urls);
    let conn = pool.get()?;
    Ok(projects_db_operations::update_project(&conn, project_id, &draft)?)
}

/// Drops one gallery entry. The stored object stays in the media library.
pub fn remove_project_image(pool: &DbPool, user_id: &str, project_id: &str, index: usize) -> Result<Project, HelperError> {
    let project = require_project_owner(pool, user_id, project_id)?;
    if index >= project.images.len() {
        return Err(validation("No gallery image at that position."));
    }
    let mut draft = ProjectDraft::from(&project);
    draft.images.remove(index);
    let conn = pool.get()?;
    Ok(projects_db_operations::update_project(&conn, project_id, &draft)?)
}

pub fn delete_project(pool: &DbPool, user_id: &str, project_id: &str) -> Result<(), HelperError> {
    require_project_owner(pool, user_id, project_id)?;
    let conn = pool.get()?;
    if projects_db_operations::delete_project(&conn, project_id)? == 0 {
        return Err(HelperError::NotFound("Project".to_string()));
    }
    log::info!("Project {} deleted by {}.", project_id, user_id);
    Ok(())
}

// --- Profile ---

#[derive(Deserialize, Debug)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
}

pub fn get_profile(pool: &DbPool, user_id: &str) -> Result<Profile, HelperError> {
    let conn = pool.get()?;
    users_db_operations::read_profile_by_id(&conn, user_id)?
        .ok_or_else(|| HelperError::NotFound("Profile".to_string()))
}

pub fn update_profile(pool: &DbPool, user_id: &str, update: ProfileUpdate) -> Result<Profile, HelperError> {
    let display_name = clean_text(&update.display_name);
    if display_name.is_empty() {
        return Err(validation("Display name is required."));
    }
    let bio = optional_text(update.bio.as_deref().map(clean_text).as_deref());
    if bio.as_ref().map_or(false, |b| b.chars().count() > MAX_BIO_CHARS) {
        return Err(validation(format!("Bio cannot exceed {} characters.", MAX_BIO_CHARS)));
    }
    let avatar_url = media_url("Avatar URL", update.avatar_url.as_deref())?;
    let github_url = optional_url("GitHub URL", update.github_url.as_deref()).map_err(HelperError::Validation)?;
    let website_url = optional_url("Website URL", update.website_url.as_deref()).map_err(HelperError::Validation)?;

    let conn = pool.get()?;
    let changed = users_db_operations::update_profile(
        &conn,
        user_id,
        &display_name,
        avatar_url.as_deref(),
        bio.as_deref(),
        github_url.as_deref(),
        website_url.as_deref(),
    )?;
    if changed == 0 {
        return Err(HelperError::NotFound("Profile".to_string()));
    }
    get_profile(pool, user_id)
}

// --- Media ---

pub fn list_media(pool: &DbPool, user_id: &str) -> Result<Vec<MediaObject>, HelperError> {
    let conn = pool.get()?;
    Ok(users_db_operations::list_media_for_author(&conn, user_id)?)
}

/// Removes the library record first; a leftover object is only logged.
pub async fn delete_media(pool: &DbPool, config: &Config, user_id: &str, media_id: &str) -> Result<(), HelperError> {
    let media = {
        let conn = pool.get()?;
        let media = users_db_operations::read_media(&conn, media_id)?
            .ok_or_else(|| HelperError::NotFound("Media".to_string()))?;
        if media.author_id != user_id {
            return Err(HelperError::Forbidden("media"));
        }
        users_db_operations::delete_media_record(&conn, media_id)?;
        media
    };
    if !storage_helpers::delete_object(config, &media.storage_path).await {
        log::warn!("Media record {} removed but its object '{}' remains.", media_id, media.storage_path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_slugs_follow_the_title() {
        assert_eq!(resolve_slug("untitled-1700000000000", "Hello, World!"), "hello-world");
        assert_eq!(resolve_slug("", "My Project"), "my-project");
    }

    #[test]
    fn chosen_slugs_are_kept() {
        assert_eq!(resolve_slug("my-first-post", "A Different Title"), "my-first-post");
    }

    #[test]
    fn unsluggable_titles_keep_a_placeholder() {
        assert_eq!(resolve_slug("untitled-42", "!!!"), "untitled-42");
        assert!(resolve_slug("", "???").starts_with("untitled-"));
    }

    #[test]
    fn media_urls_accept_relative_object_paths() {
        assert_eq!(
            media_url("Cover", Some("/media/portfolio-media/posts/1/a.png")).unwrap(),
            Some("/media/portfolio-media/posts/1/a.png".to_string())
        );
        assert!(media_url("Cover", Some("/etc/passwd")).is_err());
        assert!(media_url("Cover", Some("/media/../secret")).is_err());
    }

    #[test]
    fn error_statuses() {
        assert_eq!(HelperError::Forbidden("post").status(), StatusCode::FORBIDDEN);
        assert_eq!(HelperError::from(DbError::Conflict("slug 'a' is already taken".into())).status(), StatusCode::CONFLICT);
        assert_eq!(HelperError::from(StorageError::NoFile).status(), StatusCode::BAD_REQUEST);
    }
}
