use redb::{Database, ReadableTable, TableDefinition};
use crate::models::{FullPost, PostDraft, PostMetadata, PostSummary};
use super::DbError;
use uuid::Uuid;
use chrono::Utc;
use std::collections::HashSet;

pub const POSTS: TableDefinition<&[u8; 16], &str> = TableDefinition::new("posts");
pub const METADATA: TableDefinition<&[u8; 16], &str> = TableDefinition::new("metadata");
pub const SLUG_INDEX: TableDefinition<&str, &[u8; 16]> = TableDefinition::new("slug_index");
pub const TAG_INDEX: TableDefinition<(&str, i64, &[u8; 16]), ()> = TableDefinition::new("tag_index");
pub const AUTHOR_INDEX: TableDefinition<(&str, i64, &[u8; 16]), ()> = TableDefinition::new("author_index");
// Keyed by negated creation millis so iteration yields newest first.
pub const CHRONOLOGICAL_INDEX: TableDefinition<(i64, &[u8; 16]), ()> = TableDefinition::new("chronological_index");

fn index_tags(tags: &[String]) -> HashSet<String> {
    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn display_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}

fn sort_key(metadata: &PostMetadata) -> i64 {
    -metadata.created_at.timestamp_millis()
}

fn summary_for<T>(table: &T, id_bytes: &[u8; 16]) -> Option<PostSummary>
where
    T: ReadableTable<&'static [u8; 16], &'static str>,
{
    table.get(id_bytes).ok().flatten().and_then(|meta_str| {
        serde_json::from_str::<PostMetadata>(meta_str.value())
            .ok()
            .map(|metadata| PostSummary {
                id: Uuid::from_bytes(*id_bytes).to_string(),
                metadata,
            })
    })
}

pub fn create_post(
    db: &Database,
    author_id: &str,
    draft: &PostDraft,
    content: &str,
) -> Result<FullPost, DbError> {
    let post_uuid = Uuid::new_v4();
    let post_id_bytes = post_uuid.into_bytes();
    let now = Utc::now();

    let metadata = PostMetadata {
        author_id: author_id.to_string(),
        title: draft.title.clone(),
        slug: draft.slug.clone(),
        excerpt: draft.excerpt.clone(),
        cover_image_url: draft.cover_image_url.clone(),
        tags: display_tags(&draft.tags),
        published: draft.published,
        featured: draft.featured,
        created_at: now,
        updated_at: now,
    };
    let metadata_json = serde_json::to_string(&metadata)?;
    let timestamp = sort_key(&metadata);

    let write_txn = db.begin_write()?;
    {
        let mut posts_table = write_txn.open_table(POSTS)?;
        let mut metadata_table = write_txn.open_table(METADATA)?;
        let mut slug_index = write_txn.open_table(SLUG_INDEX)?;
        let mut tag_index = write_txn.open_table(TAG_INDEX)?;
        let mut author_index = write_txn.open_table(AUTHOR_INDEX)?;
        let mut chrono_index = write_txn.open_table(CHRONOLOGICAL_INDEX)?;

        if slug_index.get(metadata.slug.as_str())?.is_some() {
            return Err(DbError::Conflict(format!("slug '{}' is already taken", metadata.slug)));
        }

        posts_table.insert(&post_id_bytes, content)?;
        metadata_table.insert(&post_id_bytes, metadata_json.as_str())?;
        slug_index.insert(metadata.slug.as_str(), &post_id_bytes)?;
        author_index.insert((author_id, timestamp, &post_id_bytes), ())?;
        chrono_index.insert((timestamp, &post_id_bytes), ())?;
        for tag in index_tags(&metadata.tags) {
            tag_index.insert((tag.as_str(), timestamp, &post_id_bytes), ())?;
        }
    }
    write_txn.commit()?;

    Ok(FullPost {
        id: post_uuid.to_string(),
        metadata,
        content: content.to_string(),
    })
}

pub fn read_post(db: &Database, id: &str) -> Option<FullPost> {
    let post_uuid = Uuid::parse_str(id).ok()?;
    let post_id_bytes = post_uuid.into_bytes();

    let read_txn = db.begin_read().ok()?;
    let posts_table = read_txn.open_table(POSTS).ok()?;
    let metadata_table = read_txn.open_table(METADATA).ok()?;

    let content_guard = posts_table.get(&post_id_bytes).ok().flatten()?;
    let meta_guard = metadata_table.get(&post_id_bytes).ok().flatten()?;
    match serde_json::from_str(meta_guard.value()) {
        Ok(metadata) => Some(FullPost {
            id: post_uuid.to_string(),
            metadata,
            content: content_guard.value().to_string(),
        }),
        Err(e) => {
            log::error!("Corrupt metadata for post {}: {}", id, e);
            None
        }
    }
}

pub fn read_post_by_slug(db: &Database, slug: &str) -> Result<Option<FullPost>, DbError> {
    let post_id_bytes = {
        let read_txn = db.begin_read()?;
        let slug_index = read_txn.open_table(SLUG_INDEX)?;
        let found = slug_index.get(slug)?.map(|guard| *guard.value());
        match found {
            Some(bytes) => bytes,
            None => return Ok(None),
        }
    };
    Ok(read_post(db, &Uuid::from_bytes(post_id_bytes).to_string()))
}

/// Rewrites the writer-controlled fields. Creation time, author and the
/// chronological position are preserved; `updated_at` is refreshed.
pub fn update_post(
    db: &Database,
    post_id: &str,
    draft: &PostDraft,
    content: &str,
) -> Result<FullPost, DbError> {
    let post_uuid = Uuid::parse_str(post_id)?;
    let post_id_bytes = post_uuid.into_bytes();

    let write_txn = db.begin_write()?;
    let new_meta = {
        let mut posts_table = write_txn.open_table(POSTS)?;
        let mut metadata_table = write_txn.open_table(METADATA)?;
        let mut slug_index = write_txn.open_table(SLUG_INDEX)?;
        let mut tag_index = write_txn.open_table(TAG_INDEX)?;

        let old_meta: PostMetadata = {
            let old_meta_str_guard = metadata_table
                .get(&post_id_bytes)?
                .ok_or_else(|| DbError::NotFound(format!("post {}", post_id)))?;
            serde_json::from_str(old_meta_str_guard.value())?
        };
        let timestamp = sort_key(&old_meta);

        if draft.slug != old_meta.slug {
            let owner = slug_index.get(draft.slug.as_str())?.map(|guard| *guard.value());
            if matches!(owner, Some(other) if other != post_id_bytes) {
                return Err(DbError::Conflict(format!("slug '{}' is already taken", draft.slug)));
            }
            slug_index.remove(old_meta.slug.as_str())?;
            slug_index.insert(draft.slug.as_str(), &post_id_bytes)?;
        }

        for tag in index_tags(&old_meta.tags) {
            tag_index.remove((tag.as_str(), timestamp, &post_id_bytes))?;
        }

        let new_meta = PostMetadata {
            author_id: old_meta.author_id,
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            excerpt: draft.excerpt.clone(),
            cover_image_url: draft.cover_image_url.clone(),
            tags: display_tags(&draft.tags),
            published: draft.published,
            featured: draft.featured,
            created_at: old_meta.created_at,
            updated_at: Utc::now(),
        };
        let new_meta_json = serde_json::to_string(&new_meta)?;

        for tag in index_tags(&new_meta.tags) {
            tag_index.insert((tag.as_str(), timestamp, &post_id_bytes), ())?;
        }
        posts_table.insert(&post_id_bytes, content)?;
        metadata_table.insert(&post_id_bytes, new_meta_json.as_str())?;
        new_meta
    };
    write_txn.commit()?;

    Ok(FullPost {
        id: post_uuid.to_string(),
        metadata: new_meta,
        content: content.to_string(),
    })
}

/// Replaces only the body, bumping `updated_at`.
pub fn update_post_content(db: &Database, post_id: &str, content: &str) -> Result<(), DbError> {
    let post_uuid = Uuid::parse_str(post_id)?;
    let post_id_bytes = post_uuid.into_bytes();

    let write_txn = db.begin_write()?;
    {
        let mut posts_table = write_txn.open_table(POSTS)?;
        let mut metadata_table = write_txn.open_table(METADATA)?;

        let mut meta: PostMetadata = {
            let guard = metadata_table
                .get(&post_id_bytes)?
                .ok_or_else(|| DbError::NotFound(format!("post {}", post_id)))?;
            serde_json::from_str(guard.value())?
        };
        meta.updated_at = Utc::now();
        let meta_json = serde_json::to_string(&meta)?;

        posts_table.insert(&post_id_bytes, content)?;
        metadata_table.insert(&post_id_bytes, meta_json.as_str())?;
    }
    write_txn.commit()?;
    Ok(())
}

/// Returns `false` when the post did not exist.
pub fn delete_post(db: &Database, post_id: &str) -> Result<bool, DbError> {
    let post_uuid = Uuid::parse_str(post_id)?;
    let post_id_bytes = post_uuid.into_bytes();

    let write_txn = db.begin_write()?;
    let existed = {
        let mut posts_table = write_txn.open_table(POSTS)?;
        let mut metadata_table = write_txn.open_table(METADATA)?;
        let mut slug_index = write_txn.open_table(SLUG_INDEX)?;
        let mut tag_index = write_txn.open_table(TAG_INDEX)?;
        let mut author_index = write_txn.open_table(AUTHOR_INDEX)?;
        let mut chrono_index = write_txn.open_table(CHRONOLOGICAL_INDEX)?;

        let meta_to_delete: Option<PostMetadata> = metadata_table
            .get(&post_id_bytes)?
            .and_then(|guard| serde_json::from_str(guard.value()).ok());

        if let Some(meta) = &meta_to_delete {
            let timestamp = sort_key(meta);
            chrono_index.remove((timestamp, &post_id_bytes))?;
            author_index.remove((meta.author_id.as_str(), timestamp, &post_id_bytes))?;
            slug_index.remove(meta.slug.as_str())?;
            for tag in index_tags(&meta.tags) {
                tag_index.remove((tag.as_str(), timestamp, &post_id_bytes))?;
            }
        }

        let removed_body = posts_table.remove(&post_id_bytes)?.is_some();
        metadata_table.remove(&post_id_bytes)?;
        removed_body || meta_to_delete.is_some()
    };
    write_txn.commit()?;
    Ok(existed)
}

/// Newest published posts first.
pub fn read_latest_post_summaries(db: &Database, limit: u32, offset: u32) -> Result<Vec<PostSummary>, DbError> {
    let read_txn = db.begin_read()?;
    let chrono_index = read_txn.open_table(CHRONOLOGICAL_INDEX)?;
    let metadata_table = read_txn.open_table(METADATA)?;

    let posts = chrono_index
        .iter()?
        .filter_map(|item_result| {
            item_result
                .ok()
                .and_then(|(key, _value)| summary_for(&metadata_table, key.value().1))
        })
        .filter(|summary| summary.metadata.published)
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    Ok(posts)
}

pub fn read_featured_post_summaries(db: &Database, limit: u32) -> Result<Vec<PostSummary>, DbError> {
    let read_txn = db.begin_read()?;
    let chrono_index = read_txn.open_table(CHRONOLOGICAL_INDEX)?;
    let metadata_table = read_txn.open_table(METADATA)?;

    let posts = chrono_index
        .iter()?
        .filter_map(|item_result| {
            item_result
                .ok()
                .and_then(|(key, _value)| summary_for(&metadata_table, key.value().1))
        })
        .filter(|summary| summary.metadata.published && summary.metadata.featured)
        .take(limit as usize)
        .collect();
    Ok(posts)
}

/// Published posts carrying `tag` (case-insensitive exact match), newest first.
pub fn read_post_summaries_by_tag(
    db: &Database,
    tag: &str,
    limit: u32,
    offset: u32,
) -> Result<Vec<PostSummary>, DbError> {
    let read_txn = db.begin_read()?;
    let tag_index = read_txn.open_table(TAG_INDEX)?;
    let metadata_table = read_txn.open_table(METADATA)?;

    let lower_tag = tag.trim().to_lowercase();
    let start_key = (lower_tag.as_str(), i64::MIN, &[0u8; 16]);
    let end_key = (lower_tag.as_str(), i64::MAX, &[255u8; 16]);

    let posts = tag_index
        .range(start_key..=end_key)?
        .filter_map(|item_result| {
            item_result
                .ok()
                .and_then(|(key, _value)| summary_for(&metadata_table, key.value().2))
        })
        .filter(|summary| summary.metadata.published)
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    Ok(posts)
}

/// All posts by one author, drafts included when asked, newest first.
pub fn read_post_summaries_by_author(
    db: &Database,
    author_id: &str,
    include_drafts: bool,
) -> Result<Vec<PostSummary>, DbError> {
    let read_txn = db.begin_read()?;
    let author_index = read_txn.open_table(AUTHOR_INDEX)?;
    let metadata_table = read_txn.open_table(METADATA)?;

    let start_key = (author_id, i64::MIN, &[0u8; 16]);
    let end_key = (author_id, i64::MAX, &[255u8; 16]);

    let posts = author_index
        .range(start_key..=end_key)?
        .filter_map(|item_result| {
            item_result
                .ok()
                .and_then(|(key, _value)| summary_for(&metadata_table, key.value().2))
        })
        .filter(|summary| include_drafts || summary.metadata.published)
        .collect();
    Ok(posts)
}
