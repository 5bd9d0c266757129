use crate::models::{Project, ProjectDraft};
use super::DbError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "id, author_id, title, slug, description, long_description, cover_image_url, \
     video_url, github_url, live_url, tech_stack, images, featured, sort_order, created_at, updated_at";

// List columns are stored as JSON arrays; an unreadable value reads as empty.
fn json_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok()).unwrap_or_default()
}

fn project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        author_id: row.get(1)?,
        title: row.get(2)?,
        slug: row.get(3)?,
        description: row.get(4)?,
        long_description: row.get(5)?,
        cover_image_url: row.get(6)?,
        video_url: row.get(7)?,
        github_url: row.get(8)?,
        live_url: row.get(9)?,
        tech_stack: json_list(row.get(10)?),
        images: json_list(row.get(11)?),
        featured: row.get(12)?,
        sort_order: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn query_projects(conn: &Connection, sql_tail: &str, param: Option<&str>) -> Result<Vec<Project>, DbError> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM projects {}", PROJECT_COLUMNS, sql_tail))?;
    let rows = match param {
        Some(p) => stmt.query_map([p], project_from_row)?.collect::<Result<Vec<_>, _>>()?,
        None => stmt.query_map([], project_from_row)?.collect::<Result<Vec<_>, _>>()?,
    };
    Ok(rows)
}

pub fn create_project(conn: &Connection, author_id: &str, draft: &ProjectDraft) -> Result<Project, DbError> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    conn.execute(
        &format!("INSERT INTO projects ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)", PROJECT_COLUMNS),
        params![
            id,
            author_id,
            draft.title,
            draft.slug,
            draft.description,
            draft.long_description,
            draft.cover_image_url,
            draft.video_url,
            draft.github_url,
            draft.live_url,
            serde_json::to_string(&draft.tech_stack)?,
            serde_json::to_string(&draft.images)?,
            draft.featured,
            draft.sort_order,
            now,
            now
        ],
    )?;
    read_project_by_id(conn, &id)?.ok_or_else(|| DbError::NotFound(format!("project {}", id)))
}

pub fn read_project_by_id(conn: &Connection, id: &str) -> Result<Option<Project>, DbError> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS),
            [id],
            project_from_row,
        )
        .optional()?)
}

pub fn read_project_by_slug(conn: &Connection, slug: &str) -> Result<Option<Project>, DbError> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM projects WHERE slug = ?1", PROJECT_COLUMNS),
            [slug],
            project_from_row,
        )
        .optional()?)
}

/// Ordered by `sort_order`, then newest first.
pub fn read_all_projects(conn: &Connection) -> Result<Vec<Project>, DbError> {
    query_projects(conn, "ORDER BY sort_order ASC, created_at DESC", None)
}

pub fn read_featured_projects(conn: &Connection, limit: u32) -> Result<Vec<Project>, DbError> {
    query_projects(conn, &format!("WHERE featured = 1 ORDER BY sort_order ASC LIMIT {}", limit), None)
}

pub fn read_projects_by_author(conn: &Connection, author_id: &str) -> Result<Vec<Project>, DbError> {
    query_projects(conn, "WHERE author_id = ?1 ORDER BY sort_order ASC, created_at DESC", Some(author_id))
}

pub fn update_project(conn: &Connection, id: &str, draft: &ProjectDraft) -> Result<Project, DbError> {
    let changed = conn.execute(
        "UPDATE projects SET title = ?1, slug = ?2, description = ?3, long_description = ?4, cover_image_url = ?5,
            video_url = ?6, github_url = ?7, live_url = ?8, tech_stack = ?9, images = ?10, featured = ?11,
            sort_order = ?12, updated_at = ?13
         WHERE id = ?14",
        params![
            draft.title,
            draft.slug,
            draft.description,
            draft.long_description,
            draft.cover_image_url,
            draft.video_url,
            draft.github_url,
            draft.live_url,
            serde_json::to_string(&draft.tech_stack)?,
            serde_json::to_string(&draft.images)?,
            draft.featured,
            draft.sort_order,
            Utc::now().to_rfc3339(),
            id
        ],
    )?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("project {}", id)));
    }
    read_project_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("project {}", id)))
}

pub fn delete_project(conn: &Connection, id: &str) -> Result<usize, DbError> {
    Ok(conn.execute("DELETE FROM projects WHERE id = ?1", [id])?)
}
