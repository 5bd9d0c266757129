use crate::models::{AnimationOption, MediaKind, MediaObject, Profile, User};
use crate::theme::AnimationType;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Error as RusqliteError, Row};

pub fn create_user(
    conn: &Connection,
    id: &str,
    email: &str,
    password_hash: &str,
) -> Result<(), RusqliteError> {
    conn.execute(
        "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, email, password_hash, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        created_at: row.get(2)?,
        last_login_time: row.get(3)?,
    })
}

/// Returns the user together with their password hash for credential checks.
pub fn read_credentials_by_email(conn: &Connection, email: &str) -> Result<Option<(User, String)>, RusqliteError> {
    conn.query_row(
        "SELECT id, email, created_at, last_login_time, password_hash FROM users WHERE email = ?1",
        [email],
        |row| Ok((user_from_row(row)?, row.get(4)?)),
    ).optional()
}

pub fn email_exists(conn: &Connection, email: &str) -> Result<bool, RusqliteError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        [email],
        |row| row.get(0),
    )
}

pub fn update_last_login_time(conn: &Connection, id: &str) -> Result<(), RusqliteError> {
    let now = Utc::now().to_rfc3339();
    conn.execute("UPDATE users SET last_login_time = ?1 WHERE id = ?2", params![now, id])?;
    Ok(())
}

// --- Profiles ---

const PROFILE_COLUMNS: &str =
    "id, username, display_name, avatar_url, bio, github_url, website_url, created_at";

fn profile_from_row(row: &Row) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        avatar_url: row.get(3)?,
        bio: row.get(4)?,
        github_url: row.get(5)?,
        website_url: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn create_profile(conn: &Connection, profile: &Profile) -> Result<(), RusqliteError> {
    conn.execute(
        "INSERT INTO profiles (id, username, display_name, avatar_url, bio, github_url, website_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            profile.id,
            profile.username,
            profile.display_name,
            profile.avatar_url,
            profile.bio,
            profile.github_url,
            profile.website_url,
            profile.created_at
        ],
    )?;
    Ok(())
}

pub fn read_profile_by_id(conn: &Connection, id: &str) -> Result<Option<Profile>, RusqliteError> {
    conn.query_row(
        &format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLUMNS),
        [id],
        profile_from_row,
    ).optional()
}

pub fn read_profile_by_username(conn: &Connection, username: &str) -> Result<Option<Profile>, RusqliteError> {
    conn.query_row(
        &format!("SELECT {} FROM profiles WHERE username = ?1", PROFILE_COLUMNS),
        [username],
        profile_from_row,
    ).optional()
}

pub fn username_exists(conn: &Connection, username: &str) -> Result<bool, RusqliteError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM profiles WHERE username = ?1)",
        [username],
        |row| row.get(0),
    )
}

pub fn update_profile(
    conn: &Connection,
    id: &str,
    display_name: &str,
    avatar_url: Option<&str>,
    bio: Option<&str>,
    github_url: Option<&str>,
    website_url: Option<&str>,
) -> Result<usize, RusqliteError> {
    conn.execute(
        "UPDATE profiles SET display_name = ?1, avatar_url = ?2, bio = ?3, github_url = ?4, website_url = ?5 WHERE id = ?6",
        params![display_name, avatar_url, bio, github_url, website_url, id],
    )
}

// --- Settings ---

pub fn read_setting(conn: &Connection, key: &str) -> Option<String> {
    conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| row.get(0))
        .optional()
        .unwrap_or(None)
}

pub fn update_setting(conn: &Connection, key: &str, value: &str) -> Result<(), RusqliteError> {
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        [key, value],
    )?;
    Ok(())
}

// --- Media ---

fn media_from_row(row: &Row) -> rusqlite::Result<MediaObject> {
    let kind: String = row.get(4)?;
    Ok(MediaObject {
        id: row.get(0)?,
        author_id: row.get(1)?,
        file_name: row.get(2)?,
        file_url: row.get(3)?,
        file_type: MediaKind::from_stored(&kind),
        storage_path: row.get(5)?,
        alt_text: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn add_media(conn: &Connection, media: &MediaObject) -> Result<(), RusqliteError> {
    conn.execute(
        "INSERT INTO media (id, author_id, file_name, file_url, file_type, storage_path, alt_text, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            media.id,
            media.author_id,
            media.file_name,
            media.file_url,
            media.file_type.as_str(),
            media.storage_path,
            media.alt_text,
            media.created_at
        ],
    )?;
    Ok(())
}

pub fn read_media(conn: &Connection, id: &str) -> Result<Option<MediaObject>, RusqliteError> {
    conn.query_row(
        "SELECT id, author_id, file_name, file_url, file_type, storage_path, alt_text, created_at FROM media WHERE id = ?1",
        [id],
        media_from_row,
    ).optional()
}

pub fn list_media_for_author(conn: &Connection, author_id: &str) -> Result<Vec<MediaObject>, RusqliteError> {
    let mut stmt = conn.prepare(
        "SELECT id, author_id, file_name, file_url, file_type, storage_path, alt_text, created_at
         FROM media WHERE author_id = ?1 ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map([author_id], media_from_row)?;

    let mut media = Vec::new();
    for row in rows {
        media.push(row?);
    }
    Ok(media)
}

pub fn delete_media_record(conn: &Connection, id: &str) -> Result<usize, RusqliteError> {
    conn.execute("DELETE FROM media WHERE id = ?1", [id])
}

// --- Animations ---

/// Rows with an unknown id are skipped with a warning.
pub fn read_animation_options(conn: &Connection) -> Result<Vec<AnimationOption>, RusqliteError> {
    let mut stmt = conn.prepare("SELECT id, label, description, preview_url FROM animations ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut options = Vec::new();
    for row in rows {
        let (id, label, description, preview_url) = row?;
        match id.parse::<AnimationType>() {
            Ok(id) => options.push(AnimationOption {
                id,
                label,
                description: description.unwrap_or_default(),
                preview_url,
            }),
            Err(e) => log::warn!("Skipping animation row: {}", e),
        }
    }
    Ok(options)
}
