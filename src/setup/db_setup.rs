use redb::{Database, CommitError, StorageError, TableError, TransactionError};
use rusqlite::{Connection, Result as RusqliteResult, Transaction};
use thiserror::Error;

use crate::models::db_operations::posts_db_operations::{
    AUTHOR_INDEX, CHRONOLOGICAL_INDEX, METADATA, POSTS, SLUG_INDEX, TAG_INDEX,
};

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Redb storage error: {0}")]
    RedbStorage(#[from] StorageError),
    #[error("Redb transaction error: {0}")]
    RedbTransaction(#[from] TransactionError),
    #[error("Redb table error: {0}")]
    RedbTable(#[from] TableError),
    #[error("Redb commit error: {0}")]
    RedbCommit(#[from] CommitError),
}

/// Upload types accepted out of the box.
pub const DEFAULT_ALLOWED_MIME_TYPES: &str =
    "image/jpeg,image/png,image/gif,image/webp,video/mp4,video/webm,application/pdf";

const ANIMATION_SEED: [(&str, &str, &str); 6] = [
    ("none", "None", "A still background."),
    ("particles", "Particles", "Drifting dots joined by faint lines when close."),
    ("gradient", "Gradient", "A slowly rotating accent gradient."),
    ("waves", "Waves", "Five layered sine waves."),
    ("matrix", "Matrix", "Falling katakana columns."),
    ("snow", "Snow", "Gently wobbling snowflakes."),
];

pub fn setup_users_db(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;
    log::info!("Creating 'users' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            last_login_time TEXT
        )",
        [],
    )?;

    log::info!("Creating 'profiles' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            avatar_url TEXT,
            bio TEXT,
            github_url TEXT,
            website_url TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (id) REFERENCES users(id) ON DELETE CASCADE
        )",
        [],
    )?;

    log::info!("Creating 'user_preferences' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS user_preferences (
            id TEXT PRIMARY KEY,
            bg_color TEXT,
            bg_secondary TEXT,
            accent_color TEXT,
            text_color TEXT,
            font_family TEXT,
            animation TEXT NOT NULL DEFAULT 'none',
            sidebar_position TEXT NOT NULL DEFAULT 'left',
            custom_css TEXT,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (id) REFERENCES users(id) ON DELETE CASCADE
        )",
        [],
    )?;

    log::info!("Creating 'projects' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT,
            long_description TEXT,
            cover_image_url TEXT,
            video_url TEXT,
            github_url TEXT,
            live_url TEXT,
            tech_stack TEXT NOT NULL DEFAULT '[]',
            images TEXT NOT NULL DEFAULT '[]',
            featured INTEGER NOT NULL DEFAULT 0,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
        )",
        [],
    )?;

    log::info!("Creating 'media' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS media (
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_url TEXT NOT NULL,
            file_type TEXT NOT NULL CHECK(file_type IN ('image', 'video', 'document')),
            storage_path TEXT NOT NULL,
            alt_text TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
        )",
        [],
    )?;

    log::info!("Creating 'animations' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS animations (
            id TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            description TEXT,
            preview_url TEXT
        )",
        [],
    )?;

    log::info!("Creating 'settings' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    seed_initial_settings(&tx)?;
    seed_animations(&tx)?;

    tx.commit()?;
    Ok(())
}

fn seed_initial_settings(tx: &Transaction) -> RusqliteResult<()> {
    let default_max_size = "10";
    tx.execute(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('max_file_upload_size_mb', ?1)",
        [&default_max_size],
    )?;
    log::info!("Default max file upload size set to: {} MB", default_max_size);

    tx.execute(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('allowed_mime_types', ?1)",
        [&DEFAULT_ALLOWED_MIME_TYPES],
    )?;
    log::info!("Default allowed MIME types set to: {}", DEFAULT_ALLOWED_MIME_TYPES);
    Ok(())
}

fn seed_animations(tx: &Transaction) -> RusqliteResult<()> {
    for (id, label, description) in ANIMATION_SEED {
        tx.execute(
            "INSERT OR IGNORE INTO animations (id, label, description) VALUES (?1, ?2, ?3)",
            [id, label, description],
        )?;
    }
    Ok(())
}

pub fn setup_posts_db(db: &Database) -> Result<(), SetupError> {
    let write_txn = db.begin_write()?;
    {
        log::info!("Creating post tables in redb...");
        write_txn.open_table(POSTS)?;
        write_txn.open_table(METADATA)?;
        write_txn.open_table(SLUG_INDEX)?;
        write_txn.open_table(TAG_INDEX)?;
        write_txn.open_table(AUTHOR_INDEX)?;
        write_txn.open_table(CHRONOLOGICAL_INDEX)?;
    }
    write_txn.commit()?;
    Ok(())
}
