use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
pub type DbPool = Pool<SqliteConnectionManager>;

use content::TitleResolver;

/// Process-wide services shared by every worker.
pub struct AppState {
    pub title_resolver: TitleResolver,
}

pub mod animation;
pub mod config;
pub mod content;
pub mod helper;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod setup;
pub mod theme;

mod tests;
