use crate::animation::{AnimationConfig, Animator, SvgSurface};
use crate::content::{self, ContentBlock};
use crate::helper::dashboard_helpers::HelperError;
use crate::helper::theme_helpers;
use crate::models::db_operations::{posts_db_operations, projects_db_operations, users_db_operations};
use crate::models::{AuthorSummary, FullPost, PostSummary, Profile, Project};
use crate::theme::ThemePreferences;
use crate::DbPool;
use redb::Database;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

pub const FEED_LIMIT: u32 = 50;
pub const FEATURED_POSTS_LIMIT: u32 = 5;
pub const FEATURED_PROJECTS_LIMIT: u32 = 6;
pub const PROFILE_POSTS_LIMIT: usize = 20;

pub const MAX_SNAPSHOT_WIDTH: u32 = 1920;
pub const MAX_SNAPSHOT_HEIGHT: u32 = 1080;
pub const MAX_SNAPSHOT_FRAMES: u32 = 120;

#[derive(Serialize, Debug)]
pub struct PostCard {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub author: Option<AuthorSummary>,
}

#[derive(Serialize, Debug)]
pub struct PublicPost {
    pub post: FullPost,
    pub blocks: Vec<ContentBlock>,
    pub author: Option<AuthorSummary>,
}

#[derive(Serialize, Debug)]
pub struct ProjectCard {
    #[serde(flatten)]
    pub project: Project,
    pub author: Option<AuthorSummary>,
}

#[derive(Serialize, Debug)]
pub struct UserPage {
    pub profile: Profile,
    pub preferences: ThemePreferences,
    pub theme_variables: BTreeMap<String, String>,
    pub stylesheet: String,
    pub posts: Vec<PostSummary>,
    pub projects: Vec<Project>,
}

/// Looks authors up once per request, however many of their items are listed.
struct AuthorCache<'a> {
    conn: &'a Connection,
    seen: HashMap<String, Option<AuthorSummary>>,
}

impl<'a> AuthorCache<'a> {
    fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            seen: HashMap::new(),
        }
    }

    fn get(&mut self, author_id: &str) -> Option<AuthorSummary> {
        let conn = self.conn;
        self.seen
            .entry(author_id.to_string())
            .or_insert_with(|| match users_db_operations::read_profile_by_id(conn, author_id) {
                Ok(profile) => profile.as_ref().map(AuthorSummary::from),
                Err(e) => {
                    log::error!("Failed to read author {}: {}", author_id, e);
                    None
                }
            })
            .clone()
    }
}

fn post_cards(pool: &DbPool, summaries: Vec<PostSummary>) -> Result<Vec<PostCard>, HelperError> {
    let conn = pool.get()?;
    let mut authors = AuthorCache::new(&conn);
    Ok(summaries
        .into_iter()
        .map(|summary| PostCard {
            author: authors.get(&summary.metadata.author_id),
            summary,
        })
        .collect())
}

fn project_cards(conn: &Connection, projects: Vec<Project>) -> Vec<ProjectCard> {
    let mut authors = AuthorCache::new(conn);
    projects
        .into_iter()
        .map(|project| ProjectCard {
            author: authors.get(&project.author_id),
            project,
        })
        .collect()
}

/// Distinct tags across `cards`, for the feed's filter bar.
pub fn collect_tags(cards: &[PostCard]) -> Vec<String> {
    let tags: BTreeSet<String> = cards
        .iter()
        .flat_map(|c| c.summary.metadata.tags.iter().cloned())
        .collect();
    tags.into_iter().collect()
}

pub fn fetch_latest_posts(db: &Database, pool: &DbPool, limit: u32, offset: u32) -> Result<Vec<PostCard>, HelperError> {
    let summaries = posts_db_operations::read_latest_post_summaries(db, limit, offset)?;
    post_cards(pool, summaries)
}

pub fn fetch_featured_posts(db: &Database, pool: &DbPool) -> Result<Vec<PostCard>, HelperError> {
    let summaries = posts_db_operations::read_featured_post_summaries(db, FEATURED_POSTS_LIMIT)?;
    post_cards(pool, summaries)
}

pub fn fetch_posts_by_tag(db: &Database, pool: &DbPool, tag: &str, limit: u32, offset: u32) -> Result<Vec<PostCard>, HelperError> {
    let summaries = posts_db_operations::read_post_summaries_by_tag(db, &tag.trim().to_lowercase(), limit, offset)?;
    post_cards(pool, summaries)
}

/// A post by slug with its decoded body. Drafts are only visible to their author.
pub fn fetch_post_by_slug(
    db: &Database,
    pool: &DbPool,
    slug: &str,
    viewer_id: Option<&str>,
) -> Result<Option<PublicPost>, HelperError> {
    let post = match posts_db_operations::read_post_by_slug(db, slug)? {
        Some(post) => post,
        None => return Ok(None),
    };
    if !post.metadata.published && viewer_id != Some(post.metadata.author_id.as_str()) {
        return Ok(None);
    }
    let conn = pool.get()?;
    let author = AuthorCache::new(&conn).get(&post.metadata.author_id);
    Ok(Some(PublicPost {
        blocks: content::deserialize_blocks(&post.content),
        post,
        author,
    }))
}

pub fn fetch_projects(pool: &DbPool) -> Result<Vec<ProjectCard>, HelperError> {
    let conn = pool.get()?;
    let projects = projects_db_operations::read_all_projects(&conn)?;
    Ok(project_cards(&conn, projects))
}

pub fn fetch_featured_projects(pool: &DbPool) -> Result<Vec<ProjectCard>, HelperError> {
    let conn = pool.get()?;
    let projects = projects_db_operations::read_featured_projects(&conn, FEATURED_PROJECTS_LIMIT)?;
    Ok(project_cards(&conn, projects))
}

pub fn fetch_project_by_slug(pool: &DbPool, slug: &str) -> Result<Option<ProjectCard>, HelperError> {
    let conn = pool.get()?;
    let project = projects_db_operations::read_project_by_slug(&conn, slug)?;
    Ok(project.map(|p| {
        let author = AuthorCache::new(&conn).get(&p.author_id);
        ProjectCard { project: p, author }
    }))
}

pub fn fetch_profile_by_username(pool: &DbPool, username: &str) -> Result<Option<Profile>, HelperError> {
    let conn = pool.get()?;
    Ok(users_db_operations::read_profile_by_username(&conn, username)?)
}

/// Everything the themed profile page shows: the profile, its theme already
/// applied, published posts and all projects.
pub fn fetch_user_page(db: &Database, pool: &DbPool, username: &str) -> Result<Option<UserPage>, HelperError> {
    let profile = match fetch_profile_by_username(pool, username)? {
        Some(profile) => profile,
        None => return Ok(None),
    };
    let preferences = theme_helpers::load_preferences(pool, &profile.id)?;
    let theme = theme_helpers::theme_context(&preferences);

    let mut posts = posts_db_operations::read_post_summaries_by_author(db, &profile.id, false)?;
    posts.truncate(PROFILE_POSTS_LIMIT);
    let projects = {
        let conn = pool.get()?;
        projects_db_operations::read_projects_by_author(&conn, &profile.id)?
    };

    Ok(Some(UserPage {
        theme_variables: theme.properties().clone(),
        stylesheet: theme.to_stylesheet(),
        profile,
        preferences,
        posts,
        projects,
    }))
}

/// Seed derived from the user id, so a profile's background is stable between requests.
pub fn snapshot_seed(user_id: &str) -> u64 {
    Uuid::parse_str(user_id).map(|u| u.as_u128() as u64).unwrap_or(0)
}

/// Renders the user's chosen background after `frames` frames as an SVG
/// document. Dimensions and frame count are clamped to the snapshot limits.
pub fn render_background_svg(
    pool: &DbPool,
    username: &str,
    width: u32,
    height: u32,
    frames: u32,
) -> Result<Option<String>, HelperError> {
    let profile = match fetch_profile_by_username(pool, username)? {
        Some(profile) => profile,
        None => return Ok(None),
    };
    let prefs = theme_helpers::load_preferences(pool, &profile.id)?;
    let config = AnimationConfig::new(prefs.animation, prefs.accent_or_default())
        .or_else(|e| {
            log::warn!("Invalid accent for {}: {}; using default.", username, e);
            AnimationConfig::new(prefs.animation, ThemePreferences::default().accent_or_default())
        })
        .map_err(|e| HelperError::Validation(e.to_string()))?;

    let width = width.clamp(1, MAX_SNAPSHOT_WIDTH) as f64;
    let height = height.clamp(1, MAX_SNAPSHOT_HEIGHT) as f64;
    let frames = frames.min(MAX_SNAPSHOT_FRAMES);

    let mut animator = Animator::new(config, snapshot_seed(&profile.id));
    let mut surface = SvgSurface::new(width, height);
    animator
        .attach(width, height)
        .map_err(|e| HelperError::Validation(e.to_string()))?;
    for _ in 0..frames {
        animator.frame(&mut surface);
    }
    animator
        .detach()
        .map_err(|e| HelperError::Validation(e.to_string()))?;
    Ok(Some(surface.finish()))
}
