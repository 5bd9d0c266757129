use crate::content::{self, ContentBlock};
use crate::helper::{public_helpers, theme_helpers};
use crate::middleware::session_user;
use crate::DbPool;
use actix_session::Session;
use actix_web::{web, HttpResponse, Responder};
use redb::Database;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tera::{Context, Tera};

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Deserialize)]
pub struct ApiQuery {
    limit: Option<u32>,
    offset: Option<u32>,
}

impl ApiQuery {
    fn page(&self, default_limit: u32) -> (u32, u32) {
        (
            self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
            self.offset.unwrap_or(0),
        )
    }
}

#[derive(Deserialize)]
pub struct FeedQuery {
    tag: Option<String>,
}

#[derive(Deserialize)]
pub struct BackgroundQuery {
    w: Option<u32>,
    h: Option<u32>,
    frames: Option<u32>,
}

/// Post body shaped for the templates: text split into paragraphs, images
/// still waiting for an upload left out. Images fall back to the post title
/// for their alt text.
#[derive(Serialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PageBlock {
    Text { paragraphs: Vec<String> },
    Image { url: String, caption: Option<String>, alt: String },
    Video { url: String, title: String },
}

fn page_blocks(blocks: &[ContentBlock], title: &str) -> Vec<PageBlock> {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { body } => Some(PageBlock::Text {
                paragraphs: content::split_paragraphs(body).into_iter().map(str::to_string).collect(),
            }),
            ContentBlock::Image { url, .. } if url.is_empty() => None,
            ContentBlock::Image { url, .. } => Some(PageBlock::Image {
                url: url.clone(),
                caption: block.caption().map(str::to_string),
                alt: block.caption().unwrap_or(title).to_string(),
            }),
            ContentBlock::Video { url, title } => Some(PageBlock::Video {
                url: url.clone(),
                title: title.clone(),
            }),
        })
        .collect()
}

fn render(tera: &Tera, template: &str, ctx: &Context) -> HttpResponse {
    match tera.render(template, ctx) {
        Ok(rendered) => HttpResponse::Ok().content_type("text/html; charset=utf-8").body(rendered),
        Err(err) => {
            log::error!("Template rendering error for {}: {}", template, err);
            HttpResponse::InternalServerError().body("Error rendering page.")
        }
    }
}

fn render_not_found(tera: &Tera, what: &str) -> HttpResponse {
    let mut ctx = Context::new();
    ctx.insert("what", what);
    match tera.render("public/not_found.html", &ctx) {
        Ok(rendered) => HttpResponse::NotFound().content_type("text/html; charset=utf-8").body(rendered),
        Err(err) => {
            log::error!("Template rendering error for not_found: {}", err);
            HttpResponse::NotFound().body(format!("{} not found", what))
        }
    }
}

fn page_context(session: &Session) -> Context {
    let mut ctx = Context::new();
    ctx.insert("viewer", &session_user(session));
    ctx
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/is_server_active", web::get().to(is_server_active))
            .route("/posts/latest", web::get().to(get_latest_posts))
            .route("/posts/featured", web::get().to(get_featured_posts))
            .route("/posts/tag/{tag}", web::get().to(get_posts_by_tag))
            .route("/posts/{slug}", web::get().to(get_post_by_slug))
            .route("/projects", web::get().to(get_projects))
            .route("/projects/featured", web::get().to(get_featured_projects))
            .route("/projects/{slug}", web::get().to(get_project_by_slug))
            .route("/users/{username}", web::get().to(get_user_page))
            .route("/animations", web::get().to(get_animations)),
    );
}

pub fn config_pages(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(show_home))
        .route("/feed", web::get().to(show_feed))
        .route("/blog/{slug}", web::get().to(show_post))
        .route("/projects", web::get().to(show_projects))
        .route("/projects/{slug}", web::get().to(show_project))
        .route("/u/{username}", web::get().to(show_user_home))
        .route("/u/{username}/background.svg", web::get().to(background_svg))
        .route("/theme.css", web::get().to(theme_css));
}

// --- JSON API ---

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

async fn get_latest_posts(db: web::Data<Database>, pool: web::Data<DbPool>, query: web::Query<ApiQuery>) -> impl Responder {
    let (limit, offset) = query.page(public_helpers::FEED_LIMIT);
    match public_helpers::fetch_latest_posts(&db, &pool, limit, offset) {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(e) => {
            log::error!("Failed to fetch latest posts: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn get_featured_posts(db: web::Data<Database>, pool: web::Data<DbPool>) -> impl Responder {
    match public_helpers::fetch_featured_posts(&db, &pool) {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(e) => {
            log::error!("Failed to fetch featured posts: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn get_posts_by_tag(
    tag: web::Path<String>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    query: web::Query<ApiQuery>,
) -> impl Responder {
    let (limit, offset) = query.page(20);
    let tag_value = tag.into_inner();
    match public_helpers::fetch_posts_by_tag(&db, &pool, &tag_value, limit, offset) {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(e) => {
            log::error!("Failed to fetch posts by tag '{}': {}", tag_value, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn get_post_by_slug(
    slug: web::Path<String>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    session: Session,
) -> impl Responder {
    let viewer = session_user(&session);
    match public_helpers::fetch_post_by_slug(&db, &pool, &slug, viewer.as_ref().map(|v| v.user_id.as_str())) {
        Ok(Some(post)) => HttpResponse::Ok().json(post),
        Ok(None) => HttpResponse::NotFound().json(json!({"success": false, "error": "Post not found."})),
        Err(e) => {
            log::error!("Failed to fetch post '{}': {}", slug, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn get_projects(pool: web::Data<DbPool>) -> impl Responder {
    match public_helpers::fetch_projects(&pool) {
        Ok(projects) => HttpResponse::Ok().json(projects),
        Err(e) => {
            log::error!("Failed to fetch projects: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn get_featured_projects(pool: web::Data<DbPool>) -> impl Responder {
    match public_helpers::fetch_featured_projects(&pool) {
        Ok(projects) => HttpResponse::Ok().json(projects),
        Err(e) => {
            log::error!("Failed to fetch featured projects: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn get_project_by_slug(slug: web::Path<String>, pool: web::Data<DbPool>) -> impl Responder {
    match public_helpers::fetch_project_by_slug(&pool, &slug) {
        Ok(Some(project)) => HttpResponse::Ok().json(project),
        Ok(None) => HttpResponse::NotFound().json(json!({"success": false, "error": "Project not found."})),
        Err(e) => {
            log::error!("Failed to fetch project '{}': {}", slug, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn get_user_page(username: web::Path<String>, db: web::Data<Database>, pool: web::Data<DbPool>) -> impl Responder {
    match public_helpers::fetch_user_page(&db, &pool, &username) {
        Ok(Some(page)) => HttpResponse::Ok().json(page),
        Ok(None) => HttpResponse::NotFound().json(json!({"success": false, "error": "User not found."})),
        Err(e) => {
            log::error!("Failed to fetch user page for '{}': {}", username, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn get_animations(pool: web::Data<DbPool>) -> impl Responder {
    HttpResponse::Ok().json(theme_helpers::animation_options(&pool))
}

// --- Pages ---

async fn show_home(
    tera: web::Data<Tera>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    session: Session,
) -> impl Responder {
    let posts = public_helpers::fetch_featured_posts(&db, &pool);
    let projects = public_helpers::fetch_featured_projects(&pool);
    match (posts, projects) {
        (Ok(posts), Ok(projects)) => {
            let mut ctx = page_context(&session);
            ctx.insert("posts", &posts);
            ctx.insert("projects", &projects);
            render(&tera, "public/home.html", &ctx)
        }
        (Err(e), _) | (_, Err(e)) => {
            log::error!("Failed to load home page: {}", e);
            HttpResponse::InternalServerError().body("Error loading page.")
        }
    }
}

async fn show_feed(
    tera: web::Data<Tera>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<FeedQuery>,
) -> impl Responder {
    let all = match public_helpers::fetch_latest_posts(&db, &pool, public_helpers::FEED_LIMIT, 0) {
        Ok(posts) => posts,
        Err(e) => {
            log::error!("Failed to load feed: {}", e);
            return HttpResponse::InternalServerError().body("Error loading feed.");
        }
    };
    let tags = public_helpers::collect_tags(&all);
    let active_tag = query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let posts = match active_tag {
        Some(tag) => match public_helpers::fetch_posts_by_tag(&db, &pool, tag, public_helpers::FEED_LIMIT, 0) {
            Ok(posts) => posts,
            Err(e) => {
                log::error!("Failed to load feed for tag '{}': {}", tag, e);
                return HttpResponse::InternalServerError().body("Error loading feed.");
            }
        },
        None => all,
    };

    let mut ctx = page_context(&session);
    ctx.insert("posts", &posts);
    ctx.insert("tags", &tags);
    ctx.insert("active_tag", &active_tag);
    render(&tera, "public/feed.html", &ctx)
}

async fn show_post(
    slug: web::Path<String>,
    tera: web::Data<Tera>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    session: Session,
) -> impl Responder {
    let viewer = session_user(&session);
    match public_helpers::fetch_post_by_slug(&db, &pool, &slug, viewer.as_ref().map(|v| v.user_id.as_str())) {
        Ok(Some(post)) => {
            let mut ctx = page_context(&session);
            ctx.insert("blocks", &page_blocks(&post.blocks, &post.post.metadata.title));
            ctx.insert("post", &post.post);
            ctx.insert("author", &post.author);
            render(&tera, "public/post.html", &ctx)
        }
        Ok(None) => render_not_found(&tera, "Post"),
        Err(e) => {
            log::error!("Failed to load post '{}': {}", slug, e);
            HttpResponse::InternalServerError().body("Error loading post.")
        }
    }
}

async fn show_projects(tera: web::Data<Tera>, pool: web::Data<DbPool>, session: Session) -> impl Responder {
    match public_helpers::fetch_projects(&pool) {
        Ok(projects) => {
            let mut ctx = page_context(&session);
            ctx.insert("projects", &projects);
            render(&tera, "public/projects.html", &ctx)
        }
        Err(e) => {
            log::error!("Failed to load projects: {}", e);
            HttpResponse::InternalServerError().body("Error loading projects.")
        }
    }
}

async fn show_project(
    slug: web::Path<String>,
    tera: web::Data<Tera>,
    pool: web::Data<DbPool>,
    session: Session,
) -> impl Responder {
    match public_helpers::fetch_project_by_slug(&pool, &slug) {
        Ok(Some(card)) => {
            let mut ctx = page_context(&session);
            let embed_url = card.project.video_url.as_deref().map(content::to_embed_url);
            let long_description: Vec<&str> = card
                .project
                .long_description
                .as_deref()
                .map(content::split_paragraphs)
                .unwrap_or_default();
            ctx.insert("embed_url", &embed_url);
            ctx.insert("long_description", &long_description);
            ctx.insert("project", &card.project);
            ctx.insert("author", &card.author);
            render(&tera, "public/project.html", &ctx)
        }
        Ok(None) => render_not_found(&tera, "Project"),
        Err(e) => {
            log::error!("Failed to load project '{}': {}", slug, e);
            HttpResponse::InternalServerError().body("Error loading project.")
        }
    }
}

async fn show_user_home(
    username: web::Path<String>,
    tera: web::Data<Tera>,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    session: Session,
) -> impl Responder {
    match public_helpers::fetch_user_page(&db, &pool, &username) {
        Ok(Some(page)) => {
            let mut ctx = page_context(&session);
            ctx.insert("page", &page);
            render(&tera, "public/user_home.html", &ctx)
        }
        Ok(None) => render_not_found(&tera, "User"),
        Err(e) => {
            log::error!("Failed to load user page '{}': {}", username, e);
            HttpResponse::InternalServerError().body("Error loading profile.")
        }
    }
}

async fn background_svg(
    username: web::Path<String>,
    pool: web::Data<DbPool>,
    query: web::Query<BackgroundQuery>,
) -> impl Responder {
    let width = query.w.unwrap_or(1280);
    let height = query.h.unwrap_or(720);
    let frames = query.frames.unwrap_or(30);
    match public_helpers::render_background_svg(&pool, &username, width, height, frames) {
        Ok(Some(svg)) => HttpResponse::Ok().content_type("image/svg+xml").body(svg),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(e) => {
            log::error!("Failed to render background for '{}': {}", username, e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// The signed-in viewer's theme; signed-out viewers get an empty stylesheet.
async fn theme_css(pool: web::Data<DbPool>, session: Session) -> impl Responder {
    let user = session_user(&session);
    let theme = theme_helpers::theme_for_session(&pool, user.as_ref());
    HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .insert_header(("Cache-Control", "no-store"))
        .body(theme.to_stylesheet())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_blocks_split_text_and_skip_pending_images() {
        let blocks = vec![
            ContentBlock::text("One\n\n\nTwo\n\n  "),
            ContentBlock::Image { url: String::new(), caption: None },
            ContentBlock::Image { url: "/media/a.png".into(), caption: Some(String::new()) },
            ContentBlock::Video { url: "https://youtu.be/x".into(), title: "Talk".into() },
        ];
        assert_eq!(
            page_blocks(&blocks, "My Post"),
            vec![
                PageBlock::Text { paragraphs: vec!["One".into(), "Two".into()] },
                PageBlock::Image { url: "/media/a.png".into(), caption: None, alt: "My Post".into() },
                PageBlock::Video { url: "https://youtu.be/x".into(), title: "Talk".into() },
            ]
        );
    }
}
