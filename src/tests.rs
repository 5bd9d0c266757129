#![cfg(test)]

use actix_session::{storage::CookieSessionStore, SessionExt, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::http::StatusCode;
use actix_web::{guard, test as actix_test, web, App};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use redb::Database;
use std::collections::HashMap;
use tempfile::TempDir;

use crate::config::{Config, WebConfig};
use crate::content::{self, ContentBlock, TitleResolver};
use crate::helper::account_helpers::{self, AccountError, LoginForm, SignupForm};
use crate::helper::dashboard_helpers::{self, HelperError, PostUpdate, ProjectUpdate};
use crate::helper::storage_helpers::{self, StorageError, UploadForm, UploadedFile};
use crate::helper::{public_helpers, theme_helpers};
use crate::middleware::{user_guard, AuthenticatedUser};
use crate::models::db_operations::preferences_db_operations;
use crate::routes;
use crate::setup::db_setup;
use crate::theme::ThemePreferences;
use crate::{AppState, DbPool};

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Fresh in-memory accounts database with the full schema. The named shared
/// cache lets every pooled connection see the same data.
fn test_pool() -> DbPool {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let uri = format!("file:wilky_testdb_{}?mode=memory&cache=shared", id);
    let pool = Pool::builder()
        .max_size(4)
        .build(SqliteConnectionManager::file(uri))
        .expect("Failed to create test pool");
    {
        let mut conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        db_setup::setup_users_db(&mut conn).expect("Failed to create schema");
    }
    pool
}

/// Temp-dir redb posts database. Keep the `TempDir` alive for the test's duration.
fn test_posts_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::create(dir.path().join("posts.db")).unwrap();
    db_setup::setup_posts_db(&db).unwrap();
    (dir, db)
}

fn test_config(media_dir: &TempDir) -> Config {
    Config {
        web: WebConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database_path: media_dir.path().to_string_lossy().into_owned(),
        media_path: media_dir.path().to_string_lossy().into_owned(),
        allowed_origins: String::new(),
        log_level: "debug".into(),
        session_secret_key: "0".repeat(128),
        use_secure_cookies: false,
        public_base_url: String::new(),
        title_lookup_endpoint: "http://127.0.0.1:9/".into(),
        title_lookup_timeout_secs: 1,
    }
}

fn signup(pool: &DbPool, email: &str, display_name: &str) -> AuthenticatedUser {
    let form = SignupForm {
        email: email.into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        display_name: display_name.into(),
    };
    account_helpers::sign_up(pool, &form).unwrap().0
}

fn png(name: &str) -> UploadedFile {
    UploadedFile {
        file_name: name.into(),
        content_type: "image/png".into(),
        extension: "png",
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

fn upload_form(files: Vec<UploadedFile>, fields: &[(&str, &str)]) -> UploadForm {
    UploadForm {
        files,
        fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>(),
    }
}

fn post_update(title: &str, body: &str, published: bool) -> PostUpdate {
    PostUpdate {
        title: title.into(),
        blocks: vec![ContentBlock::text(body)],
        published,
        excerpt: None,
        cover_image_url: None,
        tags: None,
        featured: None,
    }
}

fn project_update(title: &str, tech_stack: &str) -> ProjectUpdate {
    ProjectUpdate {
        title: title.into(),
        slug: String::new(),
        description: Some("A thing I built".into()),
        long_description: None,
        cover_image_url: None,
        video_url: Some("https://youtu.be/abc123".into()),
        github_url: Some("https://github.com/ada/engine".into()),
        live_url: None,
        tech_stack: tech_stack.into(),
        images: None,
        featured: true,
        sort_order: 1,
    }
}

// --- Accounts ---

#[test]
fn signup_creates_profile_and_default_preferences() {
    let pool = test_pool();
    let form = SignupForm {
        email: " Ada@Example.com ".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        display_name: "Ada Lovelace".into(),
    };
    let (user, profile) = account_helpers::sign_up(&pool, &form).unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(profile.username, "ada-lovelace");
    assert_eq!(profile.id, user.user_id);

    let conn = pool.get().unwrap();
    let prefs = preferences_db_operations::read_preferences(&conn, &user.user_id).unwrap();
    assert_eq!(prefs, Some(ThemePreferences::signup_defaults()));
}

#[test]
fn signup_rejects_taken_email_and_dedupes_usernames() {
    let pool = test_pool();
    signup(&pool, "ada@example.com", "Ada");
    let again = SignupForm {
        email: "ADA@example.com".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        display_name: "Someone".into(),
    };
    assert!(matches!(account_helpers::sign_up(&pool, &again), Err(AccountError::EmailTaken)));

    let second = account_helpers::sign_up(
        &pool,
        &SignupForm {
            email: "other@example.com".into(),
            ..again
        },
    )
    .unwrap();
    assert_eq!(second.1.username, "someone");

    let third = account_helpers::sign_up(
        &pool,
        &SignupForm {
            email: "third@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            display_name: "Ada".into(),
        },
    )
    .unwrap();
    assert_eq!(third.1.username, "ada-2");
}

#[test]
fn login_checks_the_password() {
    let pool = test_pool();
    let user = signup(&pool, "ada@example.com", "Ada");

    let ok = account_helpers::log_in(
        &pool,
        &LoginForm {
            email: "ada@example.com".into(),
            password: "secret1".into(),
        },
    )
    .unwrap();
    assert_eq!(ok.user_id, user.user_id);

    let bad = account_helpers::log_in(
        &pool,
        &LoginForm {
            email: "ada@example.com".into(),
            password: "wrong-password".into(),
        },
    );
    assert!(matches!(bad, Err(AccountError::InvalidCredentials)));

    let unknown = account_helpers::log_in(
        &pool,
        &LoginForm {
            email: "nobody@example.com".into(),
            password: "secret1".into(),
        },
    );
    assert!(matches!(unknown, Err(AccountError::InvalidCredentials)));
}

// --- Posts ---

#[test]
fn untitled_post_slug_follows_the_first_real_title() {
    let pool = test_pool();
    let (_dir, db) = test_posts_db();
    let user = signup(&pool, "ada@example.com", "Ada");

    let draft = dashboard_helpers::create_untitled_post(&db, &user.user_id).unwrap();
    assert!(draft.metadata.slug.starts_with("untitled-"));
    assert!(!draft.metadata.published);

    let saved = dashboard_helpers::save_post(&db, &user.user_id, &draft.id, post_update("Hello, World!", "First\n\nSecond", true)).unwrap();
    assert_eq!(saved.post.metadata.slug, "hello-world");
    assert_eq!(saved.blocks, vec![ContentBlock::text("First\n\nSecond")]);

    let renamed = dashboard_helpers::save_post(&db, &user.user_id, &draft.id, post_update("A New Title", "First", true)).unwrap();
    assert_eq!(renamed.post.metadata.slug, "hello-world");
    assert_eq!(renamed.post.metadata.title, "A New Title");
}

#[test]
fn saving_an_empty_body_keeps_one_text_block() {
    let pool = test_pool();
    let (_dir, db) = test_posts_db();
    let user = signup(&pool, "ada@example.com", "Ada");
    let draft = dashboard_helpers::create_untitled_post(&db, &user.user_id).unwrap();

    let update = PostUpdate {
        blocks: vec![ContentBlock::Image { url: String::new(), caption: None }],
        ..post_update("Pictures", "", false)
    };
    let saved = dashboard_helpers::save_post(&db, &user.user_id, &draft.id, update).unwrap();
    assert_eq!(saved.blocks, vec![ContentBlock::text("")]);
    assert_eq!(content::deserialize_blocks(&saved.post.content), saved.blocks);
}

#[test]
fn other_users_cannot_edit_or_delete_a_post() {
    let pool = test_pool();
    let (_dir, db) = test_posts_db();
    let owner = signup(&pool, "ada@example.com", "Ada");
    let intruder = signup(&pool, "eve@example.com", "Eve");
    let draft = dashboard_helpers::create_untitled_post(&db, &owner.user_id).unwrap();

    let err = dashboard_helpers::save_post(&db, &intruder.user_id, &draft.id, post_update("Mine now", "x", true)).unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    let err = dashboard_helpers::delete_post(&db, &intruder.user_id, &draft.id).unwrap_err();
    assert!(matches!(err, HelperError::Forbidden(_)));

    dashboard_helpers::delete_post(&db, &owner.user_id, &draft.id).unwrap();
    let err = dashboard_helpers::load_post_for_editing(&db, &owner.user_id, &draft.id).unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[test]
fn block_links_must_be_http_and_videos_need_titles() {
    let pool = test_pool();
    let (_dir, db) = test_posts_db();
    let user = signup(&pool, "ada@example.com", "Ada");
    let draft = dashboard_helpers::create_untitled_post(&db, &user.user_id).unwrap();

    let with_blocks = |blocks: Vec<ContentBlock>| PostUpdate { blocks, ..post_update("Links", "", true) };
    let video = |url: &str, title: &str| ContentBlock::Video { url: url.into(), title: title.into() };

    let rejected = [
        vec![ContentBlock::text("hi"), video("javascript:alert(document.cookie)", "Clip")],
        vec![video("https://youtu.be/abc", "  ")],
        vec![ContentBlock::Image { url: "javascript:alert(1)".into(), caption: None }],
        vec![ContentBlock::Image { url: "/media/../config/.env".into(), caption: None }],
    ];
    for blocks in rejected {
        let err = dashboard_helpers::save_post(&db, &user.user_id, &draft.id, with_blocks(blocks)).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
    assert!(public_helpers::fetch_post_by_slug(&db, &pool, "links", None).unwrap().is_none());

    let accepted = vec![
        video("https://youtu.be/abc", "Clip"),
        ContentBlock::text(""),
        ContentBlock::Image { url: "/media/portfolio-media/posts/1/a.png".into(), caption: None },
        ContentBlock::text(""),
    ];
    let saved = dashboard_helpers::save_post(&db, &user.user_id, &draft.id, with_blocks(accepted.clone())).unwrap();
    assert_eq!(saved.blocks, accepted);
    let public = public_helpers::fetch_post_by_slug(&db, &pool, "links", None).unwrap().unwrap();
    assert_eq!(public.blocks, accepted);
}

#[test]
fn drafts_are_only_visible_to_their_author() {
    let pool = test_pool();
    let (_dir, db) = test_posts_db();
    let owner = signup(&pool, "ada@example.com", "Ada");
    let reader = signup(&pool, "bob@example.com", "Bob");

    let draft = dashboard_helpers::create_untitled_post(&db, &owner.user_id).unwrap();
    dashboard_helpers::save_post(&db, &owner.user_id, &draft.id, post_update("Secret Plans", "shh", false)).unwrap();

    assert!(public_helpers::fetch_post_by_slug(&db, &pool, "secret-plans", None).unwrap().is_none());
    assert!(public_helpers::fetch_post_by_slug(&db, &pool, "secret-plans", Some(&reader.user_id)).unwrap().is_none());
    let own = public_helpers::fetch_post_by_slug(&db, &pool, "secret-plans", Some(&owner.user_id)).unwrap();
    assert_eq!(own.map(|p| p.post.id), Some(draft.id.clone()));

    assert!(public_helpers::fetch_latest_posts(&db, &pool, 50, 0).unwrap().is_empty());
}

#[test]
fn feed_lists_published_posts_with_authors_and_tags() {
    let pool = test_pool();
    let (_dir, db) = test_posts_db();
    let user = signup(&pool, "ada@example.com", "Ada Lovelace");

    for (title, tags) in [("Rust Notes", vec!["Rust", "notes"]), ("Travel", vec!["travel"])] {
        let draft = dashboard_helpers::create_untitled_post(&db, &user.user_id).unwrap();
        let update = PostUpdate {
            tags: Some(tags.into_iter().map(String::from).collect()),
            featured: Some(true),
            ..post_update(title, "body", true)
        };
        dashboard_helpers::save_post(&db, &user.user_id, &draft.id, update).unwrap();
    }

    let feed = public_helpers::fetch_latest_posts(&db, &pool, 50, 0).unwrap();
    assert_eq!(feed.len(), 2);
    assert!(feed.iter().all(|c| c.author.as_ref().map(|a| a.username.as_str()) == Some("ada-lovelace")));
    assert_eq!(public_helpers::collect_tags(&feed).len(), 3);

    let tagged = public_helpers::fetch_posts_by_tag(&db, &pool, "RUST", 20, 0).unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].summary.metadata.title, "Rust Notes");

    assert_eq!(public_helpers::fetch_featured_posts(&db, &pool).unwrap().len(), 2);
}

// --- Projects ---

#[test]
fn project_save_parses_tech_stack_and_checks_ownership() {
    let pool = test_pool();
    let owner = signup(&pool, "ada@example.com", "Ada");
    let intruder = signup(&pool, "eve@example.com", "Eve");

    let project = dashboard_helpers::create_untitled_project(&pool, &owner.user_id).unwrap();
    assert!(project.slug.starts_with("untitled-"));

    let saved = dashboard_helpers::save_project(&pool, &owner.user_id, &project.id, project_update("Analytical Engine", "Rust, ,actix-web ,SQLite")).unwrap();
    assert_eq!(saved.slug, "analytical-engine");
    assert_eq!(saved.tech_stack, vec!["Rust", "actix-web", "SQLite"]);

    let err = dashboard_helpers::save_project(&pool, &intruder.user_id, &project.id, project_update("Stolen", "")).unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let bad_url = ProjectUpdate {
        github_url: Some("javascript:alert(1)".into()),
        ..project_update("Analytical Engine", "Rust")
    };
    let err = dashboard_helpers::save_project(&pool, &owner.user_id, &project.id, bad_url).unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let featured = public_helpers::fetch_featured_projects(&pool).unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(content::to_embed_url(featured[0].project.video_url.as_deref().unwrap()), "https://www.youtube.com/embed/abc123");
}

#[test]
fn gallery_entries_can_be_removed_by_index() {
    let pool = test_pool();
    let owner = signup(&pool, "ada@example.com", "Ada");
    let project = dashboard_helpers::create_untitled_project(&pool, &owner.user_id).unwrap();

    let with_images = ProjectUpdate {
        images: Some(vec![
            "/media/portfolio-media/a.png".into(),
            "/media/portfolio-media/b.png".into(),
        ]),
        ..project_update("Gallery", "")
    };
    dashboard_helpers::save_project(&pool, &owner.user_id, &project.id, with_images).unwrap();

    let after = dashboard_helpers::remove_project_image(&pool, &owner.user_id, &project.id, 0).unwrap();
    assert_eq!(after.images, vec!["/media/portfolio-media/b.png"]);
    let err = dashboard_helpers::remove_project_image(&pool, &owner.user_id, &project.id, 5).unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

// --- Storage ---

#[actix_web::test]
async fn objects_are_written_under_the_bucket_and_deleted() {
    let media = tempfile::tempdir().unwrap();
    let config = test_config(&media);

    let url = storage_helpers::upload_object(&config, "posts/1/a.png", b"one".to_vec()).await.unwrap();
    assert_eq!(url, "/media/portfolio-media/posts/1/a.png");
    let on_disk = media.path().join("portfolio-media/posts/1/a.png");
    assert_eq!(std::fs::read(&on_disk).unwrap(), b"one");

    storage_helpers::upload_object(&config, "posts/1/a.png", b"two".to_vec()).await.unwrap();
    assert_eq!(std::fs::read(&on_disk).unwrap(), b"two");

    assert!(storage_helpers::delete_object(&config, "posts/1/a.png").await);
    assert!(!on_disk.exists());
    assert!(storage_helpers::delete_object(&config, "posts/1/a.png").await);

    let err = storage_helpers::upload_object(&config, "../escape.png", vec![1]).await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidPath(_)));
}

#[actix_web::test]
async fn failed_upload_leaves_no_staging_file() {
    let media = tempfile::tempdir().unwrap();
    let config = test_config(&media);
    // A non-empty directory where the object should go makes the final rename fail.
    let blocked = media.path().join("portfolio-media/posts/2/b.png");
    std::fs::create_dir_all(blocked.join("inner")).unwrap();

    let err = storage_helpers::upload_object(&config, "posts/2/b.png", b"data".to_vec()).await.unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));

    let entries: Vec<String> = std::fs::read_dir(media.path().join("portfolio-media/posts/2"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["b.png".to_string()]);
}

#[actix_web::test]
async fn post_image_upload_appends_image_and_text_blocks() {
    let pool = test_pool();
    let (_dir, db) = test_posts_db();
    let media = tempfile::tempdir().unwrap();
    let config = test_config(&media);
    let user = signup(&pool, "ada@example.com", "Ada");
    let draft = dashboard_helpers::create_untitled_post(&db, &user.user_id).unwrap();

    let form = upload_form(vec![png("My Cat.png")], &[("caption", "Mittens")]);
    let (post, stored) = dashboard_helpers::add_image_to_post(&db, &pool, &config, &user.user_id, &draft.id, form)
        .await
        .unwrap();

    assert!(stored.storage_path.starts_with(&format!("posts/{}/img-", draft.id)));
    assert!(stored.storage_path.ends_with("-My-Cat.png"));
    assert_eq!(
        post.blocks,
        vec![
            ContentBlock::text(""),
            ContentBlock::Image { url: stored.file_url.clone(), caption: Some("Mittens".into()) },
            ContentBlock::text(""),
        ]
    );
    assert_eq!(dashboard_helpers::list_media(&pool, &user.user_id).unwrap().len(), 1);
}

#[actix_web::test]
async fn project_cover_and_gallery_uploads() {
    let pool = test_pool();
    let media = tempfile::tempdir().unwrap();
    let config = test_config(&media);
    let user = signup(&pool, "ada@example.com", "Ada");
    let project = dashboard_helpers::create_untitled_project(&pool, &user.user_id).unwrap();

    let cover = dashboard_helpers::set_project_cover(&pool, &config, &user.user_id, &project.id, upload_form(vec![png("cover.png")], &[]))
        .await
        .unwrap();
    assert_eq!(
        cover.cover_image_url,
        Some(format!("/media/portfolio-media/projects/{}/cover-cover.png", project.id))
    );

    let gallery = dashboard_helpers::add_project_gallery_images(
        &pool,
        &config,
        &user.user_id,
        &project.id,
        upload_form(vec![png("one.png"), png("two.png")], &[]),
    )
    .await
    .unwrap();
    assert_eq!(gallery.images.len(), 2);
    assert!(gallery.images[0].ends_with("-one.png"));
    assert!(gallery.images[1].ends_with("-two.png"));

    let pdf = UploadedFile {
        content_type: "application/pdf".into(),
        extension: "pdf",
        ..png("notes.pdf")
    };
    let err = dashboard_helpers::add_project_gallery_images(&pool, &config, &user.user_id, &project.id, upload_form(vec![pdf], &[]))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn media_delete_removes_record_then_object() {
    let pool = test_pool();
    let media = tempfile::tempdir().unwrap();
    let config = test_config(&media);
    let owner = signup(&pool, "ada@example.com", "Ada");
    let intruder = signup(&pool, "eve@example.com", "Eve");
    let project = dashboard_helpers::create_untitled_project(&pool, &owner.user_id).unwrap();
    dashboard_helpers::set_project_cover(&pool, &config, &owner.user_id, &project.id, upload_form(vec![png("c.png")], &[]))
        .await
        .unwrap();

    let stored = dashboard_helpers::list_media(&pool, &owner.user_id).unwrap().remove(0);
    let err = dashboard_helpers::delete_media(&pool, &config, &intruder.user_id, &stored.id).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    dashboard_helpers::delete_media(&pool, &config, &owner.user_id, &stored.id).await.unwrap();
    assert!(dashboard_helpers::list_media(&pool, &owner.user_id).unwrap().is_empty());
    assert!(!media.path().join("portfolio-media").join(&stored.storage_path).exists());
}

// --- Theme ---

#[test]
fn preference_updates_validate_colours_and_preview_replays_edits() {
    let pool = test_pool();
    let user = signup(&pool, "ada@example.com", "Ada");

    let bad = ThemePreferences {
        accent_color: Some("purple-ish".into()),
        ..ThemePreferences::signup_defaults()
    };
    let err = theme_helpers::update_preferences(&pool, &user.user_id, bad).unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let good = ThemePreferences {
        accent_color: Some("#ff0000".into()),
        ..ThemePreferences::signup_defaults()
    };
    theme_helpers::update_preferences(&pool, &user.user_id, good).unwrap();
    let stored = theme_helpers::load_preferences(&pool, &user.user_id).unwrap();
    assert_eq!(stored.accent_color.as_deref(), Some("#ff0000"));

    let theme = theme_helpers::theme_for_session(&pool, Some(&user));
    assert_eq!(theme.property("--accent"), Some("#ff0000"));
    let anonymous = theme_helpers::theme_for_session(&pool, None);
    assert_eq!(anonymous.property("--accent"), None);
}

#[test]
fn user_page_and_background_snapshot() {
    let pool = test_pool();
    let (_dir, db) = test_posts_db();
    signup(&pool, "ada@example.com", "Ada");

    let page = public_helpers::fetch_user_page(&db, &pool, "ada").unwrap().unwrap();
    assert_eq!(page.profile.display_name, "Ada");
    assert_eq!(page.theme_variables.get("--accent").map(String::as_str), Some("#8b5cf6"));
    assert!(public_helpers::fetch_user_page(&db, &pool, "nobody").unwrap().is_none());

    let svg = public_helpers::render_background_svg(&pool, "ada", 5000, 5000, 3).unwrap().unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("1920"));
    assert!(public_helpers::render_background_svg(&pool, "nobody", 100, 100, 1).unwrap().is_none());
}

// --- Handlers ---

fn session_middleware(key: &Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
        .cookie_secure(false)
        .build()
}

#[actix_web::test]
async fn public_api_routes_respond() {
    let pool = test_pool();
    let (_dir, db) = test_posts_db();
    signup(&pool, "ada@example.com", "Ada");
    let key = Key::generate();

    let app = actix_test::init_service(
        App::new()
            .wrap(session_middleware(&key))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(db))
            .configure(routes::public::config_api),
    )
    .await;

    let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/is_server_active").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let posts: serde_json::Value =
        actix_test::call_and_read_body_json(&app, actix_test::TestRequest::get().uri("/api/posts/latest").to_request()).await;
    assert_eq!(posts, serde_json::json!([]));

    let user: serde_json::Value =
        actix_test::call_and_read_body_json(&app, actix_test::TestRequest::get().uri("/api/users/ada").to_request()).await;
    assert_eq!(user["profile"]["username"], "ada");

    let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/users/nobody").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let animations: serde_json::Value =
        actix_test::call_and_read_body_json(&app, actix_test::TestRequest::get().uri("/api/animations").to_request()).await;
    assert_eq!(animations.as_array().map(Vec::len), Some(6));
}

#[actix_web::test]
async fn dashboard_requires_a_session_and_delete_requires_confirmation() {
    let pool = test_pool();
    let (_dir, db) = test_posts_db();
    let key = Key::generate();
    let media = tempfile::tempdir().unwrap();
    let config = test_config(&media);

    let app = actix_test::init_service(
        App::new()
            .wrap(session_middleware(&key))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(db))
            .app_data(web::Data::new(config))
            .app_data(web::Data::new(AppState {
                title_resolver: TitleResolver::new("http://127.0.0.1:9/", std::time::Duration::from_secs(1)),
            }))
            .configure(routes::auth::config_auth)
            .service(
                web::scope("/dashboard")
                    .guard(guard::fn_guard(|ctx| user_guard(&ctx.get_session())))
                    .configure(routes::dashboard::config_dashboard),
            ),
    )
    .await;

    let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/dashboard/api/overview").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let signup_req = actix_test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(serde_json::json!({
            "email": "ada@example.com",
            "password": "secret1",
            "confirm_password": "secret1",
            "display_name": "Ada"
        }))
        .to_request();
    let resp = actix_test::call_service(&app, signup_req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "id")
        .expect("session cookie")
        .into_owned();

    let overview: serde_json::Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get().uri("/dashboard/api/overview").cookie(cookie.clone()).to_request(),
    )
    .await;
    assert_eq!(overview["success"], true);
    assert_eq!(overview["data"]["post_count"], 0);

    let created: serde_json::Value = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::post().uri("/dashboard/api/posts/new").cookie(cookie.clone()).to_request(),
    )
    .await;
    let post_id = created["post_id"].as_str().unwrap().to_string();

    let resp = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/dashboard/api/posts/{}/delete", post_id))
            .cookie(cookie.clone())
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload("confirmation=yes")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/dashboard/api/posts/{}/delete", post_id))
            .cookie(cookie.clone())
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload("confirmation=delete")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri("/auth/logout").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}
