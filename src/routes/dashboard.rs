use crate::config::Config;
use crate::helper::dashboard_helpers::{self, HelperError, LinkRequest, PostUpdate, ProfileUpdate, ProjectUpdate};
use crate::helper::form_helpers::{is_delete_confirmed, parse_form};
use crate::helper::storage_helpers::{self, UploadForm, UploadPolicy};
use crate::helper::theme_helpers::{self, PreviewRequest};
use crate::middleware::AuthenticatedUser;
use crate::theme::ThemePreferences;
use crate::{AppState, DbPool};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use redb::Database;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct LinkPreviewPayload {
    input: String,
}

// --- Route Configuration ---
/// Registered under a scope guarded by `user_guard`; handlers still extract
/// `AuthenticatedUser` for the caller's id.
pub fn config_dashboard(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/overview", web::get().to(get_overview))
            .route("/posts", web::get().to(get_my_posts))
            .route("/posts/new", web::post().to(create_post))
            .route("/posts/{post_id}", web::get().to(get_post_for_editing))
            .route("/posts/{post_id}/update", web::post().to(update_post))
            .route("/posts/{post_id}/delete", web::post().to(delete_post))
            .route("/posts/{post_id}/links", web::post().to(add_post_link))
            .route("/posts/{post_id}/images", web::post().to(upload_post_image))
            .route("/projects", web::get().to(get_my_projects))
            .route("/projects/new", web::post().to(create_project))
            .route("/projects/{project_id}", web::get().to(get_project_for_editing))
            .route("/projects/{project_id}/update", web::post().to(update_project))
            .route("/projects/{project_id}/delete", web::post().to(delete_project))
            .route("/projects/{project_id}/cover", web::post().to(upload_project_cover))
            .route("/projects/{project_id}/gallery", web::post().to(upload_project_gallery))
            .route("/projects/{project_id}/gallery/{index}/delete", web::post().to(remove_gallery_image))
            .route("/profile", web::get().to(get_profile))
            .route("/profile/update", web::post().to(update_profile))
            .route("/preferences", web::get().to(get_preferences))
            .route("/preferences/update", web::post().to(update_preferences))
            .route("/preferences/preview", web::post().to(preview_preferences))
            .route("/link-preview", web::post().to(link_preview))
            .route("/media", web::get().to(get_my_media))
            .route("/media/{media_id}/delete", web::post().to(delete_media)),
    );
}

fn respond<T: serde::Serialize>(result: Result<T, HelperError>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(json!({"success": true, "data": data})),
        Err(e) => e.to_response(),
    }
}

/// Reads the confirmation form that every delete endpoint requires.
fn require_confirmation(form: &web::Bytes) -> Result<(), HttpResponse> {
    let parsed = parse_form(form)?;
    if !is_delete_confirmed(&parsed) {
        return Err(HttpResponse::BadRequest()
            .json(json!({"success": false, "error": "Type 'delete' to confirm."})));
    }
    Ok(())
}

async fn read_upload(pool: &DbPool, payload: Multipart) -> Result<UploadForm, HttpResponse> {
    let policy = match pool.get() {
        Ok(conn) => UploadPolicy::load(&conn),
        Err(e) => return Err(HelperError::from(e).to_response()),
    };
    storage_helpers::read_upload_form(payload, &policy)
        .await
        .map_err(|e| HelperError::from(e).to_response())
}

// --- Overview ---

async fn get_overview(user: AuthenticatedUser, db: web::Data<Database>, pool: web::Data<DbPool>) -> impl Responder {
    respond(dashboard_helpers::overview(&db, &pool, &user.user_id))
}

// --- Posts ---

async fn get_my_posts(user: AuthenticatedUser, db: web::Data<Database>) -> impl Responder {
    respond(dashboard_helpers::list_my_posts(&db, &user.user_id))
}

async fn create_post(user: AuthenticatedUser, db: web::Data<Database>) -> impl Responder {
    match dashboard_helpers::create_untitled_post(&db, &user.user_id) {
        Ok(post) => {
            log::info!("User {} created draft {}.", user.user_id, post.id);
            HttpResponse::Ok().json(json!({"success": true, "post_id": post.id, "data": post}))
        }
        Err(e) => e.to_response(),
    }
}

async fn get_post_for_editing(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    post_id: web::Path<String>,
) -> impl Responder {
    respond(dashboard_helpers::load_post_for_editing(&db, &user.user_id, &post_id))
}

async fn update_post(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    post_id: web::Path<String>,
    payload: web::Json<PostUpdate>,
) -> impl Responder {
    respond(dashboard_helpers::save_post(&db, &user.user_id, &post_id, payload.into_inner()))
}

async fn delete_post(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    post_id: web::Path<String>,
    form: web::Bytes,
) -> impl Responder {
    if let Err(response) = require_confirmation(&form) {
        return response;
    }
    match dashboard_helpers::delete_post(&db, &user.user_id, &post_id) {
        Ok(()) => HttpResponse::Ok().json(json!({"success": true, "message": "Post deleted successfully."})),
        Err(e) => e.to_response(),
    }
}

async fn add_post_link(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    app_state: web::Data<AppState>,
    post_id: web::Path<String>,
    payload: web::Json<LinkRequest>,
) -> impl Responder {
    respond(
        dashboard_helpers::add_link_to_post(&db, &app_state.title_resolver, &user.user_id, &post_id, payload.into_inner())
            .await,
    )
}

async fn upload_post_image(
    user: AuthenticatedUser,
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    post_id: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    let form = match read_upload(&pool, payload).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    match dashboard_helpers::add_image_to_post(&db, &pool, &config, &user.user_id, &post_id, form).await {
        Ok((post, media)) => HttpResponse::Ok().json(json!({"success": true, "url": media.file_url, "id": media.id, "data": post})),
        Err(e) => e.to_response(),
    }
}

// --- Projects ---

async fn get_my_projects(user: AuthenticatedUser, pool: web::Data<DbPool>) -> impl Responder {
    respond(dashboard_helpers::list_my_projects(&pool, &user.user_id))
}

async fn create_project(user: AuthenticatedUser, pool: web::Data<DbPool>) -> impl Responder {
    match dashboard_helpers::create_untitled_project(&pool, &user.user_id) {
        Ok(project) => HttpResponse::Ok().json(json!({"success": true, "project_id": project.id, "data": project})),
        Err(e) => e.to_response(),
    }
}

async fn get_project_for_editing(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    project_id: web::Path<String>,
) -> impl Responder {
    respond(dashboard_helpers::require_project_owner(&pool, &user.user_id, &project_id))
}

async fn update_project(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    project_id: web::Path<String>,
    payload: web::Json<ProjectUpdate>,
) -> impl Responder {
    respond(dashboard_helpers::save_project(&pool, &user.user_id, &project_id, payload.into_inner()))
}

async fn delete_project(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    project_id: web::Path<String>,
    form: web::Bytes,
) -> impl Responder {
    if let Err(response) = require_confirmation(&form) {
        return response;
    }
    match dashboard_helpers::delete_project(&pool, &user.user_id, &project_id) {
        Ok(()) => HttpResponse::Ok().json(json!({"success": true, "message": "Project deleted successfully."})),
        Err(e) => e.to_response(),
    }
}

async fn upload_project_cover(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    project_id: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    let form = match read_upload(&pool, payload).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    respond(dashboard_helpers::set_project_cover(&pool, &config, &user.user_id, &project_id, form).await)
}

async fn upload_project_gallery(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    project_id: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    let form = match read_upload(&pool, payload).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    respond(dashboard_helpers::add_project_gallery_images(&pool, &config, &user.user_id, &project_id, form).await)
}

async fn remove_gallery_image(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    path: web::Path<(String, usize)>,
) -> impl Responder {
    let (project_id, index) = path.into_inner();
    respond(dashboard_helpers::remove_project_image(&pool, &user.user_id, &project_id, index))
}

// --- Profile & preferences ---

async fn get_profile(user: AuthenticatedUser, pool: web::Data<DbPool>) -> impl Responder {
    respond(dashboard_helpers::get_profile(&pool, &user.user_id))
}

async fn update_profile(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    payload: web::Json<ProfileUpdate>,
) -> impl Responder {
    respond(dashboard_helpers::update_profile(&pool, &user.user_id, payload.into_inner()))
}

async fn get_preferences(user: AuthenticatedUser, pool: web::Data<DbPool>) -> impl Responder {
    respond(theme_helpers::load_preferences(&pool, &user.user_id))
}

async fn update_preferences(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    payload: web::Json<ThemePreferences>,
) -> impl Responder {
    match theme_helpers::update_preferences(&pool, &user.user_id, payload.into_inner()) {
        Ok(prefs) => {
            let theme = theme_helpers::theme_context(&prefs);
            HttpResponse::Ok().json(json!({
                "success": true,
                "data": prefs,
                "stylesheet": theme.to_stylesheet(),
            }))
        }
        Err(e) => e.to_response(),
    }
}

async fn preview_preferences(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    payload: web::Json<PreviewRequest>,
) -> impl Responder {
    respond(theme_helpers::preview(&pool, &user.user_id, payload.into_inner()))
}

async fn link_preview(app_state: web::Data<AppState>, payload: web::Json<LinkPreviewPayload>) -> impl Responder {
    respond(dashboard_helpers::resolve_link(&app_state.title_resolver, &payload.input).await)
}

// --- Media ---

async fn get_my_media(user: AuthenticatedUser, pool: web::Data<DbPool>) -> impl Responder {
    respond(dashboard_helpers::list_media(&pool, &user.user_id))
}

async fn delete_media(
    user: AuthenticatedUser,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    media_id: web::Path<String>,
    form: web::Bytes,
) -> impl Responder {
    if let Err(response) = require_confirmation(&form) {
        return response;
    }
    match dashboard_helpers::delete_media(&pool, &config, &user.user_id, &media_id).await {
        Ok(()) => HttpResponse::Ok().json(json!({"success": true, "message": "Media deleted successfully."})),
        Err(e) => e.to_response(),
    }
}
