use crate::helper::account_helpers::{self, AccountError, LoginForm, SignupForm};
use crate::middleware::{session_user, AuthenticatedUser, SESSION_EMAIL, SESSION_USER_ID};
use crate::DbPool;
use actix_session::{Session, SessionInsertError};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub fn config_auth(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/signup", web::post().to(handle_signup))
            .route("/login", web::post().to(handle_login))
            .route("/logout", web::post().to(handle_logout))
            .route("/session", web::get().to(get_session)),
    );
}

fn start_session(session: &Session, user: &AuthenticatedUser) -> Result<(), SessionInsertError> {
    session.renew();
    session.insert(SESSION_USER_ID, &user.user_id)?;
    session.insert(SESSION_EMAIL, &user.email)?;
    Ok(())
}

fn account_error_response(e: &AccountError) -> HttpResponse {
    match e {
        AccountError::InvalidCredentials => {
            HttpResponse::Unauthorized().json(json!({"success": false, "error": e.to_string()}))
        }
        AccountError::EmailTaken => HttpResponse::Conflict().json(json!({"success": false, "error": e.to_string()})),
        _ if e.is_client_error() => HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()})),
        _ => {
            log::error!("Account operation failed: {}", e);
            HttpResponse::InternalServerError()
                .json(json!({"success": false, "error": "An internal error occurred. Please try again."}))
        }
    }
}

fn session_failure(e: SessionInsertError) -> HttpResponse {
    log::error!("Failed to write session: {}", e);
    HttpResponse::InternalServerError().json(json!({"success": false, "error": "Could not start a session."}))
}

async fn handle_signup(session: Session, pool: web::Data<DbPool>, form: web::Json<SignupForm>) -> impl Responder {
    let form = form.into_inner();
    let result = web::block(move || account_helpers::sign_up(&pool, &form)).await;
    match result {
        Ok(Ok((user, profile))) => {
            if let Err(e) = start_session(&session, &user) {
                return session_failure(e);
            }
            log::info!("New account {} created ({}).", user.user_id, profile.username);
            HttpResponse::Ok().json(json!({"success": true, "user": user, "profile": profile}))
        }
        Ok(Err(e)) => account_error_response(&e),
        Err(e) => {
            log::error!("Sign-up task failed: {}", e);
            HttpResponse::InternalServerError().json(json!({"success": false, "error": "Sign-up failed."}))
        }
    }
}

async fn handle_login(session: Session, pool: web::Data<DbPool>, form: web::Json<LoginForm>) -> impl Responder {
    let form = form.into_inner();
    let result = web::block(move || account_helpers::log_in(&pool, &form)).await;
    match result {
        Ok(Ok(user)) => {
            if let Err(e) = start_session(&session, &user) {
                return session_failure(e);
            }
            log::info!("User {} logged in.", user.user_id);
            HttpResponse::Ok().json(json!({"success": true, "user": user}))
        }
        Ok(Err(e)) => {
            if matches!(e, AccountError::InvalidCredentials) {
                log::warn!("Failed login attempt.");
            }
            account_error_response(&e)
        }
        Err(e) => {
            log::error!("Login task failed: {}", e);
            HttpResponse::InternalServerError().json(json!({"success": false, "error": "Login failed."}))
        }
    }
}

async fn handle_logout(session: Session) -> impl Responder {
    session.clear();
    HttpResponse::Ok().json(json!({"success": true}))
}

async fn get_session(session: Session) -> impl Responder {
    match session_user(&session) {
        Some(user) => HttpResponse::Ok().json(json!({"authenticated": true, "user": user})),
        None => HttpResponse::Ok().json(json!({"authenticated": false})),
    }
}
