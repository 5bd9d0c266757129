use actix_web::{dev, FromRequest, HttpRequest};
use actix_session::{Session, SessionExt};
use serde::Serialize;
use std::future::{ready, Ready};

pub const SESSION_USER_ID: &str = "user_id";
pub const SESSION_EMAIL: &str = "email";

/// The signed-in user, read from the session cookie.
#[derive(Serialize, Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let session = req.get_session();
        match session_user(&session) {
            Some(user) => ready(Ok(user)),
            None => ready(Err(actix_web::error::ErrorUnauthorized("Not logged in."))),
        }
    }
}

pub fn session_user(session: &Session) -> Option<AuthenticatedUser> {
    match (
        session.get::<String>(SESSION_USER_ID),
        session.get::<String>(SESSION_EMAIL),
    ) {
        (Ok(Some(user_id)), Ok(Some(email))) => Some(AuthenticatedUser { user_id, email }),
        _ => None,
    }
}

pub fn user_guard(session: &Session) -> bool {
    session_user(session).is_some()
}
