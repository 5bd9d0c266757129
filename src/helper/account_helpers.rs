use crate::content::generate_slug;
use crate::middleware::AuthenticatedUser;
use crate::models::db_operations::{preferences_db_operations, users_db_operations};
use crate::models::Profile;
use crate::theme::ThemePreferences;
use crate::DbPool;
use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

#[cfg(test)]
const HASH_COST: u32 = 4;
#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    #[error("An account with this email already exists.")]
    EmailTaken,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("R2D2 Pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

impl AccountError {
    /// True for failures the caller caused and can fix by resubmitting.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AccountError::Validation(_) | AccountError::EmailTaken | AccountError::InvalidCredentials
        )
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_signup(form: &SignupForm) -> Result<(), AccountError> {
    if form.display_name.trim().is_empty() {
        return Err(AccountError::Validation("Display name is required.".into()));
    }
    let email = normalize_email(&form.email);
    if email.is_empty() || !email.contains('@') {
        return Err(AccountError::Validation("A valid email address is required.".into()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::Validation(format!(
            "Password must be at least {} characters.",
            MIN_PASSWORD_LEN
        )));
    }
    if form.password != form.confirm_password {
        return Err(AccountError::Validation("Passwords do not match.".into()));
    }
    Ok(())
}

/// Slug of the display name, suffixed `-2`, `-3`, ... until it is free.
pub fn unique_username(conn: &Connection, display_name: &str) -> Result<String, rusqlite::Error> {
    let mut base = generate_slug(display_name);
    if base.is_empty() {
        base = "user".to_string();
    }
    if !users_db_operations::username_exists(conn, &base)? {
        return Ok(base);
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !users_db_operations::username_exists(conn, &candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// A sign-up that lost a race for the same email fails on the unique index
/// rather than on the earlier lookup.
fn account_insert_error(e: rusqlite::Error) -> AccountError {
    match e {
        rusqlite::Error::SqliteFailure(ref err, Some(ref msg))
            if err.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains("users.email") =>
        {
            AccountError::EmailTaken
        }
        other => AccountError::Database(other),
    }
}

/// Creates the account, its public profile and the default theme in one
/// transaction, so a failed sign-up leaves nothing behind.
pub fn sign_up(pool: &DbPool, form: &SignupForm) -> Result<(AuthenticatedUser, Profile), AccountError> {
    validate_signup(form)?;
    let email = normalize_email(&form.email);

    let mut conn = pool.get()?;
    if users_db_operations::email_exists(&conn, &email)? {
        return Err(AccountError::EmailTaken);
    }

    let password_hash = bcrypt::hash(&form.password, HASH_COST)?;
    let user_id = Uuid::new_v4().to_string();

    let tx = conn.transaction()?;
    let profile = Profile {
        id: user_id.clone(),
        username: unique_username(&tx, &form.display_name)?,
        display_name: form.display_name.trim().to_string(),
        avatar_url: None,
        bio: None,
        github_url: None,
        website_url: None,
        created_at: Utc::now().to_rfc3339(),
    };
    users_db_operations::create_user(&tx, &user_id, &email, &password_hash).map_err(account_insert_error)?;
    users_db_operations::create_profile(&tx, &profile)?;
    preferences_db_operations::create_preferences(&tx, &user_id, &ThemePreferences::signup_defaults())?;
    tx.commit()?;

    log::info!("New account '{}' registered as '{}'.", email, profile.username);
    Ok((AuthenticatedUser { user_id, email }, profile))
}

pub fn log_in(pool: &DbPool, form: &LoginForm) -> Result<AuthenticatedUser, AccountError> {
    let conn = pool.get()?;
    let email = normalize_email(&form.email);
    let (user, password_hash) = users_db_operations::read_credentials_by_email(&conn, &email)?
        .ok_or(AccountError::InvalidCredentials)?;

    if !bcrypt::verify(&form.password, &password_hash)? {
        return Err(AccountError::InvalidCredentials);
    }

    if let Err(e) = users_db_operations::update_last_login_time(&conn, &user.id) {
        log::warn!("Could not record login time for {}: {}", user.id, e);
    }
    Ok(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
    })
}
