use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::{jwt::TokenKeys, password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest};
use crate::users::repo::{self, User, UserChanges};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Empty strings mean "leave unchanged", same as absent fields.
fn supplied(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

pub async fn create_user(state: &AppState, req: RegisterRequest) -> Result<(), ApiError> {
    let email = req.email.trim().to_lowercase();
    if req.password.is_empty() || !is_valid_email(&email) {
        warn!("rejected registration input");
        return Err(ApiError::InvalidRegistration);
    }

    if repo::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::EmailTaken);
    }

    let hash = password::hash_password(&req.password)?;
    let user_id = repo::insert(&state.db, &email, &hash).await?;
    info!(user_id = %user_id, email = %email, "user registered");
    Ok(())
}

pub async fn update_user(
    state: &AppState,
    user_id: i64,
    req: UpdateUserRequest,
) -> Result<User, ApiError> {
    let email = supplied(req.email).map(|e| e.trim().to_lowercase());
    let username = supplied(req.username);
    let password = supplied(req.password);
    let phone_number = supplied(req.phone_number);
    let birth_date = supplied(req.birth_date);

    if email.is_none()
        && username.is_none()
        && password.is_none()
        && phone_number.is_none()
        && birth_date.is_none()
    {
        return Err(ApiError::NothingToUpdate);
    }

    if let Some(ref email) = email {
        if !is_valid_email(email) {
            return Err(ApiError::InvalidUpdate);
        }
        // A different account owning the target email blocks the update.
        if let Some(owner) = repo::find_by_email(&state.db, email).await? {
            if owner.id != user_id {
                warn!(user_id = %user_id, "settings update to an email in use");
                return Err(ApiError::EmailTaken);
            }
        }
    }

    let current = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let password_hash = match password {
        Some(plain) => Some(password::hash_password(&plain)?),
        None => None,
    };

    let changes = UserChanges {
        email,
        username,
        password_hash,
        phone_number,
        birth_date,
    };
    repo::apply_update(&state.db, &current, &changes).await?;

    let updated = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(user_id = %user_id, "user settings updated");
    Ok(updated)
}

pub async fn login(state: &AppState, req: LoginRequest) -> Result<LoginResponse, ApiError> {
    let email = req.email.trim().to_lowercase();

    // Unknown email and wrong password are indistinguishable to the caller.
    let Some(auth) = repo::auth_by_email(&state.db, &email).await? else {
        warn!("login attempt with unknown email");
        return Err(ApiError::LoginFailed);
    };
    if !password::verify_password(&req.password, &auth.password_hash)? {
        warn!(user_id = %auth.id, "login attempt with wrong password");
        return Err(ApiError::LoginFailed);
    }

    let keys = TokenKeys::from_ref(state);
    let token = keys.sign(auth.id, auth.role).map_err(ApiError::Internal)?;
    info!(user_id = %auth.id, "user logged in");
    Ok(LoginResponse { token })
}

pub async fn get_user(state: &AppState, id: i64) -> Result<User, ApiError> {
    repo::find_by_id(&state.db, id).await?.ok_or(ApiError::NotFound)
}
