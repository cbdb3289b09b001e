use actix_web::{HttpResponse, web};
use bcrypt::{DEFAULT_COST, hash, verify};
use validator::Validate;

use crate::db::store::StoreError;
use crate::error::ApiError;
use crate::models::user::User;
use crate::state::app_state::AppState;
use crate::structs::user::{LoginRequest, LoginResponse, SignupRequest, UserResponse};
use crate::utils::jwt::create_token;

fn hash_password(password: &str) -> Result<String, ApiError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

fn issue_token(app_state: &AppState, user: User) -> Result<LoginResponse, ApiError> {
    let token = create_token(&user, &app_state.config.jwt_secret)
        .map_err(|e| ApiError::Internal(format!("Token generation failed: {:#}", e)))?;
    Ok(LoginResponse {
        token,
        user: UserResponse::from(user),
    })
}

pub async fn signup(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let password_hash = hash_password(&req.password)?;
    let user = User::new(
        req.username,
        req.email,
        req.phone_number,
        req.display_name,
        password_hash,
        false,
    );

    let user = match app_state.user_store.create_user(user).await {
        Ok(user) => user,
        Err(StoreError::Duplicate(_)) => {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    log::info!("New account {} ({})", user.username, user.id);

    Ok(HttpResponse::Created().json(issue_token(&app_state, user)?))
}

pub async fn login(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let mut user = app_state
        .user_store
        .find_user_by_username(&req.username)
        .await?
        .ok_or_else(invalid)?;

    let password_matches = verify(&req.password, &user.password_hash)
        .map_err(|_| ApiError::Internal("Password verification failed".to_string()))?;
    if !password_matches {
        return Err(invalid());
    }

    let now = chrono::Utc::now().timestamp_millis();
    app_state.user_store.touch_last_login(&user.id, now).await?;
    user.last_login_at = Some(now);

    Ok(HttpResponse::Ok().json(issue_token(&app_state, user)?))
}

/// Create the initial admin from SUPERUSER_USERNAME / SUPERUSER_PASSWORD.
/// Only works while there are no accounts at all.
pub async fn create_superuser(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let count = app_state.user_store.count_users().await?;
    if count > 0 {
        return Err(ApiError::BadRequest(
            "Users already exist, cannot create initial superuser".to_string(),
        ));
    }

    let config = &app_state.config;
    let (username, password) = match (&config.superuser_username, &config.superuser_password) {
        (Some(username), Some(password)) => (username.clone(), password),
        _ => {
            return Err(ApiError::Internal(
                "SUPERUSER_USERNAME or SUPERUSER_PASSWORD not set".to_string(),
            ));
        }
    };

    let superuser = User::new(
        username,
        None,
        None,
        Some("Administrator".to_string()),
        hash_password(password)?,
        true,
    );
    let superuser = app_state.user_store.create_user(superuser).await?;
    log::info!("Created initial superuser {}", superuser.username);

    Ok(HttpResponse::Created().json(UserResponse::from(superuser)))
}
