use axum::{Json, extract::State, http::StatusCode};
use engine::types::XpAction;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AppState, locale::Locale, middleware::AuthUser, models::AuthenticatedUser};

// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub session_id: Option<String>,
    pub user: Option<AuthenticatedUser>,
}

// Login endpoint
pub async fn login(
    State(state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginRequest>,
) -> (StatusCode, Json<LoginResponse>) {
    // Validate input
    if payload.email.is_empty() || payload.password.is_empty() {
        let response = LoginResponse {
            success: false,
            message: "Email and password are required".to_string(),
            session_id: None,
            user: None,
        };
        return (StatusCode::BAD_REQUEST, Json(response));
    }

    // Generate session_id hash from email + password
    let mut hasher = Sha256::new();
    hasher.update(payload.email.as_bytes());
    hasher.update(payload.password.as_bytes());
    let session_id = hex::encode(hasher.finalize());

    // Get or create user account with the generated session_id
    let (user, created) = state
        .storage
        .get_or_create_account_with_session(&payload.email, &session_id);
    if created {
        tracing::info!(
            "Account {} created for {} (locale {})",
            user.account_id,
            user.email,
            locale.as_str()
        );
    }

    // Every login earns XP
    {
        let mut platform = state.platform.lock().unwrap();
        platform.gamification.award(user.account_id, XpAction::Login);
    }

    let authenticated_user = AuthenticatedUser::from(user.clone());
    let response = LoginResponse {
        success: true,
        message: locale.messages().login_success.to_string(),
        session_id: Some(user.session_id),
        user: Some(authenticated_user),
    };
    (StatusCode::OK, Json(response))
}

// User profile response
#[derive(Serialize)]
pub struct UserProfileResponse {
    pub success: bool,
    pub user: Option<AuthenticatedUser>,
    pub message: String,
}

// Get user profile endpoint (protected route)
pub async fn get_profile(AuthUser(user): AuthUser) -> (StatusCode, Json<UserProfileResponse>) {
    let response = UserProfileResponse {
        success: true,
        user: Some(user),
        message: "Profile retrieved successfully".to_string(),
    };
    (StatusCode::OK, Json(response))
}

// Mark the profile completed; awards XP the first time only
pub async fn complete_profile(
    State(state): State<AppState>,
    locale: Locale,
    AuthUser(user): AuthUser,
) -> (StatusCode, Json<UserProfileResponse>) {
    let first_completion = match state.storage.mark_profile_completed(user.account_id) {
        Ok(first) => first,
        Err(message) => {
            return (
                StatusCode::NOT_FOUND,
                Json(UserProfileResponse {
                    success: false,
                    user: None,
                    message,
                }),
            );
        }
    };

    if first_completion {
        let mut platform = state.platform.lock().unwrap();
        platform
            .gamification
            .award(user.account_id, XpAction::ProfileCompleted);
    }

    let response = UserProfileResponse {
        success: true,
        user: Some(AuthenticatedUser {
            account_id: user.account_id,
            email: user.email,
            profile_completed: true,
        }),
        message: locale.messages().profile_completed.to_string(),
    };
    (StatusCode::OK, Json(response))
}
