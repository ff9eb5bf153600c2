use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use crate::{AppState, models::AuthenticatedUser};

// Axum extractor for authenticated users
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

fn unauthorized(message: &'static str) -> Response {
    (StatusCode::UNAUTHORIZED, message).into_response()
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

        // The session token doubles as the storage key
        match state.storage.get_user_by_session_id(token) {
            Some(user) => Ok(AuthUser(AuthenticatedUser::from(user))),
            None => Err(unauthorized("Invalid token")),
        }
    }
}
