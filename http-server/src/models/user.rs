use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub account_id: u64,
    pub session_id: String,
    pub email: String,
    pub profile_completed: bool,
}

/// User view without the session id, safe to echo in responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub account_id: u64,
    pub email: String,
    pub profile_completed: bool,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        AuthenticatedUser {
            account_id: user.account_id,
            email: user.email,
            profile_completed: user.profile_completed,
        }
    }
}
