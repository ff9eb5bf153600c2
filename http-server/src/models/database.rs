use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::User;

// Simple in-memory session storage implementation
#[derive(Clone)]
pub struct InMemoryStorage {
    pub accounts: Arc<Mutex<HashMap<String, User>>>,
    next_account_id: Arc<Mutex<u64>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            next_account_id: Arc::new(Mutex::new(1)),
        }
    }

    /// Get or create a user account under the given session id.
    /// Returns the user and whether the account was just created.
    pub fn get_or_create_account_with_session(
        &self,
        email: &str,
        session_id: &str,
    ) -> (User, bool) {
        let mut accounts = self.accounts.lock().unwrap();

        if let Some(user) = accounts.get(session_id) {
            return (user.clone(), false);
        }

        let account_id = {
            let mut next = self.next_account_id.lock().unwrap();
            let id = *next;
            *next += 1;
            id
        };

        let new_user = User {
            account_id,
            session_id: session_id.to_string(),
            email: email.to_string(),
            profile_completed: false,
        };

        accounts.insert(session_id.to_string(), new_user.clone());
        (new_user, true)
    }

    // Get user by session ID
    pub fn get_user_by_session_id(&self, session_id: &str) -> Option<User> {
        let accounts = self.accounts.lock().unwrap();
        accounts.get(session_id).cloned()
    }

    /// Marks the profile completed. Returns `true` only the first time,
    /// so the completion XP is awarded once.
    pub fn mark_profile_completed(&self, account_id: u64) -> Result<bool, String> {
        let mut accounts = self.accounts.lock().unwrap();

        if let Some(user) = accounts.values_mut().find(|u| u.account_id == account_id) {
            if user.profile_completed {
                Ok(false)
            } else {
                user.profile_completed = true;
                Ok(true)
            }
        } else {
            Err("User not found".to_string())
        }
    }
}
