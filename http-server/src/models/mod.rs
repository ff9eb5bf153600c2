mod database;
mod user;

pub use database::InMemoryStorage;
pub use user::{AuthenticatedUser, User};
