pub mod affiliate;
pub mod catalog;
pub mod errors;
pub mod export;
pub mod gamification;
pub mod ledger;
pub mod types;
pub mod wagering;
