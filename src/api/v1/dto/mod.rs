pub mod auth;
pub mod homes;
pub mod messages;
