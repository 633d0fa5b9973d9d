pub mod admin;
pub mod app;
pub mod auth;
pub mod bookmarks;
pub mod config;
pub mod courses;
pub mod error;
pub mod response;
pub mod state;
#[cfg(test)]
pub(crate) mod test_support;
pub mod users;
