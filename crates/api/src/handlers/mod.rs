pub mod auth;
pub mod feed;
pub mod likes;
pub mod posts;
