pub mod app;
pub mod artwork;
pub mod browse;
pub mod catalog;
pub mod config;
pub mod enrich;
pub mod models;
pub mod omdb;
pub mod query;
pub mod slug;
