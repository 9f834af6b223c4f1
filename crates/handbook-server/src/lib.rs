//! Handbook CMS backend: HTTP API, page storage, auth and static export.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod media;
pub mod routes;
pub mod sanitize;
pub mod service;
pub mod sitegen;
pub mod store;

pub use config::Config;
pub use db::DbPool;
