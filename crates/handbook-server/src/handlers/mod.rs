pub mod auth;
pub mod menus;
pub mod pages;
pub mod public;
pub mod settings;
pub mod upload;
pub mod widgets;
