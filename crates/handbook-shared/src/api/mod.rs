mod auth;
mod content;
mod pages;

use serde::{Deserialize, Serialize};

pub use auth::*;
pub use content::*;
pub use pages::*;

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Acknowledgement naming the menu or widget it refers to.
#[derive(Debug, Serialize, Deserialize)]
pub struct NamedResponse {
    pub message: String,
    pub name: String,
}
