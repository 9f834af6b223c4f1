//! Types shared by the handbook server and its clients, and the page tree
//! that holds the handbook structure.

pub mod api;
pub mod models;
pub mod tree;

pub use models::*;
pub use tree::{page_url, NodePatch, OrderEntry, PageTree, TreeError, HOME_TITLE, HOME_URL};
