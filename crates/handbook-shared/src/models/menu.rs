use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named navigation menu; `menu_data` is the structure edited in the admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub id: i64,
    pub name: String,
    pub menu_data: Value,
}

/// Named, typed block of site content (banner, footer links, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: i64,
    pub name: String,
    pub widget_type: String,
    pub widget_data: Value,
}
