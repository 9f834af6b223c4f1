use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMenuRequest {
    pub name: String,
    #[serde(default = "empty_menu")]
    pub menu_data: Value,
}

fn empty_menu() -> Value {
    Value::Array(Vec::new())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateMenuRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_data: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateWidgetRequest {
    pub name: String,
    pub widget_type: String,
    #[serde(default = "empty_widget")]
    pub widget_data: Value,
}

fn empty_widget() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateWidgetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_data: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_path: String,
}
