pub mod auth;
pub mod category;
pub mod contact;
pub mod health;
pub mod product;

use serde::{Deserialize, Serialize};

/// Plain `{ "message": ... }` answer the API uses for errors, deletions and contact requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMessage {
    pub message: String,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub deleted_products: Option<u64>,
}
