use serde::{Deserialize, Serialize};

/// User model (safe for client responses -- no password_hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub disabled: bool,
}
