use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, PartialEq, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Editors manage every author's items; reporters only their own.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Reporter,
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reporter => "reporter",
            Role::Editor => "editor",
        }
    }

    pub fn manages_all_authors(&self) -> bool {
        matches!(self, Role::Editor)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "editor" => Role::Editor,
            _ => Role::Reporter,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_role_round_trips_through_strings() {
        assert_eq!(Role::from(String::from(Role::Editor)), Role::Editor);
        assert_eq!(Role::from(String::from(Role::Reporter)), Role::Reporter);
    }

    #[test]
    fn test_unknown_role_defaults_to_reporter() {
        assert_eq!(Role::from("admin".to_string()), Role::Reporter);
    }
}
