use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn active_by_default() -> bool {
    true
}

/// Fields submitted when creating or updating a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    /// Only sent on update; `None` leaves the flag untouched.
    pub is_active: Option<bool>,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            is_active: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Category name is required".to_string());
        }
        Ok(())
    }

    pub(crate) fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.trim().to_string()),
            ("description", self.description.clone()),
        ];
        if let Some(active) = self.is_active {
            fields.push(("isActive", active.to_string()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_lean_document() {
        let category: Category = serde_json::from_str(
            r#"{"_id":"65a1","name":"Office Chairs","slug":"office-chairs","createdAt":"2024-03-01T10:00:00.000Z"}"#,
        )
        .unwrap();

        assert_eq!(category.id, "65a1");
        assert!(category.is_active);
        assert!(category.description.is_none());
        assert!(category.created_at.is_some());
    }

    #[test]
    fn test_draft_requires_name() {
        assert!(CategoryDraft::new("  ", "desc").validate().is_err());

        let mut draft = CategoryDraft::new("Desks", "");
        draft.is_active = Some(false);
        assert!(draft.validate().is_ok());
        assert_eq!(
            draft.form_fields(),
            vec![
                ("name", "Desks".to_string()),
                ("description", String::new()),
                ("isActive", "false".to_string()),
            ]
        );
    }
}
