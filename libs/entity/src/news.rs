use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use uuid::Uuid;

#[derive(Debug, Default, PartialEq, Clone)]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub category: Category,
    /// When several images were uploaded their public URLs are stored
    /// comma-joined in this single field. No structured list is persisted.
    pub image_url: Option<String>,
    pub author_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

/// Fields a submitter controls. The server assigns id, author and
/// created_at.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct NewsDraft {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub category: Category,
    pub image_url: Option<String>,
    pub status: Status,
}

#[derive(
    Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Category {
    #[default]
    Sociedad,
    Deportes,
    #[serde(rename = "Tecnología")]
    Tecnologia,
    Cultura,
    #[serde(rename = "Educación")]
    Educacion,
    #[serde(rename = "Medio Ambiente")]
    MedioAmbiente,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sociedad => "Sociedad",
            Category::Deportes => "Deportes",
            Category::Tecnologia => "Tecnología",
            Category::Cultura => "Cultura",
            Category::Educacion => "Educación",
            Category::MedioAmbiente => "Medio Ambiente",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Category::iter().find(|c| c.as_str() == value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::parse(&value).unwrap_or_default()
    }
}

#[derive(
    Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize, strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Editing,
    Finished,
    #[default]
    Published,
    Disabled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Editing => "editing",
            Status::Finished => "finished",
            Status::Published => "published",
            Status::Disabled => "disabled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Status::iter().find(|s| s.as_str() == value)
    }

    /// The visibility toggle flips only between published and disabled.
    /// Records still in the editorial states cannot be toggled.
    pub fn toggled(&self) -> Option<Status> {
        match self {
            Status::Published => Some(Status::Disabled),
            Status::Disabled => Some(Status::Published),
            Status::Editing | Status::Finished => None,
        }
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.as_str().to_string()
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        // Unknown stored values stay out of public view.
        Status::parse(&value).unwrap_or(Status::Editing)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator as _;

    #[test]
    fn test_category_round_trips_through_strings() {
        for category in Category::iter() {
            // Act
            let parsed = Category::parse(category.as_str());

            // Assert
            assert_eq!(parsed, Some(category));
        }
    }

    #[test]
    fn test_category_falls_back_on_unknown_value() {
        assert_eq!(Category::from("Deportes".to_string()), Category::Deportes);
        assert_eq!(
            Category::from("Medio Ambiente".to_string()),
            Category::MedioAmbiente
        );
        assert_eq!(Category::from("???".to_string()), Category::Sociedad);
    }

    #[test]
    fn test_toggle_twice_is_identity_for_visible_states() {
        for status in [Status::Published, Status::Disabled] {
            // Act
            let twice = status.toggled().and_then(|s| s.toggled());

            // Assert
            assert_eq!(twice, Some(status));
        }
    }

    #[test]
    fn test_editorial_states_cannot_be_toggled() {
        assert_eq!(Status::Editing.toggled(), None);
        assert_eq!(Status::Finished.toggled(), None);
    }

    #[test]
    fn test_unknown_status_is_never_published() {
        assert_eq!(Status::from("draft".to_string()), Status::Editing);
    }
}
