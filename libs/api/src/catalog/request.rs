use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct GetCatalogParam {
    /// Category name to filter by; "Todas" (or omitting the parameter)
    /// bypasses filtering.
    pub category: Option<String>,
}

/// The visitor's category selection. Filtering is plain string equality on
/// the category field, so an unknown category simply matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum CategorySelection {
    All,
    One(String),
}

impl From<Option<String>> for CategorySelection {
    fn from(value: Option<String>) -> Self {
        match value {
            None => CategorySelection::All,
            Some(name) if name == "Todas" => CategorySelection::All,
            Some(name) => CategorySelection::One(name),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_todas_and_absence_bypass_filtering() {
        assert_eq!(
            CategorySelection::from(None),
            CategorySelection::All
        );
        assert_eq!(
            CategorySelection::from(Some("Todas".to_string())),
            CategorySelection::All
        );
        assert_eq!(
            CategorySelection::from(Some("Deportes".to_string())),
            CategorySelection::One("Deportes".to_string())
        );
    }
}
