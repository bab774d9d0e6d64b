use axum::{
    extract::{Query, State},
    Json,
};

pub mod request;
pub mod response;
mod rotation;

pub use rotation::RotationClock;

use crate::response::{ApiResponse, IntoApiResponse as _};
use crate::ApiState;
use entity::prelude::*;

use self::request::{CategorySelection, GetCatalogParam};
use self::response::{CatalogItem, GetCatalogResponse};

/// The public catalog: published news, newest first, with the record the
/// rotation clock currently features split out from the grid
#[utoipa::path(
    get,
    path = "/catalog",
    responses(
        (status = 200, description = "Published news for the selected category", body = GetCatalogResponse)
    ),
    params(
        GetCatalogParam
    )
)]
pub async fn get_catalog(
    State(state): State<ApiState>,
    Query(params): Query<GetCatalogParam>,
) -> ApiResponse<Json<GetCatalogResponse>> {
    let published = state
        .repo
        .news
        .find_published()
        .await
        .into_response("in find published news")?;

    let selection = CategorySelection::from(params.category);
    let filtered = filter_by_category(published, &selection);
    let (featured, items) = featured_split(filtered, state.rotation.ticks());

    Ok(Json(GetCatalogResponse {
        featured: featured.map(CatalogItem::from),
        items: items.into_iter().map(CatalogItem::from).collect(),
    }))
}

pub(crate) fn filter_by_category(
    items: Vec<NewsEntity>,
    selection: &CategorySelection,
) -> Vec<NewsEntity> {
    match selection {
        CategorySelection::All => items,
        CategorySelection::One(name) => items
            .into_iter()
            .filter(|item| item.category.as_str() == name)
            .collect(),
    }
}

/// Index of the featured element after `ticks` clock ticks: ticks modulo
/// the list length. An empty list features nothing rather than panicking.
pub(crate) fn featured_index(ticks: u64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }

    Some((ticks % len as u64) as usize)
}

/// Splits the filtered list into the featured record and the grid. Grid
/// order is the existing order with only the featured index excluded.
pub(crate) fn featured_split(
    items: Vec<NewsEntity>,
    ticks: u64,
) -> (Option<NewsEntity>, Vec<NewsEntity>) {
    let Some(index) = featured_index(ticks, items.len()) else {
        return (None, items);
    };

    let mut featured = None;
    let mut rest = Vec::with_capacity(items.len() - 1);
    for (i, item) in items.into_iter().enumerate() {
        if i == index {
            featured = Some(item);
        } else {
            rest.push(item);
        }
    }

    (featured, rest)
}

#[cfg(test)]
mod test {
    use super::*;
    use entity::news::{Category, Status};
    use uuid::Uuid;

    fn published(title: &str, category: Category) -> NewsEntity {
        NewsEntity {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: "contenido".to_string(),
            category,
            status: Status::Published,
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_keeps_exactly_the_matching_items_in_order() {
        // Arrange
        let items = vec![
            published("a", Category::Deportes),
            published("b", Category::Cultura),
            published("c", Category::Deportes),
        ];

        // Act
        let filtered = filter_by_category(
            items,
            &CategorySelection::One("Deportes".to_string()),
        );

        // Assert
        let titles: Vec<_> =
            filtered.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[test]
    fn test_filter_on_all_is_a_passthrough() {
        let items = vec![
            published("a", Category::Deportes),
            published("b", Category::Cultura),
        ];

        let filtered = filter_by_category(items.clone(), &CategorySelection::All);

        assert_eq!(filtered, items);
    }

    #[test]
    fn test_unknown_category_matches_nothing() {
        let items = vec![published("a", Category::Deportes)];

        let filtered = filter_by_category(
            items,
            &CategorySelection::One("Farándula".to_string()),
        );

        assert!(filtered.is_empty());
    }

    #[test]
    fn test_featured_index_is_ticks_modulo_length() {
        for (ticks, len, expected) in
            [(0, 3, 0), (1, 3, 1), (2, 3, 2), (3, 3, 0), (7, 3, 1), (5, 1, 0)]
        {
            assert_eq!(featured_index(ticks, len), Some(expected));
        }
    }

    #[test]
    fn test_empty_list_features_nothing() {
        assert_eq!(featured_index(12, 0), None);

        let (featured, rest) = featured_split(vec![], 12);
        assert!(featured.is_none());
        assert!(rest.is_empty());
    }

    #[test]
    fn test_split_excludes_only_the_featured_index() {
        // Arrange
        let items = vec![
            published("a", Category::Sociedad),
            published("b", Category::Sociedad),
            published("c", Category::Sociedad),
        ];

        // Act: one tick on a list of three features the second element
        let (featured, rest) = featured_split(items, 1);

        // Assert
        assert_eq!(featured.unwrap().title, "b");
        let titles: Vec<_> = rest.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }
}
