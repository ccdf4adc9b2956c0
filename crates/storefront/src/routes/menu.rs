//! Menu (catalog) route handlers.
//!
//! The menu is the home page: active items grouped into sections, with a
//! category filter, fuzzy name search, and a quantity stepper per item.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tiffinbox_core::{Category, ItemId, Rupees};

use crate::backend::types::{MenuItem, Quantities};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::services::cart;
use crate::state::AppState;

/// Menu search/filter query parameters.
#[derive(Debug, Deserialize, Default)]
pub struct MenuQuery {
    /// Fuzzy name search.
    #[serde(default)]
    pub q: Option<String>,
    /// Category filter token ("veg", "non-veg", anything else = all).
    #[serde(default)]
    pub category: Option<String>,
}

/// One menu item card.
pub struct MenuItemView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: Option<String>,
    pub is_veg: bool,
    pub quantity: u32,
}

impl MenuItemView {
    fn new(item: &MenuItem, quantities: &Quantities) -> Self {
        Self {
            id: item.id.as_i64(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: Rupees::new(item.price).to_string(),
            image_url: item.image_url.clone(),
            is_veg: item.category == Category::Veg,
            quantity: quantities.get(&item.id).copied().unwrap_or(0),
        }
    }
}

/// A display section ("Main", "Drink", ...), in first-encounter order.
pub struct MenuSection {
    pub name: String,
    pub items: Vec<MenuItemView>,
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu/index.html")]
pub struct MenuTemplate {
    pub sections: Vec<MenuSection>,
    pub query: String,
    pub category: String,
    pub error: Option<String>,
}

/// Group filtered items into sections, keyed by the item `Type`, in the
/// order each section is first encountered - not sorted.
fn group_into_sections(items: &[&MenuItem], quantities: &Quantities) -> Vec<MenuSection> {
    let mut sections: Vec<MenuSection> = Vec::new();
    for item in items {
        let view = MenuItemView::new(item, quantities);
        match sections.iter_mut().find(|s| s.name == item.section) {
            Some(section) => section.items.push(view),
            None => sections.push(MenuSection {
                name: item.section.clone(),
                items: vec![view],
            }),
        }
    }
    sections
}

/// Display the menu.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(params): Query<MenuQuery>,
) -> impl IntoResponse {
    let query = params.q.unwrap_or_default();
    let category_param = params.category.unwrap_or_default();
    let category = Category::parse_filter(&category_param);

    // A failed catalog fetch is not fatal: show the page with a notice
    // and whatever (possibly nothing) we have.
    let (sections, error) = match load_sections(&state, &session, &user, &query, category).await {
        Ok(sections) => (sections, None),
        Err(response) => match response {
            LoadError::Auth(err) => return err.into_response(),
            LoadError::Remote(message) => (Vec::new(), Some(message)),
        },
    };

    MenuTemplate {
        sections,
        query,
        category: category_param,
        error,
    }
    .into_response()
}

enum LoadError {
    Auth(crate::error::AppError),
    Remote(String),
}

async fn load_sections(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    query: &str,
    category: Option<Category>,
) -> Result<Vec<MenuSection>, LoadError> {
    let catalog = match state.backend().get_catalog(&user.token).await {
        Ok(catalog) => catalog,
        Err(err) if err.is_auth_failure() => {
            return Err(LoadError::Auth(
                crate::middleware::on_backend_error(session, err).await,
            ));
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to fetch catalog");
            return Err(LoadError::Remote(
                "Could not load the menu. Please retry.".to_string(),
            ));
        }
    };

    // Customers only ever see active items.
    let active: Vec<&MenuItem> = catalog.iter().filter(|item| item.is_active).collect();

    if let Err(e) = state.search().refresh(&active.iter().map(|i| (*i).clone()).collect::<Vec<_>>())
    {
        tracing::warn!(error = %e, "Menu search index refresh failed");
    }

    // Category filter: exact match, case-insensitive (already normalized
    // into the enum).
    let by_category: Vec<&MenuItem> = match category {
        Some(cat) => active
            .iter()
            .copied()
            .filter(|item| item.category == cat)
            .collect(),
        None => active,
    };

    // Fuzzy search keeps the index ranking; the section grouping then
    // follows that sequence's first-encounter order.
    let filtered: Vec<&MenuItem> = if query.trim().is_empty() {
        by_category
    } else {
        let ranked: Vec<ItemId> = state
            .search()
            .search(query, 50)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Menu search failed");
                Vec::new()
            });
        ranked
            .iter()
            .filter_map(|id| by_category.iter().find(|item| item.id == *id).copied())
            .collect()
    };

    let quantities = cart::quantities(state.backend(), user)
        .await
        .unwrap_or_default();

    Ok(group_into_sections(&filtered, &quantities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    fn item(id: i64, name: &str, section: &str, category: Category) -> MenuItem {
        MenuItem {
            id: ItemId::new(id),
            name: name.to_string(),
            description: String::new(),
            price: Decimal::from(100),
            image_url: None,
            is_active: true,
            category,
            section: section.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_sections_in_first_encounter_order() {
        let a = item(1, "Dosa", "Tiffin", Category::Veg);
        let b = item(2, "Biryani", "Main", Category::NonVeg);
        let c = item(3, "Idli", "Tiffin", Category::Veg);
        let items = vec![&a, &b, &c];

        let sections = group_into_sections(&items, &HashMap::new());
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        // Tiffin appears first because item 1 did; not alphabetical.
        assert_eq!(names, vec!["Tiffin", "Main"]);
        assert_eq!(sections[0].items.len(), 2);
    }

    #[test]
    fn test_stepper_quantity_comes_from_cart() {
        let a = item(1, "Dosa", "Tiffin", Category::Veg);
        let items = vec![&a];
        let mut quantities = HashMap::new();
        quantities.insert(ItemId::new(1), 3);

        let sections = group_into_sections(&items, &quantities);
        assert_eq!(sections[0].items[0].quantity, 3);
    }
}
