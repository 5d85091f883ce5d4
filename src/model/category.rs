use super::{flexible_id, flexible_string, flexible_u64};
use console_framework::{ConsoleError, ListQuery, Listing, ResourceEntity, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A post or product category.
///
/// `admin/categories.php` returns every category as a bare array; the
/// listing is paged client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub slug: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub description: String,
    #[serde(default, alias = "post_count", deserialize_with = "flexible_u64")]
    pub item_count: u64,
}

impl ResourceEntity for Category {
    const SECTION: &'static str = "categories";
    const ENDPOINT: &'static str = "admin/categories.php";

    fn normalize(payload: Value, query: &ListQuery) -> Result<Listing<Value>, ConsoleError> {
        Listing::from_payload(payload, "categories", query)
    }

    fn record_id(&self) -> String {
        self.id.clone()
    }

    fn render_row(&self) -> Row {
        Row::new(
            self.record_id(),
            vec![
                self.name.clone(),
                self.slug.clone(),
                self.description.clone(),
                self.item_count.to_string(),
            ],
        )
    }
}
