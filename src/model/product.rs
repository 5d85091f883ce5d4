use super::{flexible_f64, flexible_id, flexible_string, flexible_u64};
use console_framework::{ConsoleError, ListQuery, Listing, ResourceEntity, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A shop product.
///
/// `admin/products.php` nests the paged listing under `data` and sends
/// prices as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub price: f64,
    #[serde(default, alias = "quantity", deserialize_with = "flexible_u64")]
    pub stock: u64,
    #[serde(default, alias = "category_name", deserialize_with = "flexible_string")]
    pub category: String,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

impl ResourceEntity for Product {
    const SECTION: &'static str = "products";
    const ENDPOINT: &'static str = "admin/products.php";

    fn normalize(payload: Value, query: &ListQuery) -> Result<Listing<Value>, ConsoleError> {
        Listing::from_payload(payload, "products", query)
    }

    fn record_id(&self) -> String {
        self.id.clone()
    }

    fn render_row(&self) -> Row {
        let stock = if self.in_stock() {
            self.stock.to_string()
        } else {
            "out of stock".to_string()
        };
        Row::new(
            self.record_id(),
            vec![
                self.name.clone(),
                format!("{:.2}", self.price),
                stock,
                self.category.clone(),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_framework::PageState;
    use serde_json::json;

    #[test]
    fn nested_data_with_string_prices() {
        let payload = json!({"data": {
            "items": [{"id": 4, "name": "Mug", "price": "7.5", "quantity": 0}],
            "total": 1, "page": 1, "total_pages": 1
        }});
        let listing = Product::normalize(payload, &PageState::new(10).query_for(1))
            .unwrap()
            .try_map(serde_json::from_value::<Product>)
            .unwrap();
        let row = listing.items[0].render_row();
        assert_eq!(row.cells, vec!["Mug", "7.50", "out of stock", ""]);
    }
}
