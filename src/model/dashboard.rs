use super::flexible_u64;
use console_framework::{ConsoleError, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default, alias = "total_users", deserialize_with = "flexible_u64")]
    pub users: u64,
    #[serde(default, alias = "total_posts", deserialize_with = "flexible_u64")]
    pub posts: u64,
    #[serde(default, alias = "total_comments", deserialize_with = "flexible_u64")]
    pub comments: u64,
    #[serde(default, alias = "total_products", deserialize_with = "flexible_u64")]
    pub products: u64,
    #[serde(default, alias = "total_categories", deserialize_with = "flexible_u64")]
    pub categories: u64,
}

impl DashboardStats {
    pub const ENDPOINT: &'static str = "admin/dashboard.php";

    /// Reads the counts from either `{"stats": {..}}` or a flat object.
    pub fn from_payload(payload: Value) -> Result<Self, ConsoleError> {
        let stats = match payload {
            Value::Object(mut obj) => match obj.remove("stats") {
                Some(inner @ Value::Object(_)) => inner,
                _ => Value::Object(obj),
            },
            other => {
                return Err(ConsoleError::UnexpectedPayload(format!(
                    "dashboard expects an object, got {other}"
                )))
            }
        };
        serde_json::from_value(stats).map_err(|e| ConsoleError::UnexpectedPayload(e.to_string()))
    }

    pub fn rows(&self) -> Vec<Row> {
        [
            ("users", "Users", self.users),
            ("posts", "Posts", self.posts),
            ("comments", "Comments", self.comments),
            ("products", "Products", self.products),
            ("categories", "Categories", self.categories),
        ]
        .into_iter()
        .map(|(id, label, count)| Row::new(id, vec![label.to_string(), count.to_string()]))
        .collect()
    }
}
