use super::{flexible_id, flexible_string};
use console_framework::{ConsoleError, ListQuery, Listing, ResourceEntity, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A registered forum member.
///
/// Listed under the `users` section from `admin/users.php`, which answers
/// with the paged `{items, total, page, total_pages}` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub username: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_role() -> String {
    "user".into()
}

fn default_status() -> String {
    "active".into()
}

impl User {
    pub fn is_banned(&self) -> bool {
        self.status.eq_ignore_ascii_case("banned")
    }
}

impl ResourceEntity for User {
    const SECTION: &'static str = "users";
    const ENDPOINT: &'static str = "admin/users.php";

    fn normalize(payload: Value, query: &ListQuery) -> Result<Listing<Value>, ConsoleError> {
        Listing::from_payload(payload, "users", query)
    }

    fn record_id(&self) -> String {
        self.id.clone()
    }

    fn render_row(&self) -> Row {
        Row::new(
            self.record_id(),
            vec![
                self.username.clone(),
                self.email.clone(),
                self.role.clone(),
                self.status.clone(),
                self.created_at.clone().unwrap_or_default(),
            ],
        )
    }
}
