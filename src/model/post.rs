use super::{flexible_id, flexible_string, flexible_u64};
use console_framework::{ConsoleError, ListQuery, Listing, ResourceEntity, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A forum post.
///
/// `admin/posts.php` keys the collection as `posts` and reports paging in a
/// `pagination` sub-object whose counts are strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub title: String,
    #[serde(default, alias = "username", alias = "author_name", deserialize_with = "flexible_string")]
    pub author: String,
    #[serde(default, alias = "category_name", deserialize_with = "flexible_string")]
    pub category: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, deserialize_with = "flexible_u64")]
    pub comment_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_status() -> String {
    "published".into()
}

impl ResourceEntity for Post {
    const SECTION: &'static str = "posts";
    const ENDPOINT: &'static str = "admin/posts.php";

    fn normalize(payload: Value, query: &ListQuery) -> Result<Listing<Value>, ConsoleError> {
        Listing::from_payload(payload, "posts", query)
    }

    fn record_id(&self) -> String {
        self.id.clone()
    }

    fn render_row(&self) -> Row {
        Row::new(
            self.record_id(),
            vec![
                self.title.clone(),
                self.author.clone(),
                self.category.clone(),
                self.status.clone(),
                self.comment_count.to_string(),
            ],
        )
    }
}
