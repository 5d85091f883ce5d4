use super::{excerpt, flexible_id, flexible_string};
use console_framework::{ConsoleError, ListQuery, Listing, ResourceEntity, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CONTENT_CELL_CHARS: usize = 60;

/// A comment on a post.
///
/// `admin/comments.php` is the oldest endpoint: it returns the whole
/// collection as an array in the envelope's `message`, so paging happens
/// client-side. Its later object form reports the count as `total_comments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    pub content: String,
    #[serde(default, alias = "username", deserialize_with = "flexible_string")]
    pub author: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub post_title: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ResourceEntity for Comment {
    const SECTION: &'static str = "comments";
    const ENDPOINT: &'static str = "admin/comments.php";

    fn normalize(payload: Value, query: &ListQuery) -> Result<Listing<Value>, ConsoleError> {
        let payload = match payload {
            Value::Object(mut obj) => {
                if let Some(total) = obj.remove("total_comments") {
                    obj.entry("total").or_insert(total);
                }
                Value::Object(obj)
            }
            other => other,
        };
        Listing::from_payload(payload, "comments", query)
    }

    fn record_id(&self) -> String {
        self.id.clone()
    }

    fn render_row(&self) -> Row {
        Row::new(
            self.record_id(),
            vec![
                excerpt(&self.content, CONTENT_CELL_CHARS),
                self.author.clone(),
                self.post_title.clone(),
                self.created_at.clone().unwrap_or_default(),
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
    fn total_comments_is_read_as_total() {
        let payload = json!({"comments": [{"id": 1, "content": "hi"}], "total_comments": 31});
        let listing = Comment::normalize(payload, &PageState::new(10).query_for(1)).unwrap();
        assert_eq!((listing.total, listing.total_pages), (31, 4));
    }

    #[test]
    fn long_content_is_shortened_in_the_row() {
        let comment = Comment {
            id: "1".into(),
            content: "x".repeat(100),
            author: "ana".into(),
            post_title: "Hello".into(),
            created_at: None,
        };
        let cell = &comment.render_row().cells[0];
        assert!(cell.ends_with("..."));
        assert_eq!(cell.chars().count(), CONTENT_CELL_CHARS + 3);
    }
}
