//! # Page State & Listing Normalization
//!
//! [`PageState`] is the paging/search/filter state owned by one resource
//! manager. [`ListQuery`] is the request built from it, and [`Listing`] is
//! the canonical `{items, total, page, total_pages}` shape every endpoint
//! payload is normalized into before rendering.
//!
//! Endpoints have answered with several payload shapes over time:
//!
//! | Shape | Example |
//! |-------|---------|
//! | bare array | `[{..}, {..}]` |
//! | paged object | `{"items": [..], "total": 57, "page": 2, "total_pages": 6}` |
//! | entity-keyed | `{"users": [..], "pagination": {"total": "57"}}` |
//! | nested data | `{"data": {"items": [..]}}` |
//!
//! [`Listing::from_payload`] recognizes all of them. Each entity calls it
//! from its own adapter so rendering code never branches on shape.

use crate::error::ConsoleError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Paging, search and filter state of one resource manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_records: u64,
    pub page_size: u32,
    pub search_query: String,
    pub filters: BTreeMap<String, String>,
}

impl PageState {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            total_records: 0,
            page_size: page_size.max(1),
            search_query: String::new(),
            filters: BTreeMap::new(),
        }
    }

    /// The request parameters for `page` under the current search and filters.
    pub fn query_for(&self, page: u32) -> ListQuery {
        ListQuery {
            page: page.max(1),
            page_size: self.page_size,
            search: self.search_query.clone(),
            filters: self.filters.clone(),
        }
    }

    /// Records a successfully rendered listing.
    pub fn apply<T>(&mut self, listing: &Listing<T>) {
        self.current_page = listing.page;
        self.total_pages = listing.total_pages;
        self.total_records = listing.total;
    }
}

/// Parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: String,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// Query string: `page`, `limit`, then `search` and filters when non-empty.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer
            .append_pair("page", &self.page.to_string())
            .append_pair("limit", &self.page_size.to_string());
        let search = self.search.trim();
        if !search.is_empty() {
            serializer.append_pair("search", search);
        }
        for (key, value) in &self.filters {
            if !value.is_empty() {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    /// `endpoint` with this query appended.
    pub fn to_endpoint(&self, endpoint: &str) -> String {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!("{endpoint}{separator}{}", self.to_query_string())
    }
}

/// Canonical listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

impl<T> Listing<T> {
    /// Converts every item, failing on the first one that does not convert.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Listing<U>, E> {
        Ok(Listing {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
        })
    }
}

fn pages_for(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    total.div_ceil(size).min(u64::from(u32::MAX)) as u32
}

/// Reads a count that may arrive as a number or a numeric string.
fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lookup(obj: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    let nested = obj.get("pagination").and_then(Value::as_object);
    keys.iter().find_map(|key| {
        obj.get(*key)
            .and_then(count)
            .or_else(|| nested.and_then(|p| p.get(*key)).and_then(count))
    })
}

impl Listing<Value> {
    /// Normalizes a raw payload for `query`.
    ///
    /// A bare array is the whole collection: it is sliced client-side to the
    /// requested page. Objects are searched for `items`, then
    /// `collection_key`, then a nested `data`/`message`.
    pub fn from_payload(payload: Value, collection_key: &str, query: &ListQuery) -> Result<Self, ConsoleError> {
        match payload {
            Value::Array(items) => Ok(Self::paginate_locally(items, query)),
            Value::Object(mut obj) => {
                let items = ["items", collection_key]
                    .iter()
                    .find_map(|key| match obj.remove(*key) {
                        Some(Value::Array(items)) => Some(items),
                        _ => None,
                    });
                match items {
                    Some(items) => Ok(Self::from_paged_object(items, &obj, query)),
                    None => {
                        let nested = obj
                            .remove("data")
                            .filter(|v| v.is_array() || v.is_object())
                            .or_else(|| obj.remove("message").filter(Value::is_array));
                        match nested {
                            Some(inner) => Self::from_payload(inner, collection_key, query),
                            None => Err(ConsoleError::UnexpectedPayload(format!(
                                "no '{collection_key}' collection in response"
                            ))),
                        }
                    }
                }
            }
            other => Err(ConsoleError::UnexpectedPayload(format!(
                "expected a list, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Slices a complete collection down to the requested page.
    pub fn paginate_locally(items: Vec<Value>, query: &ListQuery) -> Self {
        let total = items.len() as u64;
        let total_pages = pages_for(total, query.page_size);
        let page = query.page.clamp(1, total_pages.max(1));
        let size = query.page_size.max(1) as usize;
        let items = items
            .into_iter()
            .skip((page as usize - 1) * size)
            .take(size)
            .collect();
        Self {
            items,
            total,
            page,
            total_pages,
        }
    }

    fn from_paged_object(items: Vec<Value>, meta: &Map<String, Value>, query: &ListQuery) -> Self {
        let total = lookup(meta, &["total", "total_records", "count"]).unwrap_or(items.len() as u64);
        let total_pages = lookup(meta, &["total_pages", "pages", "last_page"])
            .map(|p| p.min(u64::from(u32::MAX)) as u32)
            .unwrap_or_else(|| pages_for(total, query.page_size));
        let page = lookup(meta, &["page", "current_page"])
            .map(|p| p.clamp(1, u64::from(u32::MAX)) as u32)
            .unwrap_or(query.page);
        Self {
            items,
            total,
            page,
            total_pages,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(page: u32) -> ListQuery {
        PageState::new(10).query_for(page)
    }

    #[test]
    fn bare_array_is_sliced_to_the_requested_page() {
        let items: Vec<Value> = (1..=23).map(|i| json!({"id": i})).collect();
        let listing = Listing::from_payload(Value::Array(items), "users", &query(3)).unwrap();
        assert_eq!(listing.total, 23);
        assert_eq!(listing.total_pages, 3);
        assert_eq!(listing.page, 3);
        assert_eq!(listing.items, vec![json!({"id": 21}), json!({"id": 22}), json!({"id": 23})]);
    }

    #[test]
    fn paged_object_keeps_server_metadata() {
        let payload = json!({"items": [{"id": 11}], "total": 57, "page": 2, "total_pages": 6});
        let listing = Listing::from_payload(payload, "users", &query(2)).unwrap();
        assert_eq!((listing.total, listing.page, listing.total_pages), (57, 2, 6));
        assert_eq!(listing.items.len(), 1);
    }

    #[test]
    fn entity_keyed_collection_with_string_counts() {
        let payload = json!({
            "products": [{"id": "4"}, {"id": "5"}],
            "pagination": {"total": "42", "current_page": "3"}
        });
        let listing = Listing::from_payload(payload, "products", &query(3)).unwrap();
        assert_eq!(listing.total, 42);
        assert_eq!(listing.page, 3);
        assert_eq!(listing.total_pages, 5);
    }

    #[test]
    fn nested_data_is_unwrapped() {
        let payload = json!({"data": {"items": [{"id": 1}], "total": 1}});
        let listing = Listing::from_payload(payload, "posts", &query(1)).unwrap();
        assert_eq!(listing.total_pages, 1);
        assert_eq!(listing.items, vec![json!({"id": 1})]);
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        let err = Listing::from_payload(json!({"rows": []}), "users", &query(1)).unwrap_err();
        assert!(matches!(err, ConsoleError::UnexpectedPayload(_)));
        let err = Listing::from_payload(json!("nope"), "users", &query(1)).unwrap_err();
        assert_eq!(err, ConsoleError::UnexpectedPayload("expected a list, got a string".into()));
    }

    #[test]
    fn query_string_skips_empty_search_and_filters() {
        let mut state = PageState::new(10);
        state.filters.insert("role".into(), "admin".into());
        state.filters.insert("status".into(), String::new());
        assert_eq!(state.query_for(2).to_query_string(), "page=2&limit=10&role=admin");

        state.search_query = " ann lee ".into();
        assert_eq!(
            state.query_for(1).to_endpoint("admin/users.php"),
            "admin/users.php?page=1&limit=10&search=ann+lee&role=admin"
        );
        assert_eq!(
            state.query_for(1).to_endpoint("admin/users.php?view=all"),
            "admin/users.php?view=all&page=1&limit=10&search=ann+lee&role=admin"
        );
    }
}
