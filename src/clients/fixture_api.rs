//! In-memory backend for the demo binary and tests.
//!
//! Each collection deliberately answers in the payload shape its real
//! endpoint uses, so the per-entity adapters are exercised end to end:
//!
//! | Endpoint | Shape |
//! |----------|-------|
//! | `admin/users.php` | `{items, total, page, total_pages}` |
//! | `admin/posts.php` | `{posts, pagination: {total: "..", ..}}` |
//! | `admin/comments.php` | whole array in the envelope `message` |
//! | `admin/products.php` | `{data: {items, total, page, total_pages}}` |
//! | `admin/categories.php` | bare array |
//! | `admin/dashboard.php` | `{stats: {..}}` |

use crate::clients::auth::AUTH_CHECK_ENDPOINT;
use crate::model::{Category, Comment, DashboardStats, Post, Product, User};
use async_trait::async_trait;
use console_framework::{
    ApiClient, ApiEnvelope, AuthResult, ConsoleError, Method, RequestOptions, ResourceEntity,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, instrument};
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Users,
    Posts,
    Comments,
    Products,
    Categories,
}

impl Collection {
    fn from_path(path: &str) -> Option<Self> {
        match path {
            p if p == User::ENDPOINT => Some(Self::Users),
            p if p == Post::ENDPOINT => Some(Self::Posts),
            p if p == Comment::ENDPOINT => Some(Self::Comments),
            p if p == Product::ENDPOINT => Some(Self::Products),
            p if p == Category::ENDPOINT => Some(Self::Categories),
            _ => None,
        }
    }

    /// Fields matched by the `search` parameter.
    fn searchable(self) -> &'static [&'static str] {
        match self {
            Self::Users => &["username", "email"],
            Self::Posts => &["title", "username"],
            Self::Comments => &["content", "username"],
            Self::Products => &["name"],
            Self::Categories => &["name", "slug"],
        }
    }
}

#[derive(Debug, Default)]
struct Store {
    users: Vec<Value>,
    posts: Vec<Value>,
    comments: Vec<Value>,
    products: Vec<Value>,
    categories: Vec<Value>,
}

impl Store {
    fn records(&self, collection: Collection) -> &Vec<Value> {
        match collection {
            Collection::Users => &self.users,
            Collection::Posts => &self.posts,
            Collection::Comments => &self.comments,
            Collection::Products => &self.products,
            Collection::Categories => &self.categories,
        }
    }

    fn records_mut(&mut self, collection: Collection) -> &mut Vec<Value> {
        match collection {
            Collection::Users => &mut self.users,
            Collection::Posts => &mut self.posts,
            Collection::Comments => &mut self.comments,
            Collection::Products => &mut self.products,
            Collection::Categories => &mut self.categories,
        }
    }

    fn stats(&self) -> Value {
        json!({
            "stats": {
                "users": self.users.len(),
                "posts": self.posts.len(),
                "comments": self.comments.len(),
                "products": self.products.len(),
                "categories": self.categories.len(),
            }
        })
    }
}

/// Query parameters of a list request.
struct Params {
    page: usize,
    limit: usize,
    search: String,
    filters: BTreeMap<String, String>,
}

impl Params {
    fn parse(query: &str) -> Self {
        let mut params = Self {
            page: 1,
            limit: 10,
            search: String::new(),
            filters: BTreeMap::new(),
        };
        for (key, value) in form_urlencoded::parse(query.as_bytes()).into_owned() {
            match key.as_str() {
                "page" => params.page = value.parse().unwrap_or(1).max(1),
                "limit" => params.limit = value.parse().unwrap_or(10).max(1),
                "search" => params.search = value.to_lowercase(),
                _ => {
                    params.filters.insert(key, value);
                }
            }
        }
        params
    }

    fn matches(&self, record: &Value, searchable: &[&str]) -> bool {
        let text = |field: &str| match record.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let found = self.search.is_empty()
            || searchable
                .iter()
                .any(|field| text(*field).to_lowercase().contains(&self.search));
        found && self.filters.iter().all(|(key, value)| text(key.as_str()) == *value)
    }
}

/// One server-side page of `records`.
struct Page {
    items: Vec<Value>,
    total: usize,
    page: usize,
    total_pages: usize,
}

fn paginate(records: Vec<Value>, params: &Params) -> Page {
    let total = records.len();
    let total_pages = total.div_ceil(params.limit);
    let page = params.page.min(total_pages.max(1));
    let items = records
        .into_iter()
        .skip((page - 1) * params.limit)
        .take(params.limit)
        .collect();
    Page {
        items,
        total,
        page,
        total_pages,
    }
}

const CATEGORY_NAMES: [&str; 4] = ["General", "Announcements", "Hardware", "Marketplace"];

/// Scripted in-memory [`ApiClient`].
pub struct FixtureApi {
    store: Mutex<Store>,
    session: AuthResult,
    latency: Duration,
}

impl FixtureApi {
    pub fn empty() -> Self {
        Self {
            store: Mutex::new(Store::default()),
            session: AuthResult::admin("admin"),
            latency: Duration::ZERO,
        }
    }

    /// A backend populated with demo records.
    pub fn seeded() -> Self {
        let api = Self::empty();
        {
            let mut store = api.store();
            store.users = (1..=23u32)
                .map(|n| {
                    let role = match n {
                        1 => "admin",
                        n if n % 5 == 0 => "moderator",
                        _ => "user",
                    };
                    let status = if n % 7 == 0 { "banned" } else { "active" };
                    json!({
                        "id": n,
                        "username": format!("member{n:02}"),
                        "email": format!("member{n:02}@forum.test"),
                        "role": role,
                        "status": status,
                        "created_at": format!("2024-03-{n:02}"),
                    })
                })
                .collect();
            store.categories = CATEGORY_NAMES
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    json!({
                        "id": i + 1,
                        "name": name,
                        "slug": name.to_lowercase(),
                        "description": format!("{name} discussions"),
                        "post_count": (i + 1) * 3,
                    })
                })
                .collect();
            store.posts = (1..=12u32)
                .map(|n| {
                    let category = CATEGORY_NAMES[n as usize % CATEGORY_NAMES.len()];
                    let status = if n % 4 == 0 { "draft" } else { "published" };
                    json!({
                        "id": n.to_string(),
                        "title": format!("Thread #{n}"),
                        "username": format!("member{:02}", n % 23 + 1),
                        "category_name": category,
                        "status": status,
                        "comment_count": (n % 5).to_string(),
                    })
                })
                .collect();
            store.comments = (1..=30u32)
                .map(|n| {
                    json!({
                        "id": n,
                        "content": format!("Reply {n}: thanks for sharing, this thread answered most of my questions."),
                        "username": format!("member{:02}", n % 23 + 1),
                        "post_title": format!("Thread #{}", n % 12 + 1),
                        "created_at": null,
                    })
                })
                .collect();
            store.products = [
                ("Forum Mug", "7.50", 40),
                ("Sticker Pack", "3.00", 120),
                ("Hoodie", "39.90", 0),
                ("Cap", "14.00", 12),
                ("Keyboard Cable", "24.99", 8),
                ("Desk Mat", "19.90", 25),
                ("Enamel Pin", "5.00", 200),
                ("Tote Bag", "11.00", 3),
            ]
            .iter()
            .enumerate()
            .map(|(i, (name, price, stock))| {
                json!({
                    "id": i + 1,
                    "name": name,
                    "price": price,
                    "quantity": stock,
                    "category_name": "Marketplace",
                })
            })
            .collect();
        }
        api
    }

    pub fn with_session(mut self, session: AuthResult) -> Self {
        self.session = session;
        self
    }

    /// Delays every response, to make ordering effects visible.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn list(&self, collection: Collection, params: &Params) -> ApiEnvelope {
        let records: Vec<Value> = self
            .store()
            .records(collection)
            .iter()
            .filter(|r| params.matches(r, collection.searchable()))
            .cloned()
            .collect();
        match collection {
            Collection::Users => {
                let page = paginate(records, params);
                ApiEnvelope::ok(json!({
                    "items": page.items,
                    "total": page.total,
                    "page": page.page,
                    "total_pages": page.total_pages,
                }))
            }
            Collection::Posts => {
                let page = paginate(records, params);
                ApiEnvelope::ok(json!({
                    "posts": page.items,
                    "pagination": {
                        "total": page.total.to_string(),
                        "page": page.page.to_string(),
                        "total_pages": page.total_pages.to_string(),
                    }
                }))
            }
            Collection::Comments => ApiEnvelope {
                success: true,
                data: None,
                message: Value::Array(records),
            },
            Collection::Products => {
                let page = paginate(records, params);
                ApiEnvelope::ok(json!({
                    "data": {
                        "items": page.items,
                        "total": page.total,
                        "page": page.page,
                        "total_pages": page.total_pages,
                    }
                }))
            }
            Collection::Categories => ApiEnvelope::ok(Value::Array(records)),
        }
    }

    fn delete(&self, collection: Collection, body: Option<&Value>) -> ApiEnvelope {
        let id = match body.and_then(|b| b.get("id")) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return ApiEnvelope::failure("Missing record id"),
        };
        let mut store = self.store();
        let records = store.records_mut(collection);
        let before = records.len();
        records.retain(|r| match r.get("id") {
            Some(Value::String(s)) => *s != id,
            Some(Value::Number(n)) => n.to_string() != id,
            _ => true,
        });
        if records.len() == before {
            ApiEnvelope::failure("Record not found")
        } else {
            ApiEnvelope::ok(Value::Null)
        }
    }
}

#[async_trait]
impl ApiClient for FixtureApi {
    #[instrument(skip(self, options), fields(method = %options.method))]
    async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<ApiEnvelope, ConsoleError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let (path, query) = endpoint.split_once('?').unwrap_or((endpoint, ""));
        debug!(path, "Fixture request");

        if path == AUTH_CHECK_ENDPOINT {
            let session = serde_json::to_value(&self.session)
                .map_err(|e| ConsoleError::UnexpectedPayload(e.to_string()))?;
            return Ok(ApiEnvelope::ok(session));
        }
        if path == DashboardStats::ENDPOINT {
            return Ok(ApiEnvelope::ok(self.store().stats()));
        }
        let collection = Collection::from_path(path).ok_or_else(|| ConsoleError::Fetch {
            endpoint: endpoint.to_string(),
            reason: "HTTP 404".into(),
        })?;
        match options.method {
            Method::Get => Ok(self.list(collection, &Params::parse(query))),
            Method::Delete => Ok(self.delete(collection, options.body.as_ref())),
            Method::Post | Method::Put => Err(ConsoleError::Fetch {
                endpoint: endpoint.to_string(),
                reason: "HTTP 405".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn users_are_searched_and_paged_server_side() {
        let api = FixtureApi::seeded();
        let envelope = api
            .request("admin/users.php?page=3&limit=4&search=MEMBER1", RequestOptions::get())
            .await
            .unwrap();
        let payload = envelope.into_payload().unwrap();
        // member10..member19
        assert_eq!(payload["total"], json!(10));
        assert_eq!(payload["total_pages"], json!(3));
        assert_eq!(payload["page"], json!(3));
        assert_eq!(payload["items"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn filters_match_exact_values() {
        let api = FixtureApi::seeded();
        let envelope = api
            .request("admin/users.php?page=1&limit=10&role=moderator", RequestOptions::get())
            .await
            .unwrap();
        assert_eq!(envelope.into_payload().unwrap()["total"], json!(4));
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let api = FixtureApi::seeded();
        let delete = || RequestOptions::with_body(Method::Delete, json!({"id": "3"}));

        assert!(api.request("admin/products.php", delete()).await.unwrap().success);
        let again = api.request("admin/products.php", delete()).await.unwrap();
        assert_eq!(again.message_text(), "Record not found");
    }

    #[tokio::test]
    async fn unknown_endpoint_is_a_fetch_error() {
        let api = FixtureApi::empty();
        assert!(matches!(
            api.request("admin/nope.php", RequestOptions::get()).await,
            Err(ConsoleError::Fetch { .. })
        ));
    }
}
