//! # ResourceEntity Trait
//!
//! The contract every listed record type (User, Post, Comment, Product,
//! Category, ...) implements to be managed by the generic
//! [`ResourceManager`](crate::ResourceManager).
//!
//! The manager's load/render/paginate loop is written once; an entity only
//! says where it lives, how its payload is shaped and how a record renders.
//!
//! # Adapters
//! [`ResourceEntity::normalize`] is required on purpose. Every entity states
//! its payload shape explicitly, usually by delegating to
//! [`Listing::from_payload`] with its collection key.

use crate::dom::Row;
use crate::error::ConsoleError;
use crate::listing::{ListQuery, Listing};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub trait ResourceEntity: DeserializeOwned + Send + Sync + 'static {
    /// Section id this entity is listed under (e.g. `"users"`).
    const SECTION: &'static str;

    /// Endpoint of the list request, relative to the API base.
    const ENDPOINT: &'static str;

    /// Converts the raw envelope payload into a canonical listing.
    fn normalize(payload: Value, query: &ListQuery) -> Result<Listing<Value>, ConsoleError>;

    /// Identifier used for row keys and record-level requests.
    fn record_id(&self) -> String;

    /// Cells of this record's table row.
    fn render_row(&self) -> Row;
}
