//! # Entity Models
//!
//! Records listed by the console. Each implements
//! [`ResourceEntity`](console_framework::ResourceEntity), so one generic
//! [`ResourceManager`](console_framework::ResourceManager) lists, searches and
//! paginates all of them.
//!
//! The endpoints are loose about scalar types: ids and counts arrive as
//! numbers or numeric strings, prices as strings, optional fields as `null`.
//! The `flexible_*` deserializers below absorb that once for every model.

pub mod category;
pub mod comment;
pub mod dashboard;
pub mod post;
pub mod product;
pub mod user;

pub use category::Category;
pub use comment::Comment;
pub use dashboard::DashboardStats;
pub use post::Post;
pub use product::Product;
pub use user::User;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// An id sent as a number or a string.
pub(crate) fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("invalid id: {other}"))),
    }
}

/// A count sent as a number, a numeric string or `null` (read as 0).
pub(crate) fn flexible_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| de::Error::custom(format!("invalid count: {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid count: {s}"))),
        other => Err(de::Error::custom(format!("invalid count: {other}"))),
    }
}

/// An amount sent as a number, a numeric string or `null` (read as 0).
pub(crate) fn flexible_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom(format!("invalid amount: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid amount: {s}"))),
        other => Err(de::Error::custom(format!("invalid amount: {other}"))),
    }
}

/// `null` read as an empty string.
pub(crate) fn flexible_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Shortens long text for a table cell.
pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
