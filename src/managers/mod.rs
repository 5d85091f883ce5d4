//! # Section Modules
//!
//! Every listed section is a [`ResourceManager`] over its model; only the
//! dashboard needs a module of its own. [`register_all`] wires both into a
//! registry.

pub mod dashboard;

pub use dashboard::{DashboardFactory, DashboardModule, DASHBOARD};

use crate::model::{Category, Comment, Post, Product, User};
use console_framework::{ManagerFactory, ModuleRegistry, ResourceEntity};
use std::sync::Arc;

/// Listed sections, in navigation order.
pub const RESOURCE_SECTIONS: [&str; 5] = [
    User::SECTION,
    Post::SECTION,
    Comment::SECTION,
    Product::SECTION,
    Category::SECTION,
];

/// Registers the dashboard and one resource manager per model.
pub fn register_all(registry: &ModuleRegistry) {
    registry.register(DASHBOARD, Arc::new(DashboardFactory));
    registry.register(User::SECTION, Arc::new(ManagerFactory::<User>::new()));
    registry.register(Post::SECTION, Arc::new(ManagerFactory::<Post>::new()));
    registry.register(Comment::SECTION, Arc::new(ManagerFactory::<Comment>::new()));
    registry.register(Product::SECTION, Arc::new(ManagerFactory::<Product>::new()));
    registry.register(Category::SECTION, Arc::new(ManagerFactory::<Category>::new()));
}
