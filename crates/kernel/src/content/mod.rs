//! Content management module.
//!
//! This module provides:
//! - ContentTypeRegistry: Manages content type definitions from plugins
//! - ItemService: CRUD operations for content items
//! - MetaStorage: Per-item attribute storage lent to plugins
//! - FilterPipeline: Text format filtering and input sanitization

mod filter;
mod item_service;
mod meta;
mod type_registry;

pub use filter::{FilterPipeline, PlainTextSanitizer, TextFilter, html_escape};
pub use item_service::{ItemService, NewItem, UpdateItem};
pub use meta::MetaStorage;
pub use type_registry::ContentTypeRegistry;
