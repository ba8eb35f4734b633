//! URL handling module for Site-Clone
//!
//! This module provides the deterministic naming rules of a clone (root folder
//! name, page slugs), anchor classification and local navigation rewriting, and
//! resolution of resource references against their page.

mod domain;
mod href;
mod slug;

// Re-export main functions
pub use domain::folder_name;
pub use href::{classify_href, local_nav_href, resolve_url, strip_leading_slash, HrefKind};
pub use slug::{slug_for, SlugRegistry, INDEX_SLUG};
