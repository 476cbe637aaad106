//! Core types - pure abstractions shared across the codebase.

pub mod ident;
mod link;
mod scope;
mod url;

pub use link::{LinkKind, split_path_fragment};
pub use scope::{Priority, Scope, section_scope_name};
pub use url::{Route, UrlPath};
