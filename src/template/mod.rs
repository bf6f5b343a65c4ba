//! Template system for data-access wiring
//!
//! Templates are configuration trees whose keys and string values contain markers
//! such as `%crate_prefix%` or `%res_name%`. Expanding a template replaces every
//! marker with a value taken from the crate, or from one of its resources.
//!
//! # Example
//!
//! ```text
//! [resource_finders."%res_prefix%::projection.standard::view_store::finder"]
//! class = "finder::elasticsearch::ProjectionFinder"
//! settings = { type = "%vendor%-%package%-%res_name%-standard" }
//!
//! # expanded for resource `order` of crate Acme/Shop:
//! [finders."order::projection.standard::view_store::finder"]
//! class = "finder::elasticsearch::ProjectionFinder"
//! settings = { type = "acme-shop-order-standard" }
//! ```

mod catalog;
pub mod markers;
mod resolver;

pub use catalog::{Catalog, CatalogError, Family, Scope};
pub use markers::{replace_markers, MarkerSet};
pub use resolver::{substitute_tree, Expander};
