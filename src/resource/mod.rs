//! Resource abstraction layer
//!
//! This module provides a data-driven approach to block storage resources.
//! Every resource kind is a static [`ResourceDef`] consulted by one set of
//! generic request/translation routines, so adding a resource kind means
//! adding a definition and a serde record, not new request code.
//!
//! # Architecture
//!
//! - [`registry`] - Static resource definitions and lookup
//! - [`base`] - Generic get/create/update/delete and action requests
//! - [`pager`] - Lazy list streams with next-link/marker continuation
//! - [`metadata`] - `{collection}/{id}/metadata[/{key}]` addressing
//! - [`coerce`] - Wire value coercions used by the typed records
//!
//! # Example
//!
//! ```ignore
//! use block_store::resource::{base, registry::VOLUME};
//! use block_store::v2::volume::Volume;
//!
//! async fn show(session: &Session) -> block_store::Result<Volume> {
//!     base::get(session, &VOLUME, "591ac654-26d8-41be-bb77-4f90699d2d41").await
//! }
//! ```

pub mod base;
pub mod coerce;
pub mod metadata;
pub mod pager;
mod query;
pub mod registry;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use metadata::Metadata;
pub use pager::{list, ResourceStream};
pub use query::Query;
pub use registry::{get_all_resource_keys, get_resource, PathScope, ResourceDef};

/// Hypermedia link attached to most resources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
