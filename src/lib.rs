//! Client for the OpenStack Cinder v2 block storage API, as exposed by
//! Huawei Elastic Volume Service (EVS)
//!
//! # Module Structure
//!
//! - `openstack` - HTTP transport and the project-scoped [`Session`]
//! - `resource` - Resource definitions, generic requests, pagination, metadata
//! - `v2` - Typed records and the [`BlockStore`] proxy
//! - `version` - API version discovery
//! - `config` - Persistent settings for the `bsctl` binary
//!
//! # Example
//!
//! ```ignore
//! use block_store::{BlockStore, Session};
//!
//! let session = Session::new(endpoint, project_id, Some(token))?;
//! let store = BlockStore::new(session);
//! let volume = store.get_volume("591ac654-26d8-41be-bb77-4f90699d2d41").await?;
//! ```

pub mod config;
pub mod error;
pub mod openstack;
pub mod resource;
pub mod v2;
pub mod version;

/// Version injected at compile time via BSCTL_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("BSCTL_VERSION") {
    Some(v) => v,
    None => "dev",
};

pub use error::{Error, Result};
pub use openstack::client::Session;
pub use openstack::http::ClientOptions;
pub use resource::Query;
pub use v2::BlockStore;
