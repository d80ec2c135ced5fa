//! Resource Registry - static resource definitions
//!
//! Each block storage resource kind is described by a [`ResourceDef`]: where
//! its collection lives, which JSON envelope keys wrap it, which list query
//! parameters the server accepts and whether listing is paginated. The
//! generic calls in [`super::base`] consult nothing else.

use crate::error::{Error, Result};
use super::query::Query;

/// Which root a resource path hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathScope {
    /// `{endpoint}/v2/{project_id}{base_path}`
    Project,
    /// `{endpoint}{base_path}`
    Root,
}

/// Query parameters accepted by every paginated collection
pub const PAGINATION_PARAMS: &[&str] = &["limit", "marker", "sort_key", "sort_dir"];

/// Resource definition
#[derive(Debug, Clone, Copy)]
pub struct ResourceDef {
    /// Registry key
    pub name: &'static str,
    pub display_name: &'static str,
    /// Collection path, may contain `{param}` URI placeholders and a fixed query
    pub base_path: &'static str,
    /// Envelope for create/update bodies and singular responses
    pub resource_key: Option<&'static str>,
    /// Envelope for list responses
    pub resources_key: Option<&'static str>,
    /// Accepted list query parameters (pagination params are implied when paginated)
    pub query_params: &'static [&'static str],
    pub paginated: bool,
    pub scope: PathScope,
}

impl ResourceDef {
    const fn project(name: &'static str, display_name: &'static str, base_path: &'static str) -> Self {
        Self {
            name,
            display_name,
            base_path,
            resource_key: None,
            resources_key: None,
            query_params: &[],
            paginated: false,
            scope: PathScope::Project,
        }
    }

    const fn keys(mut self, resource_key: &'static str, resources_key: &'static str) -> Self {
        self.resource_key = Some(resource_key);
        self.resources_key = Some(resources_key);
        self
    }

    const fn paginated(mut self, query_params: &'static [&'static str]) -> Self {
        self.query_params = query_params;
        self.paginated = true;
        self
    }

    const fn root(mut self) -> Self {
        self.scope = PathScope::Root;
        self
    }

    /// Same schema served from a different collection path
    pub const fn at(mut self, name: &'static str, base_path: &'static str) -> Self {
        self.name = name;
        self.base_path = base_path;
        self
    }

    /// Every list query parameter the collection accepts
    pub fn accepted_query_params(&self) -> Vec<&'static str> {
        let pagination: &[&'static str] = if self.paginated { PAGINATION_PARAMS } else { &[] };
        self.query_params.iter().chain(pagination).copied().collect()
    }

    /// Check whether a list query parameter is accepted
    pub fn accepts_query(&self, key: &str) -> bool {
        self.query_params.contains(&key) || (self.paginated && PAGINATION_PARAMS.contains(&key))
    }

    /// Reject any query parameter the collection does not declare
    pub fn validate_query(&self, query: &Query) -> Result<()> {
        let rejected: Vec<&str> = query.keys().filter(|k| !self.accepts_query(k)).collect();
        if rejected.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid(format!(
                "unsupported query parameter(s) for {}: {}",
                self.display_name,
                rejected.join(", ")
            )))
        }
    }

    /// Render the base path, substituting `{param}` placeholders
    pub fn render_path(&self, uri_params: &[(&str, &str)]) -> Result<String> {
        let mut path = self.base_path.to_string();
        for (name, value) in uri_params {
            if value.trim().is_empty() {
                return Err(Error::invalid(format!("{} is required", name)));
            }
            path = path.replace(&format!("{{{}}}", name), &urlencoding::encode(value));
        }

        if let (Some(start), Some(end)) = (path.find('{'), path.find('}')) {
            if start < end {
                return Err(Error::invalid(format!(
                    "missing URI parameter '{}' for {}",
                    &path[start + 1..end],
                    self.display_name
                )));
            }
        }

        Ok(path)
    }
}

/// Append path segments to a rendered path, keeping any fixed query suffix last
pub fn join_path(path: &str, segments: &[&str]) -> String {
    let (route, query) = match path.split_once('?') {
        Some((route, query)) => (route, Some(query)),
        None => (path, None),
    };

    let mut joined = route.trim_end_matches('/').to_string();
    for segment in segments {
        joined.push('/');
        joined.push_str(&urlencoding::encode(segment));
    }

    match query {
        Some(query) => format!("{}?{}", joined, query),
        None => joined,
    }
}

// =============================================================================
// Definitions
// =============================================================================

pub const VOLUME: ResourceDef = ResourceDef::project("volume", "Volumes", "/volumes")
    .keys("volume", "volumes")
    .paginated(&["all_tenants", "name", "status", "project_id"]);

pub const VOLUME_DETAIL: ResourceDef = VOLUME.at("volume-detail", "/volumes/detail");

pub const SNAPSHOT: ResourceDef = ResourceDef::project("snapshot", "Snapshots", "/snapshots")
    .keys("snapshot", "snapshots")
    .paginated(&["all_tenants", "name", "status", "volume_id"]);

pub const SNAPSHOT_DETAIL: ResourceDef = SNAPSHOT.at("snapshot-detail", "/snapshots/detail");

pub const SNAPSHOT_ROLLBACK: ResourceDef =
    ResourceDef::project("snapshot-rollback", "Snapshot Rollback", "/os-vendor-snapshots")
        .keys("rollback", "rollbacks");

pub const VOLUME_TYPE: ResourceDef =
    ResourceDef::project("type", "Volume Types", "/types").keys("volume_type", "volume_types");

pub const QUOTA_SET: ResourceDef = ResourceDef {
    resource_key: Some("quota_set"),
    ..ResourceDef::project("quota-set", "Quota Sets", "/os-quota-sets/{tenant_id}?usage=True")
};

pub const EXTENSION: ResourceDef =
    ResourceDef::project("extension", "Extensions", "/extensions").keys("extension", "extensions");

pub const VERSION: ResourceDef =
    ResourceDef::project("version", "API Versions", "/").keys("version", "versions").root();

pub const VERSION_V2: ResourceDef = VERSION.at("version-v2", "/v2");

/// Every registered definition
static REGISTRY: &[&ResourceDef] = &[
    &VOLUME,
    &VOLUME_DETAIL,
    &SNAPSHOT,
    &SNAPSHOT_DETAIL,
    &SNAPSHOT_ROLLBACK,
    &VOLUME_TYPE,
    &QUOTA_SET,
    &EXTENSION,
    &VERSION,
    &VERSION_V2,
];

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    REGISTRY.iter().copied().find(|def| def.name == key)
}

/// Get all resource keys, in registration order
pub fn get_all_resource_keys() -> Vec<&'static str> {
    REGISTRY.iter().map(|def| def.name).collect()
}
