//! Metadata sub-resource addressing
//!
//! Metadata is never a standalone entity: it lives at
//! `{parent_collection}/{parent_id}/metadata` and, for single keys, at
//! `.../metadata/{key}`. Whole-map calls use a plural `metadata` envelope,
//! single-key calls a singular `meta` envelope.

use super::base::{decode, require};
use super::registry::{join_path, ResourceDef};
use super::Query;
use crate::error::{Error, Result};
use crate::openstack::client::Session;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Metadata map of a volume or snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Full map (whole-map calls)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    /// Single entry (calls addressed to one key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// Look a key up in whichever envelope the server used
    pub fn get(&self, key: &str) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.get(key))
            .or_else(|| self.metadata.as_ref().and_then(|m| m.get(key)))
            .map(|s| s.as_str())
    }
}

/// Path of the metadata collection, or of one key within it
pub fn metadata_path(parent: &ResourceDef, parent_id: &str, key: Option<&str>) -> Result<String> {
    require(&format!("{} id", parent.display_name), parent_id)?;
    let base = parent.render_path(&[])?;
    match key {
        Some(key) => {
            require("metadata key", key)?;
            Ok(join_path(&base, &[parent_id, "metadata", key]))
        }
        None => Ok(join_path(&base, &[parent_id, "metadata"])),
    }
}

/// Build the PUT body for an update
///
/// With a key, the map must hold exactly that key; the body is then
/// `{"meta": {key: value}}`. Without one it is `{"metadata": map}`.
pub fn update_body(metadata: &BTreeMap<String, String>, key: Option<&str>) -> Result<Value> {
    match key {
        Some(key) => {
            if metadata.len() != 1 || !metadata.contains_key(key) {
                let found: Vec<&str> = metadata.keys().map(|k| k.as_str()).collect();
                return Err(Error::invalid(format!(
                    "single-key metadata update for '{}' must carry exactly that key (got: [{}])",
                    key,
                    found.join(", ")
                )));
            }
            Ok(serde_json::json!({ "meta": metadata }))
        }
        None => Ok(serde_json::json!({ "metadata": metadata })),
    }
}

/// GET the whole map, or a single key
pub async fn get_metadata(
    session: &Session,
    parent: &ResourceDef,
    parent_id: &str,
    key: Option<&str>,
) -> Result<Metadata> {
    let url = session.url(parent.scope, &metadata_path(parent, parent_id, key)?);
    let body = session.get(&url, &Query::default()).await?;
    decode(body)
}

/// POST a map of new entries
pub async fn create_metadata(
    session: &Session,
    parent: &ResourceDef,
    parent_id: &str,
    metadata: &BTreeMap<String, String>,
) -> Result<Metadata> {
    let url = session.url(parent.scope, &metadata_path(parent, parent_id, None)?);
    let body = serde_json::json!({ "metadata": metadata });
    tracing::info!("create {} metadata on {}", parent.name, parent_id);

    let response = session.post(&url, Some(&body)).await?;
    decode(response)
}

/// PUT the whole map, or a single key
pub async fn update_metadata(
    session: &Session,
    parent: &ResourceDef,
    parent_id: &str,
    metadata: &BTreeMap<String, String>,
    key: Option<&str>,
) -> Result<Metadata> {
    let path = metadata_path(parent, parent_id, key)?;
    let body = update_body(metadata, key)?;
    let url = session.url(parent.scope, &path);
    tracing::info!("update {} metadata on {}", parent.name, parent_id);

    let response = session.put(&url, Some(&body)).await?;
    decode(response)
}

/// DELETE one key
pub async fn delete_metadata(
    session: &Session,
    parent: &ResourceDef,
    parent_id: &str,
    key: &str,
) -> Result<()> {
    let url = session.url(parent.scope, &metadata_path(parent, parent_id, Some(key))?);
    tracing::info!("delete {} metadata key {} on {}", parent.name, key, parent_id);

    session.delete(&url).await?;
    Ok(())
}
