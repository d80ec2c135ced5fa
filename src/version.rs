//! API version discovery
//!
//! Versions are listed from the service root (`/`) or the v2 root (`/v2`),
//! outside any project scope.

use crate::resource::Link;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One API version exposed by the endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Version {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// CURRENT, SUPPORTED or DEPRECATED
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    /// Minimum microversion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    /// Maximum microversion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, rename = "media-types", skip_serializing_if = "Option::is_none")]
    pub media_types: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
