//! Volumes, quota sets and volume actions

use crate::resource::coerce::{bool_str, int_str, parse_timestamp};
use crate::resource::Link;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Volume metadata sub-resource
pub type VolumeMetadata = crate::resource::Metadata;

/// A block storage volume (EVS disk)
///
/// The same record is returned by `/volumes/{id}`, `/volumes` and
/// `/volumes/detail`; fields the summary listing omits are `None`.
/// Build one with `..Default::default()` to describe a volume to create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    /// Create from an existing volume (same size as the source)
    #[serde(default, rename = "source_volid", skip_serializing_if = "Option::is_none")]
    pub source_volume_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Create from an existing snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    /// Size in GB
    #[serde(default, with = "int_str", skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Image to create a bootable volume from
    #[serde(default, rename = "imageRef", skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    #[serde(default, rename = "bootable", with = "bool_str", skip_serializing_if = "Option::is_none")]
    pub is_bootable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    /// creating, available, attaching, in-use, deleting, error, ...
    /// Not validated client side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<VolumeAttachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, rename = "os-vol-tenant-attr:tenant_id", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_image_metadata: Option<Map<String, Value>>,
    /// Current back-end
    #[serde(default, rename = "os-vol-host-attr:host", skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, rename = "encrypted", with = "bool_str", skip_serializing_if = "Option::is_none")]
    pub is_encrypted: Option<bool>,
    #[serde(
        default,
        rename = "os-volume-replication:extended_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub extended_replication_status: Option<String>,
    #[serde(
        default,
        rename = "os-volume-replication:driver_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub replication_driver_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_status: Option<String>,
    /// `None` when no migration is in progress
    #[serde(default, rename = "os-vol-mig-status-attr:migstat", skip_serializing_if = "Option::is_none")]
    pub migration_status: Option<String>,
    #[serde(default, rename = "os-vol-mig-status-attr:name_id", skip_serializing_if = "Option::is_none")]
    pub migration_id: Option<String>,
    #[serde(default, rename = "consistencygroup_id", skip_serializing_if = "Option::is_none")]
    pub consistency_group_id: Option<String>,
    #[serde(default, with = "bool_str", skip_serializing_if = "Option::is_none")]
    pub shareable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, rename = "multiattach", with = "bool_str", skip_serializing_if = "Option::is_none")]
    pub multi_attach: Option<bool>,
    /// Fields this client does not declare
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Volume {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }
}

/// One attachment of a volume to a server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Usage of one quota class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_use: Option<i64>,
    /// `-1` means unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Quotas and usage of a tenant, split by back-end class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaSet {
    /// Tenant the quota was requested for (taken from the request URI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<QuotaUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshots: Option<QuotaUsage>,
    /// Total GB of volumes and snapshots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gigabytes: Option<QuotaUsage>,
    #[serde(default, rename = "volumes_SATA", skip_serializing_if = "Option::is_none")]
    pub volumes_sata: Option<QuotaUsage>,
    #[serde(default, rename = "volumes_SSD", skip_serializing_if = "Option::is_none")]
    pub volumes_ssd: Option<QuotaUsage>,
    #[serde(default, rename = "volumes_SAS", skip_serializing_if = "Option::is_none")]
    pub volumes_sas: Option<QuotaUsage>,
    #[serde(default, rename = "snapshots_SATA", skip_serializing_if = "Option::is_none")]
    pub snapshots_sata: Option<QuotaUsage>,
    #[serde(default, rename = "snapshots_SSD", skip_serializing_if = "Option::is_none")]
    pub snapshots_ssd: Option<QuotaUsage>,
    #[serde(default, rename = "snapshots_SAS", skip_serializing_if = "Option::is_none")]
    pub snapshots_sas: Option<QuotaUsage>,
    #[serde(default, rename = "gigabytes_SATA", skip_serializing_if = "Option::is_none")]
    pub gigabytes_sata: Option<QuotaUsage>,
    #[serde(default, rename = "gigabytes_SSD", skip_serializing_if = "Option::is_none")]
    pub gigabytes_ssd: Option<QuotaUsage>,
    #[serde(default, rename = "gigabytes_SAS", skip_serializing_if = "Option::is_none")]
    pub gigabytes_sas: Option<QuotaUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backups: Option<QuotaUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_gigabytes: Option<QuotaUsage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Command sent to `/volumes/{id}/action`
///
/// Serializes to a single-key envelope, e.g.
/// `{"os-set_bootable": {"bootable": true}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VolumeAction {
    #[serde(rename = "os-set_bootable")]
    SetBootable { bootable: bool },
    #[serde(rename = "os-update_readonly_flag")]
    UpdateReadonlyFlag { readonly: bool },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_volume_wire_renames() {
        let volume: Volume = serde_json::from_value(json!({
            "id": "591ac654-26d8-41be-bb77-4f90699d2d41",
            "size": 40,
            "bootable": "false",
            "encrypted": false,
            "multiattach": true,
            "os-vol-host-attr:host": "az1.dc1#SSD",
            "os-vol-tenant-attr:tenant_id": "tenant-1",
            "source_volid": "src",
            "imageRef": "img",
            "metadata": {"quantityGB": "40"},
            "links": [{"href": "https://evs/v2/p/volumes/x", "rel": "self"}]
        }))
        .unwrap();

        assert!(volume.created().is_none());
        assert_eq!(volume.size, Some(40));
        assert_eq!(volume.is_bootable, Some(false));
        assert_eq!(volume.is_encrypted, Some(false));
        assert_eq!(volume.multi_attach, Some(true));
        assert_eq!(volume.host.as_deref(), Some("az1.dc1#SSD"));
        assert_eq!(volume.project_id.as_deref(), Some("tenant-1"));
        assert_eq!(volume.source_volume_id.as_deref(), Some("src"));
        assert_eq!(volume.image_id.as_deref(), Some("img"));
        assert_eq!(volume.metadata.unwrap()["quantityGB"], "40");
        assert_eq!(volume.links.unwrap()[0].rel.as_deref(), Some("self"));
    }

    #[test]
    fn test_volume_retains_unknown_fields() {
        let volume: Volume = serde_json::from_value(json!({
            "id": "v1",
            "dedicated_storage_id": "ds-1",
            "wwn": "688860300000d136fa16f48f05992360",
            "updated_at": "2016-02-03T02:19:29.895237"
        }))
        .unwrap();
        assert_eq!(volume.updated().unwrap().timestamp(), 1454465969);
        assert_eq!(volume.extra["dedicated_storage_id"], "ds-1");
        assert_eq!(volume.extra.len(), 2);
        assert!(volume.name.is_none());
    }

    #[test]
    fn test_create_body_only_carries_set_fields() {
        let volume = Volume {
            name: Some("vol-1".to_string()),
            size: Some(1),
            is_bootable: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&volume).unwrap(),
            json!({"name": "vol-1", "size": 1, "bootable": true})
        );
    }

    #[test]
    fn test_volume_action_envelopes() {
        assert_eq!(
            serde_json::to_value(VolumeAction::SetBootable { bootable: true }).unwrap(),
            json!({"os-set_bootable": {"bootable": true}})
        );
        assert_eq!(
            serde_json::to_value(VolumeAction::UpdateReadonlyFlag { readonly: false }).unwrap(),
            json!({"os-update_readonly_flag": {"readonly": false}})
        );
    }

    #[test]
    fn test_quota_set_classes() {
        let quota: QuotaSet = serde_json::from_value(json!({
            "id": "tenant-id",
            "gigabytes": {"in_use": 2792, "limit": -1, "reserved": 0},
            "gigabytes_SSD": {"in_use": 1085, "limit": -1, "reserved": 0},
            "snapshots_SAS": {"in_use": 0, "limit": -1, "reserved": 0},
            "volumes_SATA": {"in_use": 8, "limit": -1, "reserved": 0}
        }))
        .unwrap();
        assert_eq!(quota.gigabytes.unwrap().in_use, Some(2792));
        assert_eq!(quota.gigabytes_ssd.unwrap().in_use, Some(1085));
        assert_eq!(quota.snapshots_sas.unwrap().limit, Some(-1));
        assert_eq!(quota.volumes_sata.unwrap().in_use, Some(8));
        assert!(quota.tenant_id.is_none());
    }
}
