//! Block storage proxy
//!
//! `BlockStore` is the entry point callers use: one method per operation,
//! each a thin composition of the generic resource requests in
//! [`crate::resource`] with the definition for that resource kind.
//!
//! # Example
//!
//! ```ignore
//! let session = Session::new("https://evs.example.com", "project-id", Some(token))?;
//! let store = BlockStore::new(session);
//!
//! let mut volumes = store.volumes(true, Query::new().with("status", "available"))?;
//! while let Some(volume) = volumes.try_next().await? {
//!     println!("{:?}", volume.name);
//! }
//! ```

use super::extension::Extension;
use super::snapshot::{Snapshot, SnapshotMetadata, SnapshotRollback};
use super::volume::{QuotaSet, Volume, VolumeAction, VolumeMetadata};
use super::volume_type::VolumeType;
use crate::error::Result;
use crate::openstack::client::Session;
use crate::resource::base::{self, require};
use crate::resource::registry::{
    EXTENSION, QUOTA_SET, SNAPSHOT, SNAPSHOT_DETAIL, SNAPSHOT_ROLLBACK, VERSION, VERSION_V2,
    VOLUME, VOLUME_DETAIL, VOLUME_TYPE,
};
use crate::resource::{list, metadata, Query, ResourceStream};
use crate::version::Version;
use std::collections::BTreeMap;

/// Block storage v2 API
#[derive(Debug, Clone)]
pub struct BlockStore {
    session: Session,
}

impl BlockStore {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Volumes
    // =========================================================================

    pub async fn get_volume(&self, volume_id: &str) -> Result<Volume> {
        base::get(&self.session, &VOLUME, volume_id).await
    }

    /// List volumes; `details` selects `/volumes/detail`
    pub fn volumes(&self, details: bool, query: Query) -> Result<ResourceStream<Volume>> {
        let def = if details { &VOLUME_DETAIL } else { &VOLUME };
        list(&self.session, def, query)
    }

    pub async fn create_volume(&self, volume: &Volume) -> Result<Volume> {
        base::create(&self.session, &VOLUME, volume).await
    }

    pub async fn update_volume(&self, volume_id: &str, volume: &Volume) -> Result<Volume> {
        base::update(&self.session, &VOLUME, volume_id, volume).await
    }

    pub async fn delete_volume(&self, volume_id: &str, ignore_missing: bool) -> Result<()> {
        base::delete(&self.session, &VOLUME, volume_id, ignore_missing).await
    }

    /// Mark a volume bootable or not
    pub async fn set_volume_bootable(&self, volume_id: &str, bootable: bool) -> Result<()> {
        self.volume_action(volume_id, &VolumeAction::SetBootable { bootable })
            .await
    }

    /// Set or clear the read-only flag of a volume
    pub async fn set_volume_readonly(&self, volume_id: &str, readonly: bool) -> Result<()> {
        self.volume_action(volume_id, &VolumeAction::UpdateReadonlyFlag { readonly })
            .await
    }

    async fn volume_action(&self, volume_id: &str, action: &VolumeAction) -> Result<()> {
        base::post_action(&self.session, &VOLUME, volume_id, "action", action).await?;
        Ok(())
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    pub async fn get_snapshot(&self, snapshot_id: &str) -> Result<Snapshot> {
        base::get(&self.session, &SNAPSHOT, snapshot_id).await
    }

    /// List snapshots; `details` selects `/snapshots/detail`
    pub fn snapshots(&self, details: bool, query: Query) -> Result<ResourceStream<Snapshot>> {
        let def = if details { &SNAPSHOT_DETAIL } else { &SNAPSHOT };
        list(&self.session, def, query)
    }

    pub async fn create_snapshot(&self, snapshot: &Snapshot) -> Result<Snapshot> {
        base::create(&self.session, &SNAPSHOT, snapshot).await
    }

    pub async fn update_snapshot(&self, snapshot_id: &str, snapshot: &Snapshot) -> Result<Snapshot> {
        base::update(&self.session, &SNAPSHOT, snapshot_id, snapshot).await
    }

    pub async fn delete_snapshot(&self, snapshot_id: &str, ignore_missing: bool) -> Result<()> {
        base::delete(&self.session, &SNAPSHOT, snapshot_id, ignore_missing).await
    }

    /// Roll a volume back to the state captured by a snapshot
    ///
    /// `volume_name` renames the volume as part of the rollback when given.
    pub async fn rollback_snapshot(
        &self,
        volume_id: &str,
        volume_name: Option<&str>,
        snapshot_id: &str,
    ) -> Result<SnapshotRollback> {
        require("volume id", volume_id)?;
        let rollback = SnapshotRollback {
            name: volume_name.map(str::to_string),
            volume_id: Some(volume_id.to_string()),
            ..Default::default()
        };
        let body = base::request_body(&SNAPSHOT_ROLLBACK, &rollback)?;
        let response =
            base::post_action(&self.session, &SNAPSHOT_ROLLBACK, snapshot_id, "rollback", &body)
                .await?;
        base::translate(&SNAPSHOT_ROLLBACK, response)
    }

    // =========================================================================
    // Volume types
    // =========================================================================

    pub async fn get_type(&self, type_id: &str) -> Result<VolumeType> {
        base::get(&self.session, &VOLUME_TYPE, type_id).await
    }

    pub fn types(&self) -> Result<ResourceStream<VolumeType>> {
        list(&self.session, &VOLUME_TYPE, Query::new())
    }

    pub async fn create_type(&self, volume_type: &VolumeType) -> Result<VolumeType> {
        base::create(&self.session, &VOLUME_TYPE, volume_type).await
    }

    pub async fn update_type(&self, type_id: &str, volume_type: &VolumeType) -> Result<VolumeType> {
        base::update(&self.session, &VOLUME_TYPE, type_id, volume_type).await
    }

    pub async fn delete_type(&self, type_id: &str, ignore_missing: bool) -> Result<()> {
        base::delete(&self.session, &VOLUME_TYPE, type_id, ignore_missing).await
    }

    // =========================================================================
    // Quota
    // =========================================================================

    /// Quotas and usage of a tenant
    pub async fn get_quota_set(&self, tenant_id: &str) -> Result<QuotaSet> {
        require("tenant id", tenant_id)?;
        let mut quota: QuotaSet =
            base::get_by_params(&self.session, &QUOTA_SET, &[("tenant_id", tenant_id)]).await?;
        quota.tenant_id = Some(tenant_id.to_string());
        Ok(quota)
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    pub async fn get_volume_metadata(
        &self,
        volume_id: &str,
        key: Option<&str>,
    ) -> Result<VolumeMetadata> {
        metadata::get_metadata(&self.session, &VOLUME, volume_id, key).await
    }

    pub async fn create_volume_metadata(
        &self,
        volume_id: &str,
        entries: &BTreeMap<String, String>,
    ) -> Result<VolumeMetadata> {
        metadata::create_metadata(&self.session, &VOLUME, volume_id, entries).await
    }

    /// Replace the whole map, or with `key` only that entry
    pub async fn update_volume_metadata(
        &self,
        volume_id: &str,
        entries: &BTreeMap<String, String>,
        key: Option<&str>,
    ) -> Result<VolumeMetadata> {
        metadata::update_metadata(&self.session, &VOLUME, volume_id, entries, key).await
    }

    pub async fn delete_volume_metadata(&self, volume_id: &str, key: &str) -> Result<()> {
        metadata::delete_metadata(&self.session, &VOLUME, volume_id, key).await
    }

    pub async fn get_snapshot_metadata(
        &self,
        snapshot_id: &str,
        key: Option<&str>,
    ) -> Result<SnapshotMetadata> {
        metadata::get_metadata(&self.session, &SNAPSHOT, snapshot_id, key).await
    }

    pub async fn create_snapshot_metadata(
        &self,
        snapshot_id: &str,
        entries: &BTreeMap<String, String>,
    ) -> Result<SnapshotMetadata> {
        metadata::create_metadata(&self.session, &SNAPSHOT, snapshot_id, entries).await
    }

    pub async fn update_snapshot_metadata(
        &self,
        snapshot_id: &str,
        entries: &BTreeMap<String, String>,
        key: Option<&str>,
    ) -> Result<SnapshotMetadata> {
        metadata::update_metadata(&self.session, &SNAPSHOT, snapshot_id, entries, key).await
    }

    pub async fn delete_snapshot_metadata(&self, snapshot_id: &str, key: &str) -> Result<()> {
        metadata::delete_metadata(&self.session, &SNAPSHOT, snapshot_id, key).await
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    pub fn extensions(&self) -> Result<ResourceStream<Extension>> {
        list(&self.session, &EXTENSION, Query::new())
    }

    /// API versions from the service root, or from `/v2` when `v2` is set
    pub fn versions(&self, v2: bool) -> Result<ResourceStream<Version>> {
        let def = if v2 { &VERSION_V2 } else { &VERSION };
        list(&self.session, def, Query::new())
    }
}
