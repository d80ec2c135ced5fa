//! Block storage v2 API
//!
//! Typed records for each resource kind and the [`BlockStore`] proxy that
//! issues the requests.
//!
//! # Module Structure
//!
//! - `volume` - Volumes, attachments, quota sets and volume actions
//! - `snapshot` - Snapshots and snapshot rollback
//! - `volume_type` - Volume types
//! - `extension` - API extensions
//! - `proxy` - `BlockStore`, one method per operation

pub mod extension;
pub mod proxy;
pub mod snapshot;
pub mod volume;
pub mod volume_type;

pub use extension::Extension;
pub use proxy::BlockStore;
pub use snapshot::{Snapshot, SnapshotMetadata, SnapshotRollback};
pub use volume::{QuotaSet, QuotaUsage, Volume, VolumeAction, VolumeAttachment, VolumeMetadata};
pub use volume_type::VolumeType;
