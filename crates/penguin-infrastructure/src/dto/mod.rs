//! Data transfer objects for on-disk formats.

mod share_snapshot;

pub use share_snapshot::{
    AttachmentV1, MessageV1, SHARE_SNAPSHOT_V1_VERSION, ShareSnapshotV1,
};
