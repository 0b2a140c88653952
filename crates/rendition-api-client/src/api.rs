//! Partial-update contracts for the Task and Snapshot services.
//!
//! The caller names the fields it updates and supplies values only for those;
//! the server leaves every other field untouched.

use crate::{ApiClient, ClientResult};
use async_trait::async_trait;
use rendition_core::{SnapshotPatch, TaskPatch};

#[async_trait]
pub trait TaskClient: Send + Sync {
    async fn patch(&self, task_id: &str, patch: TaskPatch) -> ClientResult<()>;
}

#[async_trait]
pub trait SnapshotClient: Send + Sync {
    async fn patch(&self, patch: SnapshotPatch) -> ClientResult<()>;
}

#[async_trait]
impl TaskClient for ApiClient {
    async fn patch(&self, task_id: &str, patch: TaskPatch) -> ClientResult<()> {
        tracing::debug!(task_id = %task_id, fields = ?patch.fields, "Patching task");
        self.patch_json(&["v3", "tasks", task_id], &patch).await
    }
}

#[async_trait]
impl SnapshotClient for ApiClient {
    async fn patch(&self, patch: SnapshotPatch) -> ClientResult<()> {
        tracing::debug!(
            snapshot_id = %patch.snapshot_id(),
            fields = ?patch.fields,
            "Patching snapshot"
        );
        self.patch_json(&["v3", "snapshots", patch.snapshot_id()], &patch)
            .await
    }
}
