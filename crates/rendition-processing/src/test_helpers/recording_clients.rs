//! Task and Snapshot clients that apply patches to in-memory records

use super::Journal;
use async_trait::async_trait;
use rendition_api_client::{ClientError, ClientResult, SnapshotClient, StatusCode, TaskClient};
use rendition_core::{Snapshot, SnapshotPatch, Task, TaskPatch};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

fn unavailable() -> ClientError {
    ClientError::Status {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "simulated outage".to_string(),
    }
}

#[derive(Clone)]
pub struct RecordingTaskClient {
    tasks: Arc<Mutex<HashMap<String, Task>>>,
    patches: Arc<Mutex<Vec<(String, TaskPatch)>>>,
    unreachable: Arc<AtomicBool>,
    journal: Journal,
}

impl RecordingTaskClient {
    pub fn new(journal: Journal) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            patches: Arc::new(Mutex::new(Vec::new())),
            unreachable: Arc::new(AtomicBool::new(false)),
            journal,
        }
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.tasks.lock().unwrap().get(id).cloned()
    }

    pub fn patches(&self) -> Vec<(String, TaskPatch)> {
        self.patches.lock().unwrap().clone()
    }

    /// Task names in the order they were patched.
    pub fn names(&self) -> Vec<String> {
        self.patches()
            .into_iter()
            .filter_map(|(_, patch)| patch.name)
            .collect()
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl TaskClient for RecordingTaskClient {
    async fn patch(&self, task_id: &str, patch: TaskPatch) -> ClientResult<()> {
        self.journal
            .record(format!("task.patch {} {:?}", task_id, patch.fields));
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.tasks
            .lock()
            .unwrap()
            .entry(task_id.to_string())
            .or_insert_with(|| Task::new(task_id))
            .apply(&patch);
        self.patches
            .lock()
            .unwrap()
            .push((task_id.to_string(), patch));
        Ok(())
    }
}

#[derive(Clone)]
pub struct RecordingSnapshotClient {
    snapshots: Arc<Mutex<HashMap<String, Snapshot>>>,
    patches: Arc<Mutex<Vec<SnapshotPatch>>>,
    unreachable: Arc<AtomicBool>,
    journal: Journal,
}

impl RecordingSnapshotClient {
    pub fn new(journal: Journal) -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(HashMap::new())),
            patches: Arc::new(Mutex::new(Vec::new())),
            unreachable: Arc::new(AtomicBool::new(false)),
            journal,
        }
    }

    pub fn snapshot(&self, id: &str) -> Option<Snapshot> {
        self.snapshots.lock().unwrap().get(id).cloned()
    }

    pub fn patches(&self) -> Vec<SnapshotPatch> {
        self.patches.lock().unwrap().clone()
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl SnapshotClient for RecordingSnapshotClient {
    async fn patch(&self, patch: SnapshotPatch) -> ClientResult<()> {
        self.journal.record(format!(
            "snapshot.patch {} {:?}",
            patch.snapshot_id(),
            patch.fields
        ));
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let id = patch.snapshot_id().to_string();
        self.snapshots
            .lock()
            .unwrap()
            .entry(id.clone())
            .or_insert_with(|| Snapshot::new(id))
            .apply(&patch);
        self.patches.lock().unwrap().push(patch);
        Ok(())
    }
}
