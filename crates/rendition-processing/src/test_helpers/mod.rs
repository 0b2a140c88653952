//! Test helpers for pipeline tests
//!
//! In-memory storage, recording Task/Snapshot clients and fake processors.
//! Every fake writes to a shared `Journal` so tests can assert on the order
//! in which a run touched its collaborators.

pub mod fake_processors;
pub mod memory_storage;
pub mod recording_clients;

pub use fake_processors::*;
pub use memory_storage::*;
pub use recording_clients::*;

use crate::factory::{PipelineFactory, Processors};
use crate::mesh::GltfArchiveExtractor;
use crate::pipeline::PipelineContext;
use rendition_core::{Limits, RunOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const TEST_BUCKET: &str = "b";
pub const TEST_TASK_ID: &str = "t1";
pub const TEST_SNAPSHOT_ID: &str = "s1";

/// Ordered log of collaborator calls shared by all fakes.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.events().iter().position(|e| e.starts_with(prefix))
    }
}

/// All fakes wired together around a private temp directory.
pub struct Harness {
    pub journal: Journal,
    pub storage: Arc<MemoryStorage>,
    pub tasks: Arc<RecordingTaskClient>,
    pub snapshots: Arc<RecordingSnapshotClient>,
    pub thumbnailer: Arc<FakeThumbnailer>,
    pub measurer: Arc<FakeMeasurer>,
    pub text: Arc<FakeTextExtractor>,
    pub converter: Arc<FakeConverter>,
    pub limits: Limits,
    temp_dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let journal = Journal::default();
        Self {
            storage: Arc::new(MemoryStorage::new(journal.clone())),
            tasks: Arc::new(RecordingTaskClient::new(journal.clone())),
            snapshots: Arc::new(RecordingSnapshotClient::new(journal.clone())),
            thumbnailer: Arc::new(FakeThumbnailer::new(journal.clone())),
            measurer: Arc::new(FakeMeasurer::new(journal.clone())),
            text: Arc::new(FakeTextExtractor::new(journal.clone())),
            converter: Arc::new(FakeConverter::new(journal.clone())),
            limits: Limits::default(),
            temp_dir: TempDir::new().unwrap(),
            journal,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Everything currently left in the run temp directory.
    pub fn temp_entries(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    pub fn context(&self) -> PipelineContext {
        PipelineContext::new(
            self.storage.clone(),
            self.tasks.clone(),
            self.snapshots.clone(),
            self.temp_dir.path(),
            self.limits,
        )
    }

    /// Fakes for every processor except archives, which use the real extractor.
    pub fn processors(&self) -> Processors {
        Processors {
            image: self.thumbnailer.clone(),
            measurer: self.measurer.clone(),
            pdf: self.thumbnailer.clone(),
            text: self.text.clone(),
            glb: self.thumbnailer.clone(),
            office: self.converter.clone(),
            archive: Arc::new(GltfArchiveExtractor),
        }
    }

    pub fn factory(&self) -> PipelineFactory {
        PipelineFactory::new(self.context(), self.processors())
    }

    pub fn options(&self, key: &str) -> RunOptions {
        RunOptions::new(TEST_TASK_ID, TEST_SNAPSHOT_ID, TEST_BUCKET, key)
    }

    /// Store `data` as the source object `(TEST_BUCKET, key)`.
    pub fn put_source(&self, key: &str, data: &[u8]) {
        self.storage.insert(TEST_BUCKET, key, data.to_vec());
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
