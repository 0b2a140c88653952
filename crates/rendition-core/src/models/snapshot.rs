use serde::{Deserialize, Serialize};

use super::{ArtifactRef, RunOptions};

/// Version record that receives derived artifact references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<ArtifactRef>,
}

impl Snapshot {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Applies a partial update. Artifact fields are monotonic: a listed field
    /// without a value never unsets what is already there.
    pub fn apply(&mut self, patch: &SnapshotPatch) {
        for field in &patch.fields {
            let (slot, value) = match field {
                SnapshotField::Preview => (&mut self.preview, &patch.preview),
                SnapshotField::Thumbnail => (&mut self.thumbnail, &patch.thumbnail),
                SnapshotField::Text => (&mut self.text, &patch.text),
            };
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotField {
    Preview,
    Thumbnail,
    Text,
}

/// Partial update for the Snapshot identified by `options.snapshot_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPatch {
    pub options: RunOptions,
    pub fields: Vec<SnapshotField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ArtifactRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<ArtifactRef>,
}

impl SnapshotPatch {
    fn empty(options: &RunOptions, field: SnapshotField) -> Self {
        Self {
            options: options.clone(),
            fields: vec![field],
            preview: None,
            thumbnail: None,
            text: None,
        }
    }

    pub fn preview(options: &RunOptions, artifact: ArtifactRef) -> Self {
        Self {
            preview: Some(artifact),
            ..Self::empty(options, SnapshotField::Preview)
        }
    }

    pub fn thumbnail(options: &RunOptions, artifact: ArtifactRef) -> Self {
        Self {
            thumbnail: Some(artifact),
            ..Self::empty(options, SnapshotField::Thumbnail)
        }
    }

    pub fn text(options: &RunOptions, artifact: ArtifactRef) -> Self {
        Self {
            text: Some(artifact),
            ..Self::empty(options, SnapshotField::Text)
        }
    }

    pub fn snapshot_id(&self) -> &str {
        &self.options.snapshot_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> RunOptions {
        RunOptions::new("t1", "s1", "b", "a.glb")
    }

    #[test]
    fn test_apply_is_idempotent() {
        let patch = SnapshotPatch::preview(&opts(), ArtifactRef::new("b", "a.glb", 42));

        let mut once = Snapshot::new("s1");
        once.apply(&patch);
        let mut twice = once.clone();
        twice.apply(&patch);

        assert_eq!(once, twice);
        assert_eq!(once.preview.unwrap().key, "a.glb");
    }

    #[test]
    fn test_apply_never_unsets() {
        let mut snapshot = Snapshot::new("s1");
        snapshot.apply(&SnapshotPatch::thumbnail(
            &opts(),
            ArtifactRef::new("b", "s1/thumbnail.png", 7),
        ));

        let mut blank = SnapshotPatch::thumbnail(&opts(), ArtifactRef::new("b", "x", 0));
        blank.thumbnail = None;
        snapshot.apply(&blank);

        assert_eq!(snapshot.thumbnail.unwrap().key, "s1/thumbnail.png");
        assert!(snapshot.preview.is_none());
    }

    #[test]
    fn test_patch_wire_shape() {
        let patch = SnapshotPatch::preview(&opts(), ArtifactRef::new("b", "a.glb", 42));
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["options"]["snapshotId"], "s1");
        assert_eq!(json["fields"], serde_json::json!(["preview"]));
        assert_eq!(json["preview"]["size"], 42);
        assert!(json.get("thumbnail").is_none());
    }
}
