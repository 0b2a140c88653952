use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters of one conversion run.
///
/// Wire shape: `{taskId, snapshotId, bucket, key, ...}`. Format-specific
/// fields that the engine does not interpret are preserved in `extras` so
/// they round-trip back to the Snapshot service unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    pub task_id: String,
    pub snapshot_id: String,
    pub bucket: String,
    pub key: String,
    /// Declared media type, consulted only when the key has no known extension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl RunOptions {
    pub fn new(
        task_id: impl Into<String>,
        snapshot_id: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            snapshot_id: snapshot_id.into(),
            bucket: bucket.into(),
            key: key.into(),
            content_type: None,
            extras: Map::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Permanent key for an artifact derived from this run's snapshot,
    /// e.g. `snapshot_key("thumbnail.png")` -> `"<snapshotId>/thumbnail.png"`.
    pub fn snapshot_key(&self, name: &str) -> String {
        format!("{}/{}", self.snapshot_id, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_uses_camel_case() {
        let opts = RunOptions::new("t1", "s1", "b", "a.glb");
        let value = serde_json::to_value(&opts).unwrap();
        assert_eq!(value["taskId"], "t1");
        assert_eq!(value["snapshotId"], "s1");
        assert_eq!(value["bucket"], "b");
        assert_eq!(value["key"], "a.glb");
        assert!(value.get("contentType").is_none());
    }

    #[test]
    fn test_extras_are_preserved() {
        let json = r#"{"taskId":"t1","snapshotId":"s1","bucket":"b","key":"doc.pdf","language":"eng"}"#;
        let opts: RunOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.extras.get("language").unwrap(), "eng");

        let back = serde_json::to_value(&opts).unwrap();
        assert_eq!(back["language"], "eng");
    }

    #[test]
    fn test_snapshot_key() {
        let opts = RunOptions::new("t1", "s1", "b", "a.glb");
        assert_eq!(opts.snapshot_key("thumbnail.png"), "s1/thumbnail.png");
    }
}
