use rendition_core::{ArtifactRef, Snapshot, TaskStatus};
use rendition_processing::pipeline::{
    CONVERTING_TO_PDF, CREATING_THUMBNAIL, EXTRACTING_ARCHIVE, EXTRACTING_TEXT,
};
use rendition_processing::test_helpers::*;
use rendition_processing::{PipelineError, PipelineVariant, RunStep};
use std::io::Write;
use tokio::task::JoinSet;
use zip::write::{FileOptions, ZipWriter};

const MESH: &[u8] = b"glTF\x02\x00\x00\x00 small mesh payload";

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        for (name, data) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

fn thumbnail_ref() -> ArtifactRef {
    ArtifactRef::new(TEST_BUCKET, "s1/thumbnail.png", FAKE_THUMBNAIL.len() as u64)
        .with_image(FAKE_IMAGE_PROPS)
}

#[tokio::test]
async fn test_glb_run_end_to_end() {
    let harness = Harness::new();
    harness.put_source("a.glb", MESH);
    let opts = harness.options("a.glb");

    let pipeline = harness.factory().for_options(&opts).unwrap();
    let report = pipeline.run(&opts).await.unwrap();

    assert_eq!(report.variant, PipelineVariant::Glb);
    assert!(report.warnings.is_empty());

    // The phase is visible before any processing starts.
    assert_eq!(harness.tasks.names(), vec![CREATING_THUMBNAIL.to_string()]);
    let patched = harness.journal.position("task.patch").unwrap();
    let rendered = harness.journal.position("processor.thumbnail").unwrap();
    assert!(patched < rendered);

    let snapshot = harness.snapshots.snapshot(TEST_SNAPSHOT_ID).unwrap();
    assert_eq!(
        snapshot.preview,
        Some(ArtifactRef::new(TEST_BUCKET, "a.glb", MESH.len() as u64))
    );
    assert_eq!(snapshot.thumbnail, Some(thumbnail_ref()));

    assert_eq!(
        harness.storage.object(TEST_BUCKET, "s1/thumbnail.png").unwrap(),
        FAKE_THUMBNAIL
    );
    assert_eq!(
        harness.storage.content_type(TEST_BUCKET, "s1/thumbnail.png").unwrap(),
        "image/png"
    );
    // The preview reuses the source object; nothing else was stored.
    assert_eq!(
        harness.storage.keys(TEST_BUCKET),
        vec!["a.glb".to_string(), "s1/thumbnail.png".to_string()]
    );
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_thumbnail_failure_is_tolerated() {
    let harness = Harness::new();
    harness.put_source("model.glb", MESH);
    harness.thumbnailer.set_fail(true);
    let opts = harness.options("model.glb");

    let report = harness
        .factory()
        .for_options(&opts)
        .unwrap()
        .run(&opts)
        .await
        .unwrap();

    assert!(report.has_warning(RunStep::Thumbnail));
    assert!(report.thumbnail.is_none());

    let snapshot = harness.snapshots.snapshot(TEST_SNAPSHOT_ID).unwrap();
    assert!(snapshot.thumbnail.is_none());
    assert_eq!(snapshot.preview.unwrap().key, "model.glb");
    assert!(harness
        .storage
        .object(TEST_BUCKET, "s1/thumbnail.png")
        .is_none());
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_thumbnail_measure_failure_skips_upload() {
    let harness = Harness::new();
    harness.put_source("model.glb", MESH);
    harness.measurer.set_fail(true);
    let opts = harness.options("model.glb");

    let report = harness
        .factory()
        .create(PipelineVariant::Glb)
        .run(&opts)
        .await
        .unwrap();

    assert!(report.has_warning(RunStep::Measure));
    assert_eq!(harness.storage.keys(TEST_BUCKET), vec!["model.glb".to_string()]);
    assert!(report.preview.is_some());
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_task_patch_failure_is_fatal() {
    let harness = Harness::new();
    harness.put_source("a.glb", MESH);
    harness.tasks.set_unreachable(true);
    let opts = harness.options("a.glb");

    let err = harness
        .factory()
        .create(PipelineVariant::Glb)
        .run(&opts)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Client(_)));
    assert!(err.is_retryable());
    assert_eq!(harness.thumbnailer.calls(), 0);
    assert!(harness.snapshots.patches().is_empty());
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_thumbnail_upload_failure_is_fatal() {
    let harness = Harness::new();
    harness.put_source("a.glb", MESH);
    harness.storage.set_fail_puts(true);
    let opts = harness.options("a.glb");

    let err = harness
        .factory()
        .create(PipelineVariant::Glb)
        .run(&opts)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Storage(_)));
    // The preview step never ran.
    assert!(harness.snapshots.patches().is_empty());
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_missing_source_fails_before_processing() {
    let harness = Harness::new();
    let opts = harness.options("a.glb");

    let err = harness
        .factory()
        .create(PipelineVariant::Glb)
        .run(&opts)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Storage(_)));
    assert!(!err.is_retryable());
    assert!(harness.tasks.patches().is_empty());
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_unsupported_input_does_no_io() {
    let harness = Harness::new();
    let opts = harness.options("clip.mp4");

    let err = harness.factory().for_options(&opts).err().unwrap();

    assert!(err.is_unsupported());
    assert!(harness.journal.events().is_empty());
}

#[tokio::test]
async fn test_run_from_local_path_keeps_callers_file() {
    let harness = Harness::new();
    let scratch = tempfile::tempdir().unwrap();
    let local = scratch.path().join("held.glb");
    std::fs::write(&local, MESH).unwrap();
    let opts = harness.options("model.glb");

    let report = harness
        .factory()
        .create(PipelineVariant::Glb)
        .run_from_local_path(&local, &opts)
        .await
        .unwrap();

    assert_eq!(
        report.preview,
        Some(ArtifactRef::new(TEST_BUCKET, "model.glb", MESH.len() as u64))
    );
    assert!(local.exists());
    assert!(harness.journal.position("storage.get").is_none());
}

#[tokio::test]
async fn test_gltf_archive_preview_uses_synthetic_key() {
    let harness = Harness::new();
    let gltf: &[u8] = br#"{"asset":{"version":"2.0"},"buffers":[{"uri":"scene.bin"}]}"#;
    harness.put_source(
        "scene.zip",
        &zip_bytes(&[("scene.gltf", gltf), ("scene.bin", b"\0\0\0\0")]),
    );
    let opts = harness.options("scene.zip");

    let report = harness
        .factory()
        .for_options(&opts)
        .unwrap()
        .run(&opts)
        .await
        .unwrap();

    assert_eq!(report.variant, PipelineVariant::GltfArchive);
    assert_eq!(
        harness.tasks.names(),
        vec![
            EXTRACTING_ARCHIVE.to_string(),
            CREATING_THUMBNAIL.to_string()
        ]
    );

    let snapshot = harness.snapshots.snapshot(TEST_SNAPSHOT_ID).unwrap();
    let preview = snapshot.preview.unwrap();
    assert_eq!(preview.key, "s1/preview.gltf");
    assert_eq!(preview.size, gltf.len() as u64);
    assert_eq!(
        harness.storage.object(TEST_BUCKET, "s1/preview.gltf").unwrap(),
        gltf
    );
    assert_eq!(
        harness.storage.content_type(TEST_BUCKET, "s1/preview.gltf").unwrap(),
        "model/gltf+json"
    );
    assert_eq!(snapshot.thumbnail, Some(thumbnail_ref()));
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_gltf_archive_prefers_glb_scene() {
    let harness = Harness::new();
    harness.put_source(
        "bundle.zip",
        &zip_bytes(&[("a/scene.gltf", b"{}"), ("model.glb", MESH)]),
    );
    let opts = harness.options("bundle.zip");

    let report = harness
        .factory()
        .create(PipelineVariant::GltfArchive)
        .run(&opts)
        .await
        .unwrap();

    assert_eq!(report.preview.unwrap().key, "s1/preview.glb");
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_archive_without_scene_is_fatal() {
    let harness = Harness::new();
    harness.put_source("notes.zip", &zip_bytes(&[("readme.txt", b"hello")]));
    let opts = harness.options("notes.zip");

    let err = harness
        .factory()
        .create(PipelineVariant::GltfArchive)
        .run(&opts)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Processing(_)));
    assert!(!err.is_retryable());
    assert!(harness.snapshots.patches().is_empty());
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_rerun_after_tracking_outage_converges() {
    // Interrupted run followed by a retry.
    let retried = Harness::new();
    retried.put_source("a.glb", MESH);
    let opts = retried.options("a.glb");
    let factory = retried.factory();

    retried.snapshots.set_unreachable(true);
    let err = factory.for_options(&opts).unwrap().run(&opts).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(retried.temp_entries().is_empty());

    retried.snapshots.set_unreachable(false);
    factory.for_options(&opts).unwrap().run(&opts).await.unwrap();

    // Single uninterrupted run.
    let single = Harness::new();
    single.put_source("a.glb", MESH);
    single
        .factory()
        .for_options(&opts)
        .unwrap()
        .run(&opts)
        .await
        .unwrap();

    let retried_snapshot: Snapshot = retried.snapshots.snapshot(TEST_SNAPSHOT_ID).unwrap();
    let single_snapshot: Snapshot = single.snapshots.snapshot(TEST_SNAPSHOT_ID).unwrap();
    assert_eq!(retried_snapshot, single_snapshot);
    assert_eq!(
        retried.storage.keys(TEST_BUCKET),
        single.storage.keys(TEST_BUCKET)
    );
    assert!(retried.temp_entries().is_empty());
}

#[tokio::test]
async fn test_pdf_run_stores_text() {
    let harness = Harness::new();
    harness.put_source("doc.pdf", b"%PDF-1.4 source");
    harness.text.set_text("Quarterly report");
    let opts = harness.options("doc.pdf");

    let report = harness
        .factory()
        .for_options(&opts)
        .unwrap()
        .run(&opts)
        .await
        .unwrap();

    assert_eq!(
        harness.tasks.names(),
        vec![CREATING_THUMBNAIL.to_string(), EXTRACTING_TEXT.to_string()]
    );
    let snapshot = harness.snapshots.snapshot(TEST_SNAPSHOT_ID).unwrap();
    assert_eq!(snapshot.preview.unwrap().key, "doc.pdf");
    assert_eq!(
        snapshot.text,
        Some(ArtifactRef::new(TEST_BUCKET, "s1/text.txt", 16))
    );
    assert_eq!(report.text, snapshot.text);
    assert_eq!(
        harness.storage.object(TEST_BUCKET, "s1/text.txt").unwrap(),
        b"Quarterly report"
    );
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_pdf_text_failure_is_tolerated() {
    let harness = Harness::new();
    harness.put_source("doc.pdf", b"%PDF-1.4 source");
    harness.text.set_fail();
    let opts = harness.options("doc.pdf");

    let report = harness
        .factory()
        .create(PipelineVariant::Pdf)
        .run(&opts)
        .await
        .unwrap();

    assert!(report.has_warning(RunStep::TextExtraction));
    let snapshot = harness.snapshots.snapshot(TEST_SNAPSHOT_ID).unwrap();
    assert!(snapshot.text.is_none());
    assert!(snapshot.preview.is_some());
    assert!(snapshot.thumbnail.is_some());
}

#[tokio::test]
async fn test_pdf_without_text_stores_nothing() {
    let harness = Harness::new();
    harness.put_source("scan.pdf", b"%PDF-1.4 source");
    harness.text.set_text("");
    let opts = harness.options("scan.pdf");

    let report = harness
        .factory()
        .create(PipelineVariant::Pdf)
        .run(&opts)
        .await
        .unwrap();

    assert!(report.warnings.is_empty());
    assert!(report.text.is_none());
    assert!(harness.storage.object(TEST_BUCKET, "s1/text.txt").is_none());
}

#[tokio::test]
async fn test_office_run_previews_converted_pdf() {
    let harness = Harness::new();
    harness.put_source("memo.docx", b"PK docx payload");
    let opts = harness.options("memo.docx");

    let report = harness
        .factory()
        .for_options(&opts)
        .unwrap()
        .run(&opts)
        .await
        .unwrap();

    assert_eq!(report.variant, PipelineVariant::Office);
    assert_eq!(
        harness.tasks.names(),
        vec![
            CONVERTING_TO_PDF.to_string(),
            CREATING_THUMBNAIL.to_string(),
            EXTRACTING_TEXT.to_string()
        ]
    );
    let snapshot = harness.snapshots.snapshot(TEST_SNAPSHOT_ID).unwrap();
    let preview = snapshot.preview.unwrap();
    assert_eq!(preview.key, "s1/preview.pdf");
    assert_eq!(preview.size, FAKE_PDF.len() as u64);
    assert_eq!(
        harness.storage.content_type(TEST_BUCKET, "s1/preview.pdf").unwrap(),
        "application/pdf"
    );
    assert!(snapshot.text.is_some());
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_office_conversion_failure_is_fatal() {
    let harness = Harness::new();
    harness.put_source("memo.docx", b"PK docx payload");
    harness.converter.set_fail(true);
    let opts = harness.options("memo.docx");

    let err = harness
        .factory()
        .create(PipelineVariant::Office)
        .run(&opts)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Processing(_)));
    assert_eq!(harness.thumbnailer.calls(), 0);
    assert!(harness.snapshots.patches().is_empty());
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_image_preview_carries_dimensions() {
    let harness = Harness::new();
    harness.put_source("photos/cat.PNG", b"png source bytes");
    let opts = harness.options("photos/cat.PNG");

    let report = harness
        .factory()
        .for_options(&opts)
        .unwrap()
        .run(&opts)
        .await
        .unwrap();

    assert_eq!(report.variant, PipelineVariant::Image);
    let preview = report.preview.unwrap();
    assert_eq!(preview.key, "photos/cat.PNG");
    assert_eq!(preview.image, Some(FAKE_IMAGE_PROPS));
    assert!(report.thumbnail.is_some());
}

#[tokio::test]
async fn test_image_measure_failure_still_previews() {
    let harness = Harness::new();
    harness.put_source("cat.jpg", b"jpeg source bytes");
    harness.measurer.set_fail(true);
    let opts = harness.options("cat.jpg");

    let report = harness
        .factory()
        .create(PipelineVariant::Image)
        .run(&opts)
        .await
        .unwrap();

    assert!(report.has_warning(RunStep::Measure));
    let preview = report.preview.unwrap();
    assert_eq!(preview.key, "cat.jpg");
    assert!(preview.image.is_none());
    assert!(report.thumbnail.is_none());
}

#[tokio::test]
async fn test_concurrent_runs_do_not_collide() {
    let harness = Harness::new();
    harness.put_source("a.glb", MESH);
    let factory = harness.factory();

    let mut runs = JoinSet::new();
    for i in 0..8 {
        let factory = factory.clone();
        let mut opts = harness.options("a.glb");
        opts.task_id = format!("t{}", i);
        opts.snapshot_id = format!("s{}", i);
        runs.spawn(async move { factory.for_options(&opts)?.run(&opts).await });
    }

    while let Some(result) = runs.join_next().await {
        result.unwrap().unwrap();
    }

    for i in 0..8 {
        let snapshot = harness.snapshots.snapshot(&format!("s{}", i)).unwrap();
        assert_eq!(
            snapshot.thumbnail.unwrap().key,
            format!("s{}/thumbnail.png", i)
        );
        let task = harness.tasks.task(&format!("t{}", i)).unwrap();
        assert_eq!(task.name, CREATING_THUMBNAIL);
        assert_eq!(task.status, TaskStatus::Waiting);
    }
    assert!(harness.temp_entries().is_empty());
}

#[tokio::test]
async fn test_run_from_local_path_creates_missing_temp_dir() {
    let harness = Harness::new();
    std::fs::remove_dir_all(harness.temp_path()).unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let local = scratch.path().join("held.pdf");
    std::fs::write(&local, b"%PDF-1.4 source").unwrap();
    let opts = harness.options("doc.pdf");

    let report = harness
        .factory()
        .create(PipelineVariant::Pdf)
        .run_from_local_path(&local, &opts)
        .await
        .unwrap();

    assert!(report.warnings.is_empty());
    assert_eq!(report.thumbnail, Some(thumbnail_ref()));
    assert_eq!(
        report.text,
        Some(ArtifactRef::new(TEST_BUCKET, "s1/text.txt", 14))
    );
    assert!(harness.temp_entries().is_empty());
}
