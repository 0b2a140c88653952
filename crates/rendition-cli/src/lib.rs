use anyhow::Context;
use rendition_api_client::ApiClient;
use rendition_core::{Config, RunOptions};
use rendition_processing::{PipelineContext, PipelineFactory, Processors};
use rendition_storage::create_storage;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for the CLI. Events go to stderr so stdout stays
/// machine-readable; set `LOG_FORMAT=json` for JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rendition=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Parse one job description (a JSON `RunOptions` object).
pub fn parse_run_options(json: &str) -> anyhow::Result<RunOptions> {
    let opts: RunOptions =
        serde_json::from_str(json.trim()).context("Invalid run options JSON")?;
    anyhow::ensure!(!opts.task_id.is_empty(), "taskId must not be empty");
    anyhow::ensure!(!opts.snapshot_id.is_empty(), "snapshotId must not be empty");
    anyhow::ensure!(!opts.bucket.is_empty(), "bucket must not be empty");
    anyhow::ensure!(!opts.key.is_empty(), "key must not be empty");
    Ok(opts)
}

/// Wire the configured storage backend, tracking API client and external
/// tools into a pipeline factory.
pub async fn build_factory(config: &Config) -> anyhow::Result<PipelineFactory> {
    let storage = create_storage(&config.storage)
        .await
        .context("Failed to initialize storage")?;
    let api = ApiClient::from_config(&config.api).context("Failed to create API client")?;

    tracing::info!(
        storage = %storage.backend_type(),
        api_url = %api.base_url(),
        temp_dir = %config.temp_dir.display(),
        "Pipeline factory ready"
    );

    let ctx = PipelineContext::new(
        storage,
        Arc::new(api.clone()),
        Arc::new(api),
        &config.temp_dir,
        config.limits,
    );
    Ok(PipelineFactory::new(ctx, Processors::from_tools(&config.tools)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rendition_core::{ApiConfig, Limits, StorageBackend, StorageConfig, ToolPaths, WorkerConfig};

    #[test]
    fn parse_run_options_accepts_camel_case() {
        let opts = parse_run_options(
            r#"{"taskId":"t1","snapshotId":"s1","bucket":"b","key":"a.glb","tenant":"acme"}"#,
        )
        .unwrap();
        assert_eq!(opts.task_id, "t1");
        assert_eq!(opts.snapshot_id, "s1");
        assert_eq!(opts.key, "a.glb");
        assert_eq!(opts.extras["tenant"], "acme");
    }

    #[test]
    fn parse_run_options_tolerates_surrounding_whitespace() {
        let opts =
            parse_run_options("  {\"taskId\":\"t\",\"snapshotId\":\"s\",\"bucket\":\"b\",\"key\":\"k.pdf\"}\n")
                .unwrap();
        assert_eq!(opts.key, "k.pdf");
    }

    #[test]
    fn parse_run_options_rejects_missing_fields() {
        assert!(parse_run_options(r#"{"taskId":"t1"}"#).is_err());
        assert!(parse_run_options("not json").is_err());
        assert!(parse_run_options(
            r#"{"taskId":"t1","snapshotId":"s1","bucket":"","key":"a.glb"}"#
        )
        .is_err());
    }

    #[tokio::test]
    async fn build_factory_with_local_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            environment: "test".to_string(),
            storage: StorageConfig {
                backend: StorageBackend::Local,
                s3_region: None,
                s3_endpoint: None,
                local_storage_path: Some(dir.path().join("objects")),
            },
            api: ApiConfig {
                url: "http://127.0.0.1:8080".to_string(),
                api_key: None,
                timeout_secs: 5,
            },
            temp_dir: dir.path().join("tmp"),
            limits: Limits::default(),
            tools: ToolPaths::default(),
            worker: WorkerConfig::default(),
        };
        config.validate().unwrap();

        let factory = build_factory(&config).await.unwrap();
        assert_eq!(factory.context().temp_dir, dir.path().join("tmp"));
    }
}
