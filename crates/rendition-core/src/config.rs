use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const IMAGE_PREVIEW_MAX_WIDTH: u32 = 512;
const IMAGE_PREVIEW_MAX_HEIGHT: u32 = 512;
const WORKER_MAX_WORKERS: usize = 4;
const WORKER_MAX_RETRIES: u32 = 3;
const API_TIMEOUT_SECS: u64 = 60;

/// Bounds applied to every derived artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub image_preview_max_width: u32,
    pub image_preview_max_height: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            image_preview_max_width: IMAGE_PREVIEW_MAX_WIDTH,
            image_preview_max_height: IMAGE_PREVIEW_MAX_HEIGHT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Locations of the external tools behind the processors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub pdftoppm: String,
    pub soffice: String,
    pub glb_renderer: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            pdftoppm: "pdftoppm".to_string(),
            soffice: "soffice".to_string(),
            glb_renderer: "glb-thumbnail".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    pub max_workers: usize,
    pub max_retries: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_workers: WORKER_MAX_WORKERS,
            max_retries: WORKER_MAX_RETRIES,
        }
    }
}

/// Process-wide, read-only configuration shared by all runs.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub storage: StorageConfig,
    pub api: ApiConfig,
    pub temp_dir: PathBuf,
    pub limits: Limits,
    pub tools: ToolPaths,
    pub worker: WorkerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .parse::<StorageBackend>()?;

        let config = Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            storage: StorageConfig {
                backend,
                s3_region: env::var("S3_REGION")
                    .or_else(|_| env::var("AWS_REGION"))
                    .ok(),
                s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
                local_storage_path: env::var("LOCAL_STORAGE_PATH").ok().map(PathBuf::from),
            },
            api: ApiConfig {
                url: env::var("API_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
                api_key: env::var("API_KEY").ok().filter(|s| !s.is_empty()),
                timeout_secs: env::var("API_TIMEOUT_SECS")
                    .unwrap_or_else(|_| API_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(API_TIMEOUT_SECS),
            },
            temp_dir: env::var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            limits: Limits {
                image_preview_max_width: env::var("IMAGE_PREVIEW_MAX_WIDTH")
                    .unwrap_or_else(|_| IMAGE_PREVIEW_MAX_WIDTH.to_string())
                    .parse()
                    .unwrap_or(IMAGE_PREVIEW_MAX_WIDTH),
                image_preview_max_height: env::var("IMAGE_PREVIEW_MAX_HEIGHT")
                    .unwrap_or_else(|_| IMAGE_PREVIEW_MAX_HEIGHT.to_string())
                    .parse()
                    .unwrap_or(IMAGE_PREVIEW_MAX_HEIGHT),
            },
            tools: ToolPaths {
                pdftoppm: env::var("PDFTOPPM_PATH").unwrap_or_else(|_| "pdftoppm".to_string()),
                soffice: env::var("SOFFICE_PATH").unwrap_or_else(|_| "soffice".to_string()),
                glb_renderer: env::var("GLB_RENDERER_PATH")
                    .unwrap_or_else(|_| "glb-thumbnail".to_string()),
            },
            worker: WorkerConfig {
                max_workers: env::var("WORKER_MAX_WORKERS")
                    .unwrap_or_else(|_| WORKER_MAX_WORKERS.to_string())
                    .parse()
                    .unwrap_or(WORKER_MAX_WORKERS),
                max_retries: env::var("WORKER_MAX_RETRIES")
                    .unwrap_or_else(|_| WORKER_MAX_RETRIES.to_string())
                    .parse()
                    .unwrap_or(WORKER_MAX_RETRIES),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.limits.image_preview_max_width == 0 || self.limits.image_preview_max_height == 0 {
            return Err(anyhow::anyhow!(
                "IMAGE_PREVIEW_MAX_WIDTH and IMAGE_PREVIEW_MAX_HEIGHT must be greater than zero"
            ));
        }

        if self.worker.max_workers == 0 {
            return Err(anyhow::anyhow!("WORKER_MAX_WORKERS must be at least 1"));
        }

        if self.is_production() && self.api.api_key.is_none() {
            return Err(anyhow::anyhow!("API_KEY must be set in production"));
        }

        if !self.api.url.starts_with("http://") && !self.api.url.starts_with("https://") {
            return Err(anyhow::anyhow!("API_URL must be an http(s) URL"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> Config {
        Config {
            environment: "development".to_string(),
            storage: StorageConfig {
                backend: StorageBackend::Local,
                s3_region: None,
                s3_endpoint: None,
                local_storage_path: Some(PathBuf::from("/var/lib/rendition")),
            },
            api: ApiConfig {
                url: "http://localhost:8080".to_string(),
                api_key: None,
                timeout_secs: API_TIMEOUT_SECS,
            },
            temp_dir: env::temp_dir(),
            limits: Limits::default(),
            tools: ToolPaths::default(),
            worker: WorkerConfig::default(),
        }
    }

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.image_preview_max_width, 512);
        assert_eq!(limits.image_preview_max_height, 512);
    }

    #[test]
    fn test_validate_local_backend() {
        let mut config = local_config();
        assert!(config.validate().is_ok());

        config.storage.local_storage_path = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_s3_requires_region() {
        let mut config = local_config();
        config.storage.backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.storage.s3_region = Some("us-east-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = local_config();
        config.limits.image_preview_max_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_api_key() {
        let mut config = local_config();
        config.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.api.api_key = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }
}
