//! Configuration management

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Unprefixed environment variables honored for compatibility with existing
/// deployments, and the keys they set.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("MINIO_ENDPOINT", "storage.endpoint"),
    ("MINIO_ACCESS_KEY", "storage.access_key"),
    ("MINIO_SECRET_KEY", "storage.secret_key"),
    ("MINIO_REGION", "storage.region"),
    ("BUCKET_NAME", "storage.bucket"),
];

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which object store implementation backs the service
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Memory,
}

#[derive(Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Host and port (or full URL) of the S3-compatible endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_credential")]
    pub access_key: String,

    #[serde(default = "default_credential")]
    pub secret_key: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            endpoint: default_endpoint(),
            access_key: default_credential(),
            secret_key: default_credential(),
            region: default_region(),
            bucket: default_bucket(),
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl StorageConfig {
    /// Endpoint as a URL the SDK can dial; bare `host:port` means plain HTTP.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_endpoint() -> String {
    "minio:9000".to_string()
}

fn default_credential() -> String {
    "minioadmin".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket() -> String {
    "analytics-data".to_string()
}

impl Config {
    /// Load configuration from file and the process environment
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(path, &vars)
    }

    /// Load configuration from file and an explicit set of environment variables.
    ///
    /// Precedence, lowest first: defaults, file, `DATAHUB_<SECTION>__<KEY>`,
    /// then the legacy `MINIO_*` / `BUCKET_NAME` variables.
    pub fn load_from(path: Option<&Path>, vars: &HashMap<String, String>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("datahub").required(false),
        };

        let mut builder = config::Config::builder().add_source(file).add_source(
            config::Environment::with_prefix("DATAHUB")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(vars.clone())),
        );

        for (var, key) in LEGACY_ENV {
            if let Some(value) = vars.get(*var) {
                builder = builder.set_override(*key, value.as_str())?;
            }
        }

        Ok(builder.build()?.try_deserialize::<Config>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::load_from(None, &HashMap::new()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.endpoint, "minio:9000");
        assert_eq!(config.storage.access_key, "minioadmin");
        assert_eq!(config.storage.secret_key, "minioadmin");
        assert_eq!(config.storage.region, "us-east-1");
        assert_eq!(config.storage.bucket, "analytics-data");
    }

    #[test]
    fn test_legacy_variables() {
        let vars = env(&[
            ("MINIO_ENDPOINT", "localhost:9100"),
            ("MINIO_ACCESS_KEY", "ak"),
            ("MINIO_SECRET_KEY", "sk"),
            ("BUCKET_NAME", "reports"),
        ]);
        let config = Config::load_from(None, &vars).unwrap();

        assert_eq!(config.storage.endpoint, "localhost:9100");
        assert_eq!(config.storage.access_key, "ak");
        assert_eq!(config.storage.secret_key, "sk");
        assert_eq!(config.storage.bucket, "reports");
    }

    #[test]
    fn test_prefixed_variables() {
        let vars = env(&[
            ("DATAHUB_SERVER__PORT", "8080"),
            ("DATAHUB_STORAGE__BACKEND", "memory"),
            ("DATAHUB_STORAGE__REGION", "eu-west-1"),
        ]);
        let config = Config::load_from(None, &vars).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.region, "eu-west-1");
    }

    #[test]
    fn test_legacy_wins_over_prefixed() {
        let vars = env(&[
            ("DATAHUB_STORAGE__BUCKET", "from-prefixed"),
            ("BUCKET_NAME", "from-legacy"),
        ]);
        let config = Config::load_from(None, &vars).unwrap();

        assert_eq!(config.storage.bucket, "from-legacy");
    }

    #[test]
    fn test_endpoint_url() {
        let mut storage = StorageConfig::default();
        assert_eq!(storage.endpoint_url(), "http://minio:9000");

        storage.endpoint = "https://s3.example.com".to_string();
        assert_eq!(storage.endpoint_url(), "https://s3.example.com");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let storage = StorageConfig {
            secret_key: "super-secret".to_string(),
            ..StorageConfig::default()
        };
        let rendered = format!("{storage:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
