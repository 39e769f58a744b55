use anyhow::{bail, Context, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::decommission::WorkloadHandle;

/// Static job description: what to decommission in this run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// StatefulSets to scale down and strip of their claims, in order
    #[serde(default, rename = "statefulsets")]
    pub statefulsets: Vec<WorkloadHandle>,
    /// Bucket to empty once every StatefulSet is done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_config: Option<BucketConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketConfig {
    pub region: String,
    pub bucket_name: String,
    pub access_key: String,
    pub secret_key: String,
    /// Custom endpoint for S3-compatible stores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl JobSpec {
    /// Read a job file. `.toml` files are parsed as TOML, everything else as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;

        let job: JobSpec = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&raw)
                .with_context(|| format!("Invalid TOML in job file {}", path.display()))?,
            _ => serde_json::from_str(&raw)
                .with_context(|| format!("Invalid JSON in job file {}", path.display()))?,
        };

        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<()> {
        for (index, handle) in self.statefulsets.iter().enumerate() {
            if handle.name.trim().is_empty() {
                bail!("statefulsets[{index}]: name must not be empty");
            }
            if handle.namespace.trim().is_empty() {
                bail!("statefulsets[{index}] ({}): namespace must not be empty", handle.name);
            }
        }

        if let Some(bucket) = &self.aws_config {
            let required = [
                ("region", &bucket.region),
                ("bucketName", &bucket.bucket_name),
                ("accessKey", &bucket.access_key),
                ("secretKey", &bucket.secret_key),
            ];
            for (field, value) in required {
                if value.trim().is_empty() {
                    bail!("awsConfig.{field} must not be empty");
                }
            }
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.statefulsets.is_empty() && self.aws_config.is_none()
    }
}

/// Runtime settings, independent of the job being run
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JanitorSettings {
    /// Delay before the single convergence check of a waited StatefulSet
    pub poll_delay_seconds: u64,
    /// Kubeconfig context to use instead of the ambient configuration
    pub kube_context: Option<String>,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for JanitorSettings {
    fn default() -> Self {
        Self {
            poll_delay_seconds: 30,
            kube_context: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

impl JanitorSettings {
    /// Load settings with precedence:
    /// 1. Default values
    /// 2. Settings file (`janitor.toml` in the working directory, or `explicit`)
    /// 3. Environment variables (prefixed with JANITOR_)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("Settings file {} does not exist", path.display());
                }
                // Always TOML, whatever the extension.
                builder = builder.add_source(File::from(path).format(FileFormat::Toml));
            }
            None => {
                if Path::new("janitor.toml").exists() {
                    builder = builder.add_source(File::with_name("janitor"));
                }
            }
        }

        builder = builder.add_source(Environment::with_prefix("JANITOR").try_parsing(true));

        let settings = builder
            .build()
            .context("Failed to load janitor settings")?
            .try_deserialize()
            .context("Invalid janitor settings")?;

        Ok(settings)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<Option<PathBuf>> {
        if Path::new(".env").exists() {
            let path = dotenvy::dotenv()?;
            return Ok(Some(path));
        }
        Ok(None)
    }

    pub fn poll_delay(&self) -> Duration {
        Duration::from_secs(self.poll_delay_seconds)
    }

    pub fn logging(&self) -> LoggingSettings {
        LoggingSettings {
            level: self.log_level.clone(),
            format: self.log_format,
        }
    }
}
