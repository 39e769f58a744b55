use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::BucketConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    pub objects_deleted: u64,
    pub pages: u64,
}

#[derive(Debug, Error)]
pub enum PurgeError {
    #[error("failed to list objects in bucket {bucket}: {message}")]
    List { bucket: String, message: String },

    #[error("failed to delete objects from bucket {bucket}: {message}")]
    Delete { bucket: String, message: String },

    #[error(
        "bucket {bucket} rejected {count} of the deletes, first: {first}",
        count = .failed.len(),
        first = .failed.first().map(String::as_str).unwrap_or("-")
    )]
    Rejected { bucket: String, failed: Vec<String> },

    #[error("invalid delete request: {message}")]
    InvalidRequest { message: String },
}

/// Removes every object from a bucket.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BucketPurge: Send + Sync {
    async fn purge_bucket(&self, bucket: &str) -> Result<PurgeSummary, PurgeError>;
}

/// [`BucketPurge`] over the S3 API.
#[derive(Debug, Clone)]
pub struct S3BucketPurger {
    client: Client,
}

impl S3BucketPurger {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the static credentials in the job file.
    pub async fn from_bucket_config(bucket: &BucketConfig) -> Self {
        let credentials = Credentials::new(
            bucket.access_key.clone(),
            bucket.secret_key.clone(),
            None,
            None,
            "janitor-job",
        );

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(bucket.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &bucket.endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(Client::from_conf(s3_config.build()))
    }

    async fn delete_page(&self, bucket: &str, keys: Vec<String>) -> Result<u64, PurgeError> {
        let count = keys.len() as u64;
        let objects = keys
            .into_iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PurgeError::InvalidRequest { message: e.to_string() })?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| PurgeError::InvalidRequest { message: e.to_string() })?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| PurgeError::Delete {
                bucket: bucket.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let failed: Vec<String> = output
            .errors()
            .iter()
            .map(|err| {
                format!(
                    "{}: {}",
                    err.key().unwrap_or("<unknown>"),
                    err.message().unwrap_or("delete failed")
                )
            })
            .collect();
        if !failed.is_empty() {
            return Err(PurgeError::Rejected {
                bucket: bucket.to_string(),
                failed,
            });
        }

        Ok(count)
    }
}

#[async_trait]
impl BucketPurge for S3BucketPurger {
    async fn purge_bucket(&self, bucket: &str) -> Result<PurgeSummary, PurgeError> {
        let mut summary = PurgeSummary::default();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| PurgeError::List {
                bucket: bucket.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
            summary.pages += 1;

            let keys: Vec<String> = page
                .contents()
                .iter()
                .filter_map(|object| object.key().map(str::to_string))
                .collect();
            if keys.is_empty() {
                continue;
            }

            debug!(bucket, page = summary.pages, objects = keys.len(), "Deleting object page");
            summary.objects_deleted += self.delete_page(bucket, keys).await?;
        }

        info!(
            bucket,
            objects_deleted = summary.objects_deleted,
            pages = summary.pages,
            "Bucket purged"
        );
        Ok(summary)
    }
}
