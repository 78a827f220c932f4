/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::Instrument;

use crate::error::{self, Error};

/// Fluent builder for downloading a single object to a local file
#[derive(Debug)]
pub struct DownloadFluentBuilder {
    handle: Arc<crate::client::Handle>,
    bucket: Option<String>,
    key: Option<String>,
    destination: Option<PathBuf>,
}

impl DownloadFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            bucket: None,
            key: None,
            destination: None,
        }
    }

    /// The bucket containing the object
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// The bucket containing the object
    pub fn get_bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Key of the object to download
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Key of the object to download
    pub fn get_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Local file to write the object to. Created if missing, truncated otherwise.
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Local file to write the object to
    pub fn get_destination(&self) -> Option<&PathBuf> {
        self.destination.as_ref()
    }

    /// Download the object into the destination file.
    ///
    /// The destination is truncated before the object is requested. If the
    /// transfer fails and the destination did not exist beforehand, the partially
    /// written file is removed. A destination that already existed is left in
    /// place, truncated or partially written.
    pub async fn send(self) -> Result<DownloadOutput, Error> {
        let bucket = super::required("bucket", self.bucket)?;
        let key = super::required("key", self.key)?;
        let destination = self
            .destination
            .filter(|d| !d.as_os_str().is_empty())
            .ok_or_else(|| error::missing_field("destination"))?;

        let preexisting = !matches!(tokio::fs::try_exists(&destination).await, Ok(false));
        let mut file = tokio::fs::File::create(&destination).await?;
        let result = self
            .handle
            .storage
            .get_object(&bucket, &key, &mut file)
            .instrument(tracing::debug_span!(
                "download",
                bucket = bucket.as_str(),
                key = key.as_str()
            ))
            .await;
        drop(file);

        match result {
            Ok(content_length) => {
                tracing::debug!("downloaded {content_length} bytes to {}", destination.display());
                Ok(DownloadOutput {
                    destination,
                    content_length,
                })
            }
            Err(err) => {
                if !preexisting {
                    remove_partial(&destination).await;
                }
                Err(err)
            }
        }
    }
}

async fn remove_partial(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        tracing::warn!("failed to remove partial download {}: {err}", path.display());
    }
}

/// Output from downloading a single object
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadOutput {
    /// Local file the object was written to
    pub destination: PathBuf,

    /// Number of bytes written
    pub content_length: u64,
}

impl DownloadOutput {
    /// Local file the object was written to
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Number of bytes written
    pub fn content_length(&self) -> u64 {
        self.content_length
    }
}
