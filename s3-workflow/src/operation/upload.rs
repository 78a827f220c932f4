/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::PathBuf;
use std::sync::Arc;

use tracing::Instrument;

use crate::error::{self, Error};

/// Fluent builder for uploading a local file as a single object
#[derive(Debug)]
pub struct UploadFluentBuilder {
    handle: Arc<crate::client::Handle>,
    bucket: Option<String>,
    key: Option<String>,
    source: Option<PathBuf>,
}

impl UploadFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            bucket: None,
            key: None,
            source: None,
        }
    }

    /// The bucket to upload into
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// The bucket to upload into
    pub fn get_bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Object key to store the file under.
    ///
    /// Defaults to the source path exactly as given.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Object key to store the file under
    pub fn get_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Local file to upload
    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Local file to upload
    pub fn get_source(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }

    /// Upload the source file.
    ///
    /// The local file is opened before anything is sent; if it cannot be opened
    /// an [`IOError`](crate::error::ErrorKind::IOError) is returned and the storage
    /// service is never contacted.
    pub async fn send(self) -> Result<UploadOutput, Error> {
        let bucket = super::required("bucket", self.bucket)?;
        let source = self
            .source
            .filter(|s| !s.as_os_str().is_empty())
            .ok_or_else(|| error::missing_field("source"))?;
        let key = match self.key.filter(|k| !k.is_empty()) {
            Some(key) => key,
            None => source
                .to_str()
                .ok_or_else(|| {
                    error::invalid_input(format!(
                        "source path {} is not valid UTF-8, set an explicit key",
                        source.display()
                    ))
                })?
                .to_owned(),
        };

        let file = tokio::fs::File::open(&source).await?;
        let content_length = self
            .handle
            .storage
            .put_object(&bucket, &key, file)
            .instrument(tracing::debug_span!(
                "upload",
                bucket = bucket.as_str(),
                key = key.as_str()
            ))
            .await?;

        tracing::debug!("uploaded {content_length} bytes from {}", source.display());
        Ok(UploadOutput {
            key,
            content_length,
        })
    }
}

/// Output from uploading a single object
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOutput {
    /// Key the object was stored under
    pub key: String,

    /// Number of bytes uploaded
    pub content_length: u64,
}

impl UploadOutput {
    /// Key the object was stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of bytes uploaded
    pub fn content_length(&self) -> u64 {
        self.content_length
    }
}
