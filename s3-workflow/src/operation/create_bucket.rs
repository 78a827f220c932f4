/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use tracing::Instrument;

use crate::error::Error;
use crate::types::Presence;

/// Fluent builder for creating a bucket
#[derive(Debug)]
pub struct CreateBucketFluentBuilder {
    handle: Arc<crate::client::Handle>,
    bucket: Option<String>,
}

impl CreateBucketFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            bucket: None,
        }
    }

    /// The name of the bucket to create
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// The name of the bucket to create
    pub fn get_bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Create the bucket, then block until the service reports it exists.
    ///
    /// The wait is bounded by [`Config::wait_timeout`](crate::Config::wait_timeout).
    pub async fn send(self) -> Result<(), Error> {
        let bucket = super::required("bucket", self.bucket)?;
        let storage = &self.handle.storage;
        let max_wait = self.handle.config.wait_timeout();

        async {
            storage.create_bucket(&bucket).await?;
            tracing::debug!("waiting for bucket to be created");
            storage
                .wait_for_bucket(&bucket, Presence::Present, max_wait)
                .await
        }
        .instrument(tracing::debug_span!("create-bucket", bucket = bucket.as_str()))
        .await
    }
}
