/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use tracing::Instrument;

use crate::error::Error;
use crate::types::Presence;

/// Fluent builder for deleting a bucket
#[derive(Debug)]
pub struct DeleteBucketFluentBuilder {
    handle: Arc<crate::client::Handle>,
    bucket: Option<String>,
}

impl DeleteBucketFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            bucket: None,
        }
    }

    /// The name of the bucket to delete
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// The name of the bucket to delete
    pub fn get_bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Delete the bucket, then block until the service reports it no longer exists.
    ///
    /// The bucket must be empty.
    pub async fn send(self) -> Result<(), Error> {
        let bucket = super::required("bucket", self.bucket)?;
        let storage = &self.handle.storage;
        let max_wait = self.handle.config.wait_timeout();

        async {
            storage.delete_bucket(&bucket).await?;
            tracing::debug!("waiting for bucket to be deleted");
            storage
                .wait_for_bucket(&bucket, Presence::Absent, max_wait)
                .await
        }
        .instrument(tracing::debug_span!("delete-bucket", bucket = bucket.as_str()))
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::storage::in_memory::InMemoryStorage;
    use crate::{Client, Config};

    #[tokio::test]
    async fn test_delete_bucket_waits_for_absence() {
        let client = Client::new(Config::default(), InMemoryStorage::new());
        client.create_bucket().bucket("b1").send().await.unwrap();
        client.delete_bucket().bucket("b1").send().await.unwrap();
        assert!(client.list_buckets().send().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_bucket() {
        let client = Client::new(Config::default(), InMemoryStorage::new());
        let err = client.delete_bucket().bucket("nope").send().await.unwrap_err();
        assert_eq!(&ErrorKind::NotFound, err.kind());
    }
}
