/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use tracing::Instrument;

use crate::error::Error;
use crate::types::Presence;

/// Fluent builder for deleting a single object
#[derive(Debug)]
pub struct DeleteObjectFluentBuilder {
    handle: Arc<crate::client::Handle>,
    bucket: Option<String>,
    key: Option<String>,
}

impl DeleteObjectFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            bucket: None,
            key: None,
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

    /// Key of the object to delete
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Key of the object to delete
    pub fn get_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Delete the object, then block until the service reports it no longer exists.
    pub async fn send(self) -> Result<(), Error> {
        let bucket = super::required("bucket", self.bucket)?;
        let key = super::required("key", self.key)?;
        let storage = &self.handle.storage;
        let max_wait = self.handle.config.wait_timeout();

        async {
            storage.delete_object(&bucket, &key).await?;
            tracing::debug!("waiting for object to be deleted");
            storage
                .wait_for_object(&bucket, &key, Presence::Absent, max_wait)
                .await
        }
        .instrument(tracing::debug_span!(
            "delete-object",
            bucket = bucket.as_str(),
            key = key.as_str()
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::storage::in_memory::InMemoryStorage;
    use crate::{Client, Config};

    #[tokio::test]
    async fn test_key_required() {
        let client = Client::new(Config::default(), InMemoryStorage::new());
        let err = client
            .delete_object()
            .bucket("b")
            .send()
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }
}
