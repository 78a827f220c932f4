/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
//! Storage service backends.
//!
//! This module provides the `StorageService` trait and its implementations.
//! Operations on the [`Client`](crate::Client) talk to object storage exclusively
//! through this trait, which keeps the workflow logic independent of the network
//! layer. The production implementation is [`S3Storage`], backed by the AWS SDK.
//! An in-memory implementation is available behind the `test-util` feature.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::error::Error;
use crate::types::{ObjectPage, Presence};

mod sdk;
pub use sdk::S3Storage;

/// In-memory storage service for tests
#[cfg(any(test, feature = "test-util"))]
pub mod in_memory;

/// An object storage service.
///
/// Every method performs (at most) one logical request. Implementations are not
/// expected to retry beyond whatever their transport does internally.
#[async_trait]
pub trait StorageService: Send + Sync + Debug {
    /// List the names of every bucket visible to the caller.
    ///
    /// Implementations return the complete listing, following any pagination
    /// the underlying service applies.
    async fn list_buckets(&self) -> Result<Vec<String>, Error>;

    /// Issue a bucket creation request.
    async fn create_bucket(&self, bucket: &str) -> Result<(), Error>;

    /// Issue a bucket deletion request.
    async fn delete_bucket(&self, bucket: &str) -> Result<(), Error>;

    /// Block until `bucket` reaches the given [`Presence`] or `max_wait` elapses.
    async fn wait_for_bucket(
        &self,
        bucket: &str,
        presence: Presence,
        max_wait: Duration,
    ) -> Result<(), Error>;

    /// Fetch a single page of object keys.
    ///
    /// # Arguments
    ///
    /// * `bucket` - The bucket to list
    /// * `prefix` - Only return keys starting with this prefix
    /// * `continuation_token` - Token returned with the previous page, `None` for the first page
    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, Error>;

    /// Store the contents of `body` as object `key`.
    ///
    /// The file handle is owned by the call and released when it returns.
    /// Returns the number of bytes stored.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: tokio::fs::File,
    ) -> Result<u64, Error>;

    /// Stream the contents of object `key` into `dest`.
    ///
    /// Returns the number of bytes written.
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        dest: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, Error>;

    /// Issue an object deletion request.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), Error>;

    /// Block until object `key` reaches the given [`Presence`] or `max_wait` elapses.
    async fn wait_for_object(
        &self,
        bucket: &str,
        key: &str,
        presence: Presence,
        max_wait: Duration,
    ) -> Result<(), Error>;
}

#[async_trait]
impl<T> StorageService for Arc<T>
where
    T: StorageService + ?Sized,
{
    async fn list_buckets(&self) -> Result<Vec<String>, Error> {
        (**self).list_buckets().await
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), Error> {
        (**self).create_bucket(bucket).await
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), Error> {
        (**self).delete_bucket(bucket).await
    }

    async fn wait_for_bucket(
        &self,
        bucket: &str,
        presence: Presence,
        max_wait: Duration,
    ) -> Result<(), Error> {
        (**self).wait_for_bucket(bucket, presence, max_wait).await
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, Error> {
        (**self)
            .list_objects_page(bucket, prefix, continuation_token)
            .await
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: tokio::fs::File,
    ) -> Result<u64, Error> {
        (**self).put_object(bucket, key, body).await
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        dest: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, Error> {
        (**self).get_object(bucket, key, dest).await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), Error> {
        (**self).delete_object(bucket, key).await
    }

    async fn wait_for_object(
        &self,
        bucket: &str,
        key: &str,
        presence: Presence,
        max_wait: Duration,
    ) -> Result<(), Error> {
        (**self)
            .wait_for_object(bucket, key, presence, max_wait)
            .await
    }
}

/// A [`StorageService`] that can be shared between client clones.
#[derive(Debug, Clone)]
pub struct SharedStorageService(Arc<dyn StorageService>);

impl SharedStorageService {
    /// Wrap a storage service implementation
    pub fn new(service: impl StorageService + 'static) -> Self {
        Self(Arc::new(service))
    }
}

impl std::ops::Deref for SharedStorageService {
    type Target = dyn StorageService;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
