/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! In-memory implementation of the StorageService trait.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::RwLock;

use crate::error::{Error, ErrorKind};
use crate::storage::StorageService;
use crate::types::{ObjectPage, Presence};

type Objects = BTreeMap<String, Bytes>;

/// An in-memory implementation of the [`StorageService`] trait.
///
/// Buckets and objects live in sorted maps, so listings come back in
/// lexicographic key order. Changes are visible immediately; waiters succeed
/// when the state already matches and time out otherwise.
#[derive(Debug)]
pub struct InMemoryStorage {
    // bucket -> (key -> content)
    buckets: RwLock<BTreeMap<String, Objects>>,
    page_size: usize,
    requests: AtomicUsize,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create an empty storage service.
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(BTreeMap::new()),
            page_size: 1000,
            requests: AtomicUsize::new(0),
        }
    }

    /// Limit how many keys a single listing page may hold.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Number of requests served so far, including waiter polls.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Contents of an object, if it exists.
    pub async fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        let buckets = self.buckets.read().await;
        buckets.get(bucket).and_then(|objects| objects.get(key)).cloned()
    }

    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

fn no_such_bucket(bucket: &str) -> Error {
    Error::new(ErrorKind::NotFound, format!("NoSuchBucket: {bucket}"))
}

fn wait_timed_out(resource: String, presence: Presence) -> Error {
    Error::new(
        ErrorKind::WaitTimedOut,
        format!("{resource} did not become {presence:?}"),
    )
}

#[async_trait]
impl StorageService for InMemoryStorage {
    async fn list_buckets(&self) -> Result<Vec<String>, Error> {
        self.record_request();
        let buckets = self.buckets.read().await;
        Ok(buckets.keys().cloned().collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), Error> {
        self.record_request();
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(bucket) {
            return Err(Error::new(
                ErrorKind::ServiceError,
                format!("BucketAlreadyOwnedByYou: {bucket}"),
            ));
        }
        buckets.insert(bucket.to_owned(), Objects::new());
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), Error> {
        self.record_request();
        let mut buckets = self.buckets.write().await;
        match buckets.get(bucket) {
            None => Err(no_such_bucket(bucket)),
            Some(objects) if !objects.is_empty() => Err(Error::new(
                ErrorKind::ServiceError,
                format!("BucketNotEmpty: {bucket}"),
            )),
            Some(_) => {
                buckets.remove(bucket);
                Ok(())
            }
        }
    }

    async fn wait_for_bucket(
        &self,
        bucket: &str,
        presence: Presence,
        _max_wait: Duration,
    ) -> Result<(), Error> {
        self.record_request();
        let exists = self.buckets.read().await.contains_key(bucket);
        match (presence, exists) {
            (Presence::Present, true) | (Presence::Absent, false) => Ok(()),
            _ => Err(wait_timed_out(format!("bucket {bucket}"), presence)),
        }
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, Error> {
        self.record_request();
        let buckets = self.buckets.read().await;
        let objects = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;

        // the continuation token is the last key of the previous page
        let mut keys = objects
            .keys()
            .filter(|key| continuation_token.map_or(true, |token| key.as_str() > token))
            .filter(|key| prefix.map_or(true, |prefix| key.starts_with(prefix)))
            .take(self.page_size + 1)
            .cloned()
            .collect::<Vec<_>>();

        let next_token = if keys.len() > self.page_size {
            keys.truncate(self.page_size);
            keys.last().cloned()
        } else {
            None
        };

        Ok(ObjectPage::new(keys, next_token))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        mut body: tokio::fs::File,
    ) -> Result<u64, Error> {
        self.record_request();
        let mut content = Vec::new();
        body.read_to_end(&mut content).await?;

        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        let len = content.len() as u64;
        objects.insert(key.to_owned(), Bytes::from(content));
        Ok(len)
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        dest: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, Error> {
        self.record_request();
        let content = {
            let buckets = self.buckets.read().await;
            let objects = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
            objects
                .get(key)
                .cloned()
                .ok_or_else(|| Error::new(ErrorKind::NotFound, format!("NoSuchKey: {key}")))?
        };

        dest.write_all(&content).await?;
        dest.flush().await?;
        Ok(content.len() as u64)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), Error> {
        self.record_request();
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket))?;
        // deleting a missing key succeeds, as it does in S3
        objects.remove(key);
        Ok(())
    }

    async fn wait_for_object(
        &self,
        bucket: &str,
        key: &str,
        presence: Presence,
        _max_wait: Duration,
    ) -> Result<(), Error> {
        self.record_request();
        let exists = self
            .buckets
            .read()
            .await
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key));
        match (presence, exists) {
            (Presence::Present, true) | (Presence::Absent, false) => Ok(()),
            _ => Err(wait_timed_out(format!("object {bucket}/{key}"), presence)),
        }
    }
}
