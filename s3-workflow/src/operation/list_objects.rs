/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use tracing::Instrument;

use crate::error::Error;
use crate::storage::SharedStorageService;
use crate::types::ObjectPage;

/// Fluent builder for listing every object key in a bucket
#[derive(Debug)]
pub struct ListObjectsFluentBuilder {
    handle: Arc<crate::client::Handle>,
    bucket: Option<String>,
    prefix: Option<String>,
}

impl ListObjectsFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            bucket: None,
            prefix: None,
        }
    }

    /// The bucket to list
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// The bucket to list
    pub fn get_bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Only list keys that begin with this prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Only list keys that begin with this prefix
    pub fn get_prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Return every key in the bucket.
    ///
    /// Continuation tokens are followed until the listing is complete, so the
    /// result is not limited to the service's first page. An empty bucket yields
    /// an empty list.
    pub async fn send(self) -> Result<Vec<String>, Error> {
        let bucket = super::required("bucket", self.bucket)?;
        let mut paginator =
            ListObjectsPaginator::new(self.handle.storage.clone(), bucket, self.prefix);

        let mut keys = Vec::new();
        while let Some(page) = paginator.next_page().await {
            keys.extend(page?.keys);
        }
        tracing::debug!("listed {} objects", keys.len());
        Ok(keys)
    }
}

/// Paginator over the pages of a single bucket listing.
#[derive(Debug)]
struct ListObjectsPaginator {
    storage: SharedStorageService,
    bucket: String,
    prefix: Option<String>,
    state: State,
}

#[derive(Debug, PartialEq)]
enum State {
    Paginating {
        // next continuation token to use
        next_token: Option<String>,
    },
    Done,
}

impl State {
    fn next_state(self, page: &ObjectPage) -> State {
        match self {
            State::Paginating { .. } => match &page.next_continuation_token {
                Some(token) => State::Paginating {
                    next_token: Some(token.clone()),
                },
                None => State::Done,
            },
            State::Done => State::Done,
        }
    }
}

impl ListObjectsPaginator {
    fn new(storage: SharedStorageService, bucket: String, prefix: Option<String>) -> Self {
        Self {
            storage,
            bucket,
            prefix,
            state: State::Paginating { next_token: None },
        }
    }

    async fn next_page(&mut self) -> Option<Result<ObjectPage, Error>> {
        let next_token = match &self.state {
            State::Done => return None,
            State::Paginating { next_token } => next_token.clone(),
        };

        let result = self
            .storage
            .list_objects_page(&self.bucket, self.prefix.as_deref(), next_token.as_deref())
            .instrument(tracing::debug_span!(
                "list-objects-page",
                bucket = self.bucket.as_str()
            ))
            .await;

        match result {
            Ok(page) => {
                let prev_state = std::mem::replace(&mut self.state, State::Done);
                self.state = prev_state.next_state(&page);
                Some(Ok(page))
            }
            Err(err) => {
                // don't keep paginating past a failed page
                self.state = State::Done;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::storage::in_memory::InMemoryStorage;
    use crate::storage::SharedStorageService;
    use crate::types::ObjectPage;
    use crate::{Client, Config};

    use super::{ListObjectsPaginator, State};

    fn page(keys: &[&str], next_token: Option<&str>) -> ObjectPage {
        ObjectPage::new(
            keys.iter().map(|k| (*k).to_owned()).collect(),
            next_token.map(str::to_owned),
        )
    }

    #[test]
    fn test_next_state() {
        let start = State::Paginating { next_token: None };

        let state2 = start.next_state(&page(&["k1", "k2"], Some("token1")));
        assert_eq!(
            state2,
            State::Paginating {
                next_token: Some("token1".to_owned())
            }
        );

        let state3 = state2.next_state(&page(&["k3"], None));
        assert_eq!(state3, State::Done);

        let state4 = state3.next_state(&page(&["k4"], Some("token2")));
        assert_eq!(state4, State::Done);
    }

    #[tokio::test]
    async fn test_paginator_stops_after_error() {
        let storage = SharedStorageService::new(InMemoryStorage::new());
        let mut paginator = ListObjectsPaginator::new(storage, "missing".to_owned(), None);

        let err = paginator.next_page().await.unwrap().unwrap_err();
        assert_eq!(&ErrorKind::NotFound, err.kind());
        assert!(paginator.next_page().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_bucket() {
        let client = Client::new(Config::default(), InMemoryStorage::new());
        client.create_bucket().bucket("b").send().await.unwrap();
        let keys = client.list_objects().bucket("b").send().await.unwrap();
        assert!(keys.is_empty());
    }
}
