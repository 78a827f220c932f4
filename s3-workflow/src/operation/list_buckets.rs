/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use tracing::Instrument;

use crate::error::Error;

/// Fluent builder for listing the buckets visible to the client's credentials
#[derive(Debug)]
pub struct ListBucketsFluentBuilder {
    handle: Arc<crate::client::Handle>,
}

impl ListBucketsFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self { handle }
    }

    /// Return the name of every bucket, in the order the service reports them.
    ///
    /// An account without buckets yields an empty list.
    pub async fn send(self) -> Result<Vec<String>, Error> {
        let buckets = self
            .handle
            .storage
            .list_buckets()
            .instrument(tracing::debug_span!("list-buckets"))
            .await?;
        tracing::debug!("listed {} buckets", buckets.len());
        Ok(buckets)
    }
}
