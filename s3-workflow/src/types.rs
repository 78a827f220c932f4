/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// The state a bucket or object is expected to reach before a waiter returns.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Presence {
    /// The resource must be observable (e.g. `HeadBucket` succeeds).
    Present,

    /// The resource must no longer be observable.
    Absent,
}

/// A single page of object keys returned from a listing request.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ObjectPage {
    /// Object keys contained in this page, in service order
    pub keys: Vec<String>,

    /// Token to pass to the next listing request, `None` if this is the last page
    pub next_continuation_token: Option<String>,
}

impl ObjectPage {
    /// Create a page from keys and an optional continuation token
    pub fn new(keys: Vec<String>, next_continuation_token: Option<String>) -> Self {
        Self {
            keys,
            next_continuation_token,
        }
    }
}
