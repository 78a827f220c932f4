/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::{self, Error};

/// Types for the list buckets operation
pub mod list_buckets;

/// Types for the create bucket operation
pub mod create_bucket;

/// Types for the delete bucket operation
pub mod delete_bucket;

/// Types for listing the objects of a bucket
pub mod list_objects;

/// Types for single object upload operation
pub mod upload;

/// Types for single object download operation
pub mod download;

/// Types for the delete object operation
pub mod delete_object;

/// Unwrap a required, non-empty input field.
pub(crate) fn required(field: &'static str, value: Option<String>) -> Result<String, Error> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| error::missing_field(field))
}
