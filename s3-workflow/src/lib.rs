/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */
#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

//! Bucket and object workflows for Amazon S3.
//!
//! A thin layer over the AWS SDK for Rust that runs single, sequential bucket and
//! object operations. Every operation returns a `Result`; operations that change
//! what exists (creating or deleting a bucket, deleting an object) block until the
//! service reports the change using the SDK waiters.
//!
//! # Examples
//!
//! Connect and list buckets:
//!
//! ```no_run
//! # async fn example() -> Result<(), s3_workflow::error::Error> {
//! let config = s3_workflow::Config::builder().region("us-east-1").build();
//! let client = s3_workflow::connect(config).await?;
//!
//! for bucket in client.list_buckets().send().await? {
//!     println!("{bucket}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Crate Features
//!
//! - `test-util`: Enables the in-memory storage service for tests. DO NOT ENABLE IN PRODUCTION.

/// Error types emitted by `s3-workflow`
pub mod error;

/// Common types used by `s3-workflow`
pub mod types;

/// Client configuration
pub mod config;

/// Storage service abstraction and implementations
pub mod storage;

/// Workflow client
pub mod client;

/// Bucket and object operations
pub mod operation;

/// Sequenced workflow driver
pub mod driver;

pub use self::client::{connect, Client};
pub use self::config::Config;
