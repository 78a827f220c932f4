/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::ProvideCredentials;

use crate::error::{self, Error};
use crate::storage::{S3Storage, SharedStorageService, StorageService};
use crate::Config;

/// Client for running bucket and object operations against object storage.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) handle: Arc<Handle>,
}

/// Whatever is needed to carry out operations: configuration and the storage service.
#[derive(Debug)]
pub(crate) struct Handle {
    pub(crate) config: Config,
    pub(crate) storage: SharedStorageService,
}

impl Client {
    /// Creates a new client from a config and any storage service implementation.
    pub fn new(config: Config, storage: impl StorageService + 'static) -> Client {
        let handle = Arc::new(Handle {
            config,
            storage: SharedStorageService::new(storage),
        });
        Client { handle }
    }

    /// Connect to Amazon S3 using the given configuration.
    ///
    /// Credentials are resolved eagerly so that a missing or broken credential
    /// setup is reported here rather than on the first operation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), s3_workflow::error::Error> {
    /// let config = s3_workflow::Config::builder().region("us-east-1").build();
    /// let client = s3_workflow::Client::connect(config).await?;
    /// let buckets = client.list_buckets().send().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: Config) -> Result<Client, Error> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region().to_owned()));
        if let Some(endpoint_url) = config.endpoint_url() {
            loader = loader.endpoint_url(endpoint_url);
        }
        if let Some(credentials) = config.credentials() {
            loader = loader.credentials_provider(credentials.clone());
        }
        let sdk_config = loader.load().await;

        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| error::connection_failed("no credentials provider configured"))?;
        provider
            .provide_credentials()
            .await
            .map_err(error::connection_failed)?;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style())
            .build();
        let storage = S3Storage::new(
            aws_sdk_s3::Client::from_conf(s3_config),
            config.region().to_owned(),
        );

        tracing::debug!(region = config.region(), "connected to storage service");
        Ok(Client::new(config, storage))
    }

    /// Returns the client's configuration
    pub fn config(&self) -> &Config {
        &self.handle.config
    }

    /// List every bucket visible to the configured credentials.
    ///
    /// Constructs a fluent builder for the
    /// [`ListBuckets`](crate::operation::list_buckets::ListBucketsFluentBuilder) operation.
    pub fn list_buckets(&self) -> crate::operation::list_buckets::ListBucketsFluentBuilder {
        crate::operation::list_buckets::ListBucketsFluentBuilder::new(self.handle.clone())
    }

    /// Create a bucket and wait until it exists.
    ///
    /// Constructs a fluent builder for the
    /// [`CreateBucket`](crate::operation::create_bucket::CreateBucketFluentBuilder) operation.
    pub fn create_bucket(&self) -> crate::operation::create_bucket::CreateBucketFluentBuilder {
        crate::operation::create_bucket::CreateBucketFluentBuilder::new(self.handle.clone())
    }

    /// Delete a bucket and wait until it no longer exists.
    ///
    /// Constructs a fluent builder for the
    /// [`DeleteBucket`](crate::operation::delete_bucket::DeleteBucketFluentBuilder) operation.
    pub fn delete_bucket(&self) -> crate::operation::delete_bucket::DeleteBucketFluentBuilder {
        crate::operation::delete_bucket::DeleteBucketFluentBuilder::new(self.handle.clone())
    }

    /// List every object key in a bucket.
    ///
    /// Constructs a fluent builder for the
    /// [`ListObjects`](crate::operation::list_objects::ListObjectsFluentBuilder) operation.
    pub fn list_objects(&self) -> crate::operation::list_objects::ListObjectsFluentBuilder {
        crate::operation::list_objects::ListObjectsFluentBuilder::new(self.handle.clone())
    }

    /// Upload a local file as a single object.
    ///
    /// Constructs a fluent builder for the
    /// [`Upload`](crate::operation::upload::UploadFluentBuilder) operation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// async fn upload_file(client: &s3_workflow::Client) -> Result<(), s3_workflow::error::Error> {
    ///     let output = client
    ///         .upload()
    ///         .bucket("my-bucket")
    ///         .source("serverless.yml")
    ///         .send()
    ///         .await?;
    ///     println!("uploaded {} bytes as {}", output.content_length(), output.key());
    ///     Ok(())
    /// }
    /// ```
    pub fn upload(&self) -> crate::operation::upload::UploadFluentBuilder {
        crate::operation::upload::UploadFluentBuilder::new(self.handle.clone())
    }

    /// Download a single object to a local file.
    ///
    /// Constructs a fluent builder for the
    /// [`Download`](crate::operation::download::DownloadFluentBuilder) operation.
    pub fn download(&self) -> crate::operation::download::DownloadFluentBuilder {
        crate::operation::download::DownloadFluentBuilder::new(self.handle.clone())
    }

    /// Delete a single object and wait until it no longer exists.
    ///
    /// Constructs a fluent builder for the
    /// [`DeleteObject`](crate::operation::delete_object::DeleteObjectFluentBuilder) operation.
    pub fn delete_object(&self) -> crate::operation::delete_object::DeleteObjectFluentBuilder {
        crate::operation::delete_object::DeleteObjectFluentBuilder::new(self.handle.clone())
    }
}

/// Connect to Amazon S3 using the given configuration.
///
/// Shorthand for [`Client::connect`].
pub async fn connect(config: Config) -> Result<Client, Error> {
    Client::connect(config).await
}
