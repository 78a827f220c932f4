/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::client::Waiters;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::Instrument;

use crate::config::DEFAULT_REGION;
use crate::error::Error;
use crate::storage::StorageService;
use crate::types::{ObjectPage, Presence};

/// [`StorageService`] backed by the Amazon S3 SDK client.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    region: String,
}

impl S3Storage {
    /// Create a storage service from an SDK client.
    ///
    /// `region` is used as the location constraint for new buckets.
    pub fn new(client: aws_sdk_s3::Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    /// The Amazon S3 client instance used to send requests to S3.
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }

    // us-east-1 rejects an explicit location constraint
    fn create_bucket_configuration(&self) -> Option<CreateBucketConfiguration> {
        if self.region == DEFAULT_REGION {
            return None;
        }

        let constraint = BucketLocationConstraint::from(self.region.as_str());
        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(constraint)
                .build(),
        )
    }
}

#[async_trait]
impl StorageService for S3Storage {
    async fn list_buckets(&self) -> Result<Vec<String>, Error> {
        let mut buckets = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let output = self
                .client
                .list_buckets()
                .set_continuation_token(continuation_token.take())
                .send()
                .instrument(tracing::debug_span!("send-list-buckets"))
                .await?;

            buckets.extend(
                output
                    .buckets()
                    .iter()
                    .filter_map(|bucket| bucket.name().map(str::to_owned)),
            );

            match output.continuation_token() {
                Some(token) if !token.is_empty() => continuation_token = Some(token.to_owned()),
                _ => break,
            }
        }
        Ok(buckets)
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), Error> {
        self.client
            .create_bucket()
            .bucket(bucket)
            .set_create_bucket_configuration(self.create_bucket_configuration())
            .send()
            .instrument(tracing::debug_span!("send-create-bucket", bucket))
            .await?;
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), Error> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .instrument(tracing::debug_span!("send-delete-bucket", bucket))
            .await?;
        Ok(())
    }

    async fn wait_for_bucket(
        &self,
        bucket: &str,
        presence: Presence,
        max_wait: Duration,
    ) -> Result<(), Error> {
        let span = tracing::debug_span!("wait-for-bucket", bucket, ?presence);
        match presence {
            Presence::Present => {
                self.client
                    .wait_until_bucket_exists()
                    .bucket(bucket)
                    .wait(max_wait)
                    .instrument(span)
                    .await?;
            }
            Presence::Absent => {
                self.client
                    .wait_until_bucket_not_exists()
                    .bucket(bucket)
                    .wait(max_wait)
                    .instrument(span)
                    .await?;
            }
        }
        Ok(())
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, Error> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(str::to_owned))
            .set_continuation_token(continuation_token.map(str::to_owned))
            .send()
            .instrument(tracing::debug_span!("send-list-objects-v2", bucket))
            .await?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_owned))
            .collect();

        let next_token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_owned)
        } else {
            None
        };

        Ok(ObjectPage::new(keys, next_token))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: tokio::fs::File,
    ) -> Result<u64, Error> {
        let content_length = body.metadata().await?.len();
        let body = ByteStream::read_from().file(body).build().await?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(content_length as i64)
            .body(body)
            .send()
            .instrument(tracing::debug_span!("send-put-object", bucket, key))
            .await?;
        Ok(content_length)
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        dest: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<u64, Error> {
        let mut output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .instrument(tracing::debug_span!("send-get-object", bucket, key))
            .await?;

        let mut written = 0u64;
        while let Some(chunk) = output.body.try_next().await? {
            dest.write_all(&chunk).await?;
            written += chunk.len() as u64;
            tracing::trace!("wrote chunk size: {}", chunk.len());
        }
        dest.flush().await?;
        Ok(written)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), Error> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .instrument(tracing::debug_span!("send-delete-object", bucket, key))
            .await?;
        Ok(())
    }

    async fn wait_for_object(
        &self,
        bucket: &str,
        key: &str,
        presence: Presence,
        max_wait: Duration,
    ) -> Result<(), Error> {
        let span = tracing::debug_span!("wait-for-object", bucket, key, ?presence);
        match presence {
            Presence::Present => {
                self.client
                    .wait_until_object_exists()
                    .bucket(bucket)
                    .key(key)
                    .wait(max_wait)
                    .instrument(span)
                    .await?;
            }
            Presence::Absent => {
                self.client
                    .wait_until_object_not_exists()
                    .bucket(bucket)
                    .key(key)
                    .wait(max_wait)
                    .instrument(span)
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    use aws_sdk_s3::config::retry::RetryConfig;
    use aws_sdk_s3::config::{
        BehaviorVersion, Credentials, Region, RequestChecksumCalculation,
        StalledStreamProtectionConfig,
    };
    use aws_sdk_s3::operation::create_bucket::CreateBucketOutput;
    use aws_sdk_s3::operation::delete_bucket::{DeleteBucketError, DeleteBucketOutput};
    use aws_sdk_s3::operation::delete_object::DeleteObjectOutput;
    use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
    use aws_sdk_s3::operation::list_buckets::ListBucketsOutput;
    use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::error::NoSuchKey;
    use aws_sdk_s3::types::{Bucket, BucketLocationConstraint, Object};
    use aws_smithy_async::test_util::instant_time_and_sleep;
    use aws_smithy_http_client::test_util::{capture_request, infallible_client_fn};
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use aws_smithy_types::error::ErrorMetadata;

    use super::S3Storage;
    use crate::error::ErrorKind;
    use crate::storage::StorageService;
    use crate::types::{ObjectPage, Presence};

    fn http_test_config() -> aws_sdk_s3::config::Builder {
        aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKID", "SECRET", None, None, "test"))
            .retry_config(RetryConfig::disabled())
            .stalled_stream_protection(StalledStreamProtectionConfig::disabled())
    }

    /// Storage whose HTTP layer answers every request with an empty `status` response.
    ///
    /// Sleeps complete immediately and advance the client's clock, so waiters
    /// run their whole polling schedule without real delays.
    fn fixed_status_storage(status: u16) -> (S3Storage, Arc<AtomicUsize>) {
        let requests = Arc::new(AtomicUsize::new(0));
        let http_client = {
            let requests = requests.clone();
            infallible_client_fn(move |_req| {
                requests.fetch_add(1, Ordering::SeqCst);
                http_1x::Response::builder()
                    .status(status)
                    .body("")
                    .unwrap()
            })
        };
        let (time_source, sleep) = instant_time_and_sleep(SystemTime::now());
        let config = http_test_config()
            .http_client(http_client)
            .time_source(time_source)
            .sleep_impl(sleep)
            .build();
        let storage = S3Storage::new(aws_sdk_s3::Client::from_conf(config), "us-east-1");
        (storage, requests)
    }

    fn list_buckets_resp(token: Option<&'static str>, names: &[&'static str]) -> ListBucketsOutput {
        let buckets = names
            .iter()
            .map(|name| Bucket::builder().name(*name).build())
            .collect();
        ListBucketsOutput::builder()
            .set_buckets(Some(buckets))
            .set_continuation_token(token.map(str::to_owned))
            .build()
    }

    #[tokio::test]
    async fn test_list_buckets_follows_continuation_token() {
        let page1 = mock!(aws_sdk_s3::Client::list_buckets)
            .match_requests(|input| input.continuation_token().is_none())
            .then_output(|| list_buckets_resp(Some("token1"), &["b1", "b2"]));
        let page2 = mock!(aws_sdk_s3::Client::list_buckets)
            .match_requests(|input| input.continuation_token() == Some("token1"))
            .then_output(|| list_buckets_resp(None, &["b3"]));
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&page1, &page2]);

        let storage = S3Storage::new(client, "us-east-1");
        let buckets = storage.list_buckets().await.unwrap();
        assert_eq!(vec!["b1", "b2", "b3"], buckets);
    }

    #[tokio::test]
    async fn test_list_buckets_empty_account() {
        let empty = mock!(aws_sdk_s3::Client::list_buckets)
            .then_output(|| ListBucketsOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, &[&empty]);

        let storage = S3Storage::new(client, "us-east-1");
        assert!(storage.list_buckets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_bucket_sets_location_constraint_outside_us_east_1() {
        let create = mock!(aws_sdk_s3::Client::create_bucket)
            .match_requests(|input| {
                input.bucket() == Some("my-bucket")
                    && input
                        .create_bucket_configuration()
                        .and_then(|c| c.location_constraint())
                        == Some(&BucketLocationConstraint::EuWest1)
            })
            .then_output(|| CreateBucketOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, &[&create]);

        let storage = S3Storage::new(client, "eu-west-1");
        storage.create_bucket("my-bucket").await.unwrap();
        assert_eq!(1, create.num_calls());
    }

    #[tokio::test]
    async fn test_create_bucket_omits_location_constraint_in_us_east_1() {
        let create = mock!(aws_sdk_s3::Client::create_bucket)
            .match_requests(|input| input.create_bucket_configuration().is_none())
            .then_output(|| CreateBucketOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, &[&create]);

        let storage = S3Storage::new(client, "us-east-1");
        storage.create_bucket("my-bucket").await.unwrap();
        assert_eq!(1, create.num_calls());
    }

    #[tokio::test]
    async fn test_list_objects_page() {
        let list = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|input| {
                input.bucket() == Some("test-bucket") && input.continuation_token() == Some("abc")
            })
            .then_output(|| {
                ListObjectsV2Output::builder()
                    .is_truncated(true)
                    .next_continuation_token("def")
                    .contents(Object::builder().key("k1").build())
                    .contents(Object::builder().key("k2").build())
                    .build()
            });
        let client = mock_client!(aws_sdk_s3, &[&list]);

        let storage = S3Storage::new(client, "us-east-1");
        let page = storage
            .list_objects_page("test-bucket", None, Some("abc"))
            .await
            .unwrap();
        assert_eq!(
            ObjectPage::new(vec!["k1".to_owned(), "k2".to_owned()], Some("def".to_owned())),
            page
        );
    }

    #[tokio::test]
    async fn test_get_object_writes_body() {
        let get = mock!(aws_sdk_s3::Client::get_object)
            .match_requests(|input| input.key() == Some("a.txt"))
            .then_output(|| {
                GetObjectOutput::builder()
                    .body(ByteStream::from_static(b"hello world"))
                    .build()
            });
        let client = mock_client!(aws_sdk_s3, &[&get]);

        let storage = S3Storage::new(client, "us-east-1");
        let mut dest = Vec::new();
        let written = storage
            .get_object("test-bucket", "a.txt", &mut dest)
            .await
            .unwrap();
        assert_eq!(11, written);
        assert_eq!(b"hello world".to_vec(), dest);
    }

    #[tokio::test]
    async fn test_get_object_missing_key_is_not_found() {
        let get = mock!(aws_sdk_s3::Client::get_object).then_error(|| {
            GetObjectError::NoSuchKey(
                NoSuchKey::builder()
                    .meta(ErrorMetadata::builder().code("NoSuchKey").build())
                    .build(),
            )
        });
        let client = mock_client!(aws_sdk_s3, &[&get]);

        let storage = S3Storage::new(client, "us-east-1");
        let mut dest = Vec::new();
        let err = storage
            .get_object("test-bucket", "missing", &mut dest)
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::NotFound, err.kind());
        assert!(dest.is_empty());
    }

    #[tokio::test]
    async fn test_put_object_sends_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        let body = tokio::fs::File::open(file.path()).await.unwrap();

        let (http_client, request) = capture_request(None);
        let config = http_test_config()
            .http_client(http_client)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();
        let storage = S3Storage::new(aws_sdk_s3::Client::from_conf(config), "us-east-1");

        let stored = storage
            .put_object("test-bucket", "a.txt", body)
            .await
            .unwrap();
        assert_eq!(11, stored);

        let request = request.expect_request();
        assert_eq!("PUT", request.method());
        assert!(request.uri().contains("a.txt"));
        assert_eq!(Some("11"), request.headers().get("content-length"));
        let sent = ByteStream::new(request.into_body())
            .collect()
            .await
            .unwrap()
            .into_bytes();
        assert_eq!(&b"hello world"[..], &sent[..]);
    }

    #[tokio::test]
    async fn test_delete_object() {
        let delete = mock!(aws_sdk_s3::Client::delete_object)
            .match_requests(|input| {
                input.bucket() == Some("test-bucket") && input.key() == Some("a.txt")
            })
            .then_output(|| DeleteObjectOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, &[&delete]);

        let storage = S3Storage::new(client, "us-east-1");
        storage.delete_object("test-bucket", "a.txt").await.unwrap();
        assert_eq!(1, delete.num_calls());
    }

    #[tokio::test]
    async fn test_delete_bucket() {
        let delete = mock!(aws_sdk_s3::Client::delete_bucket)
            .match_requests(|input| input.bucket() == Some("test-bucket"))
            .then_output(|| DeleteBucketOutput::builder().build());
        let client = mock_client!(aws_sdk_s3, &[&delete]);

        let storage = S3Storage::new(client, "us-east-1");
        storage.delete_bucket("test-bucket").await.unwrap();
        assert_eq!(1, delete.num_calls());
    }

    #[tokio::test]
    async fn test_delete_missing_bucket_is_not_found() {
        let delete = mock!(aws_sdk_s3::Client::delete_bucket).then_error(|| {
            DeleteBucketError::generic(ErrorMetadata::builder().code("NoSuchBucket").build())
        });
        let client = mock_client!(aws_sdk_s3, &[&delete]);

        let storage = S3Storage::new(client, "us-east-1");
        let err = storage.delete_bucket("missing").await.unwrap_err();
        assert_eq!(&ErrorKind::NotFound, err.kind());
    }

    #[tokio::test]
    async fn test_wait_for_bucket_absent_succeeds_on_not_found() {
        let (storage, requests) = fixed_status_storage(404);
        storage
            .wait_for_bucket("test-bucket", Presence::Absent, Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(1, requests.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_wait_for_bucket_absent_times_out_while_bucket_exists() {
        let (storage, requests) = fixed_status_storage(200);
        let err = storage
            .wait_for_bucket("test-bucket", Presence::Absent, Duration::from_secs(30))
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::WaitTimedOut, err.kind());
        assert!(requests.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_wait_for_bucket_present() {
        let (storage, requests) = fixed_status_storage(200);
        storage
            .wait_for_bucket("test-bucket", Presence::Present, Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(1, requests.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_wait_for_bucket_present_times_out() {
        let (storage, requests) = fixed_status_storage(404);
        let err = storage
            .wait_for_bucket("test-bucket", Presence::Present, Duration::from_secs(30))
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::WaitTimedOut, err.kind());
        assert!(requests.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn test_wait_for_bucket_unexpected_status_is_service_error() {
        let (storage, requests) = fixed_status_storage(403);
        let err = storage
            .wait_for_bucket("test-bucket", Presence::Absent, Duration::from_secs(30))
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::ServiceError, err.kind());
        assert_eq!(1, requests.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_wait_for_object_absent_succeeds_on_not_found() {
        let (storage, requests) = fixed_status_storage(404);
        storage
            .wait_for_object(
                "test-bucket",
                "a.txt",
                Presence::Absent,
                Duration::from_secs(30),
            )
            .await
            .unwrap();
        assert_eq!(1, requests.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_wait_for_object_present_times_out() {
        let (storage, _requests) = fixed_status_storage(404);
        let err = storage
            .wait_for_object(
                "test-bucket",
                "a.txt",
                Presence::Present,
                Duration::from_secs(30),
            )
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::WaitTimedOut, err.kind());
    }
}
