/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use aws_smithy_types::error::display::DisplayErrorContext;

use crate::error::{self, Error};
use crate::Client;

/// Bucket that is deleted and re-created by the workflow
pub const DEFAULT_SCRATCH_BUCKET: &str = "aws-sample-bucket-1";

/// Bucket that objects are uploaded to, listed, downloaded and deleted from
pub const DEFAULT_OBJECT_BUCKET: &str = "iam-store";

/// Local file uploaded by the workflow
pub const DEFAULT_UPLOAD_SOURCE: &str = "serverless.yml";

/// Local file the uploaded object is downloaded to
pub const DEFAULT_DOWNLOAD_DESTINATION: &str = "serverless1.yml";

/// The names the workflow operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Bucket that is deleted and then created again
    pub scratch_bucket: String,

    /// Bucket the object steps run against
    pub object_bucket: String,

    /// Local file to upload; its path is also the object key and must be valid UTF-8
    pub upload_source: PathBuf,

    /// Local file to download the object to
    pub download_destination: PathBuf,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            scratch_bucket: DEFAULT_SCRATCH_BUCKET.to_owned(),
            object_bucket: DEFAULT_OBJECT_BUCKET.to_owned(),
            upload_source: PathBuf::from(DEFAULT_UPLOAD_SOURCE),
            download_destination: PathBuf::from(DEFAULT_DOWNLOAD_DESTINATION),
        }
    }
}

impl Plan {
    fn object_key(&self) -> Option<String> {
        self.upload_source.to_str().map(str::to_owned)
    }

    fn unusable_key(&self) -> Error {
        error::invalid_input(format!(
            "upload source {} is not valid UTF-8 and cannot be used as an object key",
            self.upload_source.display()
        ))
    }
}

/// The individual steps of a workflow run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Delete the scratch bucket
    DeleteBucket,
    /// List all buckets
    ListBuckets,
    /// Create the scratch bucket
    CreateBucket,
    /// Upload the source file
    Upload,
    /// List objects after the upload
    ListObjectsAfterUpload,
    /// Download the uploaded object
    Download,
    /// Delete the uploaded object
    DeleteObject,
    /// List objects after the delete
    ListObjectsAfterDelete,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::DeleteBucket => "delete-bucket",
            Step::ListBuckets => "list-buckets",
            Step::CreateBucket => "create-bucket",
            Step::Upload => "upload",
            Step::ListObjectsAfterUpload => "list-objects",
            Step::Download => "download",
            Step::DeleteObject => "delete-object",
            Step::ListObjectsAfterDelete => "list-objects",
        };
        f.write_str(name)
    }
}

/// Outcome of one workflow step
#[derive(Debug)]
pub struct StepReport {
    step: Step,
    error: Option<Error>,
}

impl StepReport {
    /// The step this report is for
    pub fn step(&self) -> Step {
        self.step
    }

    /// The error the step failed with, `None` if it succeeded
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }
}

/// Outcome of a full workflow run
#[derive(Debug, Default)]
pub struct RunReport {
    steps: Vec<StepReport>,
}

impl RunReport {
    /// Every step, in execution order
    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    /// Steps that failed
    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.error.is_some())
    }

    /// `true` if every step succeeded
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Runs the fixed bucket and object workflow, printing progress to `out`.
///
/// A failing step is reported and recorded; the run always continues with
/// the next step.
#[derive(Debug)]
pub struct Driver<W> {
    client: Client,
    out: W,
}

impl<W: Write> Driver<W> {
    /// Create a driver printing to `out`
    pub fn new(client: Client, out: W) -> Self {
        Self { client, out }
    }

    /// Consume the driver, returning the output sink
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Execute every step of `plan` in order.
    pub async fn run(&mut self, plan: &Plan) -> RunReport {
        let mut report = RunReport::default();
        let key = plan.object_key();

        let result = self
            .client
            .delete_bucket()
            .bucket(&plan.scratch_bucket)
            .send()
            .await;
        if result.is_ok() {
            self.print(format_args!("Bucket {:?} deleted", plan.scratch_bucket));
        }
        self.record(&mut report, Step::DeleteBucket, result);

        let result = self.client.list_buckets().send().await;
        let result = result.map(|buckets| self.print(format_args!("buckets: {buckets:?}")));
        self.record(&mut report, Step::ListBuckets, result);

        let result = self
            .client
            .create_bucket()
            .bucket(&plan.scratch_bucket)
            .send()
            .await;
        if result.is_ok() {
            self.print(format_args!(
                "Bucket {:?} successfully created",
                plan.scratch_bucket
            ));
        }
        self.record(&mut report, Step::CreateBucket, result);

        let result = self
            .client
            .upload()
            .bucket(&plan.object_bucket)
            .source(&plan.upload_source)
            .send()
            .await;
        let result = result.map(|output| {
            self.print(format_args!(
                "uploaded {} bytes to {:?}",
                output.content_length(),
                output.key()
            ))
        });
        self.record(&mut report, Step::Upload, result);

        self.list_objects(&mut report, Step::ListObjectsAfterUpload, plan)
            .await;

        let result = match &key {
            Some(key) => {
                self.client
                    .download()
                    .bucket(&plan.object_bucket)
                    .key(key)
                    .destination(&plan.download_destination)
                    .send()
                    .await
            }
            None => Err(plan.unusable_key()),
        };
        let result = result.map(|output| {
            self.print(format_args!(
                "file: {} ({} bytes)",
                output.destination().display(),
                output.content_length()
            ))
        });
        self.record(&mut report, Step::Download, result);

        let result = match &key {
            Some(key) => {
                let result = self
                    .client
                    .delete_object()
                    .bucket(&plan.object_bucket)
                    .key(key)
                    .send()
                    .await;
                if result.is_ok() {
                    self.print(format_args!("Object {key:?} deleted"));
                }
                result
            }
            None => Err(plan.unusable_key()),
        };
        self.record(&mut report, Step::DeleteObject, result);

        self.list_objects(&mut report, Step::ListObjectsAfterDelete, plan)
            .await;

        report
    }

    async fn list_objects(&mut self, report: &mut RunReport, step: Step, plan: &Plan) {
        let result = self
            .client
            .list_objects()
            .bucket(&plan.object_bucket)
            .send()
            .await;
        let result = result.map(|objects| self.print(format_args!("objects: {objects:?}")));
        self.record(report, step, result);
    }

    fn record(&mut self, report: &mut RunReport, step: Step, result: Result<(), Error>) {
        let error = match result {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!("{step} failed: {}", DisplayErrorContext(&err));
                self.print(format_args!("{step} failed: {err}"));
                Some(err)
            }
        };
        report.steps.push(StepReport { step, error });
    }

    fn print(&mut self, line: fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.out, "{line}") {
            tracing::warn!("failed to write driver output: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Plan, Step, DEFAULT_OBJECT_BUCKET, DEFAULT_SCRATCH_BUCKET};

    #[test]
    fn test_default_plan() {
        let plan = Plan::default();
        assert_eq!(DEFAULT_SCRATCH_BUCKET, plan.scratch_bucket);
        assert_eq!(DEFAULT_OBJECT_BUCKET, plan.object_bucket);
        assert_eq!(Some("serverless.yml".to_owned()), plan.object_key());
    }

    #[test]
    fn test_step_display() {
        assert_eq!("create-bucket", Step::CreateBucket.to_string());
        assert_eq!("list-objects", Step::ListObjectsAfterDelete.to_string());
    }
}
