/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use aws_sdk_s3::error::DisplayErrorContext;
use clap::Parser;
use s3_workflow::config::DEFAULT_REGION;
use s3_workflow::driver::{
    Driver, Plan, DEFAULT_DOWNLOAD_DESTINATION, DEFAULT_OBJECT_BUCKET, DEFAULT_SCRATCH_BUCKET,
    DEFAULT_UPLOAD_SOURCE,
};

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "s3-workflow")]
#[command(
    about = "Runs a fixed sequence of bucket and object operations against Amazon S3."
)]
pub struct Args {
    /// Region to send requests to
    #[arg(long, default_value = DEFAULT_REGION)]
    region: String,

    /// Custom endpoint for S3 compatible services
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Use path style bucket addressing
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    force_path_style: bool,

    /// Bucket that is deleted and re-created
    #[arg(long, default_value = DEFAULT_SCRATCH_BUCKET)]
    scratch_bucket: String,

    /// Bucket the object operations run against
    #[arg(long, default_value = DEFAULT_OBJECT_BUCKET)]
    bucket: String,

    /// Local file to upload, its path is used as the object key
    #[arg(long, default_value = DEFAULT_UPLOAD_SOURCE)]
    source: PathBuf,

    /// Local file to download the object to
    #[arg(long, default_value = DEFAULT_DOWNLOAD_DESTINATION)]
    download_to: PathBuf,
}

impl Args {
    fn config(&self) -> s3_workflow::Config {
        let mut builder = s3_workflow::Config::builder()
            .region(&self.region)
            .force_path_style(self.force_path_style);
        if let Some(endpoint_url) = &self.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        builder.build()
    }

    fn plan(&self) -> Plan {
        Plan {
            scratch_bucket: self.scratch_bucket.clone(),
            object_bucket: self.bucket.clone(),
            upload_source: self.source.clone(),
            download_destination: self.download_to.clone(),
        }
    }
}

async fn run(args: Args) -> Result<(), BoxError> {
    let client = s3_workflow::connect(args.config()).await?;

    let mut driver = Driver::new(client, std::io::stdout());
    let report = driver.run(&args.plan()).await;

    let failed = report.failures().count();
    if failed > 0 {
        tracing::warn!(
            "{failed} of {} steps failed: {:?}",
            report.steps().len(),
            report.failures().map(|s| s.step()).collect::<Vec<_>>()
        );
    } else {
        tracing::info!("all {} steps succeeded", report.steps().len());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("running workflow with {args:?}");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("workflow failed: {}", DisplayErrorContext(err.as_ref()));
            println!("Error creating session: {err}");
            ExitCode::FAILURE
        }
    }
}
