/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_smithy_runtime_api::client::waiters::error::WaiterError;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by this library
///
/// NOTE: Use [`aws_smithy_types::error::display::DisplayErrorContext`] or similar to display
/// the entire error cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

/// General categories of storage workflow errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Operation input validation issues
    InputInvalid,

    /// Credentials or session could not be established
    ConnectionFailed,

    /// The storage service rejected or failed the request
    ServiceError,

    /// Resource not found (e.g. bucket or key)
    NotFound,

    /// Waiting for a bucket or object to reach the desired state took too long
    WaitTimedOut,

    /// Local I/O errors
    IOError,
}

impl Error {
    /// Creates a new [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: err.into(),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InputInvalid => write!(f, "invalid input"),
            ErrorKind::ConnectionFailed => write!(f, "failed to connect to storage service"),
            ErrorKind::ServiceError => write!(f, "storage service error"),
            ErrorKind::NotFound => write!(f, "resource not found"),
            ErrorKind::WaitTimedOut => write!(f, "timed out waiting for resource state"),
            ErrorKind::IOError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl From<aws_smithy_types::byte_stream::error::Error> for Error {
    fn from(value: aws_smithy_types::byte_stream::error::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl<E, R> From<aws_sdk_s3::error::SdkError<E, R>> for Error
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
    R: Send + Sync + fmt::Debug + 'static,
{
    fn from(value: aws_sdk_s3::error::SdkError<E, R>) -> Self {
        let kind = match value.code() {
            Some("NotFound" | "NoSuchKey" | "NoSuchBucket") => ErrorKind::NotFound,
            _ => ErrorKind::ServiceError,
        };

        Error::new(kind, value)
    }
}

impl<O, E> From<WaiterError<O, E>> for Error
where
    O: fmt::Debug + Send + Sync + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(value: WaiterError<O, E>) -> Self {
        let kind = match value {
            WaiterError::ExceededMaxWait(_) => ErrorKind::WaitTimedOut,
            _ => ErrorKind::ServiceError,
        };

        Error::new(kind, value)
    }
}

pub(crate) fn invalid_input<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InputInvalid, err)
}

pub(crate) fn connection_failed<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::ConnectionFailed, err)
}

pub(crate) fn missing_field(field: &'static str) -> Error {
    invalid_input(format!("`{field}` is required and must not be empty"))
}
