/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

//! Lambda function that answers every request with the same book record.

use std::collections::HashMap;

use lambda_runtime::{Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// ISBN-13 including the hyphen after the prefix
    pub isbn: String,
    /// Book title
    pub title: String,
    /// Author name
    pub author: String,
}

impl Book {
    /// The record served by this function
    pub fn the_republic() -> Self {
        Self {
            isbn: "978-1420931693".to_owned(),
            title: "The Republic".to_owned(),
            author: "Plato".to_owned(),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    data: &'a Book,
}

/// Response shape understood by the API Gateway Lambda proxy integration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    /// HTTP status code
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Response headers, omitted when empty
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: String,
}

/// Build the response for `book`: status 200 with `{"data": book}` as the body.
///
/// Serializing can't realistically fail; if it does the body is left empty.
pub fn book_response(book: &Book) -> ApiGatewayResponse {
    let body = match serde_json::to_string(&Envelope { data: book }) {
        Ok(body) => body,
        Err(err) => {
            tracing::error!("failed to serialize book: {err}");
            String::new()
        }
    };

    ApiGatewayResponse {
        status_code: 200,
        headers: HashMap::new(),
        body,
    }
}

/// Lambda handler. The event payload is ignored.
pub async fn handler(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    tracing::debug!(request_id = %event.context.request_id, "serving book");
    Ok(book_response(&Book::the_republic()))
}
