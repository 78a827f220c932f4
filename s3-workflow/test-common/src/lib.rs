/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use s3_workflow::storage::in_memory::InMemoryStorage;
use s3_workflow::{Client, Config};

/// Random alphanumeric test data
pub fn rand_data(size: usize) -> Bytes {
    std::iter::repeat_with(fastrand::alphanumeric)
        .take(size)
        .map(|x| x as u8)
        .collect::<Vec<_>>()
        .into()
}

/// Create a temporary directory holding the given `(relative path, contents)` files
pub fn create_test_dir(files: &[(&str, &[u8])]) -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    for (path, data) in files {
        create_test_file(temp_dir.path(), path, data);
    }
    temp_dir
}

/// Create a file at `dir/name` containing `data`, creating parent directories as needed
pub fn create_test_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let parent = path.parent().unwrap();
    std::fs::create_dir_all(parent).unwrap();
    std::fs::write(&path, data).unwrap();
    path
}

/// Client backed by a fresh in-memory storage service.
///
/// The storage is returned as well so tests can inspect what the client did.
pub fn test_client() -> (Client, Arc<InMemoryStorage>) {
    test_client_with(InMemoryStorage::new())
}

/// Client backed by the given in-memory storage service
pub fn test_client_with(storage: InMemoryStorage) -> (Client, Arc<InMemoryStorage>) {
    let storage = Arc::new(storage);
    let client = Client::new(Config::default(), storage.clone());
    (client, storage)
}
