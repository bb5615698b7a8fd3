//
// Copyright (c) 2021 - 2024 ZettaScale Technology
//
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// http://www.eclipse.org/legal/epl-2.0, or the Apache License, Version 2.0
// which is available at https://www.apache.org/licenses/LICENSE-2.0.
//
// SPDX-License-Identifier: EPL-2.0 OR Apache-2.0
//
// Contributors:
//   ZettaScale Zenoh Team, <zenoh@zettascale.tech>
//

//! The object stores artifacts and documents are uploaded to.
//!
//! An [ObjectStore] is selected from a storage connection string with [from_connection_string]:
//! - a `memory://` blob endpoint gives a [MemoryStore],
//! - a `file://` blob endpoint gives a [FilesystemStore] rooted at the path of the endpoint,
//! - any other endpoint requires a `LocalMount`: the [FilesystemStore] is then rooted at the mount while the URLs
//!   are formed from the public endpoint and signed with the account key.

mod connection;
mod filesystem;
mod memory;
mod signer;

pub use connection::ConnectionString;
pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;
pub use signer::SharedKeySigner;

use crate::{ExpiryWindow, StorageError};

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

/// A blob that was uploaded: where it lives and its (unsigned) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHandle {
    pub container: String,
    /// Name of the blob in its container, `/` separates its virtual folders.
    pub name: String,
    pub url: Url,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Creates the `container`, doing nothing if it already exists.
    async fn create_container_if_absent(&self, container: &str) -> Result<(), StorageError>;

    /// Uploads the content of the `local` file as the blob `blob` of the `container`, replacing any previous
    /// content.
    async fn upload_blob(
        &self,
        container: &str,
        blob: &str,
        local: &Path,
    ) -> Result<BlobHandle, StorageError>;

    /// Returns a URL granting read-only access to the `blob` during the `window`.
    fn sign_read_url(&self, blob: &BlobHandle, window: &ExpiryWindow)
        -> Result<Url, StorageError>;
}

/// Builds the [ObjectStore] described by a storage connection string.
///
/// # Errors
///
/// This function fails if:
/// - the connection string cannot be parsed or does not designate an endpoint,
/// - the account key is not valid base64,
/// - the endpoint is neither `memory://` nor `file://` and no `LocalMount` was provided.
pub fn from_connection_string(
    connection_string: &str,
) -> Result<Arc<dyn ObjectStore>, StorageError> {
    let connection_string = ConnectionString::from_str(connection_string)?;
    let endpoint = connection_string.endpoint()?;

    let signer = match (&connection_string.account_name, &connection_string.account_key) {
        (Some(account), Some(key)) => Some(SharedKeySigner::new(account.as_str(), key)?),
        _ => None,
    };

    let store: Arc<dyn ObjectStore> = match endpoint.scheme() {
        "memory" => Arc::new(MemoryStore::new(endpoint)),
        "file" => {
            let root = endpoint
                .to_file_path()
                .map_err(|_| StorageError::UnsupportedEndpoint(endpoint.clone()))?;
            Arc::new(FilesystemStore::new(root, endpoint, signer)?)
        }
        _ => match connection_string.local_mount {
            Some(mount) => Arc::new(FilesystemStore::new(mount, endpoint, signer)?),
            None => return Err(StorageError::UnsupportedEndpoint(endpoint)),
        },
    };

    Ok(store)
}

/// Returns the URL of `blob` in `container`, appending each `/`-separated part of the name to the `endpoint`.
pub(crate) fn blob_url(endpoint: &Url, container: &str, blob: &str) -> Result<Url, StorageError> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| StorageError::UnsupportedEndpoint(endpoint.clone()))?
        .pop_if_empty()
        .push(container)
        .extend(blob.split('/'));

    Ok(url)
}
