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

use super::{blob_url, BlobHandle, ObjectStore, SharedKeySigner};
use crate::{ExpiryWindow, StorageError};

use std::path::{Path, PathBuf};

use async_std::fs;
use async_trait::async_trait;
use url::Url;

/// A `FilesystemStore` keeps each container as a directory under its `root`, each blob being a file of that
/// directory (its virtual folders being sub-directories).
///
/// The URLs of the blobs are formed from the public `endpoint`. If a [SharedKeySigner] is available they are signed,
/// otherwise they are returned as is.
#[derive(Debug)]
pub struct FilesystemStore {
    root: PathBuf,
    endpoint: Url,
    signer: Option<SharedKeySigner>,
}

impl FilesystemStore {
    pub fn new(
        root: impl Into<PathBuf>,
        endpoint: Url,
        signer: Option<SharedKeySigner>,
    ) -> Result<Self, StorageError> {
        if endpoint.cannot_be_a_base() {
            return Err(StorageError::UnsupportedEndpoint(endpoint));
        }

        Ok(Self {
            root: root.into(),
            endpoint,
            signer,
        })
    }

    fn blob_path(&self, container: &str, blob: &str) -> PathBuf {
        blob.split('/')
            .fold(self.root.join(container), |path, part| path.join(part))
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    async fn create_container_if_absent(&self, container: &str) -> Result<(), StorageError> {
        fs::create_dir_all(self.root.join(container))
            .await
            .map_err(|source| StorageError::Container {
                container: container.to_string(),
                source,
            })
    }

    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    async fn upload_blob(
        &self,
        container: &str,
        blob: &str,
        local: &Path,
    ) -> Result<BlobHandle, StorageError> {
        let upload_error = |source| StorageError::Upload {
            blob: blob.to_string(),
            local: local.to_path_buf(),
            source,
        };

        let destination = self.blob_path(container, blob);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await.map_err(upload_error)?;
        }

        let bytes = fs::copy(local, &destination).await.map_err(upload_error)?;
        tracing::debug!("Copied {} bytes to < {} >", bytes, destination.display());

        Ok(BlobHandle {
            container: container.to_string(),
            name: blob.to_string(),
            url: blob_url(&self.endpoint, container, blob)?,
        })
    }

    fn sign_read_url(
        &self,
        blob: &BlobHandle,
        window: &ExpiryWindow,
    ) -> Result<Url, StorageError> {
        match &self.signer {
            Some(signer) => signer.sign(blob, window),
            None => {
                tracing::debug!(
                    "No account key for < {} >, its URL is left unsigned",
                    blob.name
                );
                Ok(blob.url.clone())
            }
        }
    }
}
