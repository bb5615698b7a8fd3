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

use super::{blob_url, BlobHandle, ObjectStore};
use crate::{ExpiryWindow, StorageError};

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
#[cfg(feature = "test-utils")]
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

/// An in-process [ObjectStore]: blobs are kept in memory, for as long as the store lives.
///
/// Besides the blobs, the store records the containers it was asked to create and the windows of the URLs it signed.
#[derive(Debug)]
pub struct MemoryStore {
    endpoint: Url,
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    containers: HashMap<String, HashMap<String, Vec<u8>>>,
    container_requests: usize,
    signed_windows: Vec<ExpiryWindow>,
    #[cfg(feature = "test-utils")]
    failing_blobs: HashSet<String>,
    #[cfg(feature = "test-utils")]
    delayed_blobs: HashMap<String, Duration>,
}

impl MemoryStore {
    /// Creates an empty store, the URLs of its blobs are formed from `endpoint` (typically `memory:///`).
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            state: Mutex::default(),
        }
    }

    // A panic while holding the lock cannot leave the maps half-updated, the poison is ignored.
    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Returns the content of the `blob` of the `container`, if it was uploaded.
    pub fn blob(&self, container: &str, blob: &str) -> Option<Vec<u8>> {
        self.state()
            .containers
            .get(container)
            .and_then(|blobs| blobs.get(blob))
            .cloned()
    }

    /// Returns the names of the blobs of the `container`, sorted.
    pub fn blobs(&self, container: &str) -> Vec<String> {
        let mut names = self
            .state()
            .containers
            .get(container)
            .map(|blobs| blobs.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn containers(&self) -> HashSet<String> {
        self.state().containers.keys().cloned().collect()
    }

    /// The number of calls to `create_container_if_absent`.
    pub fn container_requests(&self) -> usize {
        self.state().container_requests
    }

    /// The windows of all the URLs signed so far, in the order they were signed.
    pub fn signed_windows(&self) -> Vec<ExpiryWindow> {
        self.state().signed_windows.clone()
    }

    /// Makes every upload of the `blob` fail.
    #[cfg(feature = "test-utils")]
    pub fn fail_upload_of(&self, blob: impl Into<String>) {
        self.state().failing_blobs.insert(blob.into());
    }

    /// Delays every upload of the `blob` by `delay`.
    #[cfg(feature = "test-utils")]
    pub fn delay_upload_of(&self, blob: impl Into<String>, delay: Duration) {
        self.state().delayed_blobs.insert(blob.into(), delay);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn create_container_if_absent(&self, container: &str) -> Result<(), StorageError> {
        let mut state = self.state();
        state.container_requests += 1;
        state.containers.entry(container.to_string()).or_default();
        Ok(())
    }

    async fn upload_blob(
        &self,
        container: &str,
        blob: &str,
        local: &Path,
    ) -> Result<BlobHandle, StorageError> {
        #[cfg(feature = "test-utils")]
        {
            let delay = self.state().delayed_blobs.get(blob).copied();
            if let Some(delay) = delay {
                async_std::task::sleep(delay).await;
            }

            if self.state().failing_blobs.contains(blob) {
                return Err(StorageError::Upload {
                    blob: blob.to_string(),
                    local: local.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "injected upload failure",
                    ),
                });
            }
        }

        let content = async_std::fs::read(local)
            .await
            .map_err(|source| StorageError::Upload {
                blob: blob.to_string(),
                local: local.to_path_buf(),
                source,
            })?;

        {
            let mut state = self.state();
            let blobs = state.containers.get_mut(container).ok_or_else(|| {
                StorageError::Upload {
                    blob: blob.to_string(),
                    local: local.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("container < {container} > does not exist"),
                    ),
                }
            })?;
            blobs.insert(blob.to_string(), content);
        }

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
        self.state().signed_windows.push(*window);

        let mut url = blob.url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("st", &window.signed_start())
            .append_pair("se", &window.signed_expiry())
            .append_pair("sp", "r");

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_std::task::block_on;

    fn memory_store() -> MemoryStore {
        MemoryStore::new(Url::parse("memory:///").expect("valid URL"))
    }

    #[test]
    fn test_upload_requires_the_container() {
        let build = tempfile::tempdir().expect("Failed to create temporary directory");
        let artifact = build.path().join("libfilter.so");
        std::fs::write(&artifact, b"filter").expect("Failed to write artifact");

        let store = memory_store();
        assert!(block_on(store.upload_blob("modules", "filter/libfilter.so", &artifact)).is_err());

        block_on(store.create_container_if_absent("modules")).expect("Failed to create container");
        let handle = block_on(store.upload_blob("modules", "filter/libfilter.so", &artifact))
            .expect("Failed to upload");

        assert_eq!(handle.url.as_str(), "memory:///modules/filter/libfilter.so");
        assert_eq!(
            store.blob("modules", "filter/libfilter.so"),
            Some(b"filter".to_vec())
        );
        assert_eq!(store.blobs("modules"), vec!["filter/libfilter.so"]);
        assert_eq!(store.container_requests(), 1);
    }

    #[cfg(feature = "test-utils")]
    #[test]
    fn test_injected_failure() {
        let build = tempfile::tempdir().expect("Failed to create temporary directory");
        let artifact = build.path().join("libfilter.so");
        std::fs::write(&artifact, b"filter").expect("Failed to write artifact");

        let store = memory_store();
        store.fail_upload_of("filter/libfilter.so");
        block_on(store.create_container_if_absent("modules")).expect("Failed to create container");

        assert!(matches!(
            block_on(store.upload_blob("modules", "filter/libfilter.so", &artifact)),
            Err(StorageError::Upload { .. })
        ));
        assert!(store.blob("modules", "filter/libfilter.so").is_none());
    }
}
