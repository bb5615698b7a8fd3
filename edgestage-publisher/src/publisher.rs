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

use crate::{
    ExpiryWindow, ModuleFailure, ObjectStore, PublishConfig, PublishError, PublishFailure,
    StorageError,
};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use edgestage_commons::{basename, ModuleName};
use edgestage_descriptors::{ArtifactTable, DeployDescriptor, EdgeConfigDocument, TwinDocument};
use futures::stream::{self, StreamExt};
use url::Url;

const DEFAULT_CONCURRENCY: usize = 4;

/// Where the twin document of a publication went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TwinDestination {
    File(PathBuf),
    /// No twin file was configured: it is up to the caller to deliver the document (e.g. print it).
    Caller,
}

/// What a successful publication produced.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// The signed URL of the module configuration document.
    pub module_config_url: Url,
    pub twin: TwinDocument,
    /// The twin document, serialised.
    pub twin_json: String,
    pub twin_destination: TwinDestination,
    /// The path of the edge configuration document, if one was written.
    pub edge_config_file: Option<PathBuf>,
}

/// Builder structure to help create a [Publisher].
#[must_use = "The Publisher will not be generated unless you `build()` it"]
pub struct PublisherBuilder {
    store: Arc<dyn ObjectStore>,
    concurrency: usize,
    deadline: Option<Duration>,
}

impl PublisherBuilder {
    /// Sets the maximum number of artifacts uploaded at the same time (4 by default).
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Bounds the duration of an entire publication: past the `deadline`, the publication is abandoned and a
    /// [PublishError::Timeout] is returned.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attempts to create the [Publisher].
    ///
    /// # Errors
    ///
    /// This method fails if the concurrency is 0.
    pub fn build(self) -> Result<Publisher, PublishError> {
        if self.concurrency == 0 {
            return Err(PublishError::Configuration(
                "the upload concurrency must be at least 1".into(),
            ));
        }

        Ok(Publisher {
            store: self.store,
            concurrency: self.concurrency,
            deadline: self.deadline,
        })
    }
}

/// The `Publisher` uploads the artifacts of a deployment and produces the documents a gateway needs to install it.
pub struct Publisher {
    store: Arc<dyn ObjectStore>,
    concurrency: usize,
    deadline: Option<Duration>,
}

// An artifact to upload, with the position of its module in the descriptor.
struct PendingUpload {
    index: usize,
    module: ModuleName,
    artifact: PathBuf,
}

impl Publisher {
    /// Returns a [PublisherBuilder] uploading to the provided `store`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use edgestage_publisher::{from_connection_string, Publisher};
    /// use std::time::Duration;
    ///
    /// let store = from_connection_string("BlobEndpoint=file:///srv/blobs/")
    ///     .expect("Failed to create object store");
    /// let publisher = Publisher::builder(store)
    ///     .concurrency(8)
    ///     .deadline(Duration::from_secs(600))
    ///     .build()
    ///     .expect("Failed to build the Publisher");
    /// ```
    pub fn builder(store: Arc<dyn ObjectStore>) -> PublisherBuilder {
        PublisherBuilder {
            store,
            concurrency: DEFAULT_CONCURRENCY,
            deadline: None,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Publishes the `descriptor`.
    ///
    /// The artifact of every module is uploaded as the blob `<module name>/<artifact file name>` of the container
    /// and its signed URL is recorded as the `module.url` of the module. The descriptor is then written to the module
    /// configuration file and uploaded, under its file name, at the root of the container. Finally the twin document
    /// (and, if configured, the edge configuration document) are produced.
    ///
    /// All the URLs of a publication share the same [ExpiryWindow], computed once before any upload.
    ///
    /// # Errors
    ///
    /// The publication fails before contacting the store if the configuration is invalid or if a module has no
    /// artifact.
    ///
    /// If some uploads fail, the others are still attempted and their URL recorded in the descriptor; a
    /// [PublishFailure] listing every failed module is then returned and no document is written.
    ///
    /// If a deadline was set and is exceeded, the uploads in flight are abandoned and a [PublishError::Timeout] is
    /// returned.
    pub async fn publish(
        &self,
        descriptor: &mut DeployDescriptor,
        artifacts: &ArtifactTable,
        config: &PublishConfig,
    ) -> Result<PublishOutcome, PublishError> {
        let publication = self.try_publish(descriptor, artifacts, config);

        match self.deadline {
            Some(deadline) => async_std::future::timeout(deadline, publication)
                .await
                .unwrap_or_else(|_| {
                    tracing::error!("Publication did not complete within {:?}", deadline);
                    Err(PublishError::Timeout(deadline))
                }),
            None => publication.await,
        }
    }

    async fn try_publish(
        &self,
        descriptor: &mut DeployDescriptor,
        artifacts: &ArtifactTable,
        config: &PublishConfig,
    ) -> Result<PublishOutcome, PublishError> {
        config.validate()?;

        let uploads = descriptor
            .modules
            .iter()
            .enumerate()
            .map(|(index, module)| {
                artifacts
                    .get(&module.name)
                    .map(|artifact| PendingUpload {
                        index,
                        module: module.name.clone(),
                        artifact: artifact.to_path_buf(),
                    })
                    .ok_or_else(|| PublishError::MissingArtifact(module.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let window = ExpiryWindow::new(Utc::now(), config.expiry_days);
        tracing::debug!(
            "Signed URLs valid from < {} > to < {} >",
            window.signed_start(),
            window.signed_expiry()
        );

        self.store
            .create_container_if_absent(&config.container)
            .await
            .map_err(|source| PublishError::Storage {
                context: format!("Failed to create container < {} >", config.container),
                source,
            })?;
        tracing::info!("Container < {} > ready", config.container);

        self.publish_modules(descriptor, uploads, &config.container, &window)
            .await?;

        let module_config_url = self.publish_module_config(descriptor, config, &window).await?;

        let twin = TwinDocument::new(module_config_url.as_str());
        let twin_json = to_json(&twin, "twin")?;
        let twin_destination = match &config.twin_config_file {
            Some(path) => {
                write_document(path, &twin_json).await?;
                tracing::info!("Twin document written to < {} >", path.display());
                TwinDestination::File(path.clone())
            }
            None => TwinDestination::Caller,
        };

        let edge_config_file = match config.edge_output() {
            Some((connection_string, path)) => {
                let edge_config =
                    EdgeConfigDocument::new(connection_string, config.iothub_transport.as_deref());
                write_document(path, &to_json(&edge_config, "edge configuration")?).await?;
                tracing::info!("Edge configuration written to < {} >", path.display());
                Some(path.clone())
            }
            None => None,
        };

        Ok(PublishOutcome {
            module_config_url,
            twin,
            twin_json,
            twin_destination,
            edge_config_file,
        })
    }

    /// Uploads every artifact, at most `concurrency` at a time, and records the signed URLs in the descriptor.
    async fn publish_modules(
        &self,
        descriptor: &mut DeployDescriptor,
        uploads: Vec<PendingUpload>,
        container: &str,
        window: &ExpiryWindow,
    ) -> Result<(), PublishFailure> {
        let attempted = uploads.len();

        // The uploads complete in any order: each result is tagged with the index of its upload.
        let mut results = stream::iter(uploads.iter().enumerate())
            .map(|(slot, upload)| async move {
                (slot, self.publish_module(upload, container, window).await)
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;
        results.sort_unstable_by_key(|(slot, _)| *slot);

        let mut failures = Vec::new();
        for (upload, (_, result)) in uploads.into_iter().zip(results) {
            match result {
                Ok(url) => {
                    descriptor.modules[upload.index].loader.entrypoint.module_uri = url.to_string();
                }
                Err(error) => {
                    tracing::error!("Failed to publish module < {} >: {}", upload.module, error);
                    failures.push(ModuleFailure {
                        index: upload.index,
                        module: upload.module,
                        artifact: upload.artifact,
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            tracing::info!("Published {} module(s)", attempted);
            return Ok(());
        }

        let failure = PublishFailure::new(attempted, failures);
        tracing::error!("{}", failure);
        Err(failure)
    }

    #[tracing::instrument(skip(self, upload, window), fields(module = %upload.module))]
    async fn publish_module(
        &self,
        upload: &PendingUpload,
        container: &str,
        window: &ExpiryWindow,
    ) -> Result<Url, StorageError> {
        let file_name = basename(&upload.artifact)
            .map_err(|_| StorageError::InvalidArtifact(upload.artifact.clone()))?;
        let blob = format!("{}/{}", upload.module, file_name);

        tracing::debug!("Uploading < {} > as < {} >", upload.artifact.display(), blob);
        let handle = self
            .store
            .upload_blob(container, &blob, &upload.artifact)
            .await?;

        self.store.sign_read_url(&handle, window)
    }

    /// Writes the module configuration document, uploads it at the root of the container and returns its signed URL.
    async fn publish_module_config(
        &self,
        descriptor: &DeployDescriptor,
        config: &PublishConfig,
        window: &ExpiryWindow,
    ) -> Result<Url, PublishError> {
        let document = descriptor
            .to_module_config()
            .map_err(|source| PublishError::Serialization {
                document: "module configuration",
                source,
            })?;
        write_document(&config.module_config_file, &document).await?;

        let blob = basename(&config.module_config_file)
            .map_err(|e| PublishError::Configuration(format!("{e:?}")))?;
        let storage_error = |source: StorageError| PublishError::Storage {
            context: format!("Failed to publish the module configuration < {blob} >"),
            source,
        };

        let handle = self
            .store
            .upload_blob(&config.container, &blob, &config.module_config_file)
            .await
            .map_err(storage_error)?;
        let url = self
            .store
            .sign_read_url(&handle, window)
            .map_err(storage_error)?;

        tracing::info!("Module configuration published as < {} >", blob);
        Ok(url)
    }
}

fn to_json<T: serde::Serialize>(document: &T, name: &'static str) -> Result<String, PublishError> {
    serde_json::to_string_pretty(document).map_err(|e| PublishError::Serialization {
        document: name,
        source: e.into(),
    })
}

async fn write_document(path: &Path, content: &str) -> Result<(), PublishError> {
    async_std::fs::write(path, content)
        .await
        .map_err(|source| PublishError::Io {
            path: path.to_path_buf(),
            source,
        })
}
