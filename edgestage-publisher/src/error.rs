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

use std::error::Error as _;
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;

use edgestage_commons::ModuleName;
use thiserror::Error;
use url::Url;

/// Failure of an operation of an [ObjectStore](crate::ObjectStore).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid storage connection string: {0}")]
    InvalidConnectionString(String),
    #[error(
        "unsupported blob endpoint < {0} >, expected a `file://` or `memory://` endpoint (or a `LocalMount`)"
    )]
    UnsupportedEndpoint(Url),
    #[error("failed to create container < {container} >")]
    Container {
        container: String,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact < {} > has no file name to name its blob after", .0.display())]
    InvalidArtifact(PathBuf),
    #[error("failed to upload < {} > as blob < {blob} >", local.display())]
    Upload {
        blob: String,
        local: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to sign a read URL for blob < {blob} >: {reason}")]
    Sign { blob: String, reason: String },
}

/// The failure of the publication of a single module.
#[derive(Debug)]
pub struct ModuleFailure {
    /// Position of the module in the descriptor.
    pub index: usize,
    pub module: ModuleName,
    pub artifact: PathBuf,
    pub error: StorageError,
}

impl Display for ModuleFailure {
    /// Displays the failure followed by the complete chain of its causes, separated by ": ".
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "module < {} > (#{}): {}", self.module, self.index, self.error)?;
        let mut source = self.error.source();
        while let Some(cause) = source {
            write!(f, ": {}", cause)?;
            source = cause.source();
        }

        Ok(())
    }
}

/// A `PublishFailure` aggregates the failures of the modules that could not be published.
///
/// The uploads of all modules are attempted, even when some fail: a failure contains *every* module that failed, in
/// the order of the descriptor, each with its own cause. The modules that were published successfully are not part
/// of it (their signed URL is recorded in the descriptor).
#[derive(Debug)]
pub struct PublishFailure {
    attempted: usize,
    failures: Vec<ModuleFailure>,
}

impl PublishFailure {
    /// Creates the failure of a publication that attempted `attempted` modules. The `failures` are expected in the
    /// order of the descriptor.
    pub fn new(attempted: usize, failures: Vec<ModuleFailure>) -> Self {
        Self {
            attempted,
            failures,
        }
    }

    /// The number of modules whose publication was attempted.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// The failures, one per module, in the order of the descriptor.
    pub fn causes(&self) -> &[ModuleFailure] {
        &self.failures
    }

    pub fn failed_modules(&self) -> impl Iterator<Item = &ModuleName> {
        self.failures.iter().map(|failure| &failure.module)
    }
}

impl Display for PublishFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} out of {} module(s) could not be published",
            self.failures.len(),
            self.attempted
        )
    }
}

impl std::error::Error for PublishFailure {}

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("invalid publish configuration: {0}")]
    Configuration(String),
    #[error("module < {0} > has no artifact registered")]
    MissingArtifact(ModuleName),
    #[error(transparent)]
    Failure(#[from] PublishFailure),
    #[error("{context}")]
    Storage {
        context: String,
        #[source]
        source: StorageError,
    },
    #[error("the publication did not complete within {0:?}, in-flight uploads were abandoned")]
    Timeout(Duration),
    #[error("failed to write < {} >", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize the {document} document")]
    Serialization {
        document: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
