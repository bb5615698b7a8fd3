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

use crate::PublishError;

use std::fmt::{Debug, Display};
use std::path::PathBuf;

/// Upper bound of the validity of a signed URL: a hundred years.
const MAX_EXPIRY_DAYS: f64 = 36_500.0;

/// The number of days a signed URL remains valid.
///
/// Fractions of days are accepted. The duration must be strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ExpiryDays(f64);

impl ExpiryDays {
    pub fn days(&self) -> f64 {
        self.0
    }

    /// Returns the duration as milliseconds, the precision kept when computing an [ExpiryWindow](crate::ExpiryWindow).
    pub fn as_millis(&self) -> i64 {
        (self.0 * 86_400_000.0).round() as i64
    }
}

impl TryFrom<f64> for ExpiryDays {
    type Error = PublishError;

    fn try_from(days: f64) -> Result<Self, Self::Error> {
        if !days.is_finite() || days <= 0.0 {
            return Err(PublishError::Configuration(format!(
                "the expiry duration must be a strictly positive number of days, found < {days} >"
            )));
        }

        if (days * 86_400_000.0).round() < 1.0 {
            return Err(PublishError::Configuration(format!(
                "the expiry duration must last at least one millisecond, found < {days} > day(s)"
            )));
        }

        if days > MAX_EXPIRY_DAYS {
            return Err(PublishError::Configuration(format!(
                "the expiry duration cannot exceed {MAX_EXPIRY_DAYS} days, found < {days} >"
            )));
        }

        Ok(Self(days))
    }
}

impl Display for ExpiryDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} day(s)", self.0)
    }
}

/// Everything a publication needs to know besides the descriptor itself: where to upload, for how long the URLs are
/// valid and where to write the documents.
#[derive(Clone)]
pub struct PublishConfig {
    /// Connection string of the storage account, used to build the [ObjectStore](crate::ObjectStore).
    pub storage_connection_string: String,
    /// The container, shared by all uploads of a publication. It is created if absent.
    pub container: String,
    pub expiry_days: ExpiryDays,
    /// Local path of the module configuration document. The document is uploaded under its file name.
    pub module_config_file: PathBuf,
    /// Local path of the twin document. If `None`, the twin document is handed back to the caller.
    pub twin_config_file: Option<PathBuf>,
    /// Connection string of the gateway to its hub. Required, with `edge_config_file`, to write the edge
    /// configuration document.
    pub iothub_connection_string: Option<String>,
    pub iothub_transport: Option<String>,
    pub edge_config_file: Option<PathBuf>,
}

impl PublishConfig {
    pub fn new(
        storage_connection_string: impl Into<String>,
        container: impl Into<String>,
        expiry_days: ExpiryDays,
        module_config_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage_connection_string: storage_connection_string.into(),
            container: container.into(),
            expiry_days,
            module_config_file: module_config_file.into(),
            twin_config_file: None,
            iothub_connection_string: None,
            iothub_transport: None,
            edge_config_file: None,
        }
    }

    /// Checks that this configuration can be used for a publication.
    ///
    /// # Errors
    ///
    /// This method fails if:
    /// - the storage connection string is empty,
    /// - the container name is empty or contains a path separator,
    /// - the module configuration file has no file name.
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.storage_connection_string.trim().is_empty() {
            return Err(PublishError::Configuration(
                "the storage connection string is empty".into(),
            ));
        }

        if self.container.trim().is_empty() || self.container.contains(['/', '\\']) {
            return Err(PublishError::Configuration(format!(
                "< {} > is not a valid container name",
                self.container
            )));
        }

        if self.module_config_file.file_name().is_none() {
            return Err(PublishError::Configuration(format!(
                "the module configuration file < {} > has no file name",
                self.module_config_file.display()
            )));
        }

        Ok(())
    }

    /// Returns the edge configuration to write, if both the hub connection string and the file were provided.
    pub(crate) fn edge_output(&self) -> Option<(&str, &PathBuf)> {
        match (&self.iothub_connection_string, &self.edge_config_file) {
            (Some(connection_string), Some(path)) if !connection_string.is_empty() => {
                Some((connection_string.as_str(), path))
            }
            _ => None,
        }
    }
}

// Connection strings hold credentials: they are never displayed.
impl Debug for PublishConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishConfig")
            .field("storage_connection_string", &"<redacted>")
            .field("container", &self.container)
            .field("expiry_days", &self.expiry_days)
            .field("module_config_file", &self.module_config_file)
            .field("twin_config_file", &self.twin_config_file)
            .field(
                "iothub_connection_string",
                &self.iothub_connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("iothub_transport", &self.iothub_transport)
            .field("edge_config_file", &self.edge_config_file)
            .finish()
    }
}
