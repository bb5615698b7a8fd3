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

use crate::StorageError;

use std::fmt::Debug;
use std::path::PathBuf;
use std::str::FromStr;

use url::Url;

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// The parsed form of a storage connection string: `Key=Value` pairs separated by `;`.
///
/// Keys are matched regardless of their case and unknown keys are ignored. Values may contain `=` (account keys are
/// base64-encoded): a pair is split at its first `=` only.
///
/// On top of the keys of a storage account, `LocalMount` designates a local directory where the containers of the
/// account are mounted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionString {
    pub account_name: Option<String>,
    pub account_key: Option<String>,
    pub blob_endpoint: Option<Url>,
    pub protocol: Option<String>,
    pub endpoint_suffix: Option<String>,
    pub local_mount: Option<PathBuf>,
}

impl FromStr for ConnectionString {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut connection_string = ConnectionString::default();

        for pair in s.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                StorageError::InvalidConnectionString(format!(
                    "expected `Key=Value`, found < {} >",
                    key_only(pair)
                ))
            })?;
            let value = value.trim().to_string();

            match key.trim().to_ascii_lowercase().as_str() {
                "accountname" => connection_string.account_name = Some(value),
                "accountkey" => connection_string.account_key = Some(value),
                "blobendpoint" => {
                    let endpoint = Url::parse(&value).map_err(|e| {
                        StorageError::InvalidConnectionString(format!(
                            "`BlobEndpoint` < {value} > is not a valid URL: {e}"
                        ))
                    })?;
                    connection_string.blob_endpoint = Some(endpoint);
                }
                "defaultendpointsprotocol" => connection_string.protocol = Some(value),
                "endpointsuffix" => connection_string.endpoint_suffix = Some(value),
                "localmount" => connection_string.local_mount = Some(PathBuf::from(value)),
                unknown => tracing::debug!("Ignoring key < {} > of the connection string", unknown),
            }
        }

        Ok(connection_string)
    }
}

impl ConnectionString {
    /// Returns the blob endpoint of the account: either the `BlobEndpoint` or, if absent, the endpoint derived from
    /// the account name, the protocol and the endpoint suffix.
    ///
    /// # Errors
    ///
    /// This method fails if neither a `BlobEndpoint` nor an `AccountName` were provided.
    pub fn endpoint(&self) -> Result<Url, StorageError> {
        if let Some(endpoint) = &self.blob_endpoint {
            return Ok(endpoint.clone());
        }

        let account = self.account_name.as_deref().ok_or_else(|| {
            StorageError::InvalidConnectionString(
                "either `BlobEndpoint` or `AccountName` must be provided".into(),
            )
        })?;

        let endpoint = format!(
            "{}://{}.blob.{}",
            self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL),
            account,
            self.endpoint_suffix
                .as_deref()
                .unwrap_or(DEFAULT_ENDPOINT_SUFFIX)
        );

        Url::parse(&endpoint).map_err(|e| {
            StorageError::InvalidConnectionString(format!(
                "derived endpoint < {endpoint} > is not a valid URL: {e}"
            ))
        })
    }
}

// Never echo a value back: it could be the account key.
fn key_only(pair: &str) -> &str {
    if pair.len() > 16 {
        "<redacted>"
    } else {
        pair
    }
}

impl Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("account_name", &self.account_name)
            .field("account_key", &self.account_key.as_ref().map(|_| "<redacted>"))
            .field("blob_endpoint", &self.blob_endpoint)
            .field("protocol", &self.protocol)
            .field("endpoint_suffix", &self.endpoint_suffix)
            .field("local_mount", &self.local_mount)
            .finish()
    }
}
