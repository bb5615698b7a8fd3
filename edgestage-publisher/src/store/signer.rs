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

use crate::{BlobHandle, ExpiryWindow, StorageError};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const SIGNED_VERSION: &str = "2019-12-12";
const SIGNED_RESOURCE_BLOB: &str = "b";
const SIGNED_PERMISSION_READ: &str = "r";

/// Signs read-only URLs of blobs with the shared key of a storage account (a *service shared access signature*).
///
/// The signature covers the permission, the validity window, the blob and the version of the signing scheme: none
/// of these can be altered without invalidating the URL.
#[derive(Clone)]
pub struct SharedKeySigner {
    account: String,
    key: Vec<u8>,
}

impl std::fmt::Debug for SharedKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeySigner")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl SharedKeySigner {
    /// Creates a signer for `account` from its base64-encoded key.
    ///
    /// # Errors
    ///
    /// This method fails if the key is not valid base64.
    pub fn new(account: impl Into<String>, base64_key: &str) -> Result<Self, StorageError> {
        let key = STANDARD.decode(base64_key.trim()).map_err(|e| {
            StorageError::InvalidConnectionString(format!("`AccountKey` is not valid base64: {e}"))
        })?;

        Ok(Self {
            account: account.into(),
            key,
        })
    }

    /// Returns the URL of the blob, granting read access during the `window`.
    pub fn sign(&self, blob: &BlobHandle, window: &ExpiryWindow) -> Result<Url, StorageError> {
        let signed_start = window.signed_start();
        let signed_expiry = window.signed_expiry();
        let canonicalized_resource = format!("/blob/{}/{}/{}", self.account, blob.container, blob.name);

        let string_to_sign = [
            SIGNED_PERMISSION_READ,
            signed_start.as_str(),
            signed_expiry.as_str(),
            canonicalized_resource.as_str(),
            "", // signed identifier
            "", // signed IP
            "", // signed protocol
            SIGNED_VERSION,
            SIGNED_RESOURCE_BLOB,
            "", // signed snapshot time
            "", // cache-control
            "", // content-disposition
            "", // content-encoding
            "", // content-language
            "", // content-type
        ]
        .join("\n");

        let mut mac = HmacSha256::new_from_slice(&self.key).map_err(|e| StorageError::Sign {
            blob: blob.name.clone(),
            reason: e.to_string(),
        })?;
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        let mut url = blob.url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("sv", SIGNED_VERSION)
            .append_pair("st", &signed_start)
            .append_pair("se", &signed_expiry)
            .append_pair("sr", SIGNED_RESOURCE_BLOB)
            .append_pair("sp", SIGNED_PERMISSION_READ)
            .append_pair("sig", &signature);

        Ok(url)
    }
}
