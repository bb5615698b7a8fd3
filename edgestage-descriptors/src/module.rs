//
// Copyright (c) 2021 - 2023 ZettaScale Technology
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

use crate::ModuleArgs;

use edgestage_commons::ModuleName;
use serde::{Deserialize, Serialize};

/// A `ModuleInfo` describes one module of the gateway: which loader starts it, where its library lives on the
/// gateway, where the gateway can download it from and with which arguments it is started.
///
/// # Example
///
/// The textual representation, in JSON, of a module once published is as following:
/// ```json
/// {
///   "name": "ble-sensor",
///   "loader": {
///     "name": "native",
///     "entrypoint": {
///       "module.path": "/var/edge/libble.so",
///       "module.url": "https://edge.blob.core.windows.net/modules/ble-sensor/libble.so?sv=..."
///     }
///   },
///   "args": {
///     "controller_index": "0"
///   },
///   "version": "1.0.0"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: ModuleName,
    #[serde(default)]
    pub loader: LoaderInfo,
    #[serde(default)]
    pub args: ModuleArgs,
    #[serde(default)]
    pub version: String,
}

impl ModuleInfo {
    /// Creates a module with an empty version, no arguments and a default loader.
    pub fn new(name: impl Into<ModuleName>) -> Self {
        Self {
            name: name.into(),
            loader: LoaderInfo::default(),
            args: ModuleArgs::default(),
            version: String::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entrypoint: EntryPointInfo,
}

/// Where a module can be found: on the gateway (`module.path`) and, once published, in the blob container
/// (`module.url`).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPointInfo {
    #[serde(rename = "module.path", default)]
    pub module_path: String,
    /// Empty until the module's artifact is uploaded and a signed URL is obtained for it.
    #[serde(rename = "module.url", default, skip_serializing_if = "String::is_empty")]
    pub module_uri: String,
}
