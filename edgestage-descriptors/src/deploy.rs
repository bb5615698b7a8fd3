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

use crate::{LinkInfo, ModuleInfo};

use edgestage_commons::Result;
use serde::{Deserialize, Serialize};

/// Separator used on the gateway when joining its deploy path with the file name of a module.
const EDGE_PATH_SEPARATOR: char = '/';

/// A `DeployDescriptor` describes an entire deployment of a gateway: where the modules are installed, which modules
/// compose it and how they are connected.
///
/// Once every module was published (i.e. its `module.url` is populated), the descriptor is serialised as-is: this is
/// the *module configuration* document that the gateway downloads.
///
/// The order of the modules and of the links is preserved from the input up to the serialised document.
///
/// # Example
///
/// ```
/// # use edgestage_descriptors::DeployDescriptor;
/// # let json = r#"
/// {
///   "gateway": {
///     "deploy-path": "/var/edge",
///     "version": "1.2.0"
///   },
///   "modules": [
///     {
///       "name": "ble-sensor",
///       "loader": {
///         "name": "native",
///         "entrypoint": {
///           "module.path": "/var/edge/libble.so",
///           "module.url": "https://edge.blob.core.windows.net/modules/ble-sensor/libble.so?sv=2019-12-12"
///         }
///       },
///       "args": {
///         "controller_index": "0"
///       },
///       "version": "1.0.0"
///     },
///     {
///       "name": "logger",
///       "loader": {
///         "name": "native",
///         "entrypoint": {
///           "module.path": "/var/edge/liblogger.so",
///           "module.url": "https://edge.blob.core.windows.net/modules/logger/liblogger.so?sv=2019-12-12"
///         }
///       },
///       "args": {
///         "filename": "/var/log/gateway.log"
///       },
///       "version": "1.0.0"
///     }
///   ],
///   "links": [
///     { "source": "ble-sensor", "sink": "logger" }
///   ]
/// }
/// # "#;
/// # let descriptor = serde_json::from_str::<DeployDescriptor>(json).unwrap();
/// # assert_eq!(descriptor.modules.len(), 2);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployDescriptor {
    pub gateway: GatewayInfo,
    #[serde(default)]
    pub modules: Vec<ModuleInfo>,
    #[serde(default)]
    pub links: Vec<LinkInfo>,
}

impl DeployDescriptor {
    pub fn new(gateway: GatewayInfo) -> Self {
        Self {
            gateway,
            modules: Vec::default(),
            links: Vec::default(),
        }
    }

    /// Serialises this descriptor as the module configuration document.
    pub fn to_module_config(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Metadata of the gateway the modules are deployed on.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayInfo {
    /// The directory, on the gateway, where the modules are installed.
    #[serde(rename = "deploy-path", default)]
    pub deploy_path: String,
    #[serde(default)]
    pub version: String,
}

impl GatewayInfo {
    pub fn new(deploy_path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            deploy_path: deploy_path.into(),
            version: version.into(),
        }
    }

    /// Returns the path, on the gateway, of a module whose artifact is named `file_name`.
    ///
    /// A trailing separator on the deploy path is not repeated.
    pub fn edge_path(&self, file_name: &str) -> String {
        format!(
            "{}{}{}",
            self.deploy_path.trim_end_matches(EDGE_PATH_SEPARATOR),
            EDGE_PATH_SEPARATOR,
            file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_path() {
        let gateway = GatewayInfo::new("/var/edge", "1.0");
        assert_eq!(gateway.edge_path("mymodule.so"), "/var/edge/mymodule.so");

        let gateway = GatewayInfo::new("/var/edge/", "1.0");
        assert_eq!(gateway.edge_path("mymodule.so"), "/var/edge/mymodule.so");
    }

    #[test]
    fn test_serialization_deserialization() {
        let json = r#"
{
  "gateway": { "deploy-path": "/var/edge", "version": "2.0" },
  "modules": [
    {
      "name": "hello",
      "loader": { "name": "native", "entrypoint": { "module.path": "/var/edge/libhello.so" } },
      "args": { "period": "1000" }
    }
  ]
}
"#;
        let descriptor =
            serde_json::from_str::<DeployDescriptor>(json).expect("Failed to parse descriptor");
        assert!(descriptor.links.is_empty());
        assert_eq!(descriptor.modules[0].version, "");

        let serialized = descriptor
            .to_module_config()
            .expect("Failed to serialize descriptor");
        assert_eq!(
            serde_json::from_str::<DeployDescriptor>(&serialized)
                .expect("Failed to parse serialized descriptor"),
            descriptor
        );
    }
}
