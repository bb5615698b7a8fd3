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

mod workdir;
pub use workdir::WorkDirGuard;

use crate::{ArtifactTable, GatewayInfo, LinkInfo, ModuleArgs, ModuleInfo};

use std::path::{Path, PathBuf};

use anyhow::Context;
use edgestage_commons::{basename, try_load_from_file, ModuleName, Result};
use serde::Deserialize;

/// A `StructuredConfig` is the content of a *structured file*: the modules and links of a deployment described in
/// JSON or YAML instead of on the command line.
///
/// The `module.path` of a module designates the artifact on the build machine. Once resolved, the module is
/// installed on the gateway under the deploy path, keeping the file name of its artifact.
///
/// Relative `module.path` are resolved against the working directory (possibly overridden) of the resolution.
///
/// # Example
///
/// ```
/// # use edgestage_descriptors::StructuredConfig;
/// # let yaml = r#"
/// modules:
///   - name: ble-sensor
///     version: "1.0.0"
///     loader:
///       name: native
///       entrypoint:
///         module.path: build/out/libble.so
///     args:
///       controller_index: 0
///
///   - name: logger
///     loader:
///       name: native
///       entrypoint:
///         module.path: /build/out/liblogger.so
///     args:
///       filename: /var/log/gateway.log
///
/// links:
///   - source: ble-sensor
///     sink: logger
/// # "#;
/// # let config = serde_yaml::from_str::<StructuredConfig>(yaml).unwrap();
/// # assert_eq!(config.modules.len(), 2);
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StructuredConfig {
    pub modules: Vec<StructuredModule>,
    #[serde(default)]
    pub links: Vec<LinkInfo>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StructuredModule {
    pub name: ModuleName,
    #[serde(default)]
    pub version: Option<String>,
    pub loader: StructuredLoader,
    #[serde(default)]
    pub args: ModuleArgs,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StructuredLoader {
    pub name: String,
    pub entrypoint: StructuredEntryPoint,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StructuredEntryPoint {
    /// Location of the artifact on the build machine.
    #[serde(rename = "module.path")]
    pub module_path: PathBuf,
}

/// The outcome of resolving a [StructuredConfig]: the modules and links to add to the descriptor, in the order of the
/// file, and the location of the artifact of each module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredResolution {
    pub modules: Vec<ModuleInfo>,
    pub links: Vec<LinkInfo>,
    pub artifacts: ArtifactTable,
}

impl StructuredConfig {
    /// Loads a structured file, JSON or YAML depending on its extension.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        try_load_from_file(path.as_ref())
    }

    /// Converts this configuration into modules, links and artifacts.
    ///
    /// If a `work_dir` is provided, it is the working directory of the process for the duration of the resolution
    /// only: the previous working directory is restored whether the resolution succeeds or not.
    ///
    /// # Errors
    ///
    /// This method fails if:
    /// - the working directory cannot be switched,
    /// - the `module.path` of a module has no file name.
    pub fn resolve(
        self,
        gateway: &GatewayInfo,
        work_dir: Option<&Path>,
    ) -> Result<StructuredResolution> {
        let _guard = work_dir.map(WorkDirGuard::enter).transpose()?;
        let current_dir =
            std::env::current_dir().context("Failed to read the current working directory")?;

        let mut resolution = StructuredResolution {
            modules: Vec::with_capacity(self.modules.len()),
            links: self.links,
            artifacts: ArtifactTable::default(),
        };

        for module in self.modules {
            let artifact = current_dir.join(&module.loader.entrypoint.module_path);
            let file_name = basename(&artifact)
                .context(format!("Invalid `module.path` for module < {} >", module.name))?;

            let mut module_info = ModuleInfo::new(module.name.clone());
            module_info.version = module.version.unwrap_or_default();
            module_info.loader.name = module.loader.name;
            module_info.loader.entrypoint.module_path = gateway.edge_path(&file_name);
            module_info.args = module.args;

            tracing::trace!(
                "Module < {} >: artifact < {} > installed at < {} >",
                module_info.name,
                artifact.display(),
                module_info.loader.entrypoint.module_path
            );

            resolution.artifacts.insert(module.name, artifact);
            resolution.modules.push(module_info);
        }

        Ok(resolution)
    }
}
