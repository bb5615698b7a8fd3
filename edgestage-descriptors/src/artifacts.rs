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

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use edgestage_commons::ModuleName;

use crate::DeployDescriptor;

/// An `ArtifactTable` associates the name of a module to the location, on the build machine, of its artifact.
///
/// The table is only filled while resolving the inputs. As it is keyed by name, two modules sharing the same name
/// share the same entry: the last registered artifact wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactTable(HashMap<ModuleName, PathBuf>);

impl ArtifactTable {
    /// Registers the artifact of `module`, returning the artifact it replaces, if any.
    pub fn insert(&mut self, module: ModuleName, artifact: impl Into<PathBuf>) -> Option<PathBuf> {
        let artifact = artifact.into();
        let previous = self.0.insert(module.clone(), artifact);
        if let Some(previous) = &previous {
            tracing::warn!(
                "Module < {} > was declared several times, its artifact < {} > is replaced by < {} >",
                module,
                previous.display(),
                self.0[&module].display()
            );
        }

        previous
    }

    pub fn get(&self, module: &ModuleName) -> Option<&Path> {
        self.0.get(module).map(|path| path.as_path())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the name of the first module, in the order of the descriptor, that has no artifact registered.
    pub fn first_missing<'a>(&self, descriptor: &'a DeployDescriptor) -> Option<&'a ModuleName> {
        descriptor
            .modules
            .iter()
            .map(|module| &module.name)
            .find(|name| !self.0.contains_key(*name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GatewayInfo, ModuleInfo};

    #[test]
    fn test_last_artifact_wins() {
        let mut table = ArtifactTable::default();
        assert!(table
            .insert("filter".into(), "/build/v1/libfilter.so")
            .is_none());
        assert_eq!(
            table.insert("filter".into(), "/build/v2/libfilter.so"),
            Some(PathBuf::from("/build/v1/libfilter.so"))
        );

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(&"filter".into()),
            Some(Path::new("/build/v2/libfilter.so"))
        );
    }

    #[test]
    fn test_first_missing() {
        let mut descriptor = DeployDescriptor::new(GatewayInfo::default());
        descriptor.modules.push(ModuleInfo::new("sensor"));
        descriptor.modules.push(ModuleInfo::new("logger"));
        descriptor.modules.push(ModuleInfo::new("hub"));

        let mut table = ArtifactTable::default();
        table.insert("sensor".into(), "/build/libsensor.so");
        assert_eq!(
            table.first_missing(&descriptor),
            Some(&ModuleName::from("logger"))
        );

        table.insert("logger".into(), "/build/liblogger.so");
        table.insert("hub".into(), "/build/libhub.so");
        assert_eq!(table.first_missing(&descriptor), None);
    }
}
