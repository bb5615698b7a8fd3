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

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{
    DeployDescriptor, GatewayInfo, LinkInfo, ModuleArgs, StructuredConfig, WorkDirGuard,
};
use edgestage_commons::ModuleName;

const BASE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/descriptors");

// The working directory is global to the test process: every test that switches it takes this lock.
static WORK_DIR_LOCK: Mutex<()> = Mutex::new(());

fn descriptor_path(file: &str) -> PathBuf {
    Path::new(BASE_DIR).join(file)
}

fn gateway() -> GatewayInfo {
    GatewayInfo::new("/var/edge", "1.2.0")
}

fn resolve(file: &str) -> DeployDescriptor {
    let config = StructuredConfig::try_load(descriptor_path(file))
        .unwrap_or_else(|e| panic!("Failed to load < {file} >: {e:?}"));
    let resolution = config
        .resolve(&gateway(), None)
        .unwrap_or_else(|e| panic!("Failed to resolve < {file} >: {e:?}"));

    let mut descriptor = DeployDescriptor::new(gateway());
    descriptor.modules = resolution.modules;
    descriptor.links = resolution.links;
    descriptor
}

// This test goes through a complete structured file. In particular, we want to make sure of the following:
//
// - the `module.path` of the file only designates the artifact, the module is installed under the deploy path,
// - the arguments keep the order of the file and non-string values are converted,
// - a missing (or null) version is an empty string,
// - the modules and links keep the order of the file.
#[test]
fn test_resolve_structured_file() {
    let config = StructuredConfig::try_load(descriptor_path("ble-gateway.json"))
        .expect("Failed to load structured file");
    let resolution = config
        .resolve(&gateway(), None)
        .expect("Failed to resolve structured file");

    let names = resolution
        .modules
        .iter()
        .map(|module| module.name.to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["ble-sensor", "filter", "logger"]);

    let ble = &resolution.modules[0];
    assert_eq!(ble.version, "1.0.0");
    assert_eq!(ble.loader.name, "native");
    assert_eq!(ble.loader.entrypoint.module_path, "/var/edge/libble.so");
    assert!(ble.loader.entrypoint.module_uri.is_empty());
    assert_eq!(
        ble.args,
        ModuleArgs::from_iter([
            ("controller_index", "0"),
            ("device_mac_address", "AA:BB:CC:DD:EE:FF"),
            ("instructions", "read-temperature"),
        ])
    );

    let filter = &resolution.modules[1];
    assert_eq!(filter.version, "");
    assert!(filter.args.is_empty());

    assert_eq!(
        resolution.artifacts.get(&ModuleName::from("ble-sensor")),
        Some(Path::new("/build/out/libble.so"))
    );
    assert_eq!(
        resolution.artifacts.get(&ModuleName::from("logger")),
        Some(Path::new("/build/out/liblogger.so"))
    );
    assert_eq!(resolution.artifacts.len(), 3);

    assert_eq!(
        resolution.links,
        vec![
            LinkInfo::new("ble-sensor", "filter"),
            LinkInfo::new("filter", "logger"),
            LinkInfo::new("*", "logger"),
        ]
    );
}

#[test]
fn test_json_and_yaml_are_equivalent() {
    assert_eq!(resolve("ble-gateway.json"), resolve("ble-gateway.yaml"));
}

#[test]
fn test_entry_path_is_rewritten() {
    let yaml = r#"
modules:
  - name: mymodule
    loader:
      name: native
      entrypoint:
        module.path: /build/out/mymodule.so
"#;
    let config = serde_yaml::from_str::<StructuredConfig>(yaml).expect("Failed to parse YAML");
    let resolution = config
        .resolve(&GatewayInfo::new("/var/edge", "1.0"), None)
        .expect("Failed to resolve");

    assert_eq!(
        resolution.modules[0].loader.entrypoint.module_path,
        "/var/edge/mymodule.so"
    );
    assert_eq!(
        resolution.artifacts.get(&"mymodule".into()),
        Some(Path::new("/build/out/mymodule.so"))
    );
}

#[test]
fn test_invalid_module_path() {
    let yaml = r#"
modules:
  - name: broken
    loader:
      name: native
      entrypoint:
        module.path: /build/out/..
"#;
    let config = serde_yaml::from_str::<StructuredConfig>(yaml).expect("Failed to parse YAML");
    assert!(config.resolve(&gateway(), None).is_err());
}

// Publishing then parsing back the module configuration document keeps the names, the versions and the links.
#[test]
fn test_module_config_round_trip() {
    let mut published = resolve("ble-gateway.json");
    for module in published.modules.iter_mut() {
        module.loader.entrypoint.module_uri = format!(
            "file:///srv/blobs/modules/{}/artifact?sp=r",
            module.name
        );
    }

    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let document = dir.path().join("deploy.json");
    std::fs::write(
        &document,
        published
            .to_module_config()
            .expect("Failed to serialize the module configuration"),
    )
    .expect("Failed to write the module configuration");

    let parsed_back = StructuredConfig::try_load(&document)
        .expect("Failed to load the module configuration")
        .resolve(&published.gateway, None)
        .expect("Failed to resolve the module configuration");

    let summary = |modules: &[crate::ModuleInfo]| {
        modules
            .iter()
            .map(|module| (module.name.clone(), module.version.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(summary(&published.modules), summary(&parsed_back.modules));
    assert_eq!(published.links, parsed_back.links);

    // The entry path on the gateway is stable as well: its file name is the one of the artifact.
    assert_eq!(
        published.modules[0].loader.entrypoint.module_path,
        parsed_back.modules[0].loader.entrypoint.module_path
    );
}

#[test]
fn test_relative_paths_use_the_work_dir() {
    let _lock = WORK_DIR_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let before = std::env::current_dir().expect("Failed to read working directory");
    let work_dir = tempfile::tempdir().expect("Failed to create temporary directory");

    let resolution = StructuredConfig::try_load(descriptor_path("relative-paths.json"))
        .expect("Failed to load structured file")
        .resolve(&gateway(), Some(work_dir.path()))
        .expect("Failed to resolve structured file");

    assert_eq!(
        std::env::current_dir().expect("Failed to read working directory"),
        before
    );
    let artifact = resolution
        .artifacts
        .get(&"hello".into())
        .expect("Missing artifact");
    assert!(artifact.is_absolute());
    assert!(artifact.ends_with("out/libhello.so"));
    assert_eq!(
        resolution.modules[0].loader.entrypoint.module_path,
        "/var/edge/libhello.so"
    );
}

#[test]
fn test_work_dir_is_restored_on_error() {
    let _lock = WORK_DIR_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let before = std::env::current_dir().expect("Failed to read working directory");
    let work_dir = tempfile::tempdir().expect("Failed to create temporary directory");

    let yaml = r#"
modules:
  - name: broken
    loader:
      name: native
      entrypoint:
        module.path: ..
"#;
    let config = serde_yaml::from_str::<StructuredConfig>(yaml).expect("Failed to parse YAML");
    assert!(config.resolve(&gateway(), Some(work_dir.path())).is_err());
    assert_eq!(
        std::env::current_dir().expect("Failed to read working directory"),
        before
    );

    // Entering a directory that does not exist leaves the working directory untouched.
    assert!(WorkDirGuard::enter(work_dir.path().join("missing")).is_err());
    assert_eq!(
        std::env::current_dir().expect("Failed to read working directory"),
        before
    );
}
