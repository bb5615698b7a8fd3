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

use crate::Result;
use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use std::path::Path;
use std::{ffi::OsStr, io::Read};

pub(crate) fn deserializer<N>(path: &Path) -> Result<fn(&str) -> Result<N>>
where
    N: for<'a> Deserialize<'a>,
{
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(|buf| {
            serde_json::from_str::<N>(buf)
                .context(format!("Failed to deserialize from JSON:\n{}", buf))
        }),
        Some("yml") | Some("yaml") => Ok(|buf| {
            serde_yaml::from_str::<N>(buf)
                .context(format!("Failed to deserialize from YAML:\n{}", buf))
        }),
        Some(extension) => bail!(
            r###"
Unsupported file extension < {} > in:
   {:?}

Currently supported file extensions are:
- .json
- .yml
- .yaml
"###,
            extension,
            path
        ),
        None => bail!("Missing file extension in path:\n{}", path.display()),
    }
}

/// Reads and decodes the file at `path`, the format being selected by its extension (JSON or YAML).
///
/// # Errors
///
/// This function will fail if the file does not exist, cannot be read, has an unsupported extension or if its content
/// does not match the structure `N`.
pub fn try_load_from_file<N>(path: impl AsRef<OsStr>) -> Result<N>
where
    N: for<'a> Deserialize<'a>,
{
    let path_buf = std::fs::canonicalize(path.as_ref()).context(format!(
        "Failed to canonicalize path (does the file exist?):\n{}",
        path.as_ref().to_string_lossy()
    ))?;

    let mut buf = String::default();
    std::fs::File::open(&path_buf)
        .context(format!("Failed to open file:\n{}", path_buf.display()))?
        .read_to_string(&mut buf)
        .context(format!(
            "Failed to read the content of file:\n{}",
            path_buf.display()
        ))?;

    tracing::trace!("Loaded {} bytes from {}", buf.len(), path_buf.display());

    (deserializer::<N>(&path_buf))?(&buf)
        .context(format!("Failed to deserialize {}", &path_buf.display()))
}

/// Removes one pair of surrounding double quotes, if `value` both starts and ends with one.
///
/// Shells usually strip quotes themselves; this covers values that were quoted twice (for instance connection
/// strings forwarded by a build script).
pub fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Returns the file name of `path`, as a String.
///
/// # Errors
///
/// This function fails if `path` has no file name (e.g. it ends with `..`) or if the file name is not valid UTF-8.
pub fn basename(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| anyhow!("Cannot extract a file name from path:\n{}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Gateway {
        version: String,
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""AccountName=edge""#), "AccountName=edge");
        assert_eq!(unquote(r#""""#), "");
        assert_eq!(unquote(r#"""#), r#"""#);
        assert_eq!(unquote(r#""half-quoted"#), r#""half-quoted"#);
        assert_eq!(unquote("plain"), "plain");
    }

    #[test]
    fn test_basename() {
        assert_eq!(
            basename("/build/out/mymodule.so").expect("file name"),
            "mymodule.so"
        );
        assert_eq!(basename("libfilter.so").expect("file name"), "libfilter.so");
        assert!(basename("/build/out/..").is_err());
        assert!(basename("/").is_err());
    }

    #[test]
    fn test_try_load_from_file() {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");

        let json = dir.path().join("gateway.json");
        std::fs::File::create(&json)
            .and_then(|mut file| file.write_all(br#"{ "version": "1.0.2" }"#))
            .expect("Failed to write JSON file");
        assert_eq!(
            try_load_from_file::<Gateway>(&json).expect("Failed to load JSON"),
            Gateway {
                version: "1.0.2".into()
            }
        );

        let yaml = dir.path().join("gateway.yaml");
        std::fs::write(&yaml, "version: \"2.0\"\n").expect("Failed to write YAML file");
        assert_eq!(
            try_load_from_file::<Gateway>(&yaml).expect("Failed to load YAML"),
            Gateway {
                version: "2.0".into()
            }
        );

        let toml = dir.path().join("gateway.toml");
        std::fs::write(&toml, "version = \"2.0\"\n").expect("Failed to write TOML file");
        assert!(try_load_from_file::<Gateway>(&toml).is_err());

        assert!(try_load_from_file::<Gateway>(dir.path().join("missing.json")).is_err());
    }
}
