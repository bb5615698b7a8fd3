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
use anyhow::bail;
use serde::Deserializer;
use std::sync::Arc;

/// Checks that `name` can be used as a module name.
///
/// A module name is used as the "folder" of its artifact in the blob container, hence it cannot be empty, cannot
/// contain only whitespaces and cannot contain the characters '\\' or '?'.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Module names cannot be empty");
    }

    if name.contains(['\\', '?']) {
        bail!(
            r#"
Module names must *not* contain any of the characters: '\', '?'.
The name < {} > does not satisfy that condition.

The name of a module is used as a folder in the blob container: these characters would produce an invalid blob name.
"#,
            name
        );
    }

    Ok(())
}

/// Deserialise, from a String, an `Arc<str>` that is guaranteed to be a valid [ModuleName](crate::ModuleName).
///
/// # Errors
///
/// The deserialisation will fail if the String does not pass [validate_name].
pub fn deserialize_name<'de, D>(deserializer: D) -> std::result::Result<Arc<str>, D::Error>
where
    D: Deserializer<'de>,
{
    let name: String = serde::de::Deserialize::deserialize(deserializer)?;
    validate_name(&name).map_err(|e| serde::de::Error::custom(format!("{e:?}")))?;

    Ok(name.into())
}
