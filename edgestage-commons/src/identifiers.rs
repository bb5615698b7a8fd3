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

use crate::deserialize::deserialize_name;
use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A `ModuleName` identifies a module of a gateway deployment.
///
/// It is the key of the artifact table and the folder under which the module's artifact is stored in the blob
/// container. Links also reference modules through their name.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Hash, PartialOrd, Ord)]
pub struct ModuleName(#[serde(deserialize_with = "deserialize_name")] Arc<str>);

impl Deref for ModuleName {
    type Target = Arc<str>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ModuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

impl From<String> for ModuleName {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<&str> for ModuleName {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}
