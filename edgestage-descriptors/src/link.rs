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

use std::str::FromStr;

use anyhow::{anyhow, bail};
use edgestage_commons::{validate_name, ModuleName};
use serde::{Deserialize, Serialize};

/// A `LinkInfo` describes a link of the gateway: messages published by `source` are delivered to `sink`.
///
/// Both ends are names of modules (or well-known endpoints of the gateway, such as `*`). No verification is
/// performed on them: links are only declared edges, forwarded as-is to the gateway.
///
/// # Example
///
/// The textual representation, in YAML, of a link is as following:
/// ```yaml
/// source: ble-sensor
/// sink: logger
/// ```
///
/// On the command line, the same link is written `ble-sensor:logger`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkInfo {
    pub source: ModuleName,
    pub sink: ModuleName,
}

impl std::fmt::Display for LinkInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} => {}", self.source, self.sink)
    }
}

impl LinkInfo {
    pub fn new(source: impl Into<ModuleName>, sink: impl Into<ModuleName>) -> Self {
        Self {
            source: source.into(),
            sink: sink.into(),
        }
    }
}

impl FromStr for LinkInfo {
    type Err = anyhow::Error;

    /// Parses a link written `source:sink`. Only the first ':' separates both ends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, sink) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Expected a link of the form `source:sink`, found < {s} >"))?;

        if source.is_empty() || sink.is_empty() {
            bail!("Both ends of the link < {s} > must be named");
        }
        validate_name(source)?;
        validate_name(sink)?;

        Ok(Self::new(source, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            "ble-sensor:logger".parse::<LinkInfo>().expect("valid link"),
            LinkInfo::new("ble-sensor", "logger")
        );
        assert_eq!(
            "*:hub:telemetry".parse::<LinkInfo>().expect("valid link"),
            LinkInfo::new("*", "hub:telemetry")
        );

        assert!("ble-sensor".parse::<LinkInfo>().is_err());
        assert!(":logger".parse::<LinkInfo>().is_err());
        assert!("ble-sensor:".parse::<LinkInfo>().is_err());
    }
}
