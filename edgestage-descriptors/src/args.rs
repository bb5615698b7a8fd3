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

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The arguments of a module: an ordered list of `(name, value)` pairs.
///
/// Names can repeat: every pair is kept, in insertion order.
///
/// # Textual representation
///
/// The arguments are represented as an object whose keys are the names. Values that are not strings (numbers,
/// booleans) are converted to their textual representation when parsed, `null` becomes an empty string.
///
/// ```yaml
/// args:
///   controller_index: 0
///   device_mac_address: "AA:BB:CC:DD:EE:FF"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleArgs(Vec<(String, String)>);

impl ModuleArgs {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for ModuleArgs {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl Serialize for ModuleArgs {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct ModuleArgsVisitor;

impl<'de> Visitor<'de> for ModuleArgsVisitor {
    type Value = ModuleArgs;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object associating argument names to scalar values")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut args = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, value)) = access.next_entry::<String, serde_json::Value>()? {
            let value = match value {
                serde_json::Value::String(value) => value,
                serde_json::Value::Null => String::default(),
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    return Err(serde::de::Error::custom(format!(
                        "The value of the module argument < {} > must be a scalar, found:\n{}",
                        name, value
                    )))
                }
                scalar => scalar.to_string(),
            };
            args.push((name, value));
        }

        Ok(ModuleArgs(args))
    }

    // An empty `args` section written as `args:` in YAML is a `null`.
    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(ModuleArgs::default())
    }
}

impl<'de> Deserialize<'de> for ModuleArgs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ModuleArgsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_and_duplicates_are_preserved() {
        let json = r#"{ "zeta": "1", "alpha": 2, "zeta": true, "empty": null }"#;
        let args = serde_json::from_str::<ModuleArgs>(json).expect("Failed to parse args");

        assert_eq!(
            args.iter().collect::<Vec<_>>(),
            vec![
                ("zeta", "1"),
                ("alpha", "2"),
                ("zeta", "true"),
                ("empty", "")
            ]
        );

        assert_eq!(
            serde_json::to_string(&args).expect("Failed to serialize args"),
            r#"{"zeta":"1","alpha":"2","zeta":"true","empty":""}"#
        );
    }

    #[test]
    fn test_yaml_args() {
        let yaml = r#"
controller_index: 0
device_mac_address: "AA:BB:CC:DD:EE:FF"
"#;
        let args = serde_yaml::from_str::<ModuleArgs>(yaml).expect("Failed to parse YAML args");
        assert_eq!(
            args,
            ModuleArgs::from_iter([
                ("controller_index", "0"),
                ("device_mac_address", "AA:BB:CC:DD:EE:FF"),
            ])
        );
    }

    #[test]
    fn test_nested_values_are_rejected() {
        assert!(serde_json::from_str::<ModuleArgs>(r#"{ "nested": { "a": 1 } }"#).is_err());
        assert!(serde_json::from_str::<ModuleArgs>(r#"{ "list": [1, 2] }"#).is_err());
        assert!(serde_json::from_str::<ModuleArgs>(r#"["not", "a", "map"]"#).is_err());
    }
}
