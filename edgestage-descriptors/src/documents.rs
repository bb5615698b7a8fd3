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

use crate::{LinkInfo, ModuleInfo};

use serde::{Deserialize, Serialize};

/// Transport used by the gateway to reach its hub when none is specified.
pub const DEFAULT_TRANSPORT: &str = "amqp";

/// The `TwinDocument` is the compact payload delivered through the device management channel of the gateway. It only
/// references, through a signed URL, the module configuration document.
///
/// ```json
/// { "gateway": { "configuration": "https://edge.blob.core.windows.net/modules/deploy.json?sv=..." } }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TwinDocument {
    pub gateway: TwinGateway,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TwinGateway {
    pub configuration: String,
}

impl TwinDocument {
    pub fn new(configuration: impl Into<String>) -> Self {
        Self {
            gateway: TwinGateway {
                configuration: configuration.into(),
            },
        }
    }
}

/// The `EdgeConfigDocument` describes how the gateway itself connects to its hub. It is only written locally, never
/// uploaded: modules and links are left empty as the gateway receives them through the [TwinDocument].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EdgeConfigDocument {
    pub gateway: EdgeGatewayInfo,
    pub modules: Vec<ModuleInfo>,
    pub links: Vec<LinkInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EdgeGatewayInfo {
    #[serde(rename = "connection-string")]
    pub connection_string: String,
    pub transport: String,
}

impl EdgeConfigDocument {
    /// Creates the document, falling back to the [DEFAULT_TRANSPORT] if no (or an empty) transport is provided.
    pub fn new(connection_string: impl Into<String>, transport: Option<&str>) -> Self {
        let transport = match transport {
            Some(transport) if !transport.is_empty() => transport,
            _ => DEFAULT_TRANSPORT,
        };

        Self {
            gateway: EdgeGatewayInfo {
                connection_string: connection_string.into(),
                transport: transport.to_string(),
            },
            modules: Vec::default(),
            links: Vec::default(),
        }
    }
}
