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

//! This crate exposes the structures describing a gateway deployment: the [DeployDescriptor], the modules it is
//! composed of and the links between them.
//!
//! A [DeployDescriptor] is built either from command line flags or from a *structured file* (see [StructuredConfig]).
//! In both cases the location, on the build machine, of each module's artifact is kept aside in an [ArtifactTable].
//!
//! The documents derived from a descriptor once it is published, the [TwinDocument] and the [EdgeConfigDocument],
//! are also described here.

pub(crate) mod args;
pub(crate) mod artifacts;
pub(crate) mod deploy;
pub(crate) mod documents;
pub(crate) mod link;
pub(crate) mod module;
pub(crate) mod structured;

pub use args::ModuleArgs;
pub use artifacts::ArtifactTable;
pub use deploy::{DeployDescriptor, GatewayInfo};
pub use documents::{EdgeConfigDocument, EdgeGatewayInfo, TwinDocument, TwinGateway, DEFAULT_TRANSPORT};
pub use link::LinkInfo;
pub use module::{EntryPointInfo, LoaderInfo, ModuleInfo};
pub use structured::{StructuredConfig, StructuredResolution, WorkDirGuard};

#[cfg(test)]
mod tests;
