//
// Copyright (c) 2021 - 2024 ZettaScale Technology
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

//! This crate exposes the structures driving the publication of a deployment: the [Publisher] and the
//! [ObjectStore] it uploads the artifacts to.
//!
//! Publishing a [DeployDescriptor](edgestage_descriptors::DeployDescriptor) consists in:
//! 1. uploading the artifact of every module and recording, in its entry point, a signed read-only URL,
//! 2. writing and uploading the module configuration document (the descriptor itself),
//! 3. producing the twin document that references it and, optionally, the edge configuration document.
//!
//! Users interested in staging modules should find everything in the [Publisher], [PublisherBuilder] and
//! [PublishConfig]. The errors reported by a publication are described by [PublishError]; when several modules fail,
//! each failure is kept in a [PublishFailure].

mod config;
pub use config::{ExpiryDays, PublishConfig};

mod error;
pub use error::{ModuleFailure, PublishError, PublishFailure, StorageError};

mod expiry;
pub use expiry::ExpiryWindow;

mod publisher;
pub use publisher::{PublishOutcome, Publisher, PublisherBuilder, TwinDestination};

pub mod store;
pub use store::{from_connection_string, BlobHandle, ObjectStore};
