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

mod tokens;

use std::path::PathBuf;
use std::time::Duration;

use edgestage_commons::ModuleName;
use edgestage_descriptors::{
    ArtifactTable, DeployDescriptor, GatewayInfo, LinkInfo, ModuleInfo, StructuredConfig,
};
use edgestage_publisher::{ExpiryDays, PublishConfig};
use thiserror::Error;

use self::tokens::{parse_tokens, ParsedArgs};

#[derive(Error, Debug)]
pub(crate) enum ResolveError {
    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),
    #[error("malformed input at < {token} >: {reason}")]
    MalformedInput { token: String, reason: String },
    #[error("failed to resolve the structured file < {} >", path.display())]
    MalformedFile {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    #[error("module < {0} > has no artifact, provide one with `--module-library` (`-ml`)")]
    MissingArtifact(ModuleName),
    #[error("{0}")]
    Configuration(String),
}

/// Where the modules and links of the deployment come from: the flat tokens of the command line or a structured
/// file. Both produce the same modules, links and artifacts.
#[derive(Debug)]
pub(crate) enum InputSource {
    Tokens {
        modules: Vec<ModuleInfo>,
        links: Vec<LinkInfo>,
        artifacts: ArtifactTable,
    },
    StructuredFile {
        path: PathBuf,
        work_dir: Option<PathBuf>,
    },
}

impl InputSource {
    fn resolve(
        self,
        gateway: &GatewayInfo,
    ) -> Result<(Vec<ModuleInfo>, Vec<LinkInfo>, ArtifactTable), ResolveError> {
        match self {
            InputSource::Tokens {
                modules,
                links,
                artifacts,
            } => Ok((modules, links, artifacts)),

            InputSource::StructuredFile { path, work_dir } => {
                // The file is read before switching to the working directory: its path is relative to the
                // directory esctl was started from.
                let resolution = StructuredConfig::try_load(&path)
                    .and_then(|config| config.resolve(gateway, work_dir.as_deref()))
                    .map_err(|source| ResolveError::MalformedFile {
                        path: path.clone(),
                        source,
                    })?;

                tracing::debug!(
                    "Structured file < {} >: {} module(s), {} link(s)",
                    path.display(),
                    resolution.modules.len(),
                    resolution.links.len()
                );

                Ok((resolution.modules, resolution.links, resolution.artifacts))
            }
        }
    }
}

/// Everything needed to publish a deployment, resolved from the command line.
#[derive(Debug)]
pub(crate) struct Resolution {
    pub(crate) descriptor: DeployDescriptor,
    pub(crate) artifacts: ArtifactTable,
    pub(crate) config: PublishConfig,
    pub(crate) concurrency: Option<usize>,
    pub(crate) timeout: Option<Duration>,
}

/// Resolves the tokens of the command line (without the name of the program).
///
/// # Errors
///
/// Besides the errors of the flat grammar, this function fails if:
/// - a required argument is missing,
/// - modules or links are declared on the command line alongside a structured file,
/// - the structured file cannot be loaded or resolved,
/// - a module has no artifact,
/// - the expiry duration or the resulting configuration is invalid.
pub(crate) fn resolve(tokens: impl IntoIterator<Item = String>) -> Result<Resolution, ResolveError> {
    let args = parse_tokens(tokens)?;
    check_required(&args)?;

    let ParsedArgs {
        storage_connection_string,
        iothub_connection_string,
        iothub_transport,
        work_dir,
        container,
        deploy_path,
        deploy_version,
        structured_file,
        edge_config_file,
        module_config_file,
        twin_config_file,
        expiry_days,
        concurrency,
        timeout,
        modules,
        links,
        artifacts,
        help_requested: _,
    } = args;

    let source = match structured_file {
        Some(path) => {
            if !modules.is_empty() || !links.is_empty() {
                return Err(ResolveError::MalformedInput {
                    token: "--local-json-config-file".into(),
                    reason: "modules and links cannot be declared on the command line alongside a structured file"
                        .into(),
                });
            }
            InputSource::StructuredFile { path, work_dir }
        }
        None => {
            if work_dir.is_some() {
                tracing::warn!("`--work-dir` is only used with a structured file, it is ignored");
            }
            InputSource::Tokens {
                modules,
                links,
                artifacts,
            }
        }
    };

    let expiry_days = ExpiryDays::try_from(expiry_days.unwrap_or_default())
        .map_err(|e| ResolveError::Configuration(e.to_string()))?;

    let gateway = GatewayInfo::new(
        deploy_path.unwrap_or_default(),
        deploy_version.unwrap_or_default(),
    );
    let (modules, links, artifacts) = source.resolve(&gateway)?;

    let mut descriptor = DeployDescriptor::new(gateway);
    descriptor.modules = modules;
    descriptor.links = links;

    if let Some(missing) = artifacts.first_missing(&descriptor) {
        return Err(ResolveError::MissingArtifact(missing.clone()));
    }

    let mut config = PublishConfig::new(
        storage_connection_string.unwrap_or_default(),
        container.unwrap_or_default(),
        expiry_days,
        module_config_file.unwrap_or_default(),
    );
    config.twin_config_file = twin_config_file;
    config.iothub_connection_string = iothub_connection_string;
    config.iothub_transport = iothub_transport;
    config.edge_config_file = edge_config_file;
    config
        .validate()
        .map_err(|e| ResolveError::Configuration(e.to_string()))?;

    if config.edge_config_file.is_some() && config.iothub_connection_string.is_none() {
        tracing::warn!("No `--iothub-cs` was provided, the edge configuration will not be written");
    }

    tracing::debug!(
        "Resolved {} module(s) and {} link(s)",
        descriptor.modules.len(),
        descriptor.links.len()
    );

    Ok(Resolution {
        descriptor,
        artifacts,
        config,
        concurrency,
        timeout,
    })
}

fn check_required(args: &ParsedArgs) -> Result<(), ResolveError> {
    if args.storage_connection_string.is_none() {
        return Err(ResolveError::MissingArgument("--storage-cs"));
    }
    if args.container.is_none() {
        return Err(ResolveError::MissingArgument("--blob-container"));
    }
    if args.module_config_file.is_none() {
        return Err(ResolveError::MissingArgument("--blob-module-config-file"));
    }
    if args.expiry_days.is_none() {
        return Err(ResolveError::MissingArgument("--expire-duration"));
    }
    // The deploy path prefixes the entry paths rewritten from a structured file.
    if args.structured_file.is_some() && args.deploy_path.is_none() {
        return Err(ResolveError::MissingArgument("--edge-deploy-path"));
    }

    Ok(())
}
