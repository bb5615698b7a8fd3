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

mod resolver;
use resolver::{Resolution, ResolveError};

mod usage;

use std::process::ExitCode;

use edgestage_publisher::{
    from_connection_string, PublishError, PublishFailure, Publisher, TwinDestination,
};
use tracing_subscriber::EnvFilter;

/// Invalid invocation: a required argument is missing.
const EXIT_USAGE: u8 = 1;
/// The inputs or the configuration are invalid, nothing was uploaded.
const EXIT_INVALID_INPUT: u8 = 2;
/// The publication started but did not complete.
const EXIT_PUBLISH_FAILED: u8 = 3;

#[async_std::main]
async fn main() -> ExitCode {
    // Logs go to stderr: stdout is reserved for the twin document.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let resolution = match resolver::resolve(std::env::args().skip(1)) {
        Ok(resolution) => resolution,
        Err(error) => return report_resolve_error(error),
    };

    run(resolution).await
}

async fn run(resolution: Resolution) -> ExitCode {
    let Resolution {
        mut descriptor,
        artifacts,
        config,
        concurrency,
        timeout,
    } = resolution;

    let store = match from_connection_string(&config.storage_connection_string) {
        Ok(store) => store,
        Err(error) => {
            tracing::error!("{:?}", anyhow::Error::from(error));
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    };

    let mut builder = Publisher::builder(store);
    if let Some(concurrency) = concurrency {
        builder = builder.concurrency(concurrency);
    }
    if let Some(timeout) = timeout {
        builder = builder.deadline(timeout);
    }
    let publisher = match builder.build() {
        Ok(publisher) => publisher,
        Err(error) => {
            tracing::error!("{:?}", anyhow::Error::from(error));
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    };

    match publisher.publish(&mut descriptor, &artifacts, &config).await {
        Ok(outcome) => {
            if outcome.twin_destination == TwinDestination::Caller {
                println!("{}", outcome.twin_json);
            }
            tracing::info!(
                "Deployment published, module configuration available at < {} >",
                outcome.module_config_url
            );
            ExitCode::SUCCESS
        }
        Err(error) => report_publish_error(error),
    }
}

fn report_resolve_error(error: ResolveError) -> ExitCode {
    let code = resolve_exit_code(&error);

    eprintln!("{:?}", anyhow::Error::from(error));
    if code == EXIT_USAGE {
        eprintln!("{}", usage::USAGE);
    }

    ExitCode::from(code)
}

fn report_publish_error(error: PublishError) -> ExitCode {
    let code = publish_exit_code(&error);

    match error {
        PublishError::Failure(failure) => eprint!("{}", render_failure(&failure)),
        error => eprintln!("{:?}", anyhow::Error::from(error)),
    }

    ExitCode::from(code)
}

fn resolve_exit_code(error: &ResolveError) -> u8 {
    match error {
        ResolveError::MissingArgument(_) => EXIT_USAGE,
        ResolveError::MalformedInput { .. }
        | ResolveError::MalformedFile { .. }
        | ResolveError::MissingArtifact(_)
        | ResolveError::Configuration(_) => EXIT_INVALID_INPUT,
    }
}

fn publish_exit_code(error: &PublishError) -> u8 {
    match error {
        PublishError::Configuration(_) | PublishError::MissingArtifact(_) => EXIT_INVALID_INPUT,
        PublishError::Failure(_)
        | PublishError::Storage { .. }
        | PublishError::Timeout(_)
        | PublishError::Io { .. }
        | PublishError::Serialization { .. } => EXIT_PUBLISH_FAILED,
    }
}

/// The summary of the failure on the first line, followed by every cause, numbered from 1.
fn render_failure(failure: &PublishFailure) -> String {
    let mut rendered = format!("{failure}:\n");
    for (rank, cause) in failure.causes().iter().enumerate() {
        rendered.push_str(&format!("  {}. {}\n", rank + 1, cause));
    }

    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    use edgestage_commons::ModuleName;
    use edgestage_publisher::{ModuleFailure, StorageError};

    fn upload_failure(index: usize, module: &str, reason: &str) -> ModuleFailure {
        let artifact = std::path::PathBuf::from(format!("/build/lib{module}.so"));
        ModuleFailure {
            index,
            module: ModuleName::from(module),
            artifact: artifact.clone(),
            error: StorageError::Upload {
                blob: format!("{module}/lib{module}.so"),
                local: artifact,
                source: std::io::Error::new(std::io::ErrorKind::Other, reason.to_string()),
            },
        }
    }

    #[test]
    fn test_resolve_exit_codes() {
        assert_eq!(
            resolve_exit_code(&ResolveError::MissingArgument("--storage-cs")),
            EXIT_USAGE
        );
        assert_eq!(
            resolve_exit_code(&ResolveError::MalformedInput {
                token: "-man".into(),
                reason: "expected `-mav`".into(),
            }),
            EXIT_INVALID_INPUT
        );
        assert_eq!(
            resolve_exit_code(&ResolveError::MissingArtifact("logger".into())),
            EXIT_INVALID_INPUT
        );
        assert_eq!(
            resolve_exit_code(&ResolveError::Configuration("invalid container".into())),
            EXIT_INVALID_INPUT
        );
    }

    #[test]
    fn test_publish_exit_codes() {
        assert_eq!(
            publish_exit_code(&PublishError::Configuration("empty container".into())),
            EXIT_INVALID_INPUT
        );
        assert_eq!(
            publish_exit_code(&PublishError::MissingArtifact("logger".into())),
            EXIT_INVALID_INPUT
        );
        assert_eq!(
            publish_exit_code(&PublishError::Timeout(std::time::Duration::from_secs(1))),
            EXIT_PUBLISH_FAILED
        );

        let failure = PublishFailure::new(2, vec![upload_failure(0, "ble-sensor", "disk full")]);
        assert_eq!(
            publish_exit_code(&PublishError::Failure(failure)),
            EXIT_PUBLISH_FAILED
        );
    }

    #[test]
    fn test_every_cause_is_rendered() {
        let failure = PublishFailure::new(
            3,
            vec![
                upload_failure(0, "ble-sensor", "disk full"),
                upload_failure(2, "logger", "permission denied"),
            ],
        );

        let rendered = render_failure(&failure);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "2 out of 3 module(s) could not be published:");
        assert!(lines[1].starts_with("  1. module < ble-sensor > (#0)"));
        assert!(lines[1].ends_with("disk full"));
        assert!(lines[2].starts_with("  2. module < logger > (#2)"));
        assert!(lines[2].ends_with("permission denied"));
    }
}
