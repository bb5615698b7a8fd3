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

use super::ResolveError;

use std::iter::Peekable;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use edgestage_commons::{unquote, validate_name, ModuleName};
use edgestage_descriptors::{ArtifactTable, LinkInfo, ModuleInfo};

/// The flags of the outer grammar. Each of them, except `Help`, is followed by exactly one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OuterFlag {
    StorageConnectionString,
    IotHubConnectionString,
    IotHubTransport,
    WorkDir,
    BlobContainer,
    EdgeDeployPath,
    DeployVersion,
    LocalJsonConfigFile,
    EdgeConfigJsonFile,
    Module,
    ModuleConfigFile,
    TwinConfigFile,
    ExpireDuration,
    Link,
    Concurrency,
    Timeout,
    Help,
}

impl OuterFlag {
    fn parse(token: &str) -> Option<Self> {
        let flag = match token {
            "--storage-cs" | "-scs" => Self::StorageConnectionString,
            "--iothub-cs" | "-ics" => Self::IotHubConnectionString,
            "--iothub-transport" | "-it" => Self::IotHubTransport,
            "--work-dir" | "-wd" => Self::WorkDir,
            "--blob-container" | "-bc" => Self::BlobContainer,
            "--edge-deploy-path" | "-edp" => Self::EdgeDeployPath,
            "--deploy-version" | "-dv" => Self::DeployVersion,
            "--local-json-config-file" | "-ljcf" => Self::LocalJsonConfigFile,
            "--edge-config-json-file" | "-ecjf" => Self::EdgeConfigJsonFile,
            "--module" | "-m" => Self::Module,
            "--blob-module-config-file" | "-om" => Self::ModuleConfigFile,
            "--twin-config-file" | "-ot" => Self::TwinConfigFile,
            "--expire-duration" | "-ed" => Self::ExpireDuration,
            "--link" | "-l" => Self::Link,
            "--concurrency" | "-j" => Self::Concurrency,
            "--timeout" | "-to" => Self::Timeout,
            "--help" | "-h" => Self::Help,
            _ => return None,
        };

        Some(flag)
    }
}

/// The flags of the module sub-grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleFlag {
    LoaderName,
    ModuleLibrary,
    ModuleEdgePath,
    ModuleArgName,
    ModuleVersion,
}

impl ModuleFlag {
    fn parse(token: &str) -> Option<Self> {
        let flag = match token {
            "--loader-name" | "-ln" => Self::LoaderName,
            "--module-library" | "-ml" => Self::ModuleLibrary,
            "--module-edge-path" | "-mep" => Self::ModuleEdgePath,
            "--module-arg-name" | "-man" => Self::ModuleArgName,
            "--module-version" | "-mv" => Self::ModuleVersion,
            _ => return None,
        };

        Some(flag)
    }
}

fn is_module_arg_value(token: &str) -> bool {
    token == "--module-arg-value" || token == "-mav"
}

/// Everything the flat tokens carry, before any validation of the combination of flags.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs {
    pub(crate) storage_connection_string: Option<String>,
    pub(crate) iothub_connection_string: Option<String>,
    pub(crate) iothub_transport: Option<String>,
    pub(crate) work_dir: Option<PathBuf>,
    pub(crate) container: Option<String>,
    pub(crate) deploy_path: Option<String>,
    pub(crate) deploy_version: Option<String>,
    pub(crate) structured_file: Option<PathBuf>,
    pub(crate) edge_config_file: Option<PathBuf>,
    pub(crate) module_config_file: Option<PathBuf>,
    pub(crate) twin_config_file: Option<PathBuf>,
    pub(crate) expiry_days: Option<f64>,
    pub(crate) concurrency: Option<usize>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) modules: Vec<ModuleInfo>,
    pub(crate) links: Vec<LinkInfo>,
    pub(crate) artifacts: ArtifactTable,
    pub(crate) help_requested: bool,
}

/// `Outer` consumes outer flags; `InModule` consumes the sub-flags of the module at the given index and hands
/// control back to `Outer` on the first token that is not one of them, without consuming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outer,
    InModule(usize),
}

struct TokenStream<I: Iterator<Item = String>> {
    tokens: Peekable<I>,
}

impl<I: Iterator<Item = String>> TokenStream<I> {
    /// Returns the value following `flag`, unquoted.
    fn value(&mut self, flag: &str) -> Result<String, ResolveError> {
        self.tokens
            .next()
            .map(|value| unquote(&value).to_string())
            .ok_or_else(|| ResolveError::MalformedInput {
                token: flag.to_string(),
                reason: "a value is expected after this flag".into(),
            })
    }

    fn parsed_value<T>(&mut self, flag: &str) -> Result<T, ResolveError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.value(flag)?;
        value
            .parse::<T>()
            .map_err(|e| ResolveError::MalformedInput {
                reason: format!("invalid value for `{flag}`: {e}"),
                token: value,
            })
    }
}

/// Parses the flat tokens of the command line.
///
/// Tokens are consumed left to right. Parsing stops silently at the first token that is not a recognised flag: the
/// remaining tokens are ignored.
///
/// # Errors
///
/// This function fails if a flag is not followed by a value, if a value cannot be parsed, or if a
/// `--module-arg-name` is not immediately followed by a `--module-arg-value`.
pub(crate) fn parse_tokens(
    tokens: impl IntoIterator<Item = String>,
) -> Result<ParsedArgs, ResolveError> {
    let mut stream = TokenStream {
        tokens: tokens.into_iter().peekable(),
    };
    let mut args = ParsedArgs::default();
    let mut state = State::Outer;

    loop {
        state = match state {
            State::Outer => {
                let Some(token) = stream.tokens.next() else {
                    break;
                };

                match OuterFlag::parse(&token) {
                    Some(flag) => apply_outer_flag(flag, &token, &mut stream, &mut args)?,
                    None => {
                        let ignored = stream.tokens.count();
                        tracing::debug!(
                            "Unrecognised token < {} >, parsing stops ({} token(s) ignored)",
                            token,
                            ignored
                        );
                        break;
                    }
                }
            }

            State::InModule(index) => {
                let flag = stream.tokens.peek().and_then(|token| ModuleFlag::parse(token));
                match flag {
                    Some(flag) => {
                        let token = stream.tokens.next().unwrap_or_default();
                        apply_module_flag(flag, &token, index, &mut stream, &mut args)?;
                        State::InModule(index)
                    }
                    None => {
                        tracing::trace!("End of the block of module < {} >", args.modules[index].name);
                        State::Outer
                    }
                }
            }
        };
    }

    Ok(args)
}

fn apply_outer_flag<I: Iterator<Item = String>>(
    flag: OuterFlag,
    token: &str,
    stream: &mut TokenStream<I>,
    args: &mut ParsedArgs,
) -> Result<State, ResolveError> {
    tracing::trace!("Outer flag < {} > ({:?})", token, flag);

    match flag {
        OuterFlag::StorageConnectionString => {
            args.storage_connection_string = Some(stream.value(token)?)
        }
        OuterFlag::IotHubConnectionString => {
            args.iothub_connection_string = Some(stream.value(token)?)
        }
        OuterFlag::IotHubTransport => args.iothub_transport = Some(stream.value(token)?),
        OuterFlag::WorkDir => args.work_dir = Some(stream.value(token)?.into()),
        OuterFlag::BlobContainer => args.container = Some(stream.value(token)?),
        OuterFlag::EdgeDeployPath => args.deploy_path = Some(stream.value(token)?),
        OuterFlag::DeployVersion => args.deploy_version = Some(stream.value(token)?),
        OuterFlag::LocalJsonConfigFile => args.structured_file = Some(stream.value(token)?.into()),
        OuterFlag::EdgeConfigJsonFile => args.edge_config_file = Some(stream.value(token)?.into()),
        OuterFlag::ModuleConfigFile => {
            args.module_config_file = Some(stream.value(token)?.into())
        }
        OuterFlag::TwinConfigFile => args.twin_config_file = Some(stream.value(token)?.into()),
        OuterFlag::ExpireDuration => args.expiry_days = Some(stream.parsed_value(token)?),
        OuterFlag::Concurrency => args.concurrency = Some(stream.parsed_value(token)?),
        OuterFlag::Timeout => {
            let value = stream.value(token)?;
            let timeout =
                humantime::parse_duration(&value).map_err(|e| ResolveError::MalformedInput {
                    reason: format!("invalid value for `{token}`: {e}"),
                    token: value,
                })?;
            args.timeout = Some(timeout);
        }
        OuterFlag::Link => {
            let value = stream.value(token)?;
            let link = LinkInfo::from_str(&value).map_err(|e| ResolveError::MalformedInput {
                reason: e.to_string(),
                token: value,
            })?;
            args.links.push(link);
        }
        OuterFlag::Help => {
            // Printing the usage does not end the parsing.
            crate::usage::print_usage();
            args.help_requested = true;
        }
        OuterFlag::Module => {
            let name = stream.value(token)?;
            validate_name(&name).map_err(|e| ResolveError::MalformedInput {
                reason: e.to_string(),
                token: name.clone(),
            })?;
            args.modules.push(ModuleInfo::new(name));
            return Ok(State::InModule(args.modules.len() - 1));
        }
    }

    Ok(State::Outer)
}

fn apply_module_flag<I: Iterator<Item = String>>(
    flag: ModuleFlag,
    token: &str,
    index: usize,
    stream: &mut TokenStream<I>,
    args: &mut ParsedArgs,
) -> Result<(), ResolveError> {
    tracing::trace!("Module flag < {} > ({:?})", token, flag);
    let module = &mut args.modules[index];

    match flag {
        ModuleFlag::LoaderName => module.loader.name = stream.value(token)?,
        ModuleFlag::ModuleEdgePath => module.loader.entrypoint.module_path = stream.value(token)?,
        ModuleFlag::ModuleVersion => module.version = stream.value(token)?,
        ModuleFlag::ModuleLibrary => {
            let library = stream.value(token)?;
            let name: ModuleName = module.name.clone();
            args.artifacts.insert(name, library);
        }
        ModuleFlag::ModuleArgName => {
            let name = stream.value(token)?;
            match stream.tokens.next() {
                Some(next) if is_module_arg_value(&next) => {
                    let value = stream.value(&next)?;
                    module.args.push(name, value);
                }
                next => {
                    return Err(ResolveError::MalformedInput {
                        token: next.unwrap_or_else(|| "<end of arguments>".into()),
                        reason: format!(
                            "the argument < {name} > of module < {} > must be immediately followed by `--module-arg-value` (`-mav`)",
                            module.name
                        ),
                    })
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgestage_descriptors::ModuleArgs;
    use std::path::Path;

    fn tokens(line: &str) -> Vec<String> {
        line.split_whitespace().map(|token| token.to_string()).collect()
    }

    #[test]
    fn test_modules_and_links_keep_their_order() {
        let args = parse_tokens(tokens(
            "-m ble-sensor -ln native -ml /build/libble.so -mep /var/edge/libble.so -mv 1.0.0 \
               -man controller_index -mav 0 -man instructions -mav read -man instructions -mav write \
             -m logger -ml /build/liblogger.so \
             -l ble-sensor:logger -l *:logger \
             -m filter",
        ))
        .expect("Failed to parse tokens");

        let names = args
            .modules
            .iter()
            .map(|module| module.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["ble-sensor", "logger", "filter"]);

        let ble = &args.modules[0];
        assert_eq!(ble.loader.name, "native");
        assert_eq!(ble.loader.entrypoint.module_path, "/var/edge/libble.so");
        assert_eq!(ble.version, "1.0.0");
        // Duplicated argument names are kept.
        assert_eq!(
            ble.args,
            ModuleArgs::from_iter([
                ("controller_index", "0"),
                ("instructions", "read"),
                ("instructions", "write"),
            ])
        );

        assert_eq!(
            args.links,
            vec![
                LinkInfo::new("ble-sensor", "logger"),
                LinkInfo::new("*", "logger")
            ]
        );
        assert_eq!(
            args.artifacts.get(&"logger".into()),
            Some(Path::new("/build/liblogger.so"))
        );
    }

    #[test]
    fn test_empty_module_block() {
        let args = parse_tokens(tokens("-m lonely -bc modules")).expect("Failed to parse tokens");
        let module = &args.modules[0];

        assert_eq!(module.name, ModuleName::from("lonely"));
        assert!(module.args.is_empty());
        assert!(module.loader.name.is_empty());
        assert!(module.loader.entrypoint.module_path.is_empty());
        assert!(module.loader.entrypoint.module_uri.is_empty());
        assert_eq!(args.container.as_deref(), Some("modules"));
    }

    #[test]
    fn test_arg_name_must_be_followed_by_its_value() {
        let result = parse_tokens(tokens("-m sensor -man threshold -mv 1.0 -mav 12"));
        assert!(matches!(
            result,
            Err(ResolveError::MalformedInput { token, .. }) if token == "-mv"
        ));

        let result = parse_tokens(tokens("-m sensor -man threshold"));
        assert!(matches!(result, Err(ResolveError::MalformedInput { .. })));
    }

    #[test]
    fn test_unrecognised_token_stops_parsing() {
        let args = parse_tokens(tokens("-bc modules --verbose -dv 2.0 -m ignored"))
            .expect("Failed to parse tokens");

        assert_eq!(args.container.as_deref(), Some("modules"));
        assert!(args.deploy_version.is_none());
        assert!(args.modules.is_empty());
    }

    #[test]
    fn test_orphan_arg_value_ends_the_module_block() {
        let args = parse_tokens(tokens("-m sensor -mav 12 -bc modules"))
            .expect("Failed to parse tokens");
        assert_eq!(args.modules.len(), 1);
        assert!(args.container.is_none());
    }

    #[test]
    fn test_values_are_unquoted() {
        let args = parse_tokens(vec![
            "--storage-cs".to_string(),
            r#""AccountName=edge;AccountKey=a2V5""#.to_string(),
            "-ics".to_string(),
            r#""HostName=hub;DeviceId=gw""#.to_string(),
            "-m".to_string(),
            "sensor".to_string(),
            "-man".to_string(),
            "greeting".to_string(),
            "-mav".to_string(),
            r#""hello world""#.to_string(),
        ])
        .expect("Failed to parse tokens");

        assert_eq!(
            args.storage_connection_string.as_deref(),
            Some("AccountName=edge;AccountKey=a2V5")
        );
        assert_eq!(
            args.iothub_connection_string.as_deref(),
            Some("HostName=hub;DeviceId=gw")
        );
        assert_eq!(
            args.modules[0].args,
            ModuleArgs::from_iter([("greeting", "hello world")])
        );
    }

    #[test]
    fn test_missing_value() {
        assert!(matches!(
            parse_tokens(tokens("-bc modules -om")),
            Err(ResolveError::MalformedInput { token, .. }) if token == "-om"
        ));
        assert!(matches!(
            parse_tokens(tokens("-m")),
            Err(ResolveError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_numeric_and_duration_values() {
        let args = parse_tokens(tokens("-ed 1.5 -j 8 --timeout 2m"))
            .expect("Failed to parse tokens");
        assert_eq!(args.expiry_days, Some(1.5));
        assert_eq!(args.concurrency, Some(8));
        assert_eq!(args.timeout, Some(Duration::from_secs(120)));

        assert!(matches!(
            parse_tokens(tokens("-ed thirty")),
            Err(ResolveError::MalformedInput { token, .. }) if token == "thirty"
        ));
        assert!(parse_tokens(tokens("-j many")).is_err());
        assert!(parse_tokens(tokens("-to soon")).is_err());
    }

    #[test]
    fn test_malformed_link() {
        assert!(matches!(
            parse_tokens(tokens("-l ble-sensor")),
            Err(ResolveError::MalformedInput { token, .. }) if token == "ble-sensor"
        ));
        assert_eq!(
            parse_tokens(tokens("-l *:hub:telemetry"))
                .expect("Failed to parse tokens")
                .links,
            vec![LinkInfo::new("*", "hub:telemetry")]
        );
    }

    #[test]
    fn test_help_does_not_stop_parsing() {
        let args = parse_tokens(tokens("-h -bc modules")).expect("Failed to parse tokens");
        assert!(args.help_requested);
        assert_eq!(args.container.as_deref(), Some("modules"));
    }
}
