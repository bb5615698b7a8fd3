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

pub(crate) const USAGE: &str = r#"
Usage: esctl [OPTIONS]

Uploads the modules of a gateway deployment to a blob container and writes the documents that provision the
gateway: the module configuration (uploaded alongside the modules), the twin and, optionally, the edge
configuration.

Required:
  --storage-cs, -scs <CONNECTION STRING>        Connection string of the storage account.
  --blob-container, -bc <NAME>                  Container the modules are uploaded to. Created if absent.
  --blob-module-config-file, -om <PATH>         Where to write the module configuration document.
  --expire-duration, -ed <DAYS>                 Validity of the signed URLs, in days (fractions accepted).

Deployment:
  --edge-deploy-path, -edp <PATH>               Directory, on the gateway, where the modules are installed.
                                                Required with `--local-json-config-file`.
  --deploy-version, -dv <VERSION>               Version of the deployment.
  --local-json-config-file, -ljcf <PATH>        Structured file (JSON or YAML) declaring the modules and links.
  --work-dir, -wd <PATH>                        Directory the `module.path` of the structured file are relative to.

Modules (flat form, repeatable):
  --module, -m <NAME>                           Starts the declaration of a module.
    --loader-name, -ln <NAME>                   Loader of the module.
    --module-library, -ml <PATH>                Artifact to upload for the module.
    --module-edge-path, -mep <PATH>             Path of the module on the gateway.
    --module-version, -mv <VERSION>             Version of the module.
    --module-arg-name, -man <NAME>              Name of an argument of the module, immediately followed by
    --module-arg-value, -mav <VALUE>            its value.
  --link, -l <SOURCE:SINK>                      Links the output of a module to another module (repeatable).

Outputs:
  --twin-config-file, -ot <PATH>                Where to write the twin document. Printed on stdout otherwise.
  --iothub-cs, -ics <CONNECTION STRING>         Connection string of the gateway to its hub.
  --iothub-transport, -it <TRANSPORT>           Transport of the gateway to its hub (default: amqp).
  --edge-config-json-file, -ecjf <PATH>         Where to write the edge configuration document.
                                                Requires `--iothub-cs`.

Publication:
  --concurrency, -j <N>                         Maximum number of simultaneous uploads (default: 4).
  --timeout, -to <DURATION>                     Abandons the publication past this duration (e.g. `90s`, `10m`).

  --help, -h                                    Prints this message.

Values can be wrapped in double quotes. The log level is controlled with the `RUST_LOG` environment variable
(default: `info`); logs are written on stderr.
"#;

pub(crate) fn print_usage() {
    println!("{USAGE}");
}
