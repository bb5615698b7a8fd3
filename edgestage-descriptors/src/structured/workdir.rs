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

use std::path::{Path, PathBuf};

use anyhow::Context;
use edgestage_commons::Result;

/// A `WorkDirGuard` switches the working directory of the process and switches it back when dropped.
///
/// The working directory is shared by the whole process: the guard must be held for as short as possible.
#[derive(Debug)]
pub struct WorkDirGuard {
    previous: PathBuf,
}

impl WorkDirGuard {
    /// Makes `dir` the working directory of the process until the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// This method fails if the current working directory cannot be read or if `dir` cannot be entered. In both
    /// cases the working directory is left untouched.
    pub fn enter(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let previous =
            std::env::current_dir().context("Failed to read the current working directory")?;
        std::env::set_current_dir(dir).context(format!(
            "Failed to change the working directory to:\n{}",
            dir.display()
        ))?;

        tracing::debug!(
            "Working directory switched from < {} > to < {} >",
            previous.display(),
            dir.display()
        );

        Ok(Self { previous })
    }
}

impl Drop for WorkDirGuard {
    fn drop(&mut self) {
        let res = std::env::set_current_dir(&self.previous);
        tracing::debug!(
            "Working directory restored to < {} >: {:?}",
            self.previous.display(),
            res
        );
        if let Err(e) = res {
            tracing::error!(
                "Failed to restore the working directory < {} >: {:?}",
                self.previous.display(),
                e
            );
        }
    }
}
