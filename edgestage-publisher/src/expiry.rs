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

use crate::ExpiryDays;

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// The `ExpiryWindow` is the time interval `[start, expiry)` during which a signed URL grants read access.
///
/// The window starts one minute *before* the instant it is computed for: the clock of the storage backend may lag
/// behind the clock of the machine signing the URL.
///
/// A publication computes a single window, when it starts: all the URLs it signs share it, however long the uploads
/// take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    pub start: DateTime<Utc>,
    pub expiry: DateTime<Utc>,
}

impl ExpiryWindow {
    pub fn new(now: DateTime<Utc>, days: ExpiryDays) -> Self {
        Self {
            start: now - Duration::minutes(1),
            expiry: now + Duration::milliseconds(days.as_millis()),
        }
    }

    /// `start`, formatted as expected in a shared access signature (e.g. `2024-03-01T09:59:00Z`).
    pub fn signed_start(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `expiry`, formatted as expected in a shared access signature (e.g. `2024-03-31T10:00:00Z`).
    pub fn signed_expiry(&self) -> String {
        self.expiry.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
            .single()
            .expect("valid date");
        let window = ExpiryWindow::new(now, ExpiryDays::try_from(30.0).expect("valid duration"));

        assert_eq!(now - window.start, Duration::minutes(1));
        assert_eq!(window.expiry - now, Duration::days(30));
        assert_eq!(window.signed_start(), "2024-03-01T09:59:00Z");
        assert_eq!(window.signed_expiry(), "2024-03-31T10:00:00Z");
    }

    #[test]
    fn test_fractional_days() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
            .single()
            .expect("valid date");
        let window = ExpiryWindow::new(now, ExpiryDays::try_from(0.5).expect("valid duration"));

        assert_eq!(window.signed_expiry(), "2024-03-01T22:00:00Z");
    }
}
