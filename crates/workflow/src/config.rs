// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;
use towline_domain::DeadlinePolicy;

/// Runtime settings for the sweep and administrative operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Statutory day counts and disposition routing.
    pub policy: DeadlinePolicy,
    /// Upper bound on one outbound notification call.
    pub notification_timeout: Duration,
    /// Upper bound on one document generation call.
    pub document_timeout: Duration,
    /// Upper bound on waiting for the shared vehicle store.
    pub store_timeout: Duration,
    /// Vehicles processed at once. Zero is treated as one.
    pub concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            policy: DeadlinePolicy::default(),
            notification_timeout: Duration::from_secs(30),
            document_timeout: Duration::from_secs(60),
            store_timeout: Duration::from_secs(10),
            concurrency: 4,
        }
    }
}

impl SchedulerConfig {
    pub(crate) fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}
