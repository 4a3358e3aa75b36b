// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use towline::{RepositoryError, VehicleRepository};

use crate::error::StoreError;

/// The vehicle store as shared between the sweep and the HTTP layer.
pub type SharedRepository<R> = Arc<Mutex<R>>;

/// Runs `op` against the store, waiting at most `limit` for access.
///
/// The lock is released as soon as `op` returns, so callers never hold it
/// across a call to an external collaborator.
pub(crate) async fn with_store<R, T>(
    repository: &Mutex<R>,
    limit: Duration,
    op: impl FnOnce(&mut R) -> Result<T, RepositoryError> + Send,
) -> Result<T, StoreError>
where
    R: VehicleRepository,
{
    let mut guard: MutexGuard<'_, R> = tokio::time::timeout(limit, repository.lock())
        .await
        .map_err(|_| StoreError::Timeout(limit))?;
    Ok(op(&mut guard)?)
}
