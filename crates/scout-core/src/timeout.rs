// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deadline enforcement for backend calls.

use std::future::Future;
use std::time::Duration;

use crate::error::ScoutError;

/// Runs `fut` under a deadline.
///
/// On expiry the in-flight future is dropped (cancelling it at its current
/// suspension point) and a [`ScoutError::Timeout`] naming `operation` is
/// returned.
pub async fn with_timeout<T, F>(
    operation: &str,
    duration: Duration,
    fut: F,
) -> Result<T, ScoutError>
where
    F: Future<Output = Result<T, ScoutError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(ScoutError::Timeout {
            operation: operation.to_string(),
            duration,
        }),
    }
}
