// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every backend adapter.

use async_trait::async_trait;

use crate::error::ScoutError;
use crate::types::HealthStatus;

/// Base trait for all Scout adapters.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Human-readable name of this adapter.
    fn name(&self) -> &str;

    /// Checks whether the backend behind this adapter is reachable.
    async fn health_check(&self) -> Result<HealthStatus, ScoutError>;
}
