// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `scout serve` command: runs the HTTP gateway until a shutdown signal.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use scout_config::ScoutConfig;
use scout_core::{HealthStatus, ScoutError};
use scout_gateway::GatewayState;

use crate::runtime::Runtime;

pub async fn run_serve(config: ScoutConfig, shutdown: CancellationToken) -> Result<(), ScoutError> {
    let runtime = Runtime::build(&config).await?;

    // Startup health checks only warn; backends may come up after the gateway.
    for adapter in &runtime.adapters {
        match adapter.health_check().await {
            Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "adapter healthy"),
            Ok(status) => warn!(adapter = adapter.name(), ?status, "adapter not healthy"),
            Err(e) => warn!(adapter = adapter.name(), error = %e, "adapter unreachable"),
        }
    }

    let gateway = config.gateway.clone();
    let state = GatewayState::new(
        runtime.coordinator.clone(),
        runtime.adapters.clone(),
        config,
    );
    let served = scout_gateway::serve(&gateway, state, shutdown).await;

    if let Err(e) = runtime.close().await {
        warn!(error = %e, "failed to checkpoint database on shutdown");
    }
    served
}
