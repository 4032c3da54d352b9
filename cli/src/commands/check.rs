use tracing::{error, info};

use drover_core::runner::NmapRunner;

/// Probes the engine binary; logs the verdict and returns it.
pub async fn check(engine: &str) -> bool {
    let runner = NmapRunner::new(engine);

    if runner.probe().await {
        info!("engine '{engine}' is available");
        true
    } else {
        error!("engine '{engine}' is missing or not runnable");
        false
    }
}
