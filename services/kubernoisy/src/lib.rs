pub mod cli;
pub mod dns;
pub mod error;
pub mod kube_api;
pub mod server;
pub mod telemetry;

pub use error::{ServiceError, ServiceResult};

use std::sync::Arc;

use kubernoisy_core::{
    ChurnConfig, ChurnMetrics, ClusterApi, ConvergenceVerifier, CycleRunner, RateScheduler,
    ResourceFactory,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::dns::SystemResolver;
use crate::kube_api::KubeClusterApi;

/// Boots the churn loop and the metrics endpoint, and runs until SIGINT/SIGTERM.
///
/// Returns once a termination signal arrives; in-flight cycles are left
/// running and die with the process.
pub async fn run(config: ChurnConfig) -> ServiceResult<()> {
    config.validate()?;

    let api: Arc<dyn ClusterApi> = Arc::new(KubeClusterApi::connect().await?);
    let oracle = Arc::new(SystemResolver::new(config.dns_suffix.clone()));
    let metrics = Arc::new(ChurnMetrics::new()?);

    let runner = Arc::new(CycleRunner::new(
        api,
        ConvergenceVerifier::new(oracle).with_poll_interval(config.poll_interval),
        ResourceFactory::new(config.namespace.clone()).with_image(config.image.clone()),
        Arc::clone(&metrics),
        config.timeout,
    ));
    let scheduler = RateScheduler::new(runner, config.ops, config.concurrency_policy())?;

    let addr = config.metrics_socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServiceError::Bind { addr, source })?;
    info!("Serving metrics on {}", addr);
    tokio::spawn(server::serve(listener, server::build_router(metrics)));

    info!(
        namespace = %config.namespace,
        timeout_secs = config.timeout.as_secs_f64(),
        "Starting churn"
    );
    scheduler.run_until(shutdown_signal()).await;
    Ok(())
}

/// Resolves on CTRL+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
