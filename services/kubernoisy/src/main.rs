use clap::Parser;
use kubernoisy::{cli::Cli, run, telemetry};

#[tokio::main]
async fn main() {
    let config = Cli::parse().into_config();
    telemetry::init_logging(config.verbose);

    // Fail before any cycle is spawned or the metrics endpoint is bound.
    if let Err(err) = config.validate() {
        tracing::error!(error = %err, "Invalid configuration");
        std::process::exit(1);
    }

    if let Err(err) = run(config).await {
        tracing::error!(error = %err, "kubernoisy terminated with error");
        std::process::exit(1);
    }

    // Abandon in-flight cycles instead of waiting for the runtime to drain them.
    std::process::exit(0);
}
