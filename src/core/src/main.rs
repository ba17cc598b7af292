use clap::Parser;
use log::{error, info, warn};
use solo_node::configuration::{Config, SystemEnvironment};
use solo_node::container_management::DockerCli;
use solo_node::worker::{Registration, TeardownReason, WorkerFactory};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "solo-node")]
#[command(version = "0.0.2")]
#[command(about = "Lifecycle controller for a disposable single-session browser worker")]
struct Args {
    /// Worker configuration file (TOML)
    #[arg(long, env = "SOLO_NODE_CONFIG")]
    config: PathBuf,

    /// Id of the already running container to manage
    #[arg(long, env = "SOLO_NODE_CONTAINER_ID")]
    container_id: String,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let args = Args::parse();

    info!("Importing configuration");
    let config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to import configuration from file: {}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration imported successfully");

    let engine = match DockerCli::new(&config.engine.docker_binary) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            error!("Unable to reach the container engine: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    let factory = match WorkerFactory::new(config, engine, Arc::new(SystemEnvironment)) {
        Ok(factory) => factory,
        Err(e) => {
            error!("Unable to set up the worker factory: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    let worker = match factory.create(Registration::new(&args.container_id)) {
        Ok(worker) => worker,
        Err(e) => {
            error!("Unable to create the worker: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    if worker.start_polling().is_none() {
        warn!("Idle watchdog was not started");
    }
    info!("Worker for container {} is ready", worker.container_id());

    tokio::select! {
        _ = worker.wait_until_stopped() => {
            info!("Container stopped ({:?})", worker.teardown_reason());
        }
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                error!("Unable to listen for shutdown signal: {}", e);
            }
            info!("Shutdown requested");
            worker.teardown(TeardownReason::Shutdown).await;
            worker.wait_until_stopped().await;
        }
    }
}
