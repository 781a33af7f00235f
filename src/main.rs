use std::sync::Arc;

use cp_pool::{
    service::PoolServiceBuilder,
    shell::CommandShell,
    types::Result,
    utils::{
        config::{Config, DEFAULT_CONFIG_PATH, ENV_PREFIX},
        logger::init,
    },
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let (config, source) = match args.next() {
        Some(flag) if flag == "--print-config" => {
            println!("{}", Config::default().to_toml_string()?);
            return Ok(());
        }
        Some(path) => (Config::load_layered(&path)?, path),
        None => (Config::load()?, format!("{} (optional)", DEFAULT_CONFIG_PATH)),
    };

    init(&config.logging_config().level);
    config.validate()?;
    info!("Starting constant-product pool (config: {}, env prefix {}__)", source, ENV_PREFIX);

    let service = PoolServiceBuilder::new()
        .with_config(config.clone())
        .build()?;
    let shell = CommandShell::new(Arc::new(service), config.pool_config());

    run_until_shutdown(shell).await
}

/// Read commands from stdin until EOF, Ctrl-C or SIGTERM
async fn run_until_shutdown(shell: CommandShell) -> Result<()> {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl-C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
        result = read_commands(&shell) => {
            result?;
            info!("Input closed, shutting down");
        }
    }

    info!("Pool shutdown complete");
    Ok(())
}

async fn read_commands(shell: &CommandShell) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match shell.execute_line(line).await {
            Ok(output) => println!("{}", output),
            Err(e) => {
                if !e.is_rejection() {
                    warn!("Command '{}' failed: {}", line, e);
                }
                println!("error: {}", e);
            }
        }
    }

    Ok(())
}
