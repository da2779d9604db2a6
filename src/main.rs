use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tracing::{error, info};

use dhm::app::App;
use dhm::cli::{get_version, Cli, Commands};
use dhm::core::health::{sort_nodes, HealthColor};
use dhm::core::state::{shared, MonitorMode, MonitorState};
use dhm::core::{Collector, DockerHost, ServiceNode};
use dhm::utils::logging::init_logging;
use dhm::utils::{bytes_to_mb, short_id, truncate_string, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    if cli.full {
        config.start_mode = MonitorMode::Full;
    }

    if let Some(Commands::InitConfig { force }) = cli.command {
        return handle_init_config(cli.config.clone(), &config, force);
    }

    // A broken log path only costs us the log file
    if let Err(e) = init_logging(config.log_path().as_deref()) {
        eprintln!("Warning: logging disabled: {:#}", e);
    }
    info!(version = get_version(), mode = config.start_mode.label(), "starting dhm");

    let collector = connect(&config)?;

    // The first listing decides whether the host is usable at all
    let mut nodes = match collector.collect(config.start_mode).await {
        Ok(nodes) => nodes,
        Err(e) => {
            error!(error = %e, "container host unreachable at startup");
            return Err(e).context("Cannot reach the Docker daemon. Is it running and is the socket accessible?");
        }
    };
    sort_nodes(&mut nodes);

    match cli.command {
        None => {
            let state = shared(MonitorState::new(config.start_mode));
            let mut app = App::new(collector, state, config).await;
            app.seed(nodes).await;
            app.run().await?;
        }
        Some(Commands::Status { json }) => {
            print_status(&nodes, json)?;
        }
        Some(Commands::InitConfig { .. }) => {}
    }

    Ok(())
}

fn connect(config: &AppConfig) -> Result<Collector> {
    let host = DockerHost::connect().context("Failed to connect to Docker")?;
    Ok(Collector::with_timeouts(
        Arc::new(host),
        config.inspect_timeout(),
        config.stats_timeout(),
    ))
}

fn handle_init_config(path: Option<std::path::PathBuf>, config: &AppConfig, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => AppConfig::config_path()?,
    };

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    config.save_to(&path)?;
    println!("{} Config written to {}", "✓".green(), path.display());
    Ok(())
}

fn print_status(nodes: &[ServiceNode], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(nodes).context("Failed to serialize nodes")?);
        return Ok(());
    }

    println!("{}\n", "Docker Health Monitor".bold());
    println!(
        "{:<14} {:<28} {:<12} {:>6} {:>9} {:>10}  {}",
        "ID", "NAME", "STATUS", "EXIT", "CPU %", "MEM MB", "DEPENDS ON"
    );
    println!("{}", "-".repeat(96));

    for node in nodes {
        let status = format!("{:<12}", truncate_string(&node.status, 12));
        let status = match node.health_color() {
            HealthColor::Green => status.green(),
            HealthColor::Gray => status.bright_black(),
            HealthColor::Red => status.red().bold(),
        };

        println!(
            "{:<14} {:<28} {} {:>6} {:>9.1} {:>10.1}  {}",
            short_id(&node.id),
            truncate_string(&node.name, 28),
            status,
            node.exit_code,
            node.cpu_percent,
            bytes_to_mb(node.mem_usage_bytes),
            node.deps.join(", ")
        );
    }

    let running = nodes.iter().filter(|n| n.is_running()).count();
    println!("\n{} total, {} running", nodes.len(), running.to_string().green());
    Ok(())
}
