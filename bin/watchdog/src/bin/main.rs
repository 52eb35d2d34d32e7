use alert::TelegramNotifier;
use balance::monitor::BalanceMonitor;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use watchdog::{config::Config, metrics::install_prometheus_exporter, Watchdog};

#[derive(Parser)]
#[command(name = "watchdog")]
#[command(about = "Alert when watched wallet balances drop below their thresholds")]
struct Cli {
    /// Path to the configuration file (.toml, or .json for the legacy format)
    #[arg(short, long, default_value = "config.toml", env = "WATCHDOG_CONFIG")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting watchdog");
    info!("Loading config: {}", cli.config.display());

    let config = Config::from_file(&cli.config)?;

    info!("Loaded config:");
    info!("  Network: {:?}", config.network.network_type);
    info!("  RPC URL: {}", config.network.rpc_url);
    info!("  Wallets: {}", config.wallets.len());
    info!("  Assets: {}", config.assets.len());
    info!("  Poll interval: {:?}", config.poll_interval);
    info!("  Alert interval: {:?}", config.alert_interval);

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!("  Metrics: 0.0.0.0:{}", port);
    }

    let chain = client::create_chain_client(&config.network.rpc_url, config.rpc_timeout)?;
    let notifier = TelegramNotifier::new(&config.bot_token, config.chat_id, config.rpc_timeout)?;
    let watchdog = Watchdog::new(&config, BalanceMonitor::new(chain), notifier);

    info!("Starting monitoring loop...");

    watchdog
        .run(config.poll_interval, tokio::signal::ctrl_c())
        .await
}
