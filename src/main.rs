use clap::Parser;
use color_eyre::eyre::{
    Result,
    eyre,
};
use cup_shuffle::config::GameConfig;
use std::path::{
    Path,
    PathBuf,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
};

mod app;
mod ui;

const LOG_FILE_PREFIX: &str = "cup-shuffle.log";

#[derive(Parser, Debug)]
#[command(version, about = "Find the ball under the cup", long_about = None)]
struct Args {
    /// JSON file with game settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Starting wallet balance
    #[arg(long)]
    balance: Option<u64>,

    /// Seconds the betting window stays open
    #[arg(long)]
    countdown: Option<u32>,

    /// Currency label shown in front of amounts
    #[arg(long)]
    currency: Option<String>,

    /// Start with an empty history panel instead of sample rounds
    #[arg(long)]
    no_mock_history: bool,

    /// Seed the random source for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn resolve_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(balance) = args.balance {
        config.initial_balance = balance;
    }
    if let Some(countdown) = args.countdown {
        config.countdown_secs = countdown;
    }
    if let Some(currency) = &args.currency {
        config.currency = currency.clone();
    }
    if args.no_mock_history {
        config.seed_history = false;
    }
    config.validate()?;
    Ok(config)
}

// The terminal belongs to the UI, so logs go to a rolling file.
fn init_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    let appender = rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("installing tracing subscriber: {e}"))?;
    Ok(guard)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let _guard = init_tracing(&args.log_dir)?;
    let game = resolve_config(&args)?;
    tracing::info!(?game, seed = ?args.seed, "starting cup-shuffle");
    app::run_app(app::AppConfig {
        game,
        seed: args.seed,
    })
    .await
}
