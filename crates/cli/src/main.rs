use airbot::air_quality::{AirQualityClient, AirQualitySource};
use airbot::config::{self, StrategyKind};
use airbot::llm::OpenAiClient;
use airbot::region::RegionResolver;
use airbot::reply::NO_DATA_BODY;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "airbot")]
#[command(about = "LINE air-quality bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: AIRBOT_CONFIG_PATH or ~/.airbot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the webhook gateway. Requires LINE_CHANNEL_ACCESS_TOKEN, LINE_CHANNEL_SECRET and OPENAI_API_KEY (env or config).
    Serve {
        /// Config file path (default: AIRBOT_CONFIG_PATH or ~/.airbot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from PORT, config, or 8080)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Look up air quality for a region name directly.
    Query {
        /// Region name, e.g. 台中
        region: String,

        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Show which region a message resolves to, and which strategy found it.
    Resolve {
        /// Message text, e.g. 查詢台中空氣品質
        text: String,

        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("airbot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Query { region, config }) => {
            if let Err(e) = run_query(config, &region).await {
                log::error!("query failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Resolve { text, config }) => {
            if let Err(e) = run_resolve(config, &text).await {
                log::error!("resolve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(config::default_config_path);
    let dir = airbot::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, path) = config::load_config(config_path)?;
    log::debug!("loaded config from {}", path.display());
    if let Some(p) = port {
        config.server.port = p;
    }
    log::info!("starting gateway on {}:{}", config.server.bind, config.server.port);
    airbot::gateway::run_gateway(config).await
}

/// Needs only the air-quality settings; no LINE or AI secrets.
async fn run_query(config_path: Option<PathBuf>, region: &str) -> anyhow::Result<()> {
    let (config, _) = config::load_config(config_path)?;
    let client = AirQualityClient::new(
        config.air_quality.base_url.clone(),
        config::resolve_air_quality_token(&config),
    );
    match client.fetch(region.trim()).await {
        Ok(reading) => println!("{}", reading.display()),
        Err(e) => {
            log::debug!("query: {}", e);
            println!("{}", NO_DATA_BODY);
        }
    }
    Ok(())
}

/// Needs OPENAI_API_KEY only when the ai strategy is configured.
async fn run_resolve(config_path: Option<PathBuf>, text: &str) -> anyhow::Result<()> {
    let (config, _) = config::load_config(config_path)?;
    let uses_ai = config.resolution.strategies.contains(&StrategyKind::Ai);
    let api_key = match config::resolve_ai_api_key(&config) {
        Some(k) => k,
        None if uses_ai => anyhow::bail!("OPENAI_API_KEY is required for the ai strategy"),
        None => String::new(),
    };
    let llm = OpenAiClient::new(
        Some(config.ai.base_url.clone()),
        api_key,
        Some(config.ai.model.clone()),
    );
    let resolver = RegionResolver::from_kinds(&config.resolution.strategies, Arc::new(llm));
    match resolver.resolve(text).await {
        Some(r) => println!("{} ({})", r.region, r.strategy),
        None => println!("no region"),
    }
    Ok(())
}
