use clap::Parser;
use chatbot_core::{PgAccountService, PlatformConfig};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chatbot.toml")]
    config: String,

    /// Check database connectivity and exit
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience; production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match PlatformConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    let pool = match chatbot_core::db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match chatbot_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ PostgreSQL connected: {}", v),
            Err(e) => {
                println!("❌ PostgreSQL connection failed: {}", e);
                std::process::exit(1);
            }
        }
        println!("✅ Chatbot DB health check passed");
        return Ok(());
    }

    // Migrations and the demo tenant; a failure here aborts startup.
    let accounts = PgAccountService::new(pool.clone(), config.identity.clone());
    let outcome = chatbot_core::seed::run(&pool, &accounts, &config.seed).await?;
    tracing::info!("Startup seeding: {:?}", outcome);

    let (shutdown_tx, mut shutdown) = broadcast::channel(1);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    if !config.http.enabled {
        tracing::warn!("HTTP API disabled in config; waiting for shutdown");
        let _ = shutdown.recv().await;
        return Ok(());
    }

    tracing::info!(
        "{} starting ({} environment)",
        config.service.name,
        config.service.environment
    );
    chatbot_server::http::start_http_server(pool, config, shutdown).await?;

    Ok(())
}
