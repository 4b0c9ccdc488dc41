//! Background jobs host.
//!
//! No job runs yet. The host loads the platform config, announces the
//! services it will carry, and idles until Ctrl+C.

use clap::Parser;
use chatbot_core::PlatformConfig;
use tracing_subscriber::{fmt, EnvFilter};

const PLANNED_SERVICES: [&str; 4] = [
    "Document processing and indexing",
    "Embedding generation",
    "Usage metrics aggregation",
    "Data cleanup tasks",
];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chatbot.toml")]
    config: String,
}

fn banner(service_name: &str) -> String {
    let title = format!("🔧 {} - Background Jobs Service", service_name);
    let mut out = format!("{}\n{}\n\n", title, "=".repeat(title.chars().count()));
    out.push_str("Status: Project structure ready\n\n");
    out.push_str("This service will handle:\n");
    for service in PLANNED_SERVICES {
        out.push_str(&format!("  • {}\n", service));
    }
    out.push_str("\nPress Ctrl+C to exit...\n");
    out
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match PlatformConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    println!("{}", banner(&config.service.name));
    tracing::info!(
        "Jobs host started ({} environment), no jobs registered",
        config.service.environment
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    Ok(())
}
