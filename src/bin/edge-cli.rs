use std::path::PathBuf;

use clap::{Parser, Subcommand};

use edge_router::config::{load_config, EdgeConfig};
use edge_router::rewrite::{host_without_port, RewriteTable};

#[derive(Parser)]
#[command(name = "edge-cli")]
#[command(about = "Management CLI for the edge router", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview the rewrite for a hypothetical request
    Rewrite {
        /// Host header value (a port suffix is stripped)
        #[arg(long)]
        host: String,

        /// Request path, e.g. "/team"
        #[arg(long)]
        uri: String,

        /// Config file with brand definitions (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Load and validate a configuration file
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Fetch the Prometheus metrics endpoint
    Metrics {
        #[arg(short, long, default_value = "http://localhost:9090")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rewrite { host, uri, config } => {
            let config = match &config {
                Some(path) => load_config(path)?,
                None => EdgeConfig::default(),
            };
            let table = RewriteTable::from_config(&config);
            let host = host_without_port(&host);
            let (brand, rewritten) = table.rewrite(host, &uri);
            let brand_label = brand.map(|b| b.name.as_str()).unwrap_or("default");
            println!("{}", rewritten);
            eprintln!("brand: {}", brand_label);
        }
        Commands::Check { config } => match load_config(&config) {
            Ok(parsed) => {
                let table = RewriteTable::from_config(&parsed);
                println!("{}", serde_json::to_string_pretty(&parsed)?);
                eprintln!(
                    "OK: {} brand(s), {} recognized host(s)",
                    table.brand_count(),
                    table.host_count()
                );
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Metrics { url } => {
            let res = reqwest::get(format!("{}/metrics", url)).await?;
            let status = res.status();
            if !status.is_success() {
                eprintln!("Error: metrics endpoint returned status {}", status);
                return Ok(());
            }
            println!("{}", res.text().await?);
        }
    }

    Ok(())
}
