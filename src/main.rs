use clap::Parser;
use drinks_api::cli::Cli;

#[tokio::main]
async fn main() {
    // Load .env if present so RUST_LOG, DATABASE_URL, AUTH0_DOMAIN etc. are picked up
    let _ = dotenvy::dotenv();

    drinks_api::cli::init_tracing();

    let cli = Cli::parse();

    if let Err(e) = drinks_api::cli::run(cli).await {
        tracing::error!("{:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
