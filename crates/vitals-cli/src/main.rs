//! Vitals CLI binary

#[tokio::main]
async fn main() {
    if let Err(e) = vitals_cli::run().await {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}
