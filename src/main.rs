use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = multireq::cli::Cli::parse();
    if let Err(e) = multireq::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
