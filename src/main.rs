use clap::Parser;
use severance_tax::api::{Cli, run};
use severance_tax::logger::init_logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
