use clap::Parser;
use github_notifier::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), github_notifier::AppError> {
    run(Cli::parse()).await
}
