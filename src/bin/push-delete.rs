use anyhow::Result;
use clap::Parser;
use push_client::cli::{init_tracing, run_delete, DeleteCli};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    tracing::info!("push-delete startup: tracing initialised, environment loaded");

    let cli = DeleteCli::parse();
    let result = run_delete(cli).await;
    match &result {
        Ok(_) => tracing::info!("push-delete completed successfully"),
        Err(e) => tracing::error!(error = %e, "push-delete exited with error"),
    }
    result
}
