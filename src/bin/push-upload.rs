use anyhow::Result;
use clap::Parser;
use push_client::cli::{init_tracing, run_upload, UploadCli};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    tracing::info!("push-upload startup: tracing initialised, environment loaded");

    let cli = UploadCli::parse();
    let result = run_upload(cli).await;
    match &result {
        Ok(_) => tracing::info!("push-upload completed successfully"),
        Err(e) => tracing::error!(error = %e, "push-upload exited with error"),
    }
    result
}
