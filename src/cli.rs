//! # push-client CLI glue
//!
//! Argument definitions and async entrypoints shared by the `push-upload` and
//! `push-delete` binaries. Both programs take the same credentials and document
//! id ([`CommonArgs`]); the upload program adds the local file to send.
//!
//! The binaries only parse arguments, set up tracing and call [`run_upload`] or
//! [`run_delete`]; everything else lives in [`crate::workflow`].

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;

use crate::client::PushClient;
use crate::config::{ClientConfig, Credentials};
use crate::workflow::{self, DocumentAction, WorkflowOutcome};

/// Flags shared by both programs.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Organization ID
    #[clap(short = 'o', long = "organization-id")]
    pub organization_id: String,

    /// Source ID
    #[clap(short = 's', long = "source-id")]
    pub source_id: String,

    /// Source access token
    #[clap(short = 'a', long = "access-token")]
    pub access_token: String,

    /// Document ID (URI)
    #[clap(short = 'd', long = "doc-id")]
    pub doc_id: String,

    /// Base URL of the push API
    #[clap(long = "push-api-url", env = "PUSH_API_URL")]
    pub push_api_url: Option<String>,
}

impl CommonArgs {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.organization_id, &self.source_id, &self.access_token)
    }

    pub fn client_config(&self) -> ClientConfig {
        match &self.push_api_url {
            Some(url) => ClientConfig::with_push_api_url(url),
            None => ClientConfig::from_env(),
        }
    }

    pub fn client(&self) -> Result<PushClient> {
        Ok(PushClient::new(self.credentials(), self.client_config())?)
    }
}

/// Upload a binary file and push its document record.
#[derive(Parser, Debug)]
#[clap(name = "push-upload", version)]
pub struct UploadCli {
    #[clap(flatten)]
    pub common: CommonArgs,

    /// Path to binary file to upload
    #[clap(short = 'f', long = "file")]
    pub file: PathBuf,
}

/// Delete a document record.
#[derive(Parser, Debug)]
#[clap(name = "push-delete", version)]
pub struct DeleteCli {
    #[clap(flatten)]
    pub common: CommonArgs,
}

/// Loads `.env` and installs the fmt subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn run_upload(cli: UploadCli) -> Result<()> {
    let action = DocumentAction::Upload { file: cli.file };
    run(&cli.common, action).await
}

pub async fn run_delete(cli: DeleteCli) -> Result<()> {
    run(&cli.common, DocumentAction::Delete).await
}

async fn run(common: &CommonArgs, action: DocumentAction) -> Result<()> {
    let client = common.client()?;
    match workflow::run(&client, &common.doc_id, action).await {
        Ok(WorkflowOutcome::Completed) => {
            tracing::info!(document_id = %common.doc_id, "Workflow complete");
            Ok(())
        }
        Ok(WorkflowOutcome::DocumentStepFailed(e)) => {
            tracing::error!(document_id = %common.doc_id, error = %e, "Document step failed");
            Err(anyhow::Error::new(e).context(format!(
                "document step failed for {}; source status was restored",
                common.doc_id
            )))
        }
        Err(e) => {
            tracing::error!(document_id = %common.doc_id, error = %e, "Workflow aborted");
            Err(e.into())
        }
    }
}
