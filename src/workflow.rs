//! Single-document workflows: wraps an upload or a delete in a source rebuild.
//!
//! Both flows have the same shape:
//!   1. Set the source status to `REBUILD`
//!   2. (upload only) Obtain a pre-signed URL, compress the file, upload it and build the document record
//!   3. Push or delete the document record
//!   4. Set the source status back to `IDLE`
//!
//! # Error Handling
//! Failures in steps 1, 2 and 4 return immediately with a [`WorkflowError`].
//! A failure in step 3 does not stop step 4: it is logged and reported through
//! [`WorkflowOutcome::DocumentStepFailed`], so callers can tell a completed run
//! from one where only the document record went wrong.

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::task::{spawn_blocking, JoinError};
use tracing::{debug, error, info};

use crate::compress::{compress, temp_file};
use crate::contract::{PushApi, PushError, SourceStatus};
use crate::document::DocumentRecord;

/// What to do with the document while the source is rebuilding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentAction {
    /// Upload `file` and push a record referencing it.
    Upload { file: PathBuf },
    Delete,
}

impl DocumentAction {
    fn name(&self) -> &'static str {
        match self {
            DocumentAction::Upload { .. } => "upload",
            DocumentAction::Delete => "delete",
        }
    }
}

#[derive(Debug)]
pub enum WorkflowOutcome {
    Completed,
    /// The push/delete call failed; the status was still restored.
    DocumentStepFailed(PushError),
}

impl WorkflowOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkflowOutcome::Completed)
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("failed to set source status to {status}: {source}")]
    Status {
        status: SourceStatus,
        #[source]
        source: PushError,
    },

    #[error("failed to upload {path:?}: {source}")]
    Upload {
        path: PathBuf,
        #[source]
        source: PushError,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialise document record: {0}")]
    Serialise(#[from] serde_json::Error),

    #[error("compression task failed: {0}")]
    Join(#[from] JoinError),
}

pub async fn upload_document<A>(
    api: &A,
    file: impl Into<PathBuf>,
    document_id: &str,
) -> Result<WorkflowOutcome, WorkflowError>
where
    A: PushApi + ?Sized,
{
    run(api, document_id, DocumentAction::Upload { file: file.into() }).await
}

pub async fn delete_document<A>(api: &A, document_id: &str) -> Result<WorkflowOutcome, WorkflowError>
where
    A: PushApi + ?Sized,
{
    run(api, document_id, DocumentAction::Delete).await
}

/// Runs one document action inside a `REBUILD` → `IDLE` status window.
pub async fn run<A>(
    api: &A,
    document_id: &str,
    action: DocumentAction,
) -> Result<WorkflowOutcome, WorkflowError>
where
    A: PushApi + ?Sized,
{
    let flow = action.name();
    info!(flow, document_id, "Starting document workflow");

    set_status(api, SourceStatus::Rebuild).await?;

    let document_step = match &action {
        DocumentAction::Upload { file } => {
            let record = upload_binary(api, file).await?;
            let json = record.to_json()?;
            info!(json = %json, "Built document record");
            api.push_document(&json, document_id).await
        }
        DocumentAction::Delete => api.delete_document(document_id).await,
    };

    if let Err(e) = &document_step {
        error!(flow, document_id, error = %e, "Document step failed, restoring source status anyway");
    }

    set_status(api, SourceStatus::Idle).await?;

    match document_step {
        Ok(()) => {
            info!(flow, document_id, "Document workflow completed");
            Ok(WorkflowOutcome::Completed)
        }
        Err(e) => Ok(WorkflowOutcome::DocumentStepFailed(e)),
    }
}

async fn set_status<A>(api: &A, status: SourceStatus) -> Result<(), WorkflowError>
where
    A: PushApi + ?Sized,
{
    api.set_source_status(status).await.map_err(|source| {
        error!(%status, error = %source, "Failed to set source status");
        WorkflowError::Status { status, source }
    })
}

/// Uploads the compressed file and returns the record describing the original.
async fn upload_binary<A>(api: &A, path: &Path) -> Result<DocumentRecord, WorkflowError>
where
    A: PushApi + ?Sized,
{
    let upload_error = |source: PushError| {
        error!(path = %path.display(), error = %source, "Upload failed");
        WorkflowError::Upload {
            path: path.to_path_buf(),
            source,
        }
    };
    let io_error = |source: std::io::Error| {
        error!(path = %path.display(), error = %source, "Local file error");
        WorkflowError::Io {
            path: path.to_path_buf(),
            source,
        }
    };

    let descriptor = api.get_upload_descriptor().await.map_err(upload_error)?;

    let source = File::open(path).map_err(io_error)?;
    let metadata = source.metadata().map_err(io_error)?;
    let original_size = metadata.len();
    let modified = metadata.modified().map_err(io_error)?;
    debug!(path = %path.display(), original_size, "Opened source file");

    let (temp, compressed) = spawn_blocking(move || {
        let temp = temp_file()?;
        let compressed = compress(source, &temp)?;
        Ok::<_, std::io::Error>((temp, compressed))
    })
    .await?
    .map_err(io_error)?;

    api.upload_object(compressed, &descriptor.upload_uri)
        .await
        .map_err(upload_error)?;
    temp.close().map_err(io_error)?;

    Ok(DocumentRecord::new(
        descriptor.file_id,
        original_size,
        modified,
        path,
    ))
}
