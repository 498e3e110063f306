//! # contract: interface to the document push API
//!
//! This module defines the [`PushApi`] trait and the plain data types that flow
//! through it: the lifecycle [`SourceStatus`], the pre-signed [`UploadDescriptor`]
//! and the [`PushError`] returned by every operation.
//!
//! ## Interface & Extensibility
//! - [`crate::client::PushClient`] implements the trait against the real HTTP API.
//! - All methods are async and return `Result<_, PushError>`.
//! - Every call is a single request; there are no retries.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so the workflow can be exercised with
//!   `MockPushApi` in unit and integration tests.

use std::fmt;
use std::fs::File;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Lifecycle state of a push source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    Rebuild,
    Refresh,
    Incremental,
    Idle,
}

impl SourceStatus {
    /// Value sent as the `statusType` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Rebuild => "REBUILD",
            SourceStatus::Refresh => "REFRESH",
            SourceStatus::Incremental => "INCREMENTAL",
            SourceStatus::Idle => "IDLE",
        }
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-signed upload location plus the handle the document record refers to.
///
/// Valid for a single upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadDescriptor {
    #[serde(rename = "uploadUri")]
    pub upload_uri: String,
    #[serde(rename = "fileId")]
    pub file_id: String,
}

/// Errors returned by [`PushApi`] operations.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("{operation} failed: expected HTTP {expected}, got {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        expected: u16,
        status: u16,
        body: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PushError {
    /// Response body of a rejected request, if the server answered at all.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            PushError::UnexpectedStatus { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Operations offered by the push API and the pre-signed object store.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PushApi: Send + Sync {
    /// Transition the source to `status`. Succeeds only on HTTP 201.
    async fn set_source_status(&self, status: SourceStatus) -> Result<(), PushError>;

    /// Register a new file and obtain its pre-signed upload URL. Succeeds only on HTTP 201.
    async fn get_upload_descriptor(&self) -> Result<UploadDescriptor, PushError>;

    /// Stream an already compressed file to a pre-signed URL. Succeeds only on HTTP 200.
    async fn upload_object(&self, compressed: File, upload_uri: &str) -> Result<(), PushError>;

    /// Add or replace the document record keyed by `document_id`. Succeeds only on HTTP 202.
    async fn push_document(&self, json_body: &str, document_id: &str) -> Result<(), PushError>;

    /// Remove the document record keyed by `document_id`. Succeeds only on HTTP 202.
    async fn delete_document(&self, document_id: &str) -> Result<(), PushError>;
}
