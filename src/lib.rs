#![doc = "push-client: minimal client for a document-indexing push API."]

//! Sets a source's status, uploads a zlib-compressed binary to a pre-signed
//! object-storage URL and pushes or deletes the JSON document record that
//! points at it.
//!
//! # Layout
//! - [`contract`]: the [`contract::PushApi`] trait, its data types and errors
//! - [`client`]: `reqwest` implementation of the trait
//! - [`compress`]: zlib compression into a temp file
//! - [`document`]: the document record and its field helpers
//! - [`workflow`]: the upload and delete workflows
//! - [`cli`]: argument definitions and entrypoints for the two binaries

pub mod cli;
pub mod client;
pub mod compress;
pub mod config;
pub mod contract;
pub mod document;
pub mod workflow;

pub use client::PushClient;
pub use config::{ClientConfig, Credentials};
pub use contract::{PushApi, PushError, SourceStatus, UploadDescriptor};
pub use workflow::{DocumentAction, WorkflowError, WorkflowOutcome};
