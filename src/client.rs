#![doc = "HTTP implementation of the push API contract: status changes, pre-signed uploads and document records."]
//
//! # Push Client
//!
//! [`PushClient`] implements [`PushApi`] with `reqwest`. Authenticated calls carry the
//! bearer token from [`Credentials`]; the object upload goes to a pre-signed URL and
//! carries no token. Each call expects exactly one success status and turns anything
//! else into [`PushError::UnexpectedStatus`] with the response body attached.

use std::fs::File;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode};
use tokio_util::io::ReaderStream;

use crate::config::{ClientConfig, Credentials};
use crate::contract::{PushApi, PushError, SourceStatus, UploadDescriptor};
use crate::document::encode_document_id;

const SERVER_SIDE_ENCRYPTION: &str = "x-amz-server-side-encryption";
const SERVER_SIDE_ENCRYPTION_AES256: &str = "AES256";
const OCTET_STREAM: &str = "application/octet-stream";
const JSON: &str = "application/json";

pub struct PushClient {
    http: Client,
    config: ClientConfig,
    credentials: Credentials,
}

impl PushClient {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, PushError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()?;
        tracing::info!(
            push_api_url = %config.push_api_url,
            organization_id = %credentials.organization_id,
            source_id = %credentials.source_id,
            access_token_set = !credentials.access_token.is_empty(),
            "Initialized PushClient"
        );
        Ok(PushClient {
            http,
            config,
            credentials,
        })
    }

    fn source_url(&self) -> String {
        format!(
            "{}/v1/organizations/{}/sources/{}",
            self.config.push_api_url, self.credentials.organization_id, self.credentials.source_id
        )
    }

    pub fn status_url(&self, status: SourceStatus) -> String {
        format!("{}/status?statusType={}", self.source_url(), status)
    }

    pub fn files_url(&self) -> String {
        format!(
            "{}/v1/organizations/{}/files",
            self.config.push_api_url, self.credentials.organization_id
        )
    }

    pub fn documents_url(&self, document_id: &str) -> String {
        format!(
            "{}/documents?documentId={}",
            self.source_url(),
            encode_document_id(document_id)
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(
            AUTHORIZATION,
            format!("Bearer {}", self.credentials.access_token),
        )
    }
}

/// Passes the response through when it carries `expected`, otherwise reads the body into an error.
async fn expect_status(
    response: Response,
    expected: StatusCode,
    operation: &'static str,
) -> Result<Response, PushError> {
    let status = response.status();
    tracing::info!(operation, status = status.as_u16(), "<<= Response code");
    if status == expected {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(operation, error = %e, "Failed to read error response body");
            String::new()
        }
    };
    tracing::error!(
        operation,
        status = status.as_u16(),
        expected = expected.as_u16(),
        body = %body,
        "Push API request rejected"
    );
    Err(PushError::UnexpectedStatus {
        operation,
        expected: expected.as_u16(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl PushApi for PushClient {
    async fn set_source_status(&self, status: SourceStatus) -> Result<(), PushError> {
        let url = self.status_url(status);
        tracing::info!(%url, %status, "=>> Setting source status");

        let response = self.authorized(self.http.post(&url)).send().await?;
        expect_status(response, StatusCode::CREATED, "set source status").await?;
        Ok(())
    }

    async fn get_upload_descriptor(&self) -> Result<UploadDescriptor, PushError> {
        let url = self.files_url();
        tracing::info!(%url, "=>> Requesting pre-signed upload URL");

        let response = self.authorized(self.http.post(&url)).send().await?;
        let response = expect_status(response, StatusCode::CREATED, "get upload descriptor").await?;
        let body = response.text().await?;
        tracing::debug!(body = %body, "<<= Upload descriptor body");

        let descriptor: UploadDescriptor = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %body, "Upload descriptor is missing uploadUri or fileId");
            e
        })?;
        tracing::info!(file_id = %descriptor.file_id, "Obtained upload descriptor");
        Ok(descriptor)
    }

    async fn upload_object(&self, compressed: File, upload_uri: &str) -> Result<(), PushError> {
        let length = compressed.metadata()?.len();
        tracing::info!(url = %upload_uri, bytes = length, "=>> PUT compressed file to object storage");

        let stream = ReaderStream::new(tokio::fs::File::from_std(compressed));
        let response = self
            .http
            .put(upload_uri)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .header(SERVER_SIDE_ENCRYPTION, SERVER_SIDE_ENCRYPTION_AES256)
            .header(CONTENT_LENGTH, length)
            .body(Body::wrap_stream(stream))
            .send()
            .await?;
        expect_status(response, StatusCode::OK, "upload object").await?;
        Ok(())
    }

    async fn push_document(&self, json_body: &str, document_id: &str) -> Result<(), PushError> {
        let url = self.documents_url(document_id);
        tracing::info!(%url, document_id, "=>> PUT document");

        let response = self
            .authorized(self.http.put(&url))
            .header(CONTENT_TYPE, JSON)
            .body(json_body.to_owned())
            .send()
            .await?;
        expect_status(response, StatusCode::ACCEPTED, "push document").await?;
        Ok(())
    }

    async fn delete_document(&self, document_id: &str) -> Result<(), PushError> {
        let url = self.documents_url(document_id);
        tracing::info!(%url, document_id, "=>> DELETE document");

        let response = self
            .authorized(self.http.delete(&url))
            .header(CONTENT_TYPE, JSON)
            .send()
            .await?;
        expect_status(response, StatusCode::ACCEPTED, "delete document").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PushClient {
        PushClient::new(
            Credentials::new("orgA", "srcA", "tok"),
            ClientConfig::with_push_api_url("https://push.example.com"),
        )
        .unwrap()
    }

    #[test]
    fn builds_status_url() {
        assert_eq!(
            client().status_url(SourceStatus::Rebuild),
            "https://push.example.com/v1/organizations/orgA/sources/srcA/status?statusType=REBUILD"
        );
    }

    #[test]
    fn builds_files_url() {
        assert_eq!(
            client().files_url(),
            "https://push.example.com/v1/organizations/orgA/files"
        );
    }

    #[test]
    fn builds_documents_url_with_encoded_id() {
        assert_eq!(
            client().documents_url("http://x/y.pdf"),
            "https://push.example.com/v1/organizations/orgA/sources/srcA/documents?documentId=http%3A%2F%2Fx%2Fy.pdf"
        );
    }
}
