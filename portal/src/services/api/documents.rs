//! # Document Endpoints

use super::client::ApiClient;
use super::users::mime_for;
use crate::core::error::{PortalError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use shared::{ApiEnvelope, Document, ListQuery, Page};
use std::path::Path;

pub async fn list_documents(client: &ApiClient, query: &ListQuery) -> Result<Page<Document>> {
    client.get_query("/api/documents", query).await
}

/// Upload a document file with its type (e.g. `PASSPORT`, `PROOF_OF_ADDRESS`).
#[tracing::instrument(skip(client), fields(path = %path.display()))]
pub async fn upload_document(client: &ApiClient, path: &Path, document_type: &str) -> Result<Document> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| PortalError::Storage(format!("Not a file: {}", path.display())))?;
    let mime = mime_for(&file_name);

    let response = client
        .execute(Method::POST, "/api/documents", |b| {
            let part = Part::bytes(bytes.clone()).file_name(file_name.clone());
            let part = match part.mime_str(mime) {
                Ok(part) => part,
                Err(_) => Part::bytes(bytes.clone()).file_name(file_name.clone()),
            };
            let form = Form::new()
                .text("documentType", document_type.to_string())
                .part("file", part);
            b.multipart(form)
        })
        .await?;

    let envelope: ApiEnvelope<Document> = response.json().await?;
    tracing::info!(document_id = %envelope.data.id, "Document uploaded");
    Ok(envelope.data)
}

/// Raw file contents of a document.
pub async fn download_document(client: &ApiClient, id: &str) -> Result<Vec<u8>> {
    client.get_bytes(&format!("/api/documents/{}/download", id)).await
}

pub async fn delete_document(client: &ApiClient, id: &str) -> Result<()> {
    client
        .send_unit(Method::DELETE, &format!("/api/documents/{}", id), |b| b)
        .await
}
