//! # User Profile Endpoints

use super::client::ApiClient;
use crate::core::error::{PortalError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use shared::{ChangePasswordRequest, UpdateProfileRequest, User};
use std::path::Path;

/// Fetch the profile of the authenticated user.
pub async fn get_profile(client: &ApiClient) -> Result<User> {
    client.get("/api/users/profile").await
}

/// Partial profile update; returns the complete updated user.
pub async fn update_profile(client: &ApiClient, update: &UpdateProfileRequest) -> Result<User> {
    client.put("/api/users/profile", update).await
}

/// Upload a profile picture; the backend answers with the complete user.
#[tracing::instrument(skip(client), fields(path = %path.display()))]
pub async fn upload_profile_picture(client: &ApiClient, path: &Path) -> Result<User> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| PortalError::Storage(format!("Not a file: {}", path.display())))?;
    let mime = mime_for(&file_name);

    let response = client
        .execute(Method::POST, "/api/users/profile/picture", |b| {
            let part = Part::bytes(bytes.clone()).file_name(file_name.clone());
            let part = match part.mime_str(mime) {
                Ok(part) => part,
                Err(_) => Part::bytes(bytes.clone()).file_name(file_name.clone()),
            };
            b.multipart(Form::new().part("file", part))
        })
        .await?;

    let envelope: shared::ApiEnvelope<User> = response.json().await?;
    Ok(envelope.data)
}

pub async fn change_password(client: &ApiClient, request: &ChangePasswordRequest) -> Result<()> {
    client
        .send_unit(Method::PUT, "/api/users/password", |b| b.json(request))
        .await
}

/// Content type guessed from the file extension.
pub(crate) fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_common_extensions() {
        assert_eq!(mime_for("me.PNG"), "image/png");
        assert_eq!(mime_for("passport.jpeg"), "image/jpeg");
        assert_eq!(mime_for("statement.pdf"), "application/pdf");
        assert_eq!(mime_for("noext"), "application/octet-stream");
    }
}
