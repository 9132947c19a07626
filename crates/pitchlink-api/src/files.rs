use axum::{
    body::{Body, Bytes},
    extract::{
        Multipart,
        multipart::{Field, MultipartError},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::error;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::storage::content_type_for;

/// 50 MB upload limit for files
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// One file part pulled out of a multipart body.
pub struct Upload {
    pub filename: String,
    /// As declared by the client, falling back to the extension.
    pub content_type: String,
    pub bytes: Bytes,
}

/// Read the part called `field_name`, ignoring any others.
pub async fn read_upload(mut multipart: Multipart, field_name: &str) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(field_name) {
            return upload_from_field(field, field_name).await;
        }
    }
    Err(ApiError::Validation(format!("Missing file field '{field_name}'")))
}

/// Drain one file part, enforcing the size limit.
pub async fn upload_from_field(field: Field<'_>, field_name: &str) -> ApiResult<Upload> {
    let filename = field
        .file_name()
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation(format!("'{field_name}' must be a file")))?;
    let declared = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(multipart_error)?;

    if bytes.is_empty() {
        return Err(ApiError::Validation("Uploaded file is empty".into()));
    }
    if bytes.len() > MAX_FILE_SIZE {
        return Err(ApiError::PayloadTooLarge(format!(
            "File too large. Maximum size is {} MB",
            MAX_FILE_SIZE / (1024 * 1024)
        )));
    }

    let content_type = declared
        .filter(|ct| ct != "application/octet-stream")
        .unwrap_or_else(|| content_type_for(&filename).to_string());
    Ok(Upload { filename, content_type, bytes })
}

pub(crate) fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::Validation(e.body_text())
    }
}

/// Stream a stored file back as an attachment named `filename`.
pub async fn attachment(state: &AppState, filename: &str, stored_path: &str) -> ApiResult<Response> {
    let path = state
        .storage
        .resolve(stored_path)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("File not found: {filename}")))?;
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        error!("Failed to open file {}: {}", path.display(), e);
        ApiError::NotFound(format!("File not found: {filename}"))
    })?;

    let safe_name: String = filename.chars().filter(|c| *c != '"' && !c.is_control()).collect();
    let headers = [
        (header::CONTENT_TYPE, content_type_for(&path.to_string_lossy()).to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{safe_name}\"")),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}
