//! Multipart upload parsing.

use axum::extract::Multipart;
use shareclip_core::FileResource;

use super::ApiError;

/// A parsed multipart form: the `file` part plus plain text fields.
pub struct UploadForm {
    pub file: FileResource,
    pub fields: Vec<(String, String)>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

pub async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut file = None;
    let mut fields = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(ApiError::bad_request(format!("Invalid multipart body: {}", e))),
        };
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
            file = Some(FileResource::new(file_name, mime_type, bytes.to_vec()));
        } else if let Ok(text) = field.text().await {
            fields.push((name, text.trim().to_string()));
        }
    }

    let file = file.ok_or_else(|| ApiError::bad_request("Missing 'file' field"))?;
    Ok(UploadForm { file, fields })
}
