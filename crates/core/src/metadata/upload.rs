use super::{FileResource, UploadError};
use crate::config::LimitsConfig;

/// Reject uploads outside the size limits or with a disallowed MIME type.
pub fn validate_upload(resource: &FileResource, limits: &LimitsConfig) -> Result<(), UploadError> {
    let size = resource.size();
    if size > limits.max_file_size {
        return Err(UploadError::FileTooLarge {
            size,
            max: limits.max_file_size,
        });
    }
    if size < limits.min_file_size {
        return Err(UploadError::FileTooSmall {
            size,
            min: limits.min_file_size,
        });
    }

    let mime_type = resource.mime_type.to_ascii_lowercase();
    if !limits
        .allowed_mime_types
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&mime_type))
    {
        return Err(UploadError::UnsupportedFormat {
            mime_type: resource.mime_type.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_mp4() {
        let file = FileResource::new("a.mp4", "video/mp4", vec![0; 4096]);
        assert!(validate_upload(&file, &LimitsConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_too_small() {
        let file = FileResource::new("a.mp4", "video/mp4", vec![0; 10]);
        let err = validate_upload(&file, &LimitsConfig::default()).unwrap_err();
        assert!(matches!(err, UploadError::FileTooSmall { size: 10, .. }));
    }

    #[test]
    fn test_rejects_too_large() {
        let limits = LimitsConfig {
            max_file_size: 2048,
            ..Default::default()
        };
        let file = FileResource::new("a.mp4", "video/mp4", vec![0; 4096]);
        let err = validate_upload(&file, &limits).unwrap_err();
        assert!(matches!(err, UploadError::FileTooLarge { .. }));
    }

    #[test]
    fn test_rejects_unsupported_type() {
        let file = FileResource::new("a.mkv", "video/x-matroska", vec![0; 4096]);
        let err = validate_upload(&file, &LimitsConfig::default()).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedFormat { .. }));
        assert!(err.user_message().contains("MP4"));
    }
}
