use serde::{Deserialize, Serialize};

/// Metadata describing one uploaded video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Duration in seconds.
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    /// Inferred frame rate.
    pub fps: u32,
    /// Size of the source in bytes.
    pub size: u64,
    /// Inferred codec name.
    pub codec: String,
}

impl VideoMetadata {
    pub fn pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn size_mb(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0)
    }
}

/// Metadata plus advisory warnings produced by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedMetadata {
    pub metadata: VideoMetadata,
    pub warnings: Vec<String>,
}

/// An uploaded file held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct FileResource {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileResource {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension of the file name, if it has one.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
