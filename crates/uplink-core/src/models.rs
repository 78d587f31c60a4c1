//! Domain models for the upload relay pipeline.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Upload field category. Each category has its own accepted media types and
/// size cap (see [crate::constants]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Photo,
    Video,
}

impl FileCategory {
    /// The multipart field name this category is submitted under.
    pub fn field_name(&self) -> &'static str {
        match self {
            FileCategory::Photo => "photo",
            FileCategory::Video => "video",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// One file extracted from the inbound multipart request.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub data: Bytes,
    pub original_filename: String,
    pub content_type: String,
}

impl FilePart {
    pub fn new(data: Bytes, original_filename: String, content_type: String) -> Self {
        Self {
            data,
            original_filename,
            content_type,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A parsed upload request. The empty case is unrepresentable: construction
/// through [UploadAttempt::from_parts] returns `None` when neither field was
/// supplied, so downstream code never re-checks for "no files".
#[derive(Debug, Clone)]
pub enum UploadAttempt {
    Photo(FilePart),
    Video(FilePart),
    Both { photo: FilePart, video: FilePart },
}

impl UploadAttempt {
    /// Build an attempt from the optional multipart fields.
    pub fn from_parts(photo: Option<FilePart>, video: Option<FilePart>) -> Option<Self> {
        match (photo, video) {
            (Some(photo), Some(video)) => Some(UploadAttempt::Both { photo, video }),
            (Some(photo), None) => Some(UploadAttempt::Photo(photo)),
            (None, Some(video)) => Some(UploadAttempt::Video(video)),
            (None, None) => None,
        }
    }

    pub fn photo(&self) -> Option<&FilePart> {
        match self {
            UploadAttempt::Photo(photo) | UploadAttempt::Both { photo, .. } => Some(photo),
            UploadAttempt::Video(_) => None,
        }
    }

    pub fn video(&self) -> Option<&FilePart> {
        match self {
            UploadAttempt::Video(video) | UploadAttempt::Both { video, .. } => Some(video),
            UploadAttempt::Photo(_) => None,
        }
    }

    /// Present files with their categories, photo first. Within one request
    /// every consumer (validation, storage, relay) walks files in this order.
    pub fn parts(&self) -> Vec<(FileCategory, &FilePart)> {
        let mut parts = Vec::with_capacity(2);
        if let Some(photo) = self.photo() {
            parts.push((FileCategory::Photo, photo));
        }
        if let Some(video) = self.video() {
            parts.push((FileCategory::Video, video));
        }
        parts
    }

    /// Total buffered size of all present files, in bytes.
    pub fn total_bytes(&self) -> usize {
        self.parts().iter().map(|(_, part)| part.len()).sum()
    }
}

/// How validated uploads are forwarded to the workflow webhook. Selected once
/// at configuration time; the two shapes are never mixed in a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayStrategy {
    /// Re-encode the original byte buffers as an outgoing multipart body.
    #[default]
    BinaryPassthrough,
    /// Store files first and send only their public URLs as JSON.
    ReferenceRelay,
}

impl RelayStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayStrategy::BinaryPassthrough => "binary",
            RelayStrategy::ReferenceRelay => "reference",
        }
    }
}

impl fmt::Display for RelayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelayStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binary" | "passthrough" => Ok(RelayStrategy::BinaryPassthrough),
            "reference" | "url" => Ok(RelayStrategy::ReferenceRelay),
            other => Err(format!(
                "Unknown relay strategy '{}' (expected 'binary' or 'reference')",
                other
            )),
        }
    }
}

/// Public URLs of stored objects, keyed the way the downstream workflow
/// expects them. Serialized both as the reference-relay webhook body and as
/// the `uploadedFiles` echo in the upload response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicReferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_data: Option<String>,
}

impl PublicReferences {
    pub fn set(&mut self, category: FileCategory, url: String) {
        match category {
            FileCategory::Photo => self.image_data = Some(url),
            FileCategory::Video => self.video_data = Some(url),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image_data.is_none() && self.video_data.is_none()
    }
}
