//! Uploaded image records and data-URL helpers.
//!
//! Images travel through the system as `data:<mime>;base64,<payload>`
//! strings, exactly as they are persisted and as the vendor API returns
//! them once re-wrapped.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Name used when a project has no usable name.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

/// MIME prefix every upload must carry.
const IMAGE_MIME_PREFIX: &str = "image/";

/// An uploaded source image. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    /// Full data URL, prefix included.
    #[serde(rename = "base64")]
    pub data: String,
}

impl ImageFile {
    /// Build an image record from raw bytes with an explicit MIME type.
    pub fn new(name: impl Into<String>, mime_type: &str, bytes: &[u8]) -> Result<Self, CoreError> {
        validate_image_mime(mime_type)?;
        Ok(Self {
            name: name.into(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            data: to_data_url(mime_type, bytes),
        })
    }

    /// Build an image record, sniffing the MIME type from the file's
    /// magic bytes.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, CoreError> {
        let format = image::guess_format(bytes).map_err(|_| {
            CoreError::Validation("Please upload an image file.".to_string())
        })?;
        Self::new(name, format.to_mime_type(), bytes)
    }

    /// Base64 payload without the data-URL header.
    pub fn payload(&self) -> Result<&str, CoreError> {
        split_data_url(&self.data).map(|(_, payload)| payload)
    }
}

/// Reject anything that is not an `image/*` MIME type.
pub fn validate_image_mime(mime_type: &str) -> Result<(), CoreError> {
    if mime_type.starts_with(IMAGE_MIME_PREFIX) && mime_type.len() > IMAGE_MIME_PREFIX.len() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Please upload an image file (got '{mime_type}')."
        )))
    }
}

/// Encode bytes as a base64 data URL.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Split a data URL into `(mime, base64 payload)`.
pub fn split_data_url(data_url: &str) -> Result<(&str, &str), CoreError> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or_else(|| CoreError::Validation("Image data is not a data URL".to_string()))?;

    let mime = header
        .strip_prefix("data:")
        .and_then(|rest| rest.strip_suffix(";base64"))
        .ok_or_else(|| {
            CoreError::Validation(format!("Unsupported data URL header '{header}'"))
        })?;

    Ok((mime, payload))
}

/// MIME type declared by a data URL header, if it has one.
pub fn data_url_mime(data_url: &str) -> Option<&str> {
    split_data_url(data_url).ok().map(|(mime, _)| mime)
}

/// Decode a data URL into its MIME type and raw bytes.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>), CoreError> {
    let (mime, payload) = split_data_url(data_url)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| CoreError::Validation(format!("Invalid base64 image payload: {e}")))?;
    Ok((mime.to_string(), bytes))
}

/// Default project name for an uploaded file: the file name without its
/// final extension, or [`DEFAULT_PROJECT_NAME`] when nothing is left.
pub fn default_project_name(file_name: &str) -> String {
    let stem = match file_name.rfind('.') {
        Some(pos) => {
            let ext = &file_name[pos + 1..];
            if ext.is_empty() || ext.contains('/') {
                file_name
            } else {
                &file_name[..pos]
            }
        }
        None => file_name,
    };
    display_name(stem)
}

/// `name` itself, or [`DEFAULT_PROJECT_NAME`] when it is blank.
pub fn display_name(name: &str) -> String {
    if name.trim().is_empty() {
        DEFAULT_PROJECT_NAME.to_string()
    } else {
        name.to_string()
    }
}
