//! Data-URI image codec.
//!
//! Incoming documents arrive as `data:image/<subtype>;base64,<payload>` strings.
//! This module validates the MIME type against the supported set, decodes the
//! base64 payload, and enforces the post-decode size cap. All of this happens
//! before any network call is made.

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use thiserror::Error;

/// Maximum accepted image size after base64 decoding.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("La imagen debe ser un data URI válido (data:image/...;base64,...)")]
    InvalidDataUri,

    #[error("No se pudo convertir la imagen base64")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("El tamaño máximo permitido es 10MB")]
    TooLarge { size: usize },
}

/// Supported image formats for OCR submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    /// MIME type used as the request body content type on the OCR submit path.
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }

    fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype {
            "jpeg" | "jpg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "gif" => Some(ImageKind::Gif),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

/// A decoded document image, scoped to a single request.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub kind: ImageKind,
    pub bytes: Bytes,
}

impl DecodedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decode and validate a `data:image/...;base64,...` URI.
///
/// The MIME type is checked against the supported set before decoding, and the
/// decoded byte length is checked against [`MAX_IMAGE_BYTES`].
pub fn decode_data_uri(data_uri: &str) -> Result<DecodedImage, ImageError> {
    let rest = data_uri.strip_prefix("data:image/").ok_or(ImageError::InvalidDataUri)?;
    let (subtype, payload) = rest.split_once(";base64,").ok_or(ImageError::InvalidDataUri)?;
    let kind = ImageKind::from_subtype(subtype).ok_or(ImageError::InvalidDataUri)?;

    let bytes = STANDARD.decode(payload)?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge { size: bytes.len() });
    }

    Ok(DecodedImage {
        kind,
        bytes: Bytes::from(bytes),
    })
}
