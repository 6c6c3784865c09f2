//! Codec utilities: raw upload bytes ⇄ embedded image strings.
//!
//! An *embedded image string* is the `data:<mime>;base64,<payload>` form used
//! to hand an image to a display surface or to the remote edit service. This
//! module converts between that form and [`ImageAsset`], and sniffs the format
//! of payloads whose declared type cannot be trusted.
//!
//! | Function | Direction |
//! |---|---|
//! | [`decode_upload`] | byte source → [`ImageAsset`] |
//! | [`to_embedded_base64`] | [`ImageAsset`] → embedded string |
//! | [`from_embedded_base64`] | embedded string → [`ImageAsset`] |
//! | [`mime_type_of`] / [`payload_of`] | embedded string → its parts |
//! | [`sniff_format`] / [`sniff_format_bytes`] | payload → [`MimeType`] |
//!
//! The string helpers presume the well-formed shape. Malformed input yields
//! whatever the substring rules produce (see [`mime_type_of`]); nothing here
//! validates or panics.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Base64 prefix of the JPEG start-of-image marker `FF D8 FF`.
const JPEG_BASE64_PREFIX: &str = "/9j/";
const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to read the image file.")]
    Io(#[from] std::io::Error),
    #[error("source image failed to load into a raster buffer: {0}")]
    Decode(String),
    #[error("unsupported image type: {0}")]
    UnsupportedFormat(String),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// The closed set of image containers the studio reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeType {
    Png,
    Jpeg,
    Webp,
}

impl MimeType {
    pub const ALL: [MimeType; 3] = [MimeType::Png, MimeType::Jpeg, MimeType::Webp];

    /// Full MIME string, e.g. `image/png`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Subtype after the slash; doubles as the download file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }

    /// Whether the container honours an encoder quality factor.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg)
    }

    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    /// Guess from a file extension (`jpg` accepted as an alias).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MimeType {
    type Err = CodecError;

    /// Accepts either a bare subtype (`webp`, `jpg`) or a full MIME string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let subtype = trimmed.strip_prefix("image/").unwrap_or(trimmed);
        Self::from_extension(subtype).ok_or_else(|| CodecError::UnsupportedFormat(s.to_string()))
    }
}

/// An encoded image plus what is known about it.
///
/// Immutable once created: every transform produces a new asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Bytes,
    mime: MimeType,
    width: u32,
    height: u32,
}

impl ImageAsset {
    /// Wrap encoded bytes, reading natural dimensions from the image header.
    pub fn from_encoded(bytes: impl Into<Bytes>, mime: MimeType) -> Result<Self, CodecError> {
        let bytes = bytes.into();
        let (width, height) = read_dimensions(&bytes)?;
        Ok(Self::from_parts(bytes, mime, width, height))
    }

    /// Build an asset whose dimensions are already known (e.g. fresh encoder output).
    pub(crate) fn from_parts(bytes: impl Into<Bytes>, mime: MimeType, width: u32, height: u32) -> Self {
        Self {
            bytes: bytes.into(),
            mime,
            width,
            height,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn mime(&self) -> MimeType {
        self.mime
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), CodecError> {
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    if width == 0 || height == 0 {
        return Err(CodecError::Decode(format!(
            "image reports empty dimensions {width}x{height}"
        )));
    }
    Ok((width, height))
}

/// Read an upload to completion and turn it into an [`ImageAsset`].
///
/// The encoded header decides the MIME type; `declared` (from the upload
/// boundary) is only consulted when the header is not recognised.
pub async fn decode_upload<R>(mut source: R, declared: Option<MimeType>) -> Result<ImageAsset, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    source.read_to_end(&mut buf).await?;

    let detected = image::guess_format(&buf)
        .ok()
        .and_then(MimeType::from_image_format);
    let mime = detected.or(declared).ok_or_else(|| {
        CodecError::Decode("unrecognised image header and no declared type".to_string())
    })?;

    ImageAsset::from_encoded(buf, mime)
}

/// Render as `data:<mime>;base64,<payload>`.
pub fn to_embedded_base64(asset: &ImageAsset) -> String {
    format!("data:{};base64,{}", asset.mime(), STANDARD.encode(asset.bytes()))
}

/// Parse an embedded string back into an asset.
pub fn from_embedded_base64(embedded: &str) -> Result<ImageAsset, CodecError> {
    let mime: MimeType = mime_type_of(embedded).parse()?;
    let payload = payload_of(embedded).unwrap_or_default();
    let bytes = STANDARD.decode(payload)?;
    ImageAsset::from_encoded(bytes, mime)
}

/// Text between the first `:` and the first `;`.
///
/// No validation: a missing `:` starts at the beginning, a missing `;` ends
/// at the beginning, and reversed bounds are swapped. `"abc"` yields `""`,
/// `"data:image/png"` yields `"data:"`.
pub fn mime_type_of(embedded: &str) -> &str {
    let start = embedded.find(':').map_or(0, |i| i + 1);
    let end = embedded.find(';').unwrap_or(0);
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    &embedded[lo..hi]
}

/// The segment after the first comma, up to any following comma.
pub fn payload_of(embedded: &str) -> Option<&str> {
    embedded.split(',').nth(1)
}

/// Infer the format of a base64 payload: JPEG if it opens with the SOI marker, else PNG.
pub fn sniff_format(payload: &str) -> MimeType {
    if payload.starts_with(JPEG_BASE64_PREFIX) {
        MimeType::Jpeg
    } else {
        MimeType::Png
    }
}

/// Raw-byte variant of [`sniff_format`].
pub fn sniff_format_bytes(bytes: &[u8]) -> MimeType {
    if bytes.starts_with(&JPEG_SOI) {
        MimeType::Jpeg
    } else {
        MimeType::Png
    }
}
