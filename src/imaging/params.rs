//! Parameter types for raster operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`operations`](super::operations) engine (which
//! decides what buffer to paint and how to serialize it) and the
//! [`backend`](super::backend) (which does the pixel work). The split lets
//! engine logic be tested against a recording mock.
//!
//! ## Types
//!
//! - [`Quality`]: Encoder quality (1–100, default 92). Clamped on construction.
//! - [`EncodeParams`]: Target container plus quality for serializing a buffer.
//! - [`CropParams`]: Source-pixel region to copy, and how to serialize it.
//! - [`ResizeParams`]: Exact buffer size to scale into, and how to serialize it.
//! - [`CompressionOptions`] / [`ConversionOptions`]: User-facing option sets.

use serde::{Deserialize, Serialize};

use crate::codec::MimeType;
use crate::crop::CropRegion;

/// Quality setting for lossy image encoding (1-100).
///
/// Deserialized values go through [`Quality::new`] and are clamped too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(92)
    }
}

/// How to serialize a painted buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: MimeType,
    pub quality: Quality,
}

impl EncodeParams {
    /// Lossless PNG; quality is carried but has no effect.
    pub fn png() -> Self {
        Self {
            format: MimeType::Png,
            quality: Quality::default(),
        }
    }
}

/// Copy a source-pixel region into a buffer of the region's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropParams {
    pub region: CropRegion,
    pub encode: EncodeParams,
}

/// Scale the whole source into a buffer of exactly `width × height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub encode: EncodeParams,
}

/// Options for the compress transform.
///
/// A zero target dimension means "use the natural size on that axis".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionOptions {
    pub quality: Quality,
    pub target_width: u32,
    pub target_height: u32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: Quality::new(80),
            target_width: 0,
            target_height: 0,
        }
    }
}

/// Options for the convert transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    pub target_format: MimeType,
    /// Ignored by lossless containers.
    pub quality: Quality,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            target_format: MimeType::Png,
            quality: Quality::default(),
        }
    }
}
