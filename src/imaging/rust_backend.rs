//! Pure Rust drawing surface built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::load_from_memory` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` (alpha flattened away) |
//! | Encode → PNG | `PngEncoder` (quality ignored) |
//! | Encode → WebP | `WebPEncoder::new_lossless` (quality ignored) |

use super::backend::{BackendError, Dimensions, ImageBackend, Rendered};
use super::params::{CropParams, EncodeParams, ResizeParams};
use crate::codec::MimeType;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};

/// Largest buffer edge the surface allocates unless configured otherwise.
pub const DEFAULT_MAX_SURFACE_DIMENSION: u32 = 16_384;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    max_dimension: u32,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::with_max_dimension(DEFAULT_MAX_SURFACE_DIMENSION)
    }

    /// Refuse to allocate buffers with an edge longer than `max_dimension`.
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    /// Check that a `width × height` buffer can be allocated.
    fn acquire_surface(&self, width: u32, height: u32) -> Result<(), BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::Surface(format!(
                "empty buffer requested ({width}x{height})"
            )));
        }
        if width > self.max_dimension || height > self.max_dimension {
            return Err(BackendError::Surface(format!(
                "{width}x{height} exceeds the {max}px surface limit",
                max = self.max_dimension
            )));
        }
        Ok(())
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode encoded bytes into a raster buffer.
fn load_image(source: &[u8]) -> Result<DynamicImage, BackendError> {
    image::load_from_memory(source).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Serialize a buffer under the requested container.
///
/// JPEG has no alpha channel, so the buffer is flattened to RGB first.
fn save_image(img: &DynamicImage, params: &EncodeParams) -> Result<Rendered, BackendError> {
    let (width, height) = (img.width(), img.height());
    let mut bytes = Vec::new();

    let written = match params.format {
        MimeType::Jpeg => {
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, params.quality.value() as u8).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        MimeType::Png => {
            let rgba = img.to_rgba8();
            PngEncoder::new(&mut bytes).write_image(
                rgba.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
        MimeType::Webp => {
            let rgba = img.to_rgba8();
            WebPEncoder::new_lossless(&mut bytes).write_image(
                rgba.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
    };
    written.map_err(|e| {
        BackendError::Surface(format!("{} serialization failed: {e}", params.format))
    })?;

    Ok(Rendered {
        bytes,
        dimensions: Dimensions { width, height },
    })
}

impl ImageBackend for RustBackend {
    fn crop(&self, source: &[u8], params: &CropParams) -> Result<Rendered, BackendError> {
        let region = params.region;
        self.acquire_surface(region.width, region.height)?;

        let img = load_image(source)?;
        if !region.fits_within(img.width(), img.height()) {
            return Err(BackendError::Surface(format!(
                "crop region {}x{}+{}+{} exceeds source {}x{}",
                region.width,
                region.height,
                region.x,
                region.y,
                img.width(),
                img.height()
            )));
        }

        let cropped = img.crop_imm(region.x, region.y, region.width, region.height);
        save_image(&cropped, &params.encode)
    }

    fn resize(&self, source: &[u8], params: &ResizeParams) -> Result<Rendered, BackendError> {
        self.acquire_surface(params.width, params.height)?;
        let img = load_image(source)?;
        let resized = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        save_image(&resized, &params.encode)
    }

    fn encode(&self, source: &[u8], params: &EncodeParams) -> Result<Rendered, BackendError> {
        let img = load_image(source)?;
        self.acquire_surface(img.width(), img.height())?;
        save_image(&img, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::CropRegion;
    use crate::imaging::params::Quality;
    use crate::test_helpers::{decode_rgba, jpeg_bytes, png_bytes, webp_bytes};

    fn encode(format: MimeType, quality: u32) -> EncodeParams {
        EncodeParams {
            format,
            quality: Quality::new(quality),
        }
    }

    #[test]
    fn crop_copies_exact_region() {
        let backend = RustBackend::new();
        let out = backend
            .crop(
                &png_bytes(100, 80),
                &CropParams {
                    region: CropRegion::new(30, 20, 40, 10),
                    encode: EncodeParams::png(),
                },
            )
            .unwrap();

        assert_eq!(out.dimensions, Dimensions { width: 40, height: 10 });
        let pixels = decode_rgba(&out.bytes);
        assert_eq!(pixels.dimensions(), (40, 10));
        // Gradient encodes source position: R = x, G = y
        assert_eq!(pixels.get_pixel(0, 0).0, [30, 20, 128, 255]);
        assert_eq!(pixels.get_pixel(39, 9).0, [69, 29, 128, 255]);
    }

    #[test]
    fn crop_outside_source_is_surface_error() {
        let backend = RustBackend::new();
        let result = backend.crop(
            &png_bytes(50, 50),
            &CropParams {
                region: CropRegion::new(40, 40, 20, 20),
                encode: EncodeParams::png(),
            },
        );
        assert!(matches!(result, Err(BackendError::Surface(_))));
    }

    #[test]
    fn crop_of_garbage_is_decode_error() {
        let backend = RustBackend::new();
        let result = backend.crop(
            b"garbage",
            &CropParams {
                region: CropRegion::new(0, 0, 1, 1),
                encode: EncodeParams::png(),
            },
        );
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn resize_to_exact_jpeg() {
        let backend = RustBackend::new();
        let out = backend
            .resize(
                &png_bytes(100, 50),
                &ResizeParams {
                    width: 40,
                    height: 30,
                    encode: encode(MimeType::Jpeg, 50),
                },
            )
            .unwrap();

        assert_eq!(out.dimensions, Dimensions { width: 40, height: 30 });
        assert_eq!(&out.bytes[..3], &[0xFF, 0xD8, 0xFF]);
        assert_eq!(decode_rgba(&out.bytes).dimensions(), (40, 30));
    }

    #[test]
    fn resize_zero_dimension_is_surface_error() {
        let backend = RustBackend::new();
        let result = backend.resize(
            &png_bytes(10, 10),
            &ResizeParams {
                width: 0,
                height: 10,
                encode: encode(MimeType::Jpeg, 80),
            },
        );
        assert!(matches!(result, Err(BackendError::Surface(_))));
    }

    #[test]
    fn resize_beyond_limit_is_surface_error() {
        let backend = RustBackend::with_max_dimension(64);
        let result = backend.resize(
            &png_bytes(10, 10),
            &ResizeParams {
                width: 65,
                height: 10,
                encode: encode(MimeType::Jpeg, 80),
            },
        );
        assert!(matches!(result, Err(BackendError::Surface(_))));
    }

    #[test]
    fn encode_png_ignores_quality() {
        let backend = RustBackend::new();
        let source = jpeg_bytes(32, 24);
        let low = backend.encode(&source, &encode(MimeType::Png, 10)).unwrap();
        let high = backend.encode(&source, &encode(MimeType::Png, 100)).unwrap();
        assert_eq!(low.bytes, high.bytes);
    }

    #[test]
    fn encode_to_webp_keeps_dimensions() {
        let backend = RustBackend::new();
        let out = backend
            .encode(&png_bytes(20, 10), &encode(MimeType::Webp, 92))
            .unwrap();
        assert_eq!(&out.bytes[..4], b"RIFF");
        assert_eq!(&out.bytes[8..12], b"WEBP");
        assert_eq!(out.dimensions, Dimensions { width: 20, height: 10 });
    }

    #[test]
    fn encode_webp_source_to_jpeg() {
        let backend = RustBackend::new();
        let out = backend
            .encode(&webp_bytes(16, 16), &encode(MimeType::Jpeg, 70))
            .unwrap();
        assert_eq!(&out.bytes[..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn encode_beyond_limit_is_surface_error() {
        let backend = RustBackend::with_max_dimension(8);
        let result = backend.encode(&png_bytes(9, 4), &EncodeParams::png());
        assert!(matches!(result, Err(BackendError::Surface(_))));
    }
}
