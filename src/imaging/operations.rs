//! Raster transform engine.
//!
//! These functions combine calculations with backend execution: they take
//! the source asset plus user options, compute the surface parameters, and
//! call the backend. Each `plan_*` function is the pure half and can be
//! checked without decoding anything.
//!
//! The engine never mutates its input. On failure the caller still holds the
//! previous [`ImageAsset`]; on success it receives a new one.

use super::backend::{BackendError, ImageBackend, Rendered};
use super::calculations::{resolve_target_dimensions, scale_selection};
use super::params::{
    CompressionOptions, ConversionOptions, CropParams, EncodeParams, ResizeParams,
};
use crate::codec::{ImageAsset, MimeType};
use crate::crop::DisplaySelection;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

fn into_asset(rendered: Rendered, mime: MimeType) -> ImageAsset {
    ImageAsset::from_parts(
        rendered.bytes,
        mime,
        rendered.dimensions.width,
        rendered.dimensions.height,
    )
}

/// Plan a crop: scale-correct the selection and serialize as PNG.
pub fn plan_crop(asset: &ImageAsset, selection: &DisplaySelection) -> CropParams {
    CropParams {
        region: scale_selection(selection, asset.dimensions()),
        encode: EncodeParams::png(),
    }
}

/// Extract the selected region at natural resolution.
///
/// The output is sized to the scale-corrected region and is always PNG.
pub fn crop(
    backend: &impl ImageBackend,
    asset: &ImageAsset,
    selection: &DisplaySelection,
) -> Result<ImageAsset> {
    let params = plan_crop(asset, selection);
    tracing::debug!(region = ?params.region, "cropping");
    let rendered = backend.crop(asset.bytes(), &params)?;
    Ok(into_asset(rendered, params.encode.format))
}

/// Plan a compression: exact target size and a JPEG container.
///
/// JPEG is forced whatever the source format; transparency is discarded.
pub fn plan_compress(asset: &ImageAsset, options: &CompressionOptions) -> ResizeParams {
    let (width, height) = resolve_target_dimensions(
        (options.target_width, options.target_height),
        asset.dimensions(),
    );
    ResizeParams {
        width,
        height,
        encode: EncodeParams {
            format: MimeType::Jpeg,
            quality: options.quality,
        },
    }
}

/// Scale the asset to the target size and re-encode it as JPEG.
pub fn compress(
    backend: &impl ImageBackend,
    asset: &ImageAsset,
    options: &CompressionOptions,
) -> Result<ImageAsset> {
    let params = plan_compress(asset, options);
    tracing::debug!(
        width = params.width,
        height = params.height,
        quality = params.encode.quality.value(),
        "compressing"
    );
    let rendered = backend.resize(asset.bytes(), &params)?;
    Ok(into_asset(rendered, params.encode.format))
}

pub fn plan_convert(options: &ConversionOptions) -> EncodeParams {
    EncodeParams {
        format: options.target_format,
        quality: options.quality,
    }
}

/// Re-encode the asset 1:1 under another container.
pub fn convert(
    backend: &impl ImageBackend,
    asset: &ImageAsset,
    options: &ConversionOptions,
) -> Result<ImageAsset> {
    let params = plan_convert(options);
    tracing::debug!(
        from = %asset.mime(),
        to = %params.format,
        lossy = params.format.is_lossy(),
        "converting"
    );
    let rendered = backend.encode(asset.bytes(), &params)?;
    Ok(into_asset(rendered, params.format))
}
