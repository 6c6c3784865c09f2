//! Local raster processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Crop** | scale correction + `crop_imm` → PNG |
//! | **Compress** | `resize_exact` (Lanczos3) → JPEG at the chosen quality |
//! | **Convert** | 1:1 repaint → PNG / JPEG / WebP |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop and dimension math (unit testable)
//! - **Parameters**: Data structures describing surface operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: The transform engine combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{locked_height, locked_width, scale_selection};
pub use operations::{compress, convert, crop};
pub use params::{
    CompressionOptions, ConversionOptions, CropParams, EncodeParams, Quality, ResizeParams,
};
pub use rust_backend::RustBackend;
