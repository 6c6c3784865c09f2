//! Drawing surface trait and shared types.
//!
//! The [`ImageBackend`] trait is the drawing-surface primitive the raster
//! engine builds on: decode an encoded image into a raster buffer, paint it
//! (1:1, cropped, or scaled), and serialize the buffer back to bytes with a
//! chosen container and quality. Every operation takes encoded bytes in and
//! hands encoded bytes out, so the engine never touches pixels itself.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{CropParams, EncodeParams, ResizeParams};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("source image failed to load into a raster buffer: {0}")]
    Decode(String),
    #[error("could not acquire drawing surface: {0}")]
    Surface(String),
}

/// Pixel size of a rendered buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A serialized raster buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub dimensions: Dimensions,
}

/// Trait for drawing-surface backends.
///
/// Implementations must be shareable across the blocking worker threads the
/// studio schedules transforms on.
pub trait ImageBackend: Send + Sync {
    /// Copy `params.region` of `source` into a buffer of the region's size.
    fn crop(&self, source: &[u8], params: &CropParams) -> Result<Rendered, BackendError>;

    /// Scale `source` to exactly the requested size (no letterboxing).
    fn resize(&self, source: &[u8], params: &ResizeParams) -> Result<Rendered, BackendError>;

    /// Paint `source` 1:1 and serialize it under a different container.
    fn encode(&self, source: &[u8], params: &EncodeParams) -> Result<Rendered, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::codec::MimeType;
    use crate::crop::CropRegion;
    use crate::imaging::params::Quality;
    use std::sync::Mutex;

    /// Mock backend that records operations without touching pixels.
    ///
    /// Results report the requested output size (or the configured source
    /// size for `encode`); set `failure` to make every call fail.
    #[derive(Default)]
    pub struct MockBackend {
        pub source_dimensions: Mutex<Option<Dimensions>>,
        pub failure: Mutex<Option<BackendError>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Crop {
            region: CropRegion,
            format: MimeType,
        },
        Resize {
            width: u32,
            height: u32,
            format: MimeType,
            quality: u32,
        },
        Encode {
            format: MimeType,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(width: u32, height: u32) -> Self {
            Self {
                source_dimensions: Mutex::new(Some(Dimensions { width, height })),
                ..Self::default()
            }
        }

        pub fn failing(error: BackendError) -> Self {
            Self {
                failure: Mutex::new(Some(error)),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(op);
            match self.failure.lock().unwrap().clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn source(&self) -> Dimensions {
            self.source_dimensions.lock().unwrap().unwrap_or(Dimensions {
                width: 1,
                height: 1,
            })
        }
    }

    fn rendered(width: u32, height: u32, format: MimeType) -> Rendered {
        Rendered {
            bytes: format.as_str().as_bytes().to_vec(),
            dimensions: Dimensions { width, height },
        }
    }

    impl ImageBackend for MockBackend {
        fn crop(&self, _source: &[u8], params: &CropParams) -> Result<Rendered, BackendError> {
            self.record(RecordedOp::Crop {
                region: params.region,
                format: params.encode.format,
            })?;
            Ok(rendered(
                params.region.width,
                params.region.height,
                params.encode.format,
            ))
        }

        fn resize(&self, _source: &[u8], params: &ResizeParams) -> Result<Rendered, BackendError> {
            self.record(RecordedOp::Resize {
                width: params.width,
                height: params.height,
                format: params.encode.format,
                quality: params.encode.quality.value(),
            })?;
            Ok(rendered(params.width, params.height, params.encode.format))
        }

        fn encode(&self, _source: &[u8], params: &EncodeParams) -> Result<Rendered, BackendError> {
            self.record(RecordedOp::Encode {
                format: params.format,
                quality: params.quality.value(),
            })?;
            let dims = self.source();
            Ok(rendered(dims.width, dims.height, params.format))
        }
    }

    #[test]
    fn mock_encode_reports_source_size() {
        let backend = MockBackend::with_dimensions(800, 600);

        let out = backend.encode(b"anything", &EncodeParams::png()).unwrap();
        assert_eq!(out.dimensions, Dimensions { width: 800, height: 600 });

        let ops = backend.get_operations();
        assert_eq!(
            ops,
            vec![RecordedOp::Encode {
                format: MimeType::Png,
                quality: 92,
            }]
        );
    }

    #[test]
    fn mock_records_resize() {
        let backend = MockBackend::new();

        let out = backend
            .resize(
                b"src",
                &ResizeParams {
                    width: 500,
                    height: 250,
                    encode: EncodeParams {
                        format: MimeType::Jpeg,
                        quality: Quality::new(50),
                    },
                },
            )
            .unwrap();
        assert_eq!(out.dimensions, Dimensions { width: 500, height: 250 });

        let ops = backend.get_operations();
        assert!(matches!(
            &ops[0],
            RecordedOp::Resize {
                width: 500,
                height: 250,
                format: MimeType::Jpeg,
                quality: 50,
            }
        ));
    }

    #[test]
    fn mock_failure_still_records() {
        let backend = MockBackend::failing(BackendError::Surface("no memory".into()));
        let result = backend.encode(b"src", &EncodeParams::png());
        assert!(matches!(result, Err(BackendError::Surface(_))));
        assert_eq!(backend.get_operations().len(), 1);
    }
}
