//! Shared test utilities: synthetic encoded images, ready-made assets and a
//! scripted remote transform.
//!
//! Every generated image uses a position-derived gradient so crops and
//! resizes can be checked pixel-for-pixel after decoding.

use image::{ImageEncoder, RgbaImage};

use crate::codec::{ImageAsset, MimeType};
use crate::remote::{RemoteError, RemoteTransform, TransformRequest, TransformResult};

/// Gradient image where `R = x`, `G = y` (mod 256) and alpha is opaque.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    })
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(gradient(width, height)).to_rgb8();
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::webp::WebPEncoder::new_lossless(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

pub fn png_asset(width: u32, height: u32) -> ImageAsset {
    ImageAsset::from_encoded(png_bytes(width, height), MimeType::Png).unwrap()
}

pub fn jpeg_asset(width: u32, height: u32) -> ImageAsset {
    ImageAsset::from_encoded(jpeg_bytes(width, height), MimeType::Jpeg).unwrap()
}

/// Decode encoded bytes back into RGBA pixels.
pub fn webp_asset(width: u32, height: u32) -> ImageAsset {
    ImageAsset::from_encoded(webp_bytes(width, height), MimeType::Webp).unwrap()
}

pub fn decode_rgba(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

/// Canned reply for [`StubRemote`].
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Answer with this base64 payload.
    Image(String),
    /// Answer without any image data.
    NoImage,
}

/// Remote transform that answers from a script and records instructions.
pub struct StubRemote {
    reply: StubReply,
    pub instructions: std::sync::Mutex<Vec<String>>,
}

impl StubRemote {
    pub fn replying(reply: StubReply) -> Self {
        Self {
            reply,
            instructions: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Replies with a base64 PNG of the given size.
    pub fn with_png(width: u32, height: u32) -> Self {
        use base64::{Engine as _, engine::general_purpose::STANDARD};
        Self::replying(StubReply::Image(STANDARD.encode(png_bytes(width, height))))
    }

    pub fn calls(&self) -> usize {
        self.instructions.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl RemoteTransform for StubRemote {
    async fn submit(&self, request: TransformRequest) -> Result<TransformResult, RemoteError> {
        self.instructions.lock().unwrap().push(request.instruction);
        match &self.reply {
            StubReply::Image(payload) => Ok(TransformResult {
                payload: payload.clone(),
            }),
            StubReply::NoImage => Err(RemoteError::NoImage),
        }
    }
}
