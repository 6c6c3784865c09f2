//! The closed set of transform modes and everything that varies per mode.
//!
//! Every table here is an exhaustive `match`, so adding a mode fails to
//! compile until each label, message and route is supplied.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Colorize,
    RemoveBackground,
    RemoveWatermark,
    Compress,
    Convert,
}

/// Local transforms the raster engine performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalTransform {
    Compress,
    Convert,
}

/// Where a mode's transform runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Generative edit service, with the fixed instruction text.
    Remote(&'static str),
    Local(LocalTransform),
}

/// Uploader heading and hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploaderCopy {
    pub title: &'static str,
    pub description: &'static str,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Colorize,
        Mode::RemoveBackground,
        Mode::RemoveWatermark,
        Mode::Compress,
        Mode::Convert,
    ];

    pub fn route(self) -> Route {
        match self {
            Self::Colorize => Route::Remote(
                "Colorize this black and white photograph. Enhance the colors to be realistic and natural, preserving the original details.",
            ),
            Self::RemoveBackground => Route::Remote(
                "Remove the background from this image. The subject should be perfectly isolated. Make the new background transparent.",
            ),
            Self::RemoveWatermark => Route::Remote(
                "Remove any watermark, logo, or overlaid text from this image. Reconstruct the covered areas so they blend seamlessly with their surroundings, preserving all other original details.",
            ),
            Self::Compress => Route::Local(LocalTransform::Compress),
            Self::Convert => Route::Local(LocalTransform::Convert),
        }
    }

    /// Instruction sent to the edit service; `None` for local modes.
    pub fn instruction(self) -> Option<&'static str> {
        match self.route() {
            Route::Remote(instruction) => Some(instruction),
            Route::Local(_) => None,
        }
    }

    pub fn is_remote(self) -> bool {
        matches!(self.route(), Route::Remote(_))
    }

    /// Compress options default to the upload's natural size.
    pub fn needs_dimensions(self) -> bool {
        matches!(self, Self::Compress)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Colorize => "Colorize Photo",
            Self::RemoveBackground => "Remove Background",
            Self::RemoveWatermark => "Remove Watermark",
            Self::Compress => "Compress Image",
            Self::Convert => "Convert Format",
        }
    }

    pub fn uploader(self) -> UploaderCopy {
        let (title, description) = match self {
            Self::Colorize => (
                "Upload a Black & White Photo",
                "Drag and drop or click to select a file",
            ),
            Self::RemoveBackground => (
                "Upload an Image",
                "Drag and drop or click to remove its background",
            ),
            Self::RemoveWatermark => (
                "Upload an Image with a Watermark",
                "Drag and drop or click to select a file to remove the watermark",
            ),
            Self::Compress => (
                "Upload an Image to Compress",
                "Reduce file size while preserving quality",
            ),
            Self::Convert => (
                "Upload an Image to Convert",
                "Change image format to PNG, JPEG, or WEBP",
            ),
        };
        UploaderCopy { title, description }
    }

    /// Label of the "run" action.
    pub fn action_label(self) -> &'static str {
        match self {
            Self::Colorize => "Start Colorizing",
            Self::RemoveBackground => "Remove Background",
            Self::RemoveWatermark => "Remove Watermark",
            Self::Compress => "Compress Image",
            Self::Convert => "Convert Image",
        }
    }

    /// Messages shown in rotation while a transform is in flight.
    pub fn progress_messages(self) -> &'static [&'static str] {
        match self {
            Self::Colorize => &[
                "Analyzing photo structure...",
                "Applying historical color palettes...",
                "Rendering vibrant details...",
                "Bringing memories to life...",
            ],
            Self::RemoveBackground => &[
                "Scanning for the main subject...",
                "Creating a precision mask...",
                "Isolating pixels...",
                "Finalizing transparent background...",
            ],
            Self::RemoveWatermark => &[
                "Locating the watermark...",
                "Reconstructing hidden details...",
                "Blending the repaired area...",
                "Polishing the final image...",
            ],
            Self::Compress => &["Compressing image..."],
            Self::Convert => &["Converting image..."],
        }
    }

    /// Message `tick` steps into the rotation.
    pub fn progress_message(self, tick: usize) -> &'static str {
        let messages = self.progress_messages();
        messages[tick % messages.len()]
    }

    /// Command-line name, e.g. `remove-background`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Colorize => "colorize",
            Self::RemoveBackground => "remove-background",
            Self::RemoveWatermark => "remove-watermark",
            Self::Compress => "compress",
            Self::Convert => "convert",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.slug() == s.trim())
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}
