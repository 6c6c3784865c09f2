//! Per-mode session state machine.
//!
//! ```text
//! Empty ──upload──▶ Uploaded ──run──▶ Processing ──ok──▶ Resulted
//!                    │   ▲                 │
//!             crop   ▼   │ confirm/cancel  └──err──▶ Uploaded (asset kept)
//!                   Cropping
//!
//! any state ──reset──▶ Empty
//! ```
//!
//! The session never runs transforms itself. [`ModeSession::begin_processing`]
//! and [`ModeSession::begin_crop_job`] hand out a [`Job`] describing the work;
//! the dispatcher executes it and reports back through
//! [`ModeSession::complete`]. A job id that is no longer pending (after a
//! reset, say) is ignored, so the result on the session always belongs to the
//! most recently started transform.

use super::mode::{LocalTransform, Mode, Route};
use crate::codec::{ImageAsset, MimeType};
use crate::crop::{AspectPreset, DisplaySelection, initial_selection};
use crate::error::{SessionError, StudioError};
use crate::imaging::calculations::{aspect_ratio, locked_height, locked_width};
use crate::imaging::{CompressionOptions, ConversionOptions, Quality};
use bytes::Bytes;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Empty,
    Uploaded,
    Cropping,
    Processing,
    Resulted,
}

/// Option values a session starts from and returns to on reset.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDefaults {
    pub compression_quality: Quality,
    pub aspect_lock: bool,
    pub conversion: ConversionOptions,
    pub file_stem: String,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            compression_quality: CompressionOptions::default().quality,
            aspect_lock: true,
            conversion: ConversionOptions::default(),
            file_stem: "enhanced-image".to_string(),
        }
    }
}

/// Compress-mode option state with the aspect lock applied on every edit.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionSettings {
    quality: Quality,
    width: u32,
    height: u32,
    aspect: Option<f64>,
    aspect_lock: bool,
}

impl CompressionSettings {
    pub fn new(quality: Quality, aspect_lock: bool) -> Self {
        Self {
            quality,
            width: 0,
            height: 0,
            aspect: None,
            aspect_lock,
        }
    }

    /// Take the upload's natural size as the target and remember its ratio.
    pub fn capture_natural(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.aspect = Some(aspect_ratio(width, height));
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
        if let (true, Some(aspect)) = (self.aspect_lock, self.aspect) {
            self.height = locked_height(width, aspect);
        }
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
        if let (true, Some(aspect)) = (self.aspect_lock, self.aspect) {
            self.width = locked_width(height, aspect);
        }
    }

    pub fn set_aspect_lock(&mut self, locked: bool) {
        self.aspect_lock = locked;
    }

    /// Out-of-range values are clamped into 1–100.
    pub fn set_quality(&mut self, quality: u32) {
        self.quality = Quality::new(quality);
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_lock(&self) -> bool {
        self.aspect_lock
    }

    pub fn options(&self) -> CompressionOptions {
        CompressionOptions {
            quality: self.quality,
            target_width: self.width,
            target_height: self.height,
        }
    }
}

/// What a job asks the dispatcher to do with its source asset.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPlan {
    Remote { instruction: &'static str },
    Compress(CompressionOptions),
    Convert(ConversionOptions),
    Crop(DisplaySelection),
}

/// A unit of work handed out by the session.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: u64,
    pub source: ImageAsset,
    pub plan: JobPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobKind {
    Crop,
    Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    id: u64,
    kind: JobKind,
}

/// A result ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime: MimeType,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct ModeSession {
    mode: Mode,
    phase: Phase,
    uploaded: Option<ImageAsset>,
    result: Option<ImageAsset>,
    last_error: Option<SessionError>,
    compression: CompressionSettings,
    conversion: ConversionOptions,
    crop: Option<DisplaySelection>,
    pending: Option<Pending>,
    defaults: SessionDefaults,
}

impl ModeSession {
    pub fn new(mode: Mode, defaults: SessionDefaults) -> Self {
        Self {
            mode,
            phase: Phase::Empty,
            uploaded: None,
            result: None,
            last_error: None,
            compression: CompressionSettings::new(
                defaults.compression_quality,
                defaults.aspect_lock,
            ),
            conversion: defaults.conversion,
            crop: None,
            pending: None,
            defaults,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn uploaded(&self) -> Option<&ImageAsset> {
        self.uploaded.as_ref()
    }

    pub fn result(&self) -> Option<&ImageAsset> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn compression(&self) -> &CompressionSettings {
        &self.compression
    }

    pub fn compression_mut(&mut self) -> &mut CompressionSettings {
        &mut self.compression
    }

    pub fn conversion(&self) -> ConversionOptions {
        self.conversion
    }

    pub fn set_target_format(&mut self, format: MimeType) {
        self.conversion.target_format = format;
    }

    pub fn set_conversion_quality(&mut self, quality: u32) {
        self.conversion.quality = Quality::new(quality);
    }

    pub fn crop_selection(&self) -> Option<&DisplaySelection> {
        self.crop.as_ref()
    }

    pub fn defaults(&self) -> &SessionDefaults {
        &self.defaults
    }

    /// Install a freshly decoded upload. Ignored while a job is in flight.
    pub fn accept_upload(&mut self, asset: ImageAsset) -> bool {
        if self.in_flight() {
            return false;
        }
        self.install_source(asset);
        self.result = None;
        self.last_error = None;
        true
    }

    fn install_source(&mut self, asset: ImageAsset) {
        if self.mode.needs_dimensions() {
            self.compression.capture_natural(asset.width(), asset.height());
        }
        self.uploaded = Some(asset);
        self.crop = None;
        self.phase = Phase::Uploaded;
    }

    /// Record a failure that happened outside a job (an unreadable upload).
    pub fn record_failure(&mut self, err: &StudioError) {
        self.last_error = Some(SessionError::from(err));
    }

    /// Open the crop selector over the uploaded image shown at `displayed`.
    pub fn begin_crop(&mut self, displayed: (f64, f64), preset: AspectPreset) -> bool {
        if self.phase != Phase::Uploaded || self.in_flight() {
            return false;
        }
        self.crop = Some(initial_selection(displayed, preset));
        self.phase = Phase::Cropping;
        true
    }

    pub fn adjust_crop(&mut self, selection: DisplaySelection) -> bool {
        if self.phase != Phase::Cropping || self.in_flight() {
            return false;
        }
        self.crop = Some(selection);
        true
    }

    pub fn cancel_crop(&mut self) -> bool {
        if self.phase != Phase::Cropping || self.in_flight() {
            return false;
        }
        self.crop = None;
        self.phase = Phase::Uploaded;
        true
    }

    /// Hand out the crop job for the current selection.
    ///
    /// `None` unless the selector is open, idle, and the selection has
    /// positive extents.
    pub fn begin_crop_job(&mut self) -> Option<Job> {
        if self.phase != Phase::Cropping || self.in_flight() {
            return None;
        }
        let selection = self.crop.filter(DisplaySelection::is_confirmable)?;
        let source = self.uploaded.clone()?;
        Some(self.start(JobKind::Crop, source, JobPlan::Crop(selection)))
    }

    /// Hand out the mode's transform job and enter `Processing`.
    ///
    /// `None` when there is nothing to run or a job is already in flight.
    pub fn begin_processing(&mut self) -> Option<Job> {
        if self.phase != Phase::Uploaded || self.in_flight() {
            return None;
        }
        let source = self.uploaded.clone()?;
        let plan = match self.mode.route() {
            Route::Remote(instruction) => JobPlan::Remote { instruction },
            Route::Local(LocalTransform::Compress) => JobPlan::Compress(self.compression.options()),
            Route::Local(LocalTransform::Convert) => JobPlan::Convert(self.conversion),
        };
        self.last_error = None;
        self.phase = Phase::Processing;
        Some(self.start(JobKind::Transform, source, plan))
    }

    fn start(&mut self, kind: JobKind, source: ImageAsset, plan: JobPlan) -> Job {
        let id = NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed);
        self.pending = Some(Pending { id, kind });
        Job { id, source, plan }
    }

    /// Apply a job outcome. Returns `false` if the job is no longer pending.
    pub fn complete(&mut self, job_id: u64, outcome: Result<ImageAsset, StudioError>) -> bool {
        let pending = match self.pending {
            Some(pending) if pending.id == job_id => pending,
            _ => return false,
        };
        self.pending = None;

        match (pending.kind, outcome) {
            (JobKind::Transform, Ok(asset)) => {
                self.result = Some(asset);
                self.phase = Phase::Resulted;
            }
            (JobKind::Crop, Ok(asset)) => {
                self.install_source(asset);
                self.result = None;
            }
            (_, Err(err)) => {
                self.last_error = Some(SessionError::from(&err));
                self.crop = None;
                self.phase = Phase::Uploaded;
            }
        }
        true
    }

    /// Start over: drop the upload, result, error and options.
    pub fn reset(&mut self) {
        *self = Self::new(self.mode, self.defaults.clone());
    }

    /// The result with a filename for saving.
    pub fn download(&self) -> Option<Download> {
        let result = self.result.as_ref()?;
        let mime = match self.mode.route() {
            Route::Local(LocalTransform::Compress) => MimeType::Jpeg,
            Route::Local(LocalTransform::Convert) | Route::Remote(_) => result.mime(),
        };
        Some(Download {
            filename: format!("{}.{}", self.defaults.file_stem, mime.extension()),
            mime,
            bytes: result.bytes().clone(),
        })
    }
}
