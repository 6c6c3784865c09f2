//! The studio: one active mode, one session, and the plumbing that runs jobs.
//!
//! Local transforms are pixel work, so they run on tokio's blocking pool;
//! remote transforms are awaited directly. Every failure is caught here and
//! recorded on the session. Nothing returns an error to the caller.

use super::mode::Mode;
use super::session::{Download, Job, JobPlan, ModeSession, Phase, SessionDefaults};
use crate::codec::{ImageAsset, MimeType, decode_upload};
use crate::crop::{AspectPreset, DisplaySelection};
use crate::error::StudioError;
use crate::imaging::{ImageBackend, operations};
use crate::remote::{RemoteTransform, TransformRequest};
use std::sync::Arc;
use tokio::io::AsyncRead;

pub struct Studio<B, R: ?Sized> {
    backend: Arc<B>,
    remote: Arc<R>,
    session: ModeSession,
    defaults: SessionDefaults,
}

impl<B, R> Studio<B, R>
where
    B: ImageBackend + 'static,
    R: RemoteTransform + ?Sized,
{
    pub fn new(backend: Arc<B>, remote: Arc<R>, mode: Mode, defaults: SessionDefaults) -> Self {
        Self {
            backend,
            remote,
            session: ModeSession::new(mode, defaults.clone()),
            defaults,
        }
    }

    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    pub fn session(&self) -> &ModeSession {
        &self.session
    }

    /// Option edits (quality, size, target format) go through the session.
    pub fn session_mut(&mut self) -> &mut ModeSession {
        &mut self.session
    }

    /// Switch modes. Any other mode gets a fresh session; nothing carries over.
    pub fn select_mode(&mut self, mode: Mode) {
        if mode == self.session.mode() {
            return;
        }
        tracing::info!(from = %self.session.mode(), to = %mode, "mode changed");
        self.session = ModeSession::new(mode, self.defaults.clone());
    }

    /// Read an upload to completion and install it on the session.
    pub async fn upload<S>(&mut self, source: S, declared: Option<MimeType>) -> Phase
    where
        S: AsyncRead + Unpin,
    {
        if self.session.in_flight() {
            return self.session.phase();
        }
        match decode_upload(source, declared).await {
            Ok(asset) => {
                tracing::info!(
                    mode = %self.session.mode(),
                    mime = %asset.mime(),
                    width = asset.width(),
                    height = asset.height(),
                    "image uploaded"
                );
                self.session.accept_upload(asset);
            }
            Err(err) => {
                let err = StudioError::from(err);
                tracing::warn!(kind = %err.kind(), error = %err, "upload failed");
                self.session.record_failure(&err);
            }
        }
        self.session.phase()
    }

    pub fn begin_crop(&mut self, displayed: (f64, f64), preset: AspectPreset) -> bool {
        self.session.begin_crop(displayed, preset)
    }

    pub fn adjust_crop(&mut self, selection: DisplaySelection) -> bool {
        self.session.adjust_crop(selection)
    }

    pub fn cancel_crop(&mut self) -> bool {
        self.session.cancel_crop()
    }

    /// Crop the upload to the current selection; the cropped image replaces it.
    pub async fn confirm_crop(&mut self) -> Phase {
        match self.session.begin_crop_job() {
            Some(job) => self.drive(job).await,
            None => self.session.phase(),
        }
    }

    /// Run the mode's transform on the uploaded image.
    ///
    /// A no-op unless the session is `Uploaded` and idle.
    pub async fn run(&mut self) -> Phase {
        match self.begin() {
            Some(job) => self.drive(job).await,
            None => self.session.phase(),
        }
    }

    /// First half of [`run`](Self::run): claim the job and enter `Processing`.
    pub fn begin(&mut self) -> Option<Job> {
        let job = self.session.begin_processing()?;
        tracing::info!(mode = %self.session.mode(), job = job.id, "processing started");
        Some(job)
    }

    /// Second half of [`run`](Self::run): apply an outcome produced by [`execute`].
    pub fn finish(&mut self, job_id: u64, outcome: Result<ImageAsset, StudioError>) -> Phase {
        match &outcome {
            Ok(asset) => tracing::info!(
                job = job_id,
                mime = %asset.mime(),
                width = asset.width(),
                height = asset.height(),
                bytes = asset.len(),
                "transform finished"
            ),
            Err(err) => tracing::warn!(job = job_id, kind = %err.kind(), error = %err, "transform failed"),
        }
        if !self.session.complete(job_id, outcome) {
            tracing::debug!(job = job_id, "discarded outcome of a stale job");
        }
        self.session.phase()
    }

    async fn drive(&mut self, job: Job) -> Phase {
        let id = job.id;
        let outcome = execute(&self.backend, self.remote.as_ref(), job).await;
        self.finish(id, outcome)
    }

    /// Start over in the same mode.
    pub fn reset(&mut self) {
        tracing::info!(mode = %self.session.mode(), "session reset");
        self.session.reset();
    }

    pub fn download(&self) -> Option<Download> {
        self.session.download()
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }
}

/// Carry out a job against the given backend and remote service.
pub async fn execute<B, R>(backend: &Arc<B>, remote: &R, job: Job) -> Result<ImageAsset, StudioError>
where
    B: ImageBackend + 'static,
    R: RemoteTransform + ?Sized,
{
    let Job { source, plan, .. } = job;
    match plan {
        JobPlan::Remote { instruction } => {
            let result = remote
                .submit(TransformRequest::new(&source, instruction))
                .await?;
            Ok(result.into_asset()?)
        }
        JobPlan::Compress(options) => {
            let backend = Arc::clone(backend);
            Ok(tokio::task::spawn_blocking(move || {
                operations::compress(backend.as_ref(), &source, &options)
            })
            .await??)
        }
        JobPlan::Convert(options) => {
            let backend = Arc::clone(backend);
            Ok(tokio::task::spawn_blocking(move || {
                operations::convert(backend.as_ref(), &source, &options)
            })
            .await??)
        }
        JobPlan::Crop(selection) => {
            let backend = Arc::clone(backend);
            Ok(tokio::task::spawn_blocking(move || {
                operations::crop(backend.as_ref(), &source, &selection)
            })
            .await??)
        }
    }
}
