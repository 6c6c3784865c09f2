//! Mode dispatch: which transform a mode runs, the per-mode session state
//! machine, and the [`Studio`] that drives it.

pub mod dispatcher;
pub mod mode;
pub mod session;

pub use dispatcher::{Studio, execute};
pub use mode::{LocalTransform, Mode, Route, UploaderCopy};
pub use session::{
    CompressionSettings, Download, Job, JobPlan, ModeSession, Phase, SessionDefaults,
};
