//! Studio-level error taxonomy.
//!
//! Every failure that reaches the dispatcher is folded into a [`StudioError`]
//! and then recorded on the session as a [`SessionError`]. The kind is kept
//! for diagnostics; the message is what the user sees. Local and remote
//! failures share one message channel.

use crate::codec::CodecError;
use crate::imaging::BackendError;
use crate::remote::RemoteError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Surface(String),
    #[error("{0}")]
    RemoteService(String),
    #[error("{0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Io,
    Decode,
    Surface,
    RemoteService,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Io => "io",
            Self::Decode => "decode",
            Self::Surface => "surface",
            Self::RemoteService => "remote_service",
            Self::Unknown => "unknown",
        })
    }
}

impl StudioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Surface(_) => ErrorKind::Surface,
            Self::RemoteService(_) => ErrorKind::RemoteService,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

impl From<CodecError> for StudioError {
    fn from(err: CodecError) -> Self {
        let message = err.to_string();
        match err {
            CodecError::Io(_) => Self::Io(message),
            CodecError::Decode(_) | CodecError::UnsupportedFormat(_) | CodecError::Base64(_) => {
                Self::Decode(message)
            }
        }
    }
}

impl From<BackendError> for StudioError {
    fn from(err: BackendError) -> Self {
        let message = err.to_string();
        match err {
            BackendError::Decode(_) => Self::Decode(message),
            BackendError::Surface(_) => Self::Surface(message),
        }
    }
}

impl From<RemoteError> for StudioError {
    fn from(err: RemoteError) -> Self {
        Self::RemoteService(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StudioError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Unknown(err.to_string())
    }
}

/// A failure as recorded on the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&StudioError> for SessionError {
    fn from(err: &StudioError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<StudioError> for SessionError {
    fn from(err: StudioError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
