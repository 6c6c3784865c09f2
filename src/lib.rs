//! # Photo Enhancer
//!
//! Take one photograph through one of five transforms and save the result:
//! colorize, remove background or remove watermark (delegated to a generative
//! image-editing service), or compress and convert locally. Any of them can
//! be preceded by a crop.
//!
//! # Architecture
//!
//! ```text
//! upload ─▶ (crop) ─▶ dispatch(mode) ─┬─▶ raster engine  (compress, convert, crop)
//!                                     └─▶ remote client  (colorize, remove-*)
//!                                                  │
//!                              result ◀────────────┘ ─▶ download
//! ```
//!
//! The [`studio::Studio`] owns one [`studio::ModeSession`] at a time and moves
//! it through `Empty → Uploaded → (Cropping) → Processing → Resulted`. Local
//! and remote transforms look the same from there: a job goes out, an
//! [`codec::ImageAsset`] or an error comes back.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`codec`] | `ImageAsset`, MIME handling, embedded base64 strings, magic-byte sniffing |
//! | [`crop`] | Crop selector geometry: display-space selections, source-pixel regions, presets |
//! | [`imaging`] | Drawing surface trait, `image`-crate backend, scale math, the raster engine |
//! | [`remote`] | `RemoteTransform` contract and the Gemini client |
//! | [`studio`] | Mode catalogue, session state machine, dispatcher |
//! | [`error`] | Studio error taxonomy recorded on sessions |
//! | [`config`] | `config.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Immutable Assets
//!
//! An [`codec::ImageAsset`] never changes after it is created. Every
//! transform hands back a new one, so a failed transform leaves the session
//! exactly as it was and the user can retry without re-uploading. Bytes are
//! shared (`bytes::Bytes`), so handing a snapshot to a worker costs nothing.
//!
//! ## Compression Always Yields JPEG
//!
//! Compress re-encodes to JPEG whatever the source format was, trading
//! transparency for size. Convert is the way to keep PNG or WebP.
//!
//! ## Trust the Header, Not the Label
//!
//! Uploads are identified by their encoded header; the declared type is only
//! a fallback. Remote results carry no reliable type at all and are sniffed:
//! JPEG if the payload opens with the start-of-image marker, PNG otherwise.
//!
//! ## One Job at a Time
//!
//! A session hands out at most one job, tagged with a process-unique id. An
//! outcome whose id is no longer pending (the user started over meanwhile)
//! is dropped, so what the session shows always belongs to the latest run.

pub mod codec;
pub mod config;
pub mod crop;
pub mod error;
pub mod imaging;
pub mod output;
pub mod remote;
pub mod studio;

#[cfg(test)]
pub(crate) mod test_helpers;
