//! CLI output formatting.
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Modes
//!
//! ```text
//! colorize             Colorize Photo (remote)
//!     Upload a Black & White Photo
//!     Drag and drop or click to select a file
//!     Action: Start Colorizing
//! compress             Compress Image (local)
//!     ...
//! ```
//!
//! ## Session
//!
//! ```text
//! Compress Image: resulted
//!     Source: image/png 1000x500 (12345 bytes)
//!     Result: image/jpeg 500x250 (4567 bytes)
//! ```
//!
//! A failed transform shows `Error (<kind>): <message>` in place of the result.

use crate::codec::ImageAsset;
use crate::studio::{Download, Mode, ModeSession, Phase};
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Empty => "empty",
        Phase::Uploaded => "uploaded",
        Phase::Cropping => "cropping",
        Phase::Processing => "processing",
        Phase::Resulted => "resulted",
    }
}

fn asset_line(label: &str, asset: &ImageAsset) -> String {
    format!(
        "{}{}: {} {}x{} ({} bytes)",
        indent(1),
        label,
        asset.mime(),
        asset.width(),
        asset.height(),
        asset.len()
    )
}

/// The mode catalogue, one entry per mode.
pub fn format_modes() -> Vec<String> {
    let mut lines = Vec::new();
    for mode in Mode::ALL {
        let route = if mode.is_remote() { "remote" } else { "local" };
        lines.push(format!("{:<20} {} ({})", mode.slug(), mode.label(), route));
        let copy = mode.uploader();
        lines.push(format!("{}{}", indent(1), copy.title));
        lines.push(format!("{}{}", indent(1), copy.description));
        lines.push(format!("{}Action: {}", indent(1), mode.action_label()));
    }
    lines
}

pub fn print_modes() {
    for line in format_modes() {
        println!("{}", line);
    }
}

/// Where the session stands: source, result, and any recorded error.
pub fn format_session_report(session: &ModeSession) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: {}",
        session.mode().label(),
        phase_name(session.phase())
    )];
    if let Some(asset) = session.uploaded() {
        lines.push(asset_line("Source", asset));
    }
    if let Some(asset) = session.result() {
        lines.push(asset_line("Result", asset));
    }
    if let Some(err) = session.last_error() {
        lines.push(format!("{}Error ({}): {}", indent(1), err.kind, err.message));
    }
    lines
}

pub fn print_session_report(session: &ModeSession) {
    for line in format_session_report(session) {
        println!("{}", line);
    }
}

pub fn format_saved(download: &Download, path: &Path) -> String {
    format!(
        "Saved {} ({} bytes) → {}",
        download.filename,
        download.bytes.len(),
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;
    use crate::studio::SessionDefaults;
    use crate::test_helpers::{jpeg_asset, png_asset};

    #[test]
    fn modes_list_every_mode() {
        let lines = format_modes();
        assert_eq!(lines.len(), Mode::ALL.len() * 4);
        assert!(lines[0].starts_with("colorize"));
        assert!(lines[0].ends_with("Colorize Photo (remote)"));
        assert_eq!(lines[1], "    Upload a Black & White Photo");
        assert_eq!(lines[3], "    Action: Start Colorizing");
        assert!(lines.iter().any(|l| l.ends_with("Compress Image (local)")));
        assert!(lines.contains(&"    Action: Convert Image".to_string()));
    }

    #[test]
    fn empty_session_report() {
        let session = ModeSession::new(Mode::Convert, SessionDefaults::default());
        assert_eq!(format_session_report(&session), vec!["Convert Format: empty"]);
    }

    #[test]
    fn resulted_session_report() {
        let mut session = ModeSession::new(Mode::Compress, SessionDefaults::default());
        let source = png_asset(10, 5);
        let source_len = source.len();
        session.accept_upload(source);
        let job = session.begin_processing().unwrap();
        let result = jpeg_asset(10, 5);
        let result_len = result.len();
        session.complete(job.id, Ok(result));

        let lines = format_session_report(&session);
        assert_eq!(lines[0], "Compress Image: resulted");
        assert_eq!(lines[1], format!("    Source: image/png 10x5 ({source_len} bytes)"));
        assert_eq!(lines[2], format!("    Result: image/jpeg 10x5 ({result_len} bytes)"));
    }

    #[test]
    fn failed_session_report_shows_error() {
        let mut session = ModeSession::new(Mode::Colorize, SessionDefaults::default());
        session.accept_upload(png_asset(4, 4));
        let job = session.begin_processing().unwrap();
        session.complete(job.id, Err(StudioError::RemoteService("service down".into())));

        let lines = format_session_report(&session);
        assert_eq!(lines[0], "Colorize Photo: uploaded");
        assert_eq!(lines.last().unwrap(), "    Error (remote_service): service down");
    }

    #[test]
    fn saved_line() {
        let download = Download {
            filename: "enhanced-image.png".into(),
            mime: crate::codec::MimeType::Png,
            bytes: bytes::Bytes::from_static(b"12345"),
        };
        assert_eq!(
            format_saved(&download, Path::new("out/enhanced-image.png")),
            "Saved enhanced-image.png (5 bytes) → out/enhanced-image.png"
        );
    }
}
