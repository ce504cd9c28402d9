//! Submission boundary
//!
//! Validates an uploaded file before the pipeline sees it and defines the
//! JSON reply handed back to the uploader:
//!
//! - `{"status": "pass"}`
//! - `{"status": "fail", "failed_tests": [...]}`
//! - `{"status": "fail", "error_message": "..."}` when the upload is rejected

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::report::{Report, Status};

/// File extensions accepted for upload (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "py"];

/// Maximum accepted upload size (1 MiB)
pub const MAX_SOURCE_SIZE: usize = 1024 * 1024;

/// A file as received from the uploader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub contents: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            contents: contents.into(),
        }
    }
}

/// Reasons an upload never reaches the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("No file provided")]
    NoFile,

    #[error("No file selected")]
    NoFileSelected,

    #[error("File type not allowed")]
    DisallowedExtension,

    #[error("File is not valid UTF-8 text")]
    NotUtf8,

    #[error("File is too large")]
    TooLarge,
}

/// Does `filename` carry one of the [`ALLOWED_EXTENSIONS`]?
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Validate an upload and decode it into source text.
pub fn accept(upload: Option<&Upload>) -> Result<String, Rejection> {
    let upload = upload.ok_or(Rejection::NoFile)?;

    if upload.filename.is_empty() {
        return Err(Rejection::NoFileSelected);
    }
    if !allowed_file(&upload.filename) {
        tracing::debug!(filename = %upload.filename, "rejected upload extension");
        return Err(Rejection::DisallowedExtension);
    }
    if upload.contents.len() > MAX_SOURCE_SIZE {
        return Err(Rejection::TooLarge);
    }

    String::from_utf8(upload.contents.clone()).map_err(|_| Rejection::NotUtf8)
}

/// Reply handed back to the uploader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Report(Report),
    Rejected(Rejection),
}

impl Reply {
    pub fn status(&self) -> Status {
        match self {
            Reply::Report(report) => report.status,
            Reply::Rejected(_) => Status::Fail,
        }
    }

    pub fn to_json(&self) -> String {
        // Serializing plain strings and enums into a String cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"status":"fail"}"#.to_string())
    }
}

impl From<Report> for Reply {
    fn from(report: Report) -> Self {
        Reply::Report(report)
    }
}

impl From<Rejection> for Reply {
    fn from(rejection: Rejection) -> Self {
        Reply::Rejected(rejection)
    }
}

#[derive(Serialize)]
struct RejectionBody {
    status: Status,
    error_message: String,
}

impl Serialize for Reply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reply::Report(report) => report.serialize(serializer),
            Reply::Rejected(rejection) => RejectionBody {
                status: Status::Fail,
                error_message: rejection.to_string(),
            }
            .serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(allowed_file("solution.py"));
        assert!(allowed_file("notes.TXT"));
        assert!(allowed_file("archive.tar.py"));
        assert!(!allowed_file("script.sh"));
        assert!(!allowed_file("py"));
        assert!(!allowed_file("solution.py.bak"));
        assert!(!allowed_file("trailing."));
    }

    #[test]
    fn test_no_upload() {
        assert_eq!(accept(None), Err(Rejection::NoFile));
    }

    #[test]
    fn test_empty_filename() {
        assert_eq!(accept(Some(&Upload::new("", "def f():\n    pass\n"))), Err(Rejection::NoFileSelected));
    }

    #[test]
    fn test_disallowed_extension() {
        assert_eq!(
            accept(Some(&Upload::new("run.exe", "def f():\n    pass\n"))),
            Err(Rejection::DisallowedExtension)
        );
    }

    #[test]
    fn test_invalid_utf8() {
        assert_eq!(accept(Some(&Upload::new("a.py", vec![0xff, 0xfe, 0x00]))), Err(Rejection::NotUtf8));
    }

    #[test]
    fn test_too_large() {
        let contents = vec![b'#'; MAX_SOURCE_SIZE + 1];
        assert_eq!(accept(Some(&Upload::new("a.py", contents))), Err(Rejection::TooLarge));
    }

    #[test]
    fn test_empty_contents_are_accepted() {
        assert_eq!(accept(Some(&Upload::new("empty.py", ""))), Ok(String::new()));
    }

    #[test]
    fn test_rejection_wire_format() {
        let reply = Reply::from(Rejection::DisallowedExtension);
        assert_eq!(reply.to_json(), r#"{"status":"fail","error_message":"File type not allowed"}"#);
        assert_eq!(reply.status(), Status::Fail);
    }

    #[test]
    fn test_report_wire_format() {
        let reply = Reply::from(Report::vacuous());
        assert_eq!(reply.to_json(), r#"{"status":"pass"}"#);

        let reply = Reply::from(Report {
            status: Status::Fail,
            failed_names: vec!["TestFunction_0".to_string()],
        });
        assert_eq!(reply.to_json(), r#"{"status":"fail","failed_tests":["TestFunction_0"]}"#);
    }
}
