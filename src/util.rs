//! Form validation helpers and small formatting utilities.
//!
//! Validation here is the pre-flight kind: it runs before any network call
//! and produces per-field messages. Anything that passes these checks can
//! still be rejected by the backend.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Largest file the upload form accepts (10 MB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Minimum password length accepted by the login/registration forms.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// Whether `email` looks like a standard address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Whether `password` meets the minimum length requirement.
pub fn is_valid_password(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LEN
}

/// Accepted document types, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    /// Classify a path by its extension. `None` means the type is not accepted.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// MIME type sent with the multipart file part.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Doc => "application/msword",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Human-readable file size ("482 B", "1.2 KB", "2.0 MB").
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
