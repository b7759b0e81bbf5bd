use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Prefix under which every uploaded file is stored
pub const FILES_PREFIX: &str = "files/";

/// S3 keys max out at 1024 bytes; leaves room for `files/YYYY/MM/DD/`
pub const MAX_FILENAME_BYTES: usize = 1000;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*$").expect("URL pattern is a valid regex")
});

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates file size against maximum limit
pub fn validate_file_size(size: u64, max_size: usize) -> Result<(), ValidationError> {
    if size > max_size as u64 {
        return Err(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!("File too large (max {}MB)", max_size / 1024 / 1024),
        });
    }
    Ok(())
}

/// Validates the filename extension against the allowlist; an empty allowlist accepts anything
pub fn validate_extension(filename: &str, allowed: &[String]) -> Result<(), ValidationError> {
    if allowed.is_empty() {
        return Ok(());
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension {
        Some(ext) if allowed.contains(&ext) => Ok(()),
        _ => Err(ValidationError {
            code: "EXTENSION_NOT_ALLOWED",
            message: format!(
                "Only {} files allowed",
                allowed
                    .iter()
                    .map(|e| e.to_uppercase())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }),
    }
}

/// Sanitizes filename to prevent path traversal and key injection
pub fn sanitize_filename(filename: &str) -> Result<String, ValidationError> {
    // Get only the filename component (remove any path)
    let name = Path::new(filename.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path components stripped from filename: {}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == '/'
                || c == '\\'
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == '#'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    let sanitized = truncate_keeping_extension(sanitized, MAX_FILENAME_BYTES);

    if sanitized.is_empty() || sanitized.starts_with('.') {
        return Err(ValidationError {
            code: "INVALID_FILENAME",
            message: format!("Invalid file name '{}'", filename),
        });
    }

    Ok(sanitized)
}

/// Cut the stem on a char boundary so the extension survives
fn truncate_keeping_extension(name: String, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name;
    }

    let extension = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= 16 => &name[dot..],
        _ => "",
    };
    let mut end = max_bytes - extension.len();
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &name[..end], extension)
}

/// Cheap pattern test for a bare http(s) URL; not a full parser
pub fn is_url(text: &str) -> bool {
    URL_PATTERN.is_match(text.trim())
}

/// Decoded final path segment of a URL, if it has a non-empty one
pub fn last_path_segment(raw: &str) -> Option<String> {
    let url = url::Url::parse(raw.trim()).ok()?;
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }

    let decoded = percent_encoding::percent_decode_str(segment)
        .decode_utf8_lossy()
        .into_owned();
    Some(decoded)
}

/// Filename used when a URL has no usable path segment
pub fn fallback_download_name(now: DateTime<Utc>) -> String {
    format!("download_{}.pdf", now.format("%Y%m%d_%H%M%S"))
}

/// `files/YYYY/MM/DD/<name>`; identical names on the same day overwrite each other
pub fn object_key_for(filename: &str, now: DateTime<Utc>) -> String {
    format!("{}{}/{}", FILES_PREFIX, now.format("%Y/%m/%d"), filename)
}

pub fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("epub") => "application/epub+zip",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
