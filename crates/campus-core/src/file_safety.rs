//! Upload checks for files picked into media fields.
//!
//! Media fields accept images (logos, campus photos, thumbnails, portraits)
//! and documents (question paper PDFs). Before a picked file is attached to a
//! draft it is screened:
//! 1. Size limit
//! 2. Extension blocklist
//! 3. Magic byte detection for executables

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Magic byte signatures for executable files
pub const MAGIC_SIGNATURES: &[(&str, &[u8])] = &[
    ("Windows PE/MZ", &[0x4D, 0x5A]),
    ("ELF", &[0x7F, 0x45, 0x4C, 0x46]),
    ("Mach-O 32", &[0xFE, 0xED, 0xFA, 0xCE]),
    ("Mach-O 64", &[0xFE, 0xED, 0xFA, 0xCF]),
    ("Mach-O Fat / Java Class", &[0xCA, 0xFE, 0xBA, 0xBE]),
    ("WebAssembly", &[0x00, 0x61, 0x73, 0x6D]),
];

/// Blocked file extensions (case-insensitive)
static BLOCKED_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "exe", "dll", "scr", "pif", "com", "msi", "bat", "cmd", "sh", "so", "dylib", "jar",
        "class", "apk", "dmg", "pkg", "deb", "rpm", "reg", "lnk", "hta",
    ]
    .into_iter()
    .collect()
});

/// Result of upload screening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub allowed: bool,
    pub block_reason: Option<String>,
}

impl ValidationResult {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            block_reason: None,
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            block_reason: Some(reason.into()),
        }
    }
}

/// Screen a picked file.
pub fn validate_file(filename: &str, data: &[u8], max_size_bytes: u64) -> ValidationResult {
    if data.len() as u64 > max_size_bytes {
        return ValidationResult::blocked(format!(
            "{} exceeds the maximum upload size of {} bytes",
            filename, max_size_bytes
        ));
    }

    if let Some((_, ext)) = filename.rsplit_once('.') {
        if BLOCKED_EXTENSIONS.contains(ext.to_lowercase().as_str()) {
            return ValidationResult::blocked(format!("File extension .{} is not allowed", ext));
        }
    }

    for (name, magic) in MAGIC_SIGNATURES {
        if data.starts_with(magic) {
            return ValidationResult::blocked(format!("Executable file detected: {}", name));
        }
    }

    ValidationResult::allowed()
}

/// Detect the content type sent in the multipart part.
///
/// Magic bytes win, then the extension, then the claimed type.
pub fn detect_content_type(filename: &str, data: &[u8], claimed: &str) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    if let Some((_, ext)) = filename.rsplit_once('.') {
        if let Some(mime) = mime_from_extension(ext) {
            return mime.to_string();
        }
    }

    claimed.to_string()
}

/// Extensions of upload formats that carry no magic bytes.
fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "svg" => Some("image/svg+xml"),
        "txt" => Some("text/plain"),
        "csv" => Some("text/csv"),
        "md" | "markdown" => Some("text/markdown"),
        "json" => Some("application/json"),
        _ => None,
    }
}

/// Strip path components and characters that break multipart filenames.
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        return "upload".to_string();
    }

    if sanitized.len() > 255 {
        if let Some(dot_pos) = sanitized.rfind('.') {
            let ext = &sanitized[dot_pos..];
            if ext.len() < 255 {
                let mut cut = 255 - ext.len();
                while !sanitized.is_char_boundary(cut) {
                    cut -= 1;
                }
                return format!("{}{}", &sanitized[..cut], ext);
            }
        }
        let mut cut = 255;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        return sanitized[..cut].to_string();
    }

    sanitized.to_string()
}
