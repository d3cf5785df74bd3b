//! Crate-wide constants for the file-intake surface.

/// File extensions accepted by the intake surface (documents, images, text).
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "webp", "bmp", "tif", "tiff", "docx", "txt", "csv", "json",
    "xml", "html", "htm", "md",
];

/// Maximum accepted size per file: 10 MB.
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// How many missing-item messages are shown before collapsing to "+N more".
pub const MISSING_PREVIEW_CAP: usize = 4;

/// Doc-type label passed to the extraction oracle for auto-sort batches,
/// where no slot is known yet.
pub const AUTO_SORT_DOC_LABEL: &str = "auto_sort";

pub fn is_allowed_extension(extension: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension)
}

/// Map a file extension to its MIME type. Unknown extensions fall back to the
/// generic binary type so previews degrade instead of failing.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "html" | "htm" => "text/html",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}
