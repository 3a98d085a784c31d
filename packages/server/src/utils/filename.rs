/// Why an uploaded document name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameError {
    /// Name is missing, empty or whitespace-only.
    Empty,
    /// Name is `..` or `.`.
    PathTraversal,
    /// Name contains null bytes.
    NullByte,
    /// Name starts with a dot (hidden file).
    Hidden,
    /// Name contains control characters (CR, LF, etc.).
    ControlCharacter,
    /// Name is longer than [`MAX_FILENAME_LEN`] bytes.
    TooLong,
}

/// Longest stored document name, in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

impl FilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
            Self::TooLong => "Invalid filename: longer than 255 bytes",
        }
    }
}

impl std::fmt::Display for FilenameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Reduce a client-supplied upload name to a flat, storable file name.
///
/// Browsers on Windows may send the full local path, so only the last
/// segment after `/` or `\` is kept.
pub fn sanitize_upload_name(raw: &str) -> Result<String, FilenameError> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    validate_flat_filename(last).map(str::to_string)
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed == ".." || trimmed == "." {
        return Err(FilenameError::PathTraversal);
    }

    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    if trimmed.len() > MAX_FILENAME_LEN {
        return Err(FilenameError::TooLong);
    }

    Ok(trimmed)
}

/// Lowercased extension including the dot (`.pdf`), or empty when there is none.
pub fn media_type_of(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    }
}
