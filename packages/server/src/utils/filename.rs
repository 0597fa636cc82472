//! Naming rules for uploaded content.

/// Validates the optional directory prefix of an upload, e.g. `album/2024`.
/// An empty prefix stores the file at the backend root.
pub fn validate_prefix(prefix: &str) -> Result<&str, &'static str> {
    let trimmed = prefix.trim().trim_matches('/');

    if trimmed.len() > 256 {
        return Err("Path exceeds maximum length of 256 characters");
    }

    if trimmed.contains('\0') {
        return Err("Path must not contain null bytes");
    }

    if trimmed.contains('\\') {
        return Err("Path must not contain backslashes");
    }

    if trimmed.is_empty() {
        return Ok(trimmed);
    }

    for segment in trimmed.split('/') {
        if segment.is_empty() {
            return Err("Path must not contain empty segments");
        }
        if segment.starts_with('.') {
            return Err("Path segments must not start with '.'");
        }
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_'))
    {
        return Err("Path contains invalid characters (allowed: a-zA-Z0-9, /, -, _)");
    }

    Ok(trimmed)
}

/// File extension for a MIME type, including the leading dot. Empty when the
/// type has no subtype.
pub fn extension_for_mime(mime_type: &str) -> String {
    let Some((_, subtype)) = mime_type.split_once('/') else {
        return String::new();
    };
    match subtype {
        "jpeg" | "jpg" => ".jpg".into(),
        "png" => ".png".into(),
        "gif" => ".gif".into(),
        "pdf" => ".pdf".into(),
        "mp4" => ".mp4".into(),
        "webm" => ".webm".into(),
        "zip" => ".zip".into(),
        "json" => ".json".into(),
        other => format!(".{other}"),
    }
}

/// Backend-relative path for new content: `{prefix}/{unix_nanos}{ext}`.
pub fn stored_path(prefix: &str, unix_nanos: i64, mime_type: &str) -> String {
    let name = format!("{unix_nanos}{}", extension_for_mime(mime_type));
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}/{name}")
    }
}

/// Original client filename with control characters and directories removed.
pub fn display_name(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    if cleaned.is_empty() {
        "upload".into()
    } else {
        cleaned
    }
}
