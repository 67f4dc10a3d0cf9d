#[must_use]
pub fn detect_mime(data: &[u8]) -> Option<String> {
    infer::get(data).map(|info| info.mime_type().to_string())
}

#[must_use]
pub fn detect_mime_from_extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit('.').next()?;
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg".into()),
        "png" => Some("image/png".into()),
        "gif" => Some("image/gif".into()),
        "webp" => Some("image/webp".into()),
        "bmp" => Some("image/bmp".into()),
        _ => None,
    }
}

/// Sniff an uploaded payload and return its MIME type only when it is an
/// image. Magic bytes win; the filename extension is a fallback for formats
/// `infer` does not know.
#[must_use]
pub fn detect_image_mime(data: &[u8], filename: Option<&str>) -> Option<String> {
    detect_mime(data)
        .or_else(|| filename.and_then(detect_mime_from_extension))
        .filter(|mime| mime.starts_with("image/"))
}
