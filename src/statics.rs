pub const USER_AGENT: &str = concat!("motion-notify/", env!("CARGO_PKG_VERSION"));

/// Longest caption telegram accepts on a photo
pub const MAX_PHOTO_CAPTION: usize = 1024;

/// Smallest image the analysis service will accept, in pixels per side
pub const MIN_IMAGE_SIDE: u32 = 50;

pub fn content_type(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
