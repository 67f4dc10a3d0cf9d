//! Image payload validation and encoding.

mod detection;
mod types;

pub use detection::{detect_image_mime, detect_mime, detect_mime_from_extension};
pub use types::EncodedImage;
