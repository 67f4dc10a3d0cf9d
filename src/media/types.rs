use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// A raster image held as a base64 payload plus its MIME type — the shape
/// both the persisted wardrobe and the generation wire format use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl EncodedImage {
    #[must_use]
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    pub fn decode(&self) -> anyhow::Result<Vec<u8>> {
        BASE64
            .decode(&self.data)
            .map_err(|e| anyhow::anyhow!("invalid base64 image payload: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::EncodedImage;

    #[test]
    fn encode_decode_roundtrip() {
        let bytes = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let image = EncodedImage::from_bytes("image/png", &bytes);
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.decode().unwrap(), bytes);
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        let image = EncodedImage {
            mime_type: "image/png".into(),
            data: "not-base64!!!".into(),
        };
        assert!(image.decode().is_err());
    }
}
