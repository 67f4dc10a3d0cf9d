use crate::error::{ClassifyError, GenerationError};
use crate::media::EncodedImage;
use async_trait::async_trait;

/// The outfit-image generation capability: one prompt plus an ordered set
/// of encoded images in, one encoded image out. Implementations make
/// exactly one service call per invocation — retry policy, if any, belongs
/// to the caller.
#[async_trait]
pub trait OutfitRenderer: Send + Sync {
    async fn render_outfit(
        &self,
        prompt: &str,
        images: &[EncodedImage],
    ) -> Result<EncodedImage, GenerationError>;
}

/// The garment classification capability: one clothing photo in, one
/// free-text category label out. Callers validate the label against the
/// taxonomy.
#[async_trait]
pub trait GarmentClassifier: Send + Sync {
    async fn classify_garment(&self, image: &EncodedImage) -> Result<String, ClassifyError>;
}
