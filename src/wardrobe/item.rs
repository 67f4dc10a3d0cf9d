use super::Category;
use crate::media::EncodedImage;
use serde::{Deserialize, Serialize};

fn default_subcategory() -> String {
    "Other".to_string()
}

/// One clothing record in the wardrobe.
///
/// `id` and `image` are immutable once set; `category`, `subcategory`, and
/// `confirmed` change through the store's categorize/confirm operations.
/// Records persisted before subcategories existed deserialize with
/// `subcategory = "Other"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: String,
    pub image: EncodedImage,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_subcategory")]
    pub subcategory: String,
    #[serde(default)]
    pub confirmed: bool,
}

impl ClothingItem {
    #[must_use]
    pub fn new(image: EncodedImage) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            image,
            category: Category::Unknown,
            subcategory: default_subcategory(),
            confirmed: false,
        }
    }

    /// Whether this item may be included in AI-driven outfit generation.
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        self.confirmed && self.category != Category::Unknown
    }
}
