use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The fixed clothing taxonomy. Every item carries exactly one category;
/// `Unknown` marks a freshly uploaded, not-yet-categorized item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    #[strum(to_string = "HeadCover", serialize = "head cover")]
    HeadCover,
    Top,
    Belts,
    Bottom,
    Shoes,
    Underwear,
    Accessories,
    Other,
    Unknown,
}

impl Default for Category {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Category {
    /// Parse a free-text label against the taxonomy, substituting `Other`
    /// for anything outside it. Used to validate classifier output.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or(Self::Other)
    }

    /// The sub-list a subcategory for this category is drawn from.
    #[must_use]
    pub fn subcategories(self) -> &'static [&'static str] {
        match self {
            Self::HeadCover => &["Hat", "Cap", "Beanie", "Scarf", "Other"],
            Self::Top => &[
                "TShirt", "Shirt", "Blouse", "Hoodie", "Sweater", "Jacket", "Coat", "Dress",
                "Other",
            ],
            Self::Belts => &["Leather", "Fabric", "Chain", "Other"],
            Self::Bottom => &["Jeans", "Trousers", "Shorts", "Skirt", "Leggings", "Other"],
            Self::Shoes => &["Sneakers", "Boots", "Heels", "Sandals", "Flats", "Other"],
            Self::Underwear => &["Bra", "Briefs", "Socks", "Tights", "Other"],
            Self::Accessories => &["Bag", "Jewelry", "Watch", "Glasses", "Gloves", "Other"],
            Self::Other | Self::Unknown => &["Other"],
        }
    }

    /// Normalize a requested subcategory against this category's sub-list,
    /// case-insensitively, falling back to `"Other"`.
    #[must_use]
    pub fn normalize_subcategory(self, requested: &str) -> String {
        let requested = requested.trim();
        self.subcategories()
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(requested))
            .map_or_else(|| "Other".to_string(), |c| (*c).to_string())
    }

    /// Categories a classifier may assign (everything except `Unknown`).
    pub fn assignable() -> impl Iterator<Item = Self> {
        Self::iter().filter(|c| *c != Self::Unknown)
    }

    /// The fixed taxonomy-enumeration instruction sent to the
    /// classification service.
    #[must_use]
    pub fn classifier_prompt() -> String {
        let labels = Self::assignable()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Look at the clothing item in this photo and answer with exactly one \
             category name from this list, nothing else: {labels}."
        )
    }
}
