use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Background/avatar theme pairs. Picking a background always brings its
/// paired avatar along — the two are never selected independently.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Theme {
    African,
    Asian,
    European,
}

impl Default for Theme {
    fn default() -> Self {
        Self::African
    }
}

impl Theme {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::African => "African Style",
            Self::Asian => "Asian Style",
            Self::European => "European Style",
        }
    }

    #[must_use]
    pub fn background_file(self) -> &'static str {
        match self {
            Self::African => "mbckgrd1.jpg",
            Self::Asian => "mbckgrd2.jpg",
            Self::European => "mbckgrd3.jpg",
        }
    }

    #[must_use]
    pub fn avatar_file(self) -> &'static str {
        match self {
            Self::African => "avatar_01.jpeg",
            Self::Asian => "avatar_02.jpeg",
            Self::European => "avatar_03.jpeg",
        }
    }
}
