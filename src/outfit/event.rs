use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The occasion an outfit is generated for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum EventType {
    Casual,
    Work,
    Formal,
    Party,
    #[strum(to_string = "DateNight", serialize = "date night")]
    DateNight,
    Sport,
    Travel,
}

impl EventType {
    /// Comma-separated list of valid event names, for CLI error messages.
    #[must_use]
    pub fn choices() -> String {
        Self::iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
