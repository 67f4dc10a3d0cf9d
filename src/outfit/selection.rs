use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};

/// Manual-mode selections are capped at this many items per generation.
pub const MANUAL_SELECTION_LIMIT: usize = 8;

/// An ordered, duplicate-free set of item ids picked by hand for
/// manual-mode generation. Items of any confirmation state may be chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitSelection {
    ids: Vec<String>,
}

impl OutfitSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle an item in or out of the selection. Returns `true` when the
    /// item was selected, `false` when it was deselected. Selecting beyond
    /// the cap is rejected and leaves the selection unchanged.
    pub fn toggle(&mut self, id: &str) -> Result<bool, WorkflowError> {
        if let Some(position) = self.ids.iter().position(|existing| existing == id) {
            self.ids.remove(position);
            return Ok(false);
        }
        if self.ids.len() >= MANUAL_SELECTION_LIMIT {
            return Err(WorkflowError::SelectionLimit {
                limit: MANUAL_SELECTION_LIMIT,
            });
        }
        self.ids.push(id.to_string());
        Ok(true)
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{MANUAL_SELECTION_LIMIT, OutfitSelection};
    use crate::error::WorkflowError;

    #[test]
    fn toggle_selects_then_deselects() {
        let mut selection = OutfitSelection::new();
        assert!(selection.toggle("a").unwrap());
        assert!(!selection.toggle("a").unwrap());
        assert!(selection.is_empty());
    }

    #[test]
    fn ninth_selection_is_rejected_and_set_unchanged() {
        let mut selection = OutfitSelection::new();
        for i in 0..MANUAL_SELECTION_LIMIT {
            selection.toggle(&format!("item-{i}")).unwrap();
        }

        let before = selection.clone();
        let err = selection.toggle("item-9").unwrap_err();
        assert!(matches!(err, WorkflowError::SelectionLimit { limit: 8 }));
        assert_eq!(selection, before, "rejected toggle must not mutate");
    }

    #[test]
    fn deselection_still_works_at_the_cap() {
        let mut selection = OutfitSelection::new();
        for i in 0..MANUAL_SELECTION_LIMIT {
            selection.toggle(&format!("item-{i}")).unwrap();
        }

        assert!(!selection.toggle("item-0").unwrap());
        assert_eq!(selection.len(), MANUAL_SELECTION_LIMIT - 1);
        assert!(selection.toggle("item-9").unwrap());
    }

    #[test]
    fn selection_preserves_pick_order() {
        let mut selection = OutfitSelection::new();
        selection.toggle("c").unwrap();
        selection.toggle("a").unwrap();
        selection.toggle("b").unwrap();
        assert_eq!(selection.ids(), ["c", "a", "b"]);
    }
}
