use super::{Category, ClothingItem};
use crate::error::{StoreError, WardrobeError};
use crate::media::{EncodedImage, detect_image_mime};
use crate::providers::GarmentClassifier;
use crate::storage::{KvStore, WARDROBE_KEY};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Owns the authoritative wardrobe collection. All mutation goes through
/// this store; every mutation re-serializes the full collection while the
/// collection lock is held, so the persisted state can never drift from the
/// in-memory state even under concurrent uploads.
pub struct WardrobeStore {
    kv: Arc<dyn KvStore>,
    items: Mutex<Vec<ClothingItem>>,
    max_item_bytes: u64,
}

impl WardrobeStore {
    /// Load the collection from the store (absent key means an empty
    /// wardrobe). `max_file_size_mb` bounds accepted uploads.
    pub fn open(kv: Arc<dyn KvStore>, max_file_size_mb: u64) -> Result<Self, WardrobeError> {
        let items = match kv.load(WARDROBE_KEY)? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StoreError::Deserialize {
                    key: WARDROBE_KEY.to_string(),
                    message: e.to_string(),
                })?
            }
            None => Vec::new(),
        };

        Ok(Self {
            kv,
            items: Mutex::new(items),
            max_item_bytes: max_file_size_mb * 1_024 * 1_024,
        })
    }

    /// Validate and add one uploaded payload. Non-image and oversized
    /// payloads are skipped silently (`None`), matching the bulk-upload
    /// contract where invalid files drop out without failing the batch.
    pub fn add_item(
        &self,
        bytes: &[u8],
        filename: Option<&str>,
    ) -> Result<Option<ClothingItem>, WardrobeError> {
        let Some(mime_type) = detect_image_mime(bytes, filename) else {
            debug!(filename, "skipping non-image upload");
            return Ok(None);
        };
        if bytes.len() as u64 > self.max_item_bytes {
            debug!(filename, size = bytes.len(), "skipping oversized upload");
            return Ok(None);
        }

        let item = ClothingItem::new(EncodedImage::from_bytes(mime_type, bytes));

        let mut items = self.lock();
        items.push(item.clone());
        self.persist(&items)?;
        info!(id = %item.id, "added wardrobe item");
        Ok(Some(item))
    }

    /// Bulk upload: each valid file appends under the same single-writer
    /// lock. Zero valid files is a no-op, not an error.
    pub fn add_items<I>(&self, files: I) -> Result<Vec<ClothingItem>, WardrobeError>
    where
        I: IntoIterator<Item = (Vec<u8>, Option<String>)>,
    {
        let mut added = Vec::new();
        for (bytes, filename) in files {
            if let Some(item) = self.add_item(&bytes, filename.as_deref())? {
                added.push(item);
            }
        }
        Ok(added)
    }

    /// Remove by id. Removing an absent id is a no-op.
    pub fn remove_item(&self, id: &str) -> Result<(), WardrobeError> {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(());
        }
        self.persist(&items)?;
        info!(id, "removed wardrobe item");
        Ok(())
    }

    /// Manual categorization: assigns the category, normalizes the requested
    /// subcategory against the category's sub-list, and confirms the item in
    /// one step. Re-categorization is always allowed.
    pub fn categorize_item(
        &self,
        id: &str,
        category: Category,
        subcategory: Option<&str>,
    ) -> Result<ClothingItem, WardrobeError> {
        let mut items = self.lock();
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| WardrobeError::NotFound { id: id.to_string() })?;

        item.category = category;
        item.subcategory = category.normalize_subcategory(subcategory.unwrap_or("Other"));
        item.confirmed = true;
        let updated = item.clone();
        self.persist(&items)?;
        Ok(updated)
    }

    /// AI categorization: asks the classifier for a label, validates it
    /// against the taxonomy (out-of-taxonomy labels become `Other`), and
    /// applies it *provisionally* — `confirmed` is reset to false and the
    /// item only becomes eligible after an explicit [`confirm_item`] call.
    /// On classifier failure the item is left unchanged.
    ///
    /// [`confirm_item`]: WardrobeStore::confirm_item
    pub async fn auto_categorize_item(
        &self,
        id: &str,
        classifier: &dyn GarmentClassifier,
    ) -> Result<ClothingItem, WardrobeError> {
        let image = self
            .lock()
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.image.clone())
            .ok_or_else(|| WardrobeError::NotFound { id: id.to_string() })?;

        let label = classifier.classify_garment(&image).await?;
        let category = Category::from_label(&label);
        debug!(id, %label, %category, "classifier suggestion");

        let mut items = self.lock();
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| WardrobeError::NotFound { id: id.to_string() })?;

        item.category = category;
        // The old subcategory may not exist under the new category.
        item.subcategory = "Other".to_string();
        item.confirmed = false;
        let updated = item.clone();
        self.persist(&items)?;
        Ok(updated)
    }

    /// The manual confirm step after an AI suggestion. Confirming an item
    /// that is still `Unknown` is rejected — there is nothing to confirm.
    pub fn confirm_item(&self, id: &str) -> Result<ClothingItem, WardrobeError> {
        let mut items = self.lock();
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| WardrobeError::NotFound { id: id.to_string() })?;

        if item.category == Category::Unknown {
            return Err(WardrobeError::NothingToConfirm { id: id.to_string() });
        }

        item.confirmed = true;
        let updated = item.clone();
        self.persist(&items)?;
        Ok(updated)
    }

    /// Snapshot of the collection in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<ClothingItem> {
        self.lock().clone()
    }

    /// Items usable in AI-mode generation: confirmed with a known category.
    #[must_use]
    pub fn eligible_items(&self) -> Vec<ClothingItem> {
        self.lock()
            .iter()
            .filter(|item| item.is_eligible())
            .cloned()
            .collect()
    }

    /// Resolve an ordered id subset; ids that no longer exist drop out.
    #[must_use]
    pub fn items_by_ids(&self, ids: &[String]) -> Vec<ClothingItem> {
        let items = self.lock();
        ids.iter()
            .filter_map(|id| items.iter().find(|item| &item.id == id).cloned())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ClothingItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, items: &[ClothingItem]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(items).map_err(|e| StoreError::Serialize {
            key: WARDROBE_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.kv.save(WARDROBE_KEY, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClassifyError;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    const PNG: [u8; 9] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

    struct FixedClassifier(&'static str);

    #[async_trait]
    impl GarmentClassifier for FixedClassifier {
        async fn classify_garment(&self, _image: &EncodedImage) -> Result<String, ClassifyError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl GarmentClassifier for FailingClassifier {
        async fn classify_garment(&self, _image: &EncodedImage) -> Result<String, ClassifyError> {
            Err(ClassifyError::Request("connection refused".into()))
        }
    }

    fn open_store(kv: Arc<dyn KvStore>) -> WardrobeStore {
        WardrobeStore::open(kv, 25).unwrap()
    }

    fn reload(kv: &Arc<dyn KvStore>) -> Vec<ClothingItem> {
        open_store(Arc::clone(kv)).items()
    }

    #[test]
    fn add_item_accepts_images_and_persists() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(Arc::clone(&kv));

        let item = store.add_item(&PNG, Some("top.png")).unwrap().unwrap();
        assert_eq!(item.category, Category::Unknown);
        assert!(!item.confirmed);
        assert_eq!(reload(&kv), store.items());
    }

    #[test]
    fn add_item_skips_non_images_silently() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(Arc::clone(&kv));

        assert!(store.add_item(b"not an image", Some("notes.txt")).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn bulk_upload_with_zero_valid_files_is_noop() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(Arc::clone(&kv));

        let added = store
            .add_items(vec![
                (b"plain text".to_vec(), Some("a.txt".to_string())),
                (b"more text".to_vec(), Some("b.csv".to_string())),
            ])
            .unwrap();
        assert!(added.is_empty());
        assert!(store.is_empty());
        assert_eq!(reload(&kv), Vec::new());
    }

    #[test]
    fn bulk_upload_keeps_valid_files_and_drops_the_rest() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(Arc::clone(&kv));

        let added = store
            .add_items(vec![
                (PNG.to_vec(), Some("shirt.png".to_string())),
                (b"junk".to_vec(), Some("junk.bin".to_string())),
                (PNG.to_vec(), Some("skirt.png".to_string())),
            ])
            .unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn oversized_uploads_are_skipped() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = WardrobeStore::open(kv, 1).unwrap();

        let mut oversized = PNG.to_vec();
        oversized.resize(1_024 * 1_024 + 1, 0);
        assert!(store.add_item(&oversized, Some("huge.png")).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn remove_nonexistent_id_is_noop() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(Arc::clone(&kv));
        store.add_item(&PNG, Some("a.png")).unwrap();

        store.remove_item("no-such-id").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(reload(&kv), store.items());
    }

    #[test]
    fn categorize_confirms_in_one_step() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(Arc::clone(&kv));
        let item = store.add_item(&PNG, Some("a.png")).unwrap().unwrap();

        let updated = store
            .categorize_item(&item.id, Category::Top, Some("Hoodie"))
            .unwrap();
        assert_eq!(updated.category, Category::Top);
        assert_eq!(updated.subcategory, "Hoodie");
        assert!(updated.confirmed);
        assert!(updated.is_eligible());
        assert_eq!(reload(&kv), store.items());
    }

    #[test]
    fn categorize_unknown_id_fails() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(kv);

        let err = store
            .categorize_item("ghost", Category::Top, None)
            .unwrap_err();
        assert!(matches!(err, WardrobeError::NotFound { .. }));
    }

    #[test]
    fn categorize_normalizes_subcategory() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(kv);
        let item = store.add_item(&PNG, Some("a.png")).unwrap().unwrap();

        let updated = store
            .categorize_item(&item.id, Category::Shoes, Some("rollerblades"))
            .unwrap();
        assert_eq!(updated.subcategory, "Other");
    }

    #[tokio::test]
    async fn auto_categorize_is_provisional() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(Arc::clone(&kv));
        let item = store.add_item(&PNG, Some("a.png")).unwrap().unwrap();
        // Previously confirmed by hand; an AI pass must demote it.
        store
            .categorize_item(&item.id, Category::Bottom, None)
            .unwrap();

        let updated = store
            .auto_categorize_item(&item.id, &FixedClassifier("Top"))
            .await
            .unwrap();
        assert_eq!(updated.category, Category::Top);
        assert!(!updated.confirmed, "AI categorization must not confirm");
        assert_eq!(reload(&kv), store.items());
    }

    #[tokio::test]
    async fn auto_categorize_normalizes_wild_labels_to_other() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(kv);
        let item = store.add_item(&PNG, Some("a.png")).unwrap().unwrap();

        let updated = store
            .auto_categorize_item(&item.id, &FixedClassifier("a lovely cardigan"))
            .await
            .unwrap();
        assert_eq!(updated.category, Category::Other);
        assert!(!updated.confirmed);
    }

    #[tokio::test]
    async fn auto_categorize_failure_leaves_item_unchanged() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(kv);
        let item = store.add_item(&PNG, Some("a.png")).unwrap().unwrap();
        store
            .categorize_item(&item.id, Category::Top, Some("Shirt"))
            .unwrap();

        let err = store
            .auto_categorize_item(&item.id, &FailingClassifier)
            .await
            .unwrap_err();
        assert!(matches!(err, WardrobeError::Classification(_)));

        let after = store.items().into_iter().find(|i| i.id == item.id).unwrap();
        assert_eq!(after.category, Category::Top);
        assert_eq!(after.subcategory, "Shirt");
        assert!(after.confirmed);
    }

    #[test]
    fn confirm_requires_a_known_category() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(kv);
        let item = store.add_item(&PNG, Some("a.png")).unwrap().unwrap();

        let err = store.confirm_item(&item.id).unwrap_err();
        assert!(matches!(err, WardrobeError::NothingToConfirm { .. }));
    }

    #[tokio::test]
    async fn confirm_after_ai_suggestion_makes_item_eligible() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(kv);
        let item = store.add_item(&PNG, Some("a.png")).unwrap().unwrap();

        store
            .auto_categorize_item(&item.id, &FixedClassifier("Shoes"))
            .await
            .unwrap();
        let confirmed = store.confirm_item(&item.id).unwrap();
        assert!(confirmed.is_eligible());
    }

    #[test]
    fn eligible_items_filters_by_invariant() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(kv);
        let a = store.add_item(&PNG, Some("a.png")).unwrap().unwrap();
        let _b = store.add_item(&PNG, Some("b.png")).unwrap().unwrap();
        store.categorize_item(&a.id, Category::Top, None).unwrap();

        let eligible = store.eligible_items();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, a.id);
    }

    #[test]
    fn items_by_ids_preserves_request_order_and_drops_ghosts() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(kv);
        let a = store.add_item(&PNG, Some("a.png")).unwrap().unwrap();
        let b = store.add_item(&PNG, Some("b.png")).unwrap().unwrap();

        let resolved = store.items_by_ids(&[
            b.id.clone(),
            "ghost".to_string(),
            a.id.clone(),
        ]);
        assert_eq!(
            resolved.iter().map(|i| i.id.clone()).collect::<Vec<_>>(),
            vec![b.id, a.id]
        );
    }

    #[test]
    fn persisted_state_matches_memory_after_mutation_sequence() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let store = open_store(Arc::clone(&kv));

        let a = store.add_item(&PNG, Some("a.png")).unwrap().unwrap();
        let b = store.add_item(&PNG, Some("b.png")).unwrap().unwrap();
        store.categorize_item(&a.id, Category::Top, Some("Shirt")).unwrap();
        store.remove_item(&b.id).unwrap();
        store.add_item(&PNG, Some("c.png")).unwrap().unwrap();

        assert_eq!(reload(&kv), store.items());
    }
}
