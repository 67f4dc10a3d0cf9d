use super::EventType;
use crate::error::StoreError;
use crate::media::EncodedImage;
use crate::storage::{KvStore, OUTFIT_LOG_KEY};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One successful generation, as persisted in the append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedOutfitRecord {
    pub image: EncodedImage,
    pub event_type: EventType,
    pub timestamp: String,
}

/// The `generated_outfits` log: appended on every successful generation,
/// never pruned or deduplicated.
pub struct OutfitLog {
    kv: Arc<dyn KvStore>,
}

impl OutfitLog {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Append one record, stamped with the current UTC time.
    pub fn append(&self, image: EncodedImage, event_type: EventType) -> Result<(), StoreError> {
        let mut records = self.records()?;
        records.push(GeneratedOutfitRecord {
            image,
            event_type,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        let bytes = serde_json::to_vec(&records).map_err(|e| StoreError::Serialize {
            key: OUTFIT_LOG_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.kv.save(OUTFIT_LOG_KEY, &bytes)
    }

    /// All records in append order. An absent key is an empty log.
    pub fn records(&self) -> Result<Vec<GeneratedOutfitRecord>, StoreError> {
        match self.kv.load(OUTFIT_LOG_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Deserialize {
                key: OUTFIT_LOG_KEY.to_string(),
                message: e.to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records()?.len())
    }
}
