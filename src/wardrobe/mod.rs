//! The wardrobe: clothing-item records, the fixed category taxonomy, and the
//! store that owns the persisted collection.

mod item;
mod store;
mod taxonomy;

pub use item::ClothingItem;
pub use store::WardrobeStore;
pub use taxonomy::Category;
