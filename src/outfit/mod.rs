//! Outfit generation: event taxonomy, item selection, prompt construction,
//! the append-only result log, and the single-shot generation workflow.

mod event;
mod log;
mod prompt;
mod selection;
mod workflow;

pub use event::EventType;
pub use log::{GeneratedOutfitRecord, OutfitLog};
pub use prompt::build_prompt;
pub use selection::{MANUAL_SELECTION_LIMIT, OutfitSelection};
pub use workflow::{GenerationOutcome, GenerationRequest, run_generation};
