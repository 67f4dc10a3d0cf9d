use super::{EventType, OutfitLog, build_prompt};
use crate::error::{GenerationError, StoreError};
use crate::media::EncodedImage;
use crate::providers::OutfitRenderer;
use crate::wardrobe::{ClothingItem, WardrobeStore};
use tracing::{info, warn};

/// One generation attempt: the occasion, the avatar to dress, and the
/// ordered clothing items whose photos go along. Ephemeral — never
/// persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub event_type: EventType,
    pub avatar: EncodedImage,
    pub source_items: Vec<ClothingItem>,
}

impl GenerationRequest {
    /// AI mode: every eligible item (confirmed, known category) goes in.
    /// An empty eligible set is allowed — the request then carries only
    /// the avatar.
    #[must_use]
    pub fn ai_mode(event_type: EventType, avatar: EncodedImage, store: &WardrobeStore) -> Self {
        Self {
            event_type,
            avatar,
            source_items: store.eligible_items(),
        }
    }

    /// Manual mode: exactly the user's hand-picked subset, any
    /// confirmation state.
    #[must_use]
    pub fn manual(
        event_type: EventType,
        avatar: EncodedImage,
        source_items: Vec<ClothingItem>,
    ) -> Self {
        Self {
            event_type,
            avatar,
            source_items,
        }
    }

    /// The images sent to the service: avatar first, then each source
    /// item's photo in order.
    #[must_use]
    pub fn images(&self) -> Vec<EncodedImage> {
        let mut images = Vec::with_capacity(self.source_items.len() + 1);
        images.push(self.avatar.clone());
        images.extend(self.source_items.iter().map(|item| item.image.clone()));
        images
    }
}

/// How a generation attempt resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub image: EncodedImage,
    /// True when the service call failed and the unmodified avatar stands
    /// in for a result.
    pub degraded: bool,
    /// The surfaced service error when `degraded`.
    pub error: Option<String>,
}

/// Run one generation attempt: build the prompt, issue exactly one service
/// call, and log the result on success.
///
/// On failure the behavior is the caller's choice: with
/// `placeholder_on_failure` the attempt still completes, returning the
/// untouched avatar as a degraded result with the error message attached —
/// and the log is *not* appended, so a failure never records a false
/// success. Without it, the error propagates.
///
/// No retries, no cancellation once the call is issued.
pub async fn run_generation(
    request: &GenerationRequest,
    renderer: &dyn OutfitRenderer,
    log: &OutfitLog,
    placeholder_on_failure: bool,
) -> Result<GenerationOutcome, GenerationError> {
    let prompt = build_prompt(request.event_type, &request.source_items);
    let images = request.images();
    info!(
        event_type = %request.event_type,
        items = request.source_items.len(),
        "starting outfit generation"
    );

    match renderer.render_outfit(&prompt, &images).await {
        Ok(image) => {
            log.append(image.clone(), request.event_type)
                .map_err(store_error_to_generation)?;
            info!("outfit generation complete");
            Ok(GenerationOutcome {
                image,
                degraded: false,
                error: None,
            })
        }
        Err(e) if placeholder_on_failure => {
            warn!(error = %e, "generation failed; falling back to unmodified avatar");
            Ok(GenerationOutcome {
                image: request.avatar.clone(),
                degraded: true,
                error: Some(e.to_string()),
            })
        }
        Err(e) => Err(e),
    }
}

fn store_error_to_generation(e: StoreError) -> GenerationError {
    GenerationError::Request(format!("failed to record result: {e}"))
}
