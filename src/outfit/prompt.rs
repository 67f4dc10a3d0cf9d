use super::EventType;
use crate::wardrobe::{Category, ClothingItem};

/// Render the natural-language generation prompt. The first attached image
/// is always the avatar; the rest are the selected clothing items, and the
/// prompt names the distinct categories among them (in selection order) so
/// the model knows what each photo contributes.
#[must_use]
pub fn build_prompt(event_type: EventType, items: &[ClothingItem]) -> String {
    let mut categories: Vec<Category> = Vec::new();
    for item in items {
        if item.category != Category::Unknown && !categories.contains(&item.category) {
            categories.push(item.category);
        }
    }

    let mut prompt = format!(
        "The first image is a person. Dress them in a complete outfit suitable \
         for a {event_type} occasion, assembled from the clothing items shown in \
         the remaining images."
    );

    if items.is_empty() {
        prompt.push_str(" No wardrobe photos are attached; design the outfit yourself.");
    } else if !categories.is_empty() {
        let names = categories
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        prompt.push_str(&format!(" The pieces provided cover: {names}."));
    }

    prompt.push_str(
        " Keep the person's face, pose and body unchanged, and return the styled \
         photo as an image.",
    );
    prompt
}
