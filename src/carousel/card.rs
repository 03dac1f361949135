/// Card data flowing through the carousel
///
/// A `SourceItem` is what the outside world hands us. A `CardItem` is one
/// appearance of that item in the visible window: the same photo can be on
/// screen more than once as the circular list wraps, so every appearance
/// gets its own `stable_id`.

use cgmath::{Deg, Vector2};

/// Where a photo came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    /// Shipped with the site
    #[default]
    Curated,
    /// Uploaded by a guest through the photo-memory flow
    UserSubmitted,
    /// Uploaded together with an RSVP
    Rsvp,
}

impl Provenance {
    /// Badge text under the caption; curated photos have none
    pub fn badge(self) -> Option<&'static str> {
        match self {
            Provenance::Curated => None,
            Provenance::UserSubmitted => Some("Guest photo"),
            Provenance::Rsvp => Some("From an RSVP"),
        }
    }
}

/// One entry of the circular source list
#[derive(Debug, Clone, PartialEq)]
pub struct SourceItem {
    /// URL, data URI, or local path. May be empty.
    pub image_ref: String,
    pub caption: String,
    pub provenance: Provenance,
}

impl SourceItem {
    pub fn new(image_ref: impl Into<String>, caption: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            image_ref: image_ref.into(),
            caption: caption.into(),
            provenance,
        }
    }

    /// Items without an image are shown with a placeholder, never dropped
    #[cfg(test)]
    pub fn has_image(&self) -> bool {
        !self.image_ref.trim().is_empty()
    }
}

/// Static jitter applied to a card that is not being dragged
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotate: Deg<f32>,
    pub translate: Vector2<f32>,
}

impl Transform {
    #[cfg(test)]
    pub const IDENTITY: Transform = Transform {
        rotate: Deg(0.0),
        translate: Vector2 { x: 0.0, y: 0.0 },
    };
}

/// A card currently in (or leaving) the visible window
#[derive(Debug, Clone, PartialEq)]
pub struct CardItem {
    pub stable_id: u64,
    /// Position of the item in the source list
    pub source_index: usize,
    pub image_ref: String,
    pub caption: String,
    pub provenance: Provenance,
    /// Generated once on insertion; replaced together with the card
    pub transform: Option<Transform>,
}

impl CardItem {
    pub fn from_source(
        item: &SourceItem,
        source_index: usize,
        stable_id: u64,
        transform: Option<Transform>,
    ) -> Self {
        Self {
            stable_id,
            source_index,
            image_ref: item.image_ref.clone(),
            caption: item.caption.clone(),
            provenance: item.provenance,
            transform,
        }
    }

    /// Same photo and caption, regardless of identity or jitter
    #[cfg(test)]
    pub fn same_content(&self, other: &CardItem) -> bool {
        self.image_ref == other.image_ref && self.caption == other.caption
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_only_for_guest_photos() {
        assert_eq!(Provenance::UserSubmitted.badge(), Some("Guest photo"));
        assert_eq!(Provenance::Rsvp.badge(), Some("From an RSVP"));
        assert_eq!(Provenance::Curated.badge(), None);
    }

    #[test]
    fn test_blank_image_ref_has_no_image() {
        assert!(!SourceItem::new("  ", "note", Provenance::Curated).has_image());
        assert!(SourceItem::new("/images/a.jpg", "", Provenance::Curated).has_image());
    }

    #[test]
    fn test_same_content_ignores_identity() {
        let item = SourceItem::new("a.jpg", "Save the date!", Provenance::Curated);
        let first = CardItem::from_source(&item, 0, 1, None);
        let second = CardItem::from_source(&item, 0, 7, Some(Transform::IDENTITY));

        assert!(first.same_content(&second));
        assert_ne!(first, second);
    }
}
