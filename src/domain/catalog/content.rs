//! Content items and their default gate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Cents, VideoId};

/// Default gate of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Always visible.
    Free,

    /// Requires a membership granting access on the owning profile.
    Membership,

    /// Requires a one-off purchase of exactly this item.
    Paid,
}

/// Preview and full media references for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRefs {
    /// Blurred or truncated asset shown while locked.
    pub preview: String,
    /// Full asset shown once unlocked.
    pub full: String,
}

/// A piece of media on a creator profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: VideoId,
    pub title: String,
    pub kind: ContentKind,
    /// One-off price; only meaningful for `Paid` items.
    #[serde(default)]
    pub base_price: Cents,
    pub media: MediaRefs,
}

impl ContentItem {
    pub fn is_free(&self) -> bool {
        self.kind == ContentKind::Free
    }

    pub fn is_paid(&self) -> bool {
        self.kind == ContentKind::Paid
    }

    /// True when this item can be purchased on its own.
    pub fn is_for_sale(&self) -> bool {
        self.is_paid() && !self.base_price.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: ContentKind, price: u64) -> ContentItem {
        ContentItem {
            id: VideoId::new("video1").unwrap(),
            title: "Premium Content 1".to_string(),
            kind,
            base_price: Cents::new(price),
            media: MediaRefs {
                preview: "/previews/video1.mp4".to_string(),
                full: "/videos/video1.mp4".to_string(),
            },
        }
    }

    #[test]
    fn only_priced_paid_items_are_for_sale() {
        assert!(item(ContentKind::Paid, 499).is_for_sale());
        assert!(!item(ContentKind::Paid, 0).is_for_sale());
        assert!(!item(ContentKind::Membership, 499).is_for_sale());
        assert!(!item(ContentKind::Free, 0).is_for_sale());
    }

    #[test]
    fn kind_deserializes_from_snake_case() {
        let k: ContentKind = serde_json::from_str("\"membership\"").unwrap();
        assert_eq!(k, ContentKind::Membership);
    }
}
