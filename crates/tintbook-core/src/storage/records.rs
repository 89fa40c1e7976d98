//! Persisted record types and per-attribute last-writer-wins merge.
//!
//! Every mutable attribute carries its own modification stamp so that a
//! remote device editing one property cannot clobber a concurrent local edit
//! to a different property of the same record. Whole-record merge would
//! silently drop one side.

use crate::document::StrokeDocument;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Wall-clock timestamp in milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }
}

/// A value paired with the time it was last written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamped<T> {
    pub value: T,
    pub modified_at: Timestamp,
}

impl<T> Stamped<T> {
    /// Stamp a value with the current time.
    pub fn new(value: T) -> Self {
        Self::at(value, Timestamp::now())
    }

    /// Stamp a value with an explicit time.
    pub fn at(value: T, modified_at: Timestamp) -> Self {
        Self { value, modified_at }
    }

    /// Overwrite the value, advancing the stamp.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.modified_at = Timestamp::now();
    }
}

impl<T: Clone> Stamped<T> {
    /// Last-writer-wins merge for this one attribute.
    ///
    /// The strictly newer write wins; ties keep the local value so a merge is
    /// idempotent. Returns whether the local value changed.
    pub fn merge_from(&mut self, other: &Self) -> bool {
        if other.modified_at > self.modified_at {
            self.value = other.value.clone();
            self.modified_at = other.modified_at;
            true
        } else {
            false
        }
    }
}

/// A page's drawing payload.
///
/// The blob and the user-visible last-modified move as one stamped unit: a
/// clear must advance the same stamp a draw does, or an earlier draw from
/// another device would resurrect cleared content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawingState {
    /// Serialized stroke blob; `None` is a blank page.
    #[serde(with = "blob_base64", default)]
    pub blob: Option<Vec<u8>>,
    /// Set on every drawing write, cleared when the page is cleared.
    pub last_modified: Option<Timestamp>,
}

/// Durable book metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: Uuid,
    pub title: Stamped<String>,
    pub description: Stamped<String>,
    pub cover_image: Stamped<String>,
    pub sort_order: Stamped<i16>,
    /// Presence marks the book as purchased/unlocked.
    pub purchase_date: Stamped<Option<Timestamp>>,
    /// External product identifier; `None` means the book is free.
    pub product_id: Stamped<Option<String>>,
}

impl BookRecord {
    pub fn new(
        title: &str,
        description: &str,
        cover_image: &str,
        product_id: Option<String>,
        purchase_date: Option<Timestamp>,
        sort_order: i16,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: Stamped::new(title.to_string()),
            description: Stamped::new(description.to_string()),
            cover_image: Stamped::new(cover_image.to_string()),
            sort_order: Stamped::new(sort_order),
            purchase_date: Stamped::new(purchase_date),
            product_id: Stamped::new(product_id),
        }
    }

    /// Merge a remote copy of the same book, attribute by attribute.
    pub fn merge_from(&mut self, other: &BookRecord) -> bool {
        let mut changed = false;
        changed |= self.title.merge_from(&other.title);
        changed |= self.description.merge_from(&other.description);
        changed |= self.cover_image.merge_from(&other.cover_image);
        changed |= self.sort_order.merge_from(&other.sort_order);
        changed |= self.purchase_date.merge_from(&other.purchase_date);
        changed |= self.product_id.merge_from(&other.product_id);
        changed
    }
}

/// Durable page state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: Uuid,
    /// Owning book, as a non-owning back-reference.
    pub book_id: Uuid,
    /// Position within the book, assigned contiguously from 1 at creation
    /// and never renumbered.
    pub number: i16,
    pub drawing: Stamped<DrawingState>,
}

impl PageRecord {
    pub fn new(book_id: Uuid, number: i16) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            number,
            drawing: Stamped::new(DrawingState::default()),
        }
    }

    /// Store a new drawing blob, stamping last-modified.
    pub fn write_drawing(&mut self, blob: Vec<u8>) {
        self.drawing.set(DrawingState {
            blob: Some(blob),
            last_modified: Some(Timestamp::now()),
        });
    }

    /// Drop the drawing and its last-modified timestamp.
    pub fn clear_drawing(&mut self) {
        self.drawing.set(DrawingState::default());
    }

    /// Whether the stored drawing shows any strokes.
    pub fn has_progress(&self) -> bool {
        self.drawing
            .value
            .blob
            .as_deref()
            .map(|blob| StrokeDocument::from_bytes(blob).has_visible_content())
            .unwrap_or(false)
    }

    /// Merge a remote copy of the same page.
    pub fn merge_from(&mut self, other: &PageRecord) -> bool {
        self.drawing.merge_from(&other.drawing)
    }
}

/// The full durable state of the library, as written to a backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryRecord {
    pub books: Vec<BookRecord>,
    pub pages: Vec<PageRecord>,
}

mod blob_base64 {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(
        blob: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match blob {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?;
        encoded
            .map(|text| STANDARD.decode(text).map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_attribute_wins() {
        let mut local = BookRecord::new("Shapes", "", "Shapes_cover", None, None, 0);
        let mut remote = local.clone();

        remote.title = Stamped::at("Shapes & Friends".to_string(), Timestamp(local.title.modified_at.0 + 10));
        assert!(local.merge_from(&remote));
        assert_eq!(local.title.value, "Shapes & Friends");
    }

    #[test]
    fn test_older_attribute_loses() {
        let mut local = BookRecord::new("Shapes", "", "Shapes_cover", None, None, 0);
        let mut remote = local.clone();

        remote.title = Stamped::at("Stale".to_string(), Timestamp(local.title.modified_at.0.saturating_sub(10)));
        assert!(!local.merge_from(&remote));
        assert_eq!(local.title.value, "Shapes");
    }

    #[test]
    fn test_attributes_merge_independently() {
        let mut local = BookRecord::new("Shapes", "Basic shapes", "Shapes_cover", None, None, 0);
        let base = local.title.modified_at.0;

        // Remote edited the title later; local edited the description later.
        let mut remote = local.clone();
        remote.title = Stamped::at("Shapes II".to_string(), Timestamp(base + 100));
        remote.description = Stamped::at("old words".to_string(), Timestamp(base.saturating_sub(100)));

        assert!(local.merge_from(&remote));
        assert_eq!(local.title.value, "Shapes II");
        assert_eq!(local.description.value, "Basic shapes");
    }

    #[test]
    fn test_merge_is_idempotent_on_ties() {
        let mut local = BookRecord::new("Shapes", "", "Shapes_cover", None, None, 0);
        let remote = local.clone();
        assert!(!local.merge_from(&remote));
    }

    #[test]
    fn test_later_clear_beats_earlier_draw() {
        let mut local = PageRecord::new(Uuid::new_v4(), 1);
        let mut remote = local.clone();

        let base = local.drawing.modified_at.0;
        remote.drawing = Stamped::at(
            DrawingState {
                blob: Some(vec![1, 2, 3]),
                last_modified: Some(Timestamp(base + 5)),
            },
            Timestamp(base + 5),
        );
        local.drawing = Stamped::at(DrawingState::default(), Timestamp(base + 10));

        assert!(!local.merge_from(&remote));
        assert!(local.drawing.value.blob.is_none());
        assert!(local.drawing.value.last_modified.is_none());
    }

    #[test]
    fn test_write_then_clear_drawing() {
        let mut page = PageRecord::new(Uuid::new_v4(), 1);
        assert!(!page.has_progress());

        let mut doc = StrokeDocument::new();
        doc.append(crate::document::Stroke::new(
            crate::tools::ToolKind::Pencil,
            crate::document::Color::black(),
            10.0,
            vec![kurbo::Point::new(1.0, 1.0)],
        ));
        page.write_drawing(doc.to_bytes());
        assert!(page.has_progress());
        assert!(page.drawing.value.last_modified.is_some());

        page.clear_drawing();
        assert!(!page.has_progress());
        assert!(page.drawing.value.last_modified.is_none());
    }

    #[test]
    fn test_blob_survives_json() {
        use base64::{Engine as _, engine::general_purpose::STANDARD};

        let mut page = PageRecord::new(Uuid::new_v4(), 2);
        page.write_drawing(vec![0, 1, 2, 250, 251, 252]);

        let json = serde_json::to_string(&page).unwrap();
        let back: PageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.drawing.value.blob, page.drawing.value.blob);

        // Blob is stored as text, not a byte array.
        assert!(json.contains(&STANDARD.encode([0u8, 1, 2, 250, 251, 252])));
    }

    #[test]
    fn test_corrupt_blob_reads_as_no_progress() {
        let mut page = PageRecord::new(Uuid::new_v4(), 1);
        page.write_drawing(vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(!page.has_progress());
    }
}
