//! Library coordinator: fetch, seed, persist, and react to remote changes.
//!
//! Sits between the canvas (drawing events in) and the store (durable writes
//! out). Runs on the UI execution context; remote change notifications are
//! resynchronized here by draining the store's event channel from
//! [`Library::pump`].

use crate::canvas::CanvasEvent;
use crate::document::StrokeDocument;
use crate::entitlement::EntitlementOracle;
use crate::storage::{
    Backend, BookRecord, Debouncer, PageRecord, REMOTE_CHANGE_QUIESCENCE, SaveCoordinator, Store,
    StoreEvent, Timestamp,
};
use std::sync::mpsc;
use uuid::Uuid;

/// Read view of a book, assembled from store records.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub cover_image: String,
    pub sort_order: i16,
    pub purchase_date: Option<Timestamp>,
    pub product_id: Option<String>,
    /// Pages ordered by page number.
    pub pages: Vec<Page>,
}

impl Book {
    /// Prefix shared by this book's page assets: the title without whitespace.
    pub fn asset_prefix(&self) -> String {
        asset_prefix(&self.title)
    }

    /// Whether the book's content is available to the user.
    ///
    /// A recorded purchase unlocks outright; otherwise a book without a
    /// product id is free, and paid books defer to the entitlement oracle.
    pub fn is_unlocked(&self, oracle: &dyn EntitlementOracle) -> bool {
        if self.purchase_date.is_some() {
            return true;
        }
        match self.product_id.as_deref() {
            None => true,
            Some(product_id) => oracle.is_unlocked(product_id),
        }
    }
}

/// Read view of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: Uuid,
    pub number: i16,
    pub last_modified: Option<Timestamp>,
    pub has_progress: bool,
    /// Lookup key into the bundled line-art assets.
    pub image_name: String,
}

fn asset_prefix(title: &str) -> String {
    title.split_whitespace().collect()
}

/// Asset name for a page: book prefix and page number, no separating space.
pub fn page_image_name(prefix: Option<&str>, number: i16) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}_{number}"),
        None => format!("page_{number}"),
    }
}

fn page_view(record: &PageRecord, prefix: Option<&str>) -> Page {
    Page {
        id: record.id,
        number: record.number,
        last_modified: record.drawing.value.last_modified,
        has_progress: record.has_progress(),
        image_name: page_image_name(prefix, record.number),
    }
}

/// Create the starter content for a first launch.
pub fn seed_default_library<B: Backend>(store: &mut Store<B>) {
    let book = BookRecord::new(
        "Shapes",
        "Some basic shapes to test your drawing skills!",
        "Shapes_cover",
        None,
        Some(Timestamp::now()),
        0,
    );
    let book_id = book.id;
    let pages = (1..=5).map(|n| PageRecord::new(book_id, n)).collect();
    store.insert_book(book, pages);
    log::info!("created book Shapes with 5 pages");
}

/// Orchestrates the store for a front end.
pub struct Library<B: Backend> {
    store: Store<B>,
    saver: SaveCoordinator,
    remote_refetch: Debouncer,
    store_events: mpsc::Receiver<StoreEvent>,
    books: Vec<Book>,
}

impl<B: Backend> Library<B> {
    /// Open the library over a store, seeding default content on first run.
    pub fn new(mut store: Store<B>) -> Self {
        let store_events = store.subscribe();
        let mut library = Self {
            store,
            saver: SaveCoordinator::new(),
            remote_refetch: Debouncer::new(REMOTE_CHANGE_QUIESCENCE),
            store_events,
            books: Vec::new(),
        };
        library.fetch_books();
        library.seed_if_needed();
        library
    }

    /// The current book list, sorted by sort order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Rebuild the book views from the store.
    pub fn fetch_books(&mut self) {
        let store = &self.store;
        self.books = store
            .fetch_all_books()
            .into_iter()
            .map(|record| {
                let prefix = asset_prefix(&record.title.value);
                let pages = store
                    .pages_of(record.id)
                    .into_iter()
                    .map(|page| page_view(page, Some(&prefix)))
                    .collect();
                Book {
                    id: record.id,
                    title: record.title.value.clone(),
                    description: record.description.value.clone(),
                    cover_image: record.cover_image.value.clone(),
                    sort_order: record.sort_order.value,
                    purchase_date: record.purchase_date.value,
                    product_id: record.product_id.value.clone(),
                    pages,
                }
            })
            .collect();
        log::info!("fetched {} books", self.books.len());
    }

    fn seed_if_needed(&mut self) {
        if !self.books.is_empty() {
            return;
        }
        log::info!("seeding default library");
        seed_default_library(&mut self.store);
        self.saver.flush_now(&mut self.store);
        self.fetch_books();
    }

    /// View of a single page, with the `page_<n>` fallback name when the
    /// owning book cannot be resolved.
    pub fn page_info(&self, page_id: Uuid) -> Option<Page> {
        let record = self.store.page(page_id)?;
        let prefix = self
            .store
            .book(record.book_id)
            .map(|book| asset_prefix(&book.title.value));
        Some(page_view(record, prefix.as_deref()))
    }

    /// Decode a page's stored drawing. Absent or corrupt blobs come back as
    /// an empty document.
    pub fn drawing_for(&self, page_id: Uuid) -> StrokeDocument {
        self.store
            .page(page_id)
            .and_then(|page| page.drawing.value.blob.as_deref())
            .map(StrokeDocument::from_bytes)
            .unwrap_or_default()
    }

    /// Persist a page's drawing and schedule a durable write.
    pub fn save_drawing(&mut self, drawing: &StrokeDocument, page_id: Uuid) {
        if self.store.write_drawing(page_id, drawing.to_bytes()) {
            self.saver.request_save();
        }
    }

    /// Clear a page's drawing and last-modified, and schedule a write.
    pub fn clear_page(&mut self, page_id: Uuid) {
        if self.store.clear_drawing(page_id) {
            self.saver.request_save();
        }
    }

    /// Forward a canvas notification for the page being edited.
    pub fn handle_canvas_event(&mut self, page_id: Uuid, event: CanvasEvent) {
        match event {
            CanvasEvent::DrawingChanged(drawing) => self.save_drawing(&drawing, page_id),
            CanvasEvent::DrawingCleared => self.clear_page(page_id),
        }
    }

    /// Purchase fulfillment: stamp the book as purchased.
    pub fn unlock_book(&mut self, book_id: Uuid) -> bool {
        if self.store.record_purchase(book_id, Timestamp::now()) {
            self.saver.request_save();
            self.fetch_books();
            true
        } else {
            false
        }
    }

    /// Schedule a debounced durable write.
    pub fn request_save(&mut self) {
        self.saver.request_save();
    }

    /// Write immediately. Call when the app is about to lose foreground.
    pub fn flush_now(&mut self) {
        self.saver.flush_now(&mut self.store);
    }

    /// Drive pending work from the UI loop: drain remote-change events into
    /// the refetch debouncer and poll the save coordinator.
    ///
    /// Returns whether the book list was refetched, so a front end can
    /// rebind.
    pub fn pump(&mut self) -> bool {
        while let Ok(event) = self.store_events.try_recv() {
            match event {
                StoreEvent::RemoteChange => self.remote_refetch.trigger(),
            }
        }
        self.saver.poll(&mut self.store);
        if self.remote_refetch.fire_if_ready() {
            self.fetch_books();
            true
        } else {
            false
        }
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    /// Mutable store access for the sync layer (e.g. feeding remote
    /// snapshots through `apply_remote`).
    pub fn store_mut(&mut self) -> &mut Store<B> {
        &mut self.store
    }
}
