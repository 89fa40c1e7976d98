//! The in-memory library store over a durable backend.

use super::records::{BookRecord, LibraryRecord, PageRecord, Timestamp};
use super::{Backend, StoreError};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::mpsc;
use uuid::Uuid;

/// Backend key under which the library snapshot is stored.
pub const LIBRARY_KEY: &str = "library";

/// Events broadcast to store subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Data changed due to a remote origin (another device).
    RemoteChange,
}

/// Owns all book and page records, tracks pending mutations, and flushes
/// them to a durable backend.
///
/// Books and pages live in arena maps keyed by id; a page points back at its
/// book through `book_id`. Records are never hard-deleted in normal
/// operation, only drawing content is cleared.
pub struct Store<B: Backend> {
    backend: Arc<B>,
    books: HashMap<Uuid, BookRecord>,
    pages: HashMap<Uuid, PageRecord>,
    /// Whether in-memory state differs from the last durable write.
    dirty: bool,
    subscribers: Vec<mpsc::Sender<StoreEvent>>,
}

impl<B: Backend> Store<B> {
    /// Open a store, loading the existing snapshot if one exists.
    ///
    /// A failed load starts an empty library rather than blocking app usage;
    /// the failure is logged.
    pub fn open(backend: Arc<B>) -> Self {
        let record = match pollster::block_on(backend.load(LIBRARY_KEY)) {
            Ok(record) => record,
            Err(StoreError::NotFound(_)) => LibraryRecord::default(),
            Err(e) => {
                log::error!("failed to load library, starting empty: {e}");
                LibraryRecord::default()
            }
        };

        let mut store = Self {
            backend,
            books: HashMap::new(),
            pages: HashMap::new(),
            dirty: false,
            subscribers: Vec::new(),
        };
        for book in record.books {
            store.books.insert(book.id, book);
        }
        for page in record.pages {
            store.pages.insert(page.id, page);
        }
        store
    }

    /// Whether any mutation is pending a durable write.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the library holds no books yet (first run).
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Subscribe to store change events.
    ///
    /// Events may originate off the UI thread; receivers drain them from
    /// whatever context owns the coordinator.
    pub fn subscribe(&mut self) -> mpsc::Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Insert a new book and its pages.
    pub fn insert_book(&mut self, book: BookRecord, pages: Vec<PageRecord>) {
        let book_id = book.id;
        self.books.insert(book_id, book);
        for mut page in pages {
            page.book_id = book_id;
            self.pages.insert(page.id, page);
        }
        self.dirty = true;
    }

    pub fn book(&self, id: Uuid) -> Option<&BookRecord> {
        self.books.get(&id)
    }

    pub fn page(&self, id: Uuid) -> Option<&PageRecord> {
        self.pages.get(&id)
    }

    /// Pages of a book, ordered by page number.
    pub fn pages_of(&self, book_id: Uuid) -> Vec<&PageRecord> {
        let mut pages: Vec<&PageRecord> = self
            .pages
            .values()
            .filter(|p| p.book_id == book_id)
            .collect();
        pages.sort_by_key(|p| p.number);
        pages
    }

    /// All books, ordered ascending by sort order regardless of storage order.
    pub fn fetch_all_books(&self) -> Vec<&BookRecord> {
        let mut books: Vec<&BookRecord> = self.books.values().collect();
        books.sort_by_key(|b| (b.sort_order.value, b.id));
        books
    }

    /// Store a page's drawing blob, stamping its last-modified.
    pub fn write_drawing(&mut self, page_id: Uuid, blob: Vec<u8>) -> bool {
        match self.pages.get_mut(&page_id) {
            Some(page) => {
                page.write_drawing(blob);
                self.dirty = true;
                true
            }
            None => {
                log::warn!("write_drawing: unknown page {page_id}");
                false
            }
        }
    }

    /// Clear a page's drawing and last-modified timestamp.
    pub fn clear_drawing(&mut self, page_id: Uuid) -> bool {
        match self.pages.get_mut(&page_id) {
            Some(page) => {
                page.clear_drawing();
                self.dirty = true;
                true
            }
            None => {
                log::warn!("clear_drawing: unknown page {page_id}");
                false
            }
        }
    }

    /// Mark a book as purchased.
    pub fn record_purchase(&mut self, book_id: Uuid, at: Timestamp) -> bool {
        match self.books.get_mut(&book_id) {
            Some(book) => {
                book.purchase_date.set(Some(at));
                self.dirty = true;
                true
            }
            None => {
                log::warn!("record_purchase: unknown book {book_id}");
                false
            }
        }
    }

    /// Flush pending mutations to the backend. No-op when nothing changed.
    ///
    /// A failed write is logged, not surfaced: the drawing session keeps its
    /// in-memory state and the dirty flag, so the next save retries.
    pub fn save(&mut self) {
        if !self.dirty {
            return;
        }
        let snapshot = self.snapshot();
        match pollster::block_on(self.backend.save(LIBRARY_KEY, &snapshot)) {
            Ok(()) => {
                self.dirty = false;
                log::debug!("library saved");
            }
            Err(e) => log::error!("library save failed, will retry: {e}"),
        }
    }

    /// Merge a remotely-originated snapshot into the local library.
    ///
    /// Each attribute is merged last-writer-wins on its own stamp; unknown
    /// books and pages are inserted whole. Emits [`StoreEvent::RemoteChange`]
    /// if anything changed.
    pub fn apply_remote(&mut self, remote: LibraryRecord) {
        let mut changed = false;

        for book in remote.books {
            match self.books.entry(book.id) {
                Entry::Occupied(mut entry) => changed |= entry.get_mut().merge_from(&book),
                Entry::Vacant(entry) => {
                    entry.insert(book);
                    changed = true;
                }
            }
        }
        for page in remote.pages {
            match self.pages.entry(page.id) {
                Entry::Occupied(mut entry) => changed |= entry.get_mut().merge_from(&page),
                Entry::Vacant(entry) => {
                    entry.insert(page);
                    changed = true;
                }
            }
        }

        if changed {
            self.dirty = true;
            self.broadcast(StoreEvent::RemoteChange);
        }
    }

    /// Deterministic snapshot of the current library state.
    fn snapshot(&self) -> LibraryRecord {
        let mut books: Vec<BookRecord> = self.books.values().cloned().collect();
        books.sort_by_key(|b| (b.sort_order.value, b.id));
        let mut pages: Vec<PageRecord> = self.pages.values().cloned().collect();
        pages.sort_by_key(|p| (p.book_id, p.number));
        LibraryRecord { books, pages }
    }

    fn broadcast(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}
