//! Paged, searchable, filterable book listing.
//!
//! The controller owns the single current result set of a catalog view.
//! Views render from its signals and feed user input back through
//! [`CatalogController::reset`], [`CatalogController::search_debounced`] and
//! [`CatalogController::sentinel_changed`].
//!
//! At most one page request per query generation is in flight: the loading
//! flag drops re-entrant calls instead of queueing them. Every reset starts a
//! new generation, and a response that comes back for an older generation
//! is dropped without touching state.

use std::{cell::Cell, future::Future, rc::Rc};

use async_trait::async_trait;
use futures_signals::{
    signal::{Mutable, Signal},
    signal_vec::MutableVec,
};

use crate::{
    api::{ApiClient, Transport},
    debounce::Debouncer,
    error::{Error, Result},
    models::{Book, BookPage, BookQuery},
};

#[async_trait(?Send)]
pub trait BookSource {
    async fn fetch_page(&self, query: &BookQuery) -> Result<BookPage>;
}

#[async_trait(?Send)]
impl<T: Transport> BookSource for ApiClient<T> {
    async fn fetch_page(&self, query: &BookQuery) -> Result<BookPage> {
        self.books(query).await
    }
}

#[async_trait(?Send)]
impl<S: BookSource + ?Sized> BookSource for Rc<S> {
    async fn fetch_page(&self, query: &BookQuery) -> Result<BookPage> {
        (**self).fetch_page(query).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page arrived and this many books were appended.
    Loaded(usize),
    /// Dropped by the loading or end-of-list guard, no request was made.
    Skipped,
    /// The response belonged to a superseded query and was discarded.
    Stale,
    /// The request failed; the error is exposed through [`CatalogController::error`].
    Failed,
}

pub struct CatalogController<S> {
    source: S,
    page_size: u32,
    page: Mutable<u32>,
    search: Mutable<String>,
    category: Mutable<Option<i64>>,
    has_more: Mutable<bool>,
    is_loading: Mutable<bool>,
    is_empty: Mutable<bool>,
    total: Mutable<Option<i64>>,
    error: Mutable<Option<Error>>,
    books: MutableVec<Book>,
    generation: Cell<u64>,
    sentinel_visible: Cell<bool>,
    debouncer: Debouncer,
}

impl<S: BookSource> CatalogController<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            page: Mutable::new(1),
            search: Mutable::new(String::new()),
            category: Mutable::new(None),
            has_more: Mutable::new(true),
            is_loading: Mutable::new(false),
            is_empty: Mutable::new(false),
            total: Mutable::new(None),
            error: Mutable::new(None),
            books: MutableVec::new(),
            generation: Cell::new(0),
            sentinel_visible: Cell::new(false),
            debouncer: Debouncer::new(),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page(&self) -> u32 {
        self.page.get()
    }

    pub fn search(&self) -> String {
        self.search.get_cloned()
    }

    pub fn category(&self) -> Option<i64> {
        self.category.get()
    }

    pub fn has_more(&self) -> bool {
        self.has_more.get()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.get()
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty.get()
    }

    pub fn total(&self) -> Option<i64> {
        self.total.get()
    }

    pub fn error(&self) -> Option<Error> {
        self.error.get_cloned()
    }

    pub fn books(&self) -> &MutableVec<Book> {
        &self.books
    }

    pub fn book_count(&self) -> usize {
        self.books.lock_ref().len()
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading.get() {
            Phase::Loading
        } else if !self.has_more.get() {
            Phase::Exhausted
        } else {
            Phase::Idle
        }
    }

    pub fn is_loading_signal(&self) -> impl Signal<Item = bool> + use<S> {
        self.is_loading.signal()
    }

    pub fn is_empty_signal(&self) -> impl Signal<Item = bool> + use<S> {
        self.is_empty.signal()
    }

    pub fn has_more_signal(&self) -> impl Signal<Item = bool> + use<S> {
        self.has_more.signal()
    }

    pub fn total_signal(&self) -> impl Signal<Item = Option<i64>> + use<S> {
        self.total.signal()
    }

    pub fn category_signal(&self) -> impl Signal<Item = Option<i64>> + use<S> {
        self.category.signal()
    }

    pub fn error_signal(&self) -> impl Signal<Item = Option<Error>> + use<S> {
        self.error.signal_cloned()
    }

    pub fn query(&self) -> BookQuery {
        BookQuery::new(self.page.get(), self.page_size)
            .with_search(self.search.get_cloned())
            .with_category(self.category.get())
    }

    /// Requests the next page and appends it in server order.
    ///
    /// Failures are logged and stored, never returned, so the view can
    /// offer a retry with `has_more` untouched.
    pub async fn load_next(&self) -> LoadOutcome {
        if self.is_loading.get() || !self.has_more.get() {
            return LoadOutcome::Skipped;
        }

        self.is_loading.set(true);
        let generation = self.generation.get();
        let query = self.query();
        debug!(
            "fetching page {} (search={:?}, category={:?})",
            query.page, query.search, query.category_id
        );

        let result = self.source.fetch_page(&query).await;

        if generation != self.generation.get() {
            debug!("discarding stale page {} of generation {}", query.page, generation);
            return LoadOutcome::Stale;
        }

        self.is_loading.set(false);
        match result {
            Ok(page) => {
                let count = page.books.len();
                let first_page = query.page == 1;

                if first_page {
                    self.total.set(Some(page.total.unwrap_or(count as i64)));
                }
                if count == 0 && first_page {
                    self.is_empty.set(true);
                    self.has_more.set(false);
                } else if (count as u32) < self.page_size {
                    self.has_more.set(false);
                }

                self.books.lock_mut().extend(page.books);
                self.page.set(query.page + 1);
                self.error.set(None);
                LoadOutcome::Loaded(count)
            }
            Err(e) => {
                error!("book fetch error: {}", e);
                self.error.set(Some(e));
                LoadOutcome::Failed
            }
        }
    }

    /// Starts over with page 1, applying a new search and/or category, then
    /// loads the first page. `category: Some(None)` clears the filter.
    pub async fn reset(&self, search: Option<String>, category: Option<Option<i64>>) -> LoadOutcome {
        self.generation.set(self.generation.get() + 1);

        if let Some(search) = search {
            self.search.set_neq(search.trim().to_string());
        }
        if let Some(category) = category {
            self.category.set_neq(category);
        }

        self.books.lock_mut().clear();
        self.page.set(1);
        self.has_more.set(true);
        self.is_loading.set(false);
        self.is_empty.set(false);
        self.error.set(None);
        info!(
            "catalog reset (search={:?}, category={:?})",
            self.search.get_cloned(),
            self.category.get()
        );

        self.load_next().await
    }

    pub async fn set_category(&self, category: Option<i64>) -> LoadOutcome {
        self.reset(None, Some(category)).await
    }

    /// Resets with `text` once input has paused for `delay`. Superseded
    /// calls return `None`.
    pub async fn search_debounced<F>(&self, text: String, delay: F) -> Option<LoadOutcome>
    where
        F: Future<Output = ()>,
    {
        if self.debouncer.settle(delay).await {
            Some(self.reset(Some(text), None).await)
        } else {
            None
        }
    }

    /// Resets right away, dropping any debounced search still waiting.
    pub async fn search_now(&self, text: String) -> LoadOutcome {
        self.debouncer.cancel();
        self.reset(Some(text), None).await
    }

    /// Feeds the visibility of the end-of-list sentinel. Only a crossing
    /// into view asks for the next page.
    pub async fn sentinel_changed(&self, visible: bool) -> LoadOutcome {
        let was_visible = self.sentinel_visible.replace(visible);
        if visible && !was_visible {
            self.load_next().await
        } else {
            LoadOutcome::Skipped
        }
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, collections::VecDeque};

    use futures::channel::oneshot;

    use super::*;

    type Reply = Result<BookPage>;

    #[derive(Default)]
    struct ScriptedSource {
        replies: RefCell<VecDeque<oneshot::Receiver<Reply>>>,
        calls: RefCell<Vec<BookQuery>>,
    }

    impl ScriptedSource {
        fn ready(&self, reply: Reply) {
            let (tx, rx) = oneshot::channel();
            tx.send(reply).unwrap();
            self.replies.borrow_mut().push_back(rx);
        }

        fn pending(&self) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.replies.borrow_mut().push_back(rx);
            tx
        }

        fn calls(&self) -> Vec<BookQuery> {
            self.calls.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl BookSource for ScriptedSource {
        async fn fetch_page(&self, query: &BookQuery) -> Result<BookPage> {
            self.calls.borrow_mut().push(query.clone());
            let reply = self
                .replies
                .borrow_mut()
                .pop_front()
                .expect("unexpected page request");
            reply
                .await
                .unwrap_or_else(|_| Err(Error::Network("reply dropped".to_string())))
        }
    }

    fn books(start: i64, count: usize) -> Vec<Book> {
        (0..count as i64)
            .map(|i| Book {
                id: start + i,
                title: Some(format!("Book {}", start + i)),
                ..Default::default()
            })
            .collect()
    }

    fn page(start: i64, count: usize) -> Reply {
        Ok(BookPage {
            books: books(start, count),
            total: Some(17),
        })
    }

    fn ids(controller: &CatalogController<Rc<ScriptedSource>>) -> Vec<i64> {
        controller.books().lock_ref().iter().map(|b| b.id).collect()
    }

    fn controller(source: &Rc<ScriptedSource>) -> CatalogController<Rc<ScriptedSource>> {
        CatalogController::new(source.clone(), 12)
    }

    #[tokio::test]
    async fn test_full_page_then_partial_page() {
        let source = Rc::new(ScriptedSource::default());
        let catalog = controller(&source);

        source.ready(page(1, 12));
        assert_eq!(catalog.load_next().await, LoadOutcome::Loaded(12));
        assert!(catalog.has_more());
        assert_eq!(catalog.page(), 2);
        assert_eq!(catalog.total(), Some(17));

        source.ready(page(13, 5));
        assert_eq!(catalog.load_next().await, LoadOutcome::Loaded(5));
        assert!(!catalog.has_more());
        assert_eq!(catalog.phase(), Phase::Exhausted);
        assert_eq!(ids(&catalog), (1..=17).collect::<Vec<_>>());

        let calls = source.calls();
        assert_eq!(calls[0].page, 1);
        assert_eq!(calls[1].page, 2);
        assert_eq!(calls[1].limit, 12);
    }

    #[tokio::test]
    async fn test_exhausted_list_makes_no_request() {
        let source = Rc::new(ScriptedSource::default());
        let catalog = controller(&source);

        source.ready(page(1, 3));
        catalog.load_next().await;
        assert!(!catalog.has_more());

        assert_eq!(catalog.load_next().await, LoadOutcome::Skipped);
        assert_eq!(catalog.load_next().await, LoadOutcome::Skipped);
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_reentrant_calls_are_dropped() {
        let source = Rc::new(ScriptedSource::default());
        let catalog = controller(&source);
        let tx = source.pending();

        let (first, second, third, _) = futures::join!(
            catalog.load_next(),
            catalog.load_next(),
            catalog.sentinel_changed(true),
            async move {
                tx.send(page(1, 12)).unwrap();
            }
        );

        assert_eq!(first, LoadOutcome::Loaded(12));
        assert_eq!(second, LoadOutcome::Skipped);
        assert_eq!(third, LoadOutcome::Skipped);
        assert_eq!(source.calls().len(), 1);
        assert_eq!(catalog.book_count(), 12);
        assert!(!catalog.is_loading());
    }

    #[tokio::test]
    async fn test_reset_applies_filters_and_starts_over() {
        let source = Rc::new(ScriptedSource::default());
        let catalog = controller(&source);

        source.ready(page(1, 12));
        source.ready(page(13, 12));
        catalog.load_next().await;
        catalog.load_next().await;
        assert_eq!(catalog.page(), 3);

        source.ready(page(100, 12));
        let outcome = catalog.reset(Some("  physics ".to_string()), Some(Some(4))).await;

        assert_eq!(outcome, LoadOutcome::Loaded(12));
        assert_eq!(ids(&catalog), (100..112).collect::<Vec<_>>());
        assert_eq!(catalog.page(), 2);
        assert_eq!(catalog.search(), "physics");
        assert_eq!(catalog.category(), Some(4));

        let last = source.calls().pop().unwrap();
        assert_eq!(last.page, 1);
        assert_eq!(last.search.as_deref(), Some("physics"));
        assert_eq!(last.category_id, Some(4));

        source.ready(page(200, 1));
        catalog.set_category(None).await;
        let last = source.calls().pop().unwrap();
        assert_eq!(last.category_id, None);
        assert_eq!(last.search.as_deref(), Some("physics"));
    }

    #[tokio::test]
    async fn test_empty_result_on_reset() {
        let source = Rc::new(ScriptedSource::default());
        let catalog = controller(&source);

        source.ready(Ok(BookPage {
            books: vec![],
            total: None,
        }));
        catalog.reset(Some("zzz".to_string()), None).await;

        assert!(catalog.is_empty());
        assert!(!catalog.has_more());
        assert_eq!(catalog.total(), Some(0));
        assert_eq!(catalog.load_next().await, LoadOutcome::Skipped);

        source.ready(page(1, 2));
        catalog.reset(Some("".to_string()), None).await;
        assert!(!catalog.is_empty());
        assert_eq!(catalog.book_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_retry_possible() {
        let source = Rc::new(ScriptedSource::default());
        let catalog = controller(&source);

        source.ready(Err(Error::Network("offline".to_string())));
        assert_eq!(catalog.load_next().await, LoadOutcome::Failed);
        assert!(catalog.has_more());
        assert!(!catalog.is_loading());
        assert_eq!(catalog.page(), 1);
        assert!(matches!(catalog.error(), Some(Error::Network(_))));

        source.ready(page(1, 12));
        assert_eq!(catalog.load_next().await, LoadOutcome::Loaded(12));
        assert_eq!(catalog.error(), None);
        assert_eq!(source.calls()[1].page, 1);
    }

    #[tokio::test]
    async fn test_stale_response_after_newer_reset_is_discarded() {
        let source = Rc::new(ScriptedSource::default());
        let catalog = controller(&source);
        let alpha = source.pending();
        let beta = source.pending();

        let (first, _, _) = futures::join!(
            catalog.reset(Some("alpha".to_string()), None),
            async {
                let outcome = catalog.reset(Some("beta".to_string()), None).await;
                assert_eq!(outcome, LoadOutcome::Loaded(2));
                alpha.send(page(500, 12)).unwrap();
            },
            async move {
                beta.send(page(1, 2)).unwrap();
            }
        );

        assert_eq!(first, LoadOutcome::Stale);
        assert_eq!(ids(&catalog), vec![1, 2]);
        assert_eq!(catalog.search(), "beta");
        assert_eq!(catalog.page(), 2);
        assert!(!catalog.has_more());
        assert!(!catalog.is_loading());
    }

    #[tokio::test]
    async fn test_sentinel_loads_once_per_crossing() {
        let source = Rc::new(ScriptedSource::default());
        let catalog = controller(&source);

        source.ready(page(1, 12));
        assert_eq!(catalog.sentinel_changed(true).await, LoadOutcome::Loaded(12));
        assert_eq!(catalog.sentinel_changed(true).await, LoadOutcome::Skipped);
        assert_eq!(catalog.sentinel_changed(false).await, LoadOutcome::Skipped);

        source.ready(page(13, 12));
        assert_eq!(catalog.sentinel_changed(true).await, LoadOutcome::Loaded(12));
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_debounced_search_only_last_input_resets() {
        let source = Rc::new(ScriptedSource::default());
        let catalog = controller(&source);
        let (tx1, rx1) = oneshot::channel::<()>();
        let (tx2, rx2) = oneshot::channel::<()>();
        source.ready(page(1, 4));

        let (first, second, _) = futures::join!(
            catalog.search_debounced("ru".to_string(), async move {
                let _ = rx1.await;
            }),
            catalog.search_debounced("rust".to_string(), async move {
                let _ = rx2.await;
            }),
            async move {
                tx1.send(()).unwrap();
                tx2.send(()).unwrap();
            }
        );

        assert_eq!(first, None);
        assert_eq!(second, Some(LoadOutcome::Loaded(4)));
        let calls = source.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].search.as_deref(), Some("rust"));
    }

    #[tokio::test]
    async fn test_search_now_cancels_pending_debounce() {
        let source = Rc::new(ScriptedSource::default());
        let catalog = controller(&source);
        let (tx, rx) = oneshot::channel::<()>();
        source.ready(page(1, 2));

        let (debounced, immediate) = futures::join!(
            catalog.search_debounced("che".to_string(), async move {
                let _ = rx.await;
            }),
            async {
                let outcome = catalog.search_now("chemistry".to_string()).await;
                tx.send(()).unwrap();
                outcome
            }
        );

        assert_eq!(debounced, None);
        assert_eq!(immediate, LoadOutcome::Loaded(2));
        assert_eq!(source.calls().len(), 1);
        assert_eq!(catalog.search(), "chemistry");
    }
}
