//! Feed paging, filter switching and optimistic likes.
//!
//! All state lives behind one mutex that is never held across an await, so
//! every transition the UI can observe happens synchronously. Each request
//! sequence (a reset plus the `load_more` calls that follow it) owns a
//! cancellation token and a generation number; pages that arrive for an older
//! generation are dropped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use uuid::Uuid;

use oneiro_types::api::{DEFAULT_PAGE_SIZE, FeedQuery};
use oneiro_types::models::{Dream, Language, SortMode};

use crate::backend::FeedBackend;
use crate::error::ClientError;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Idle,
    /// Loading a page after a reset or for `load_more`.
    Loading,
    /// Pull-to-refresh; existing items stay visible until page 0 arrives.
    Refreshing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub items: Vec<Dream>,
    /// Index of the last page appended to `items`, `None` until one arrives.
    pub page: Option<u32>,
    pub has_more: bool,
    pub sort: SortMode,
    pub language: Language,
    pub status: FeedStatus,
}

impl FeedState {
    fn new(sort: SortMode, language: Language) -> Self {
        Self {
            items: Vec::new(),
            page: None,
            has_more: true,
            sort,
            language,
            status: FeedStatus::Idle,
        }
    }
}

/// Out-of-band events a UI surfaces as toasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedNotice {
    LoadFailed { message: String },
    LikeFailed { dream_id: Uuid },
}

/// An optimistic like flip that can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeCommand {
    pub dream_id: Uuid,
    liked_before: bool,
}

impl LikeCommand {
    pub fn for_dream(dream: &Dream) -> Self {
        Self {
            dream_id: dream.id,
            liked_before: dream.has_liked,
        }
    }

    fn delta(&self) -> i64 {
        if self.liked_before { -1 } else { 1 }
    }

    pub fn apply(&self, dream: &mut Dream) {
        dream.has_liked = !self.liked_before;
        dream.likes += self.delta();
    }

    pub fn revert(&self, dream: &mut Dream) {
        dream.has_liked = self.liked_before;
        dream.likes -= self.delta();
    }
}

#[derive(Debug, Clone, Copy)]
enum Load {
    /// Start a new sequence at page 0.
    Reset(FeedStatus),
    /// Next page of the current sequence.
    More,
}

struct Inner {
    state: FeedState,
    generation: u64,
    cancel: CancellationToken,
    /// Dreams with a like request awaiting its reply.
    liking: HashSet<Uuid>,
}

impl Inner {
    /// Cancel the in-flight sequence and start a new one.
    fn restart(&mut self) -> (u64, CancellationToken) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.generation += 1;
        (self.generation, self.cancel.clone())
    }
}

pub struct FeedController {
    backend: Arc<dyn FeedBackend>,
    session: Session,
    page_size: u32,
    inner: Mutex<Inner>,
    notices: broadcast::Sender<FeedNotice>,
}

impl FeedController {
    pub fn new(backend: Arc<dyn FeedBackend>, session: Session, language: Language) -> Self {
        let (notices, _) = broadcast::channel(32);
        Self {
            backend,
            session,
            page_size: DEFAULT_PAGE_SIZE,
            inner: Mutex::new(Inner {
                state: FeedState::new(SortMode::default(), language),
                generation: 0,
                cancel: CancellationToken::new(),
                liking: HashSet::new(),
            }),
            notices,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> FeedState {
        self.lock().state.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedNotice> {
        self.notices.subscribe()
    }

    fn notify(&self, notice: FeedNotice) {
        // No subscribers is fine
        let _ = self.notices.send(notice);
    }

    /// Reload page 0 and replace the list once it arrives.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.load(Load::Reset(FeedStatus::Refreshing)).await
    }

    /// Append the next page. Does nothing when the feed is exhausted or a load
    /// is already running.
    pub async fn load_more(&self) -> Result<(), ClientError> {
        self.load(Load::More).await
    }

    /// Switch ordering: clear the list, cancel whatever is in flight and load
    /// page 0 under the new mode.
    pub async fn set_sort(&self, sort: SortMode) -> Result<(), ClientError> {
        {
            let mut inner = self.lock();
            if inner.state.sort == sort {
                return Ok(());
            }
            inner.state = FeedState::new(sort, inner.state.language);
        }
        self.load(Load::Reset(FeedStatus::Loading)).await
    }

    /// Same as `set_sort`, for the feed language.
    pub async fn set_language(&self, language: Language) -> Result<(), ClientError> {
        {
            let mut inner = self.lock();
            if inner.state.language == language {
                return Ok(());
            }
            inner.state = FeedState::new(inner.state.sort, language);
        }
        self.load(Load::Reset(FeedStatus::Loading)).await
    }

    async fn load(&self, kind: Load) -> Result<(), ClientError> {
        let (query, generation, cancel) = {
            let mut inner = self.lock();
            let (generation, cancel, page, status) = match kind {
                Load::Reset(status) => {
                    let (generation, cancel) = inner.restart();
                    (generation, cancel, 0, status)
                }
                Load::More => {
                    if !inner.state.has_more || inner.state.status != FeedStatus::Idle {
                        return Ok(());
                    }
                    (inner.generation, inner.cancel.clone(), next_page(inner.state.page), FeedStatus::Loading)
                }
            };
            inner.state.status = status;

            let query = FeedQuery {
                limit: self.page_size,
                offset: page * self.page_size,
                sort: inner.state.sort,
                lang: inner.state.language,
            };
            (query, generation, cancel)
        };

        let token = self.session.token();
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(generation, "Feed request superseded");
                return Ok(());
            }
            result = self.backend.fetch_feed(&query, token.as_deref()) => result,
        };

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(generation, current = inner.generation, "Dropping stale feed page");
            return Ok(());
        }
        inner.state.status = FeedStatus::Idle;

        match result {
            Ok(dreams) => {
                let page = query.offset / self.page_size;
                inner.state.has_more = dreams.len() >= self.page_size as usize;
                if page == 0 {
                    inner.state.items = dreams;
                } else {
                    inner.state.items.extend(dreams);
                }
                inner.state.page = Some(page);
                Ok(())
            }
            Err(e) => {
                drop(inner);
                error!(offset = query.offset, "Failed to load feed: {}", e);
                self.notify(FeedNotice::LoadFailed { message: e.to_string() });
                Err(e)
            }
        }
    }

    /// Like or unlike a dream in the list. The flip is visible immediately; a
    /// failed request undoes it and publishes `FeedNotice::LikeFailed`.
    ///
    /// Only one request per dream may be outstanding. A second tap before the
    /// first reply returns `ClientError::LikeInFlight` and changes nothing.
    pub async fn toggle_like(&self, dream_id: Uuid) -> Result<(), ClientError> {
        let token = self.session.token().ok_or(ClientError::NotSignedIn)?;

        let command = {
            let mut inner = self.lock();
            if inner.liking.contains(&dream_id) {
                debug!(%dream_id, "Like already in flight");
                return Err(ClientError::LikeInFlight(dream_id));
            }
            let dream = find(&mut inner.state.items, dream_id).ok_or(ClientError::NotInFeed(dream_id))?;
            let command = LikeCommand::for_dream(dream);
            command.apply(dream);
            inner.liking.insert(dream_id);
            command
        };

        let result = self.backend.toggle_like(dream_id, &token).await;

        let mut inner = self.lock();
        inner.liking.remove(&dream_id);
        match result {
            Ok(confirmed) => {
                if let Some(dream) = find(&mut inner.state.items, dream_id) {
                    dream.has_liked = confirmed.liked;
                    dream.likes = confirmed.likes;
                }
                Ok(())
            }
            Err(e) => {
                if let Some(dream) = find(&mut inner.state.items, dream_id) {
                    command.revert(dream);
                }
                drop(inner);
                warn!(%dream_id, "Like failed, reverting: {}", e);
                self.notify(FeedNotice::LikeFailed { dream_id });
                Err(e)
            }
        }
    }
}

fn next_page(last: Option<u32>) -> u32 {
    last.map_or(0, |page| page + 1)
}

fn find(items: &mut [Dream], id: Uuid) -> Option<&mut Dream> {
    items.iter_mut().find(|d| d.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use oneiro_types::api::ToggleLikeResponse;
    use oneiro_types::models::Visibility;

    use super::*;
    use crate::session::SessionUser;

    type Page = (Duration, Result<Vec<Dream>, ClientError>);

    #[derive(Default)]
    struct MockBackend {
        pages: Mutex<VecDeque<Page>>,
        likes: Mutex<VecDeque<(Duration, Result<ToggleLikeResponse, ClientError>)>>,
        queries: Mutex<Vec<(FeedQuery, Option<String>)>>,
        like_calls: Mutex<usize>,
    }

    impl MockBackend {
        fn page(self, items: Vec<Dream>) -> Self {
            self.delayed_page(Duration::ZERO, Ok(items))
        }

        fn delayed_page(self, delay: Duration, page: Result<Vec<Dream>, ClientError>) -> Self {
            self.pages.lock().unwrap().push_back((delay, page));
            self
        }

        fn like(self, delay: Duration, result: Result<ToggleLikeResponse, ClientError>) -> Self {
            self.likes.lock().unwrap().push_back((delay, result));
            self
        }

        fn queries(&self) -> Vec<(FeedQuery, Option<String>)> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FeedBackend for MockBackend {
        async fn fetch_feed(&self, query: &FeedQuery, token: Option<&str>) -> Result<Vec<Dream>, ClientError> {
            self.queries
                .lock()
                .unwrap()
                .push((query.clone(), token.map(str::to_string)));
            let (delay, page) = self.pages.lock().unwrap().pop_front().expect("unexpected feed request");
            tokio::time::sleep(delay).await;
            page
        }

        async fn toggle_like(&self, _dream_id: Uuid, _token: &str) -> Result<ToggleLikeResponse, ClientError> {
            *self.like_calls.lock().unwrap() += 1;
            let (delay, result) = self.likes.lock().unwrap().pop_front().expect("unexpected like request");
            tokio::time::sleep(delay).await;
            result
        }

        async fn search(&self, _query: &str, _token: Option<&str>) -> Result<Vec<Dream>, ClientError> {
            Ok(Vec::new())
        }
    }

    fn dream(title: &str, likes: i64, has_liked: bool) -> Dream {
        Dream {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            author_name: "Luz".into(),
            author_avatar: None,
            title: title.into(),
            description: "...".into(),
            created_at: Utc::now(),
            dreamt_at: Utc::now(),
            visibility: Visibility::Public,
            tags: Vec::new(),
            image_url: None,
            mood: None,
            is_lucid: false,
            language: Language::En,
            likes,
            has_liked,
            comment_count: 0,
            analysis: None,
        }
    }

    fn dreams(n: usize) -> Vec<Dream> {
        (0..n).map(|i| dream(&format!("Dream {i}"), 0, false)).collect()
    }

    fn server_error() -> ClientError {
        ClientError::Server {
            status: 500,
            message: "boom".into(),
        }
    }

    fn signed_in() -> Session {
        let session = Session::new();
        session.sign_in(SessionUser {
            id: Uuid::new_v4(),
            username: "luz".into(),
            token: "jwt".into(),
        });
        session
    }

    fn controller(backend: &Arc<MockBackend>, session: Session) -> Arc<FeedController> {
        let backend: Arc<dyn FeedBackend> = backend.clone();
        Arc::new(FeedController::new(backend, session, Language::Pt))
    }

    #[tokio::test]
    async fn pages_accumulate_until_a_short_page() {
        let backend = Arc::new(MockBackend::default().page(dreams(10)).page(dreams(4)));
        let feed = controller(&backend, Session::new());

        feed.refresh().await.unwrap();
        let state = feed.state();
        assert_eq!(state.items.len(), 10);
        assert!(state.has_more);

        feed.load_more().await.unwrap();
        let state = feed.state();
        assert_eq!(state.items.len(), 14);
        assert!(!state.has_more);
        assert_eq!(state.page, Some(1));
        assert_eq!(state.status, FeedStatus::Idle);

        // Exhausted: no request issued
        feed.load_more().await.unwrap();
        assert_eq!(backend.queries().len(), 2);
    }

    #[tokio::test]
    async fn queries_carry_locale_offset_and_token() {
        let backend = Arc::new(MockBackend::default().page(dreams(10)).page(dreams(1)));
        let feed = controller(&backend, signed_in());

        feed.refresh().await.unwrap();
        feed.load_more().await.unwrap();

        let queries = backend.queries();
        assert_eq!(queries[0].0.offset, 0);
        assert_eq!(queries[1].0.offset, 10);
        assert_eq!(queries[1].0.limit, 10);
        assert_eq!(queries[1].0.lang, Language::Pt);
        assert_eq!(queries[1].0.sort, SortMode::Recent);
        assert_eq!(queries[1].1.as_deref(), Some("jwt"));
    }

    #[tokio::test]
    async fn failed_load_keeps_state_and_notifies() {
        let backend = Arc::new(
            MockBackend::default()
                .page(dreams(10))
                .delayed_page(Duration::ZERO, Err(server_error())),
        );
        let feed = controller(&backend, Session::new());
        let mut notices = feed.subscribe();

        feed.refresh().await.unwrap();
        let before = feed.state();

        assert!(feed.load_more().await.is_err());
        assert_eq!(feed.state(), before);
        assert!(matches!(notices.recv().await.unwrap(), FeedNotice::LoadFailed { .. }));
    }

    #[tokio::test]
    async fn load_more_after_failed_refresh_starts_at_page_zero() {
        let first = dreams(10);
        let backend = Arc::new(
            MockBackend::default()
                .delayed_page(Duration::ZERO, Err(server_error()))
                .page(first.clone()),
        );
        let feed = controller(&backend, Session::new());

        assert!(feed.refresh().await.is_err());
        assert_eq!(feed.state().page, None);

        feed.load_more().await.unwrap();
        let offsets: Vec<_> = backend.queries().iter().map(|(q, _)| q.offset).collect();
        assert_eq!(offsets, vec![0, 0]);
        let state = feed.state();
        assert_eq!(state.page, Some(0));
        assert_eq!(state.items, first);
    }

    #[tokio::test(start_paused = true)]
    async fn load_more_is_ignored_while_loading() {
        let backend = Arc::new(
            MockBackend::default()
                .page(dreams(10))
                .delayed_page(Duration::from_secs(1), Ok(dreams(10))),
        );
        let feed = controller(&backend, Session::new());
        feed.refresh().await.unwrap();

        let running = tokio::spawn({
            let feed = feed.clone();
            async move { feed.load_more().await }
        });
        tokio::task::yield_now().await;
        assert_eq!(feed.state().status, FeedStatus::Loading);

        feed.load_more().await.unwrap();
        running.await.unwrap().unwrap();

        assert_eq!(backend.queries().len(), 2);
        assert_eq!(feed.state().items.len(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn like_is_optimistic_then_authoritative() {
        let target = dream("Sea", 5, false);
        let id = target.id;
        let backend = Arc::new(
            MockBackend::default()
                .page(vec![target])
                .like(Duration::from_secs(1), Ok(ToggleLikeResponse { liked: true, likes: 9 })),
        );
        let feed = controller(&backend, signed_in());
        feed.refresh().await.unwrap();

        let toggling = tokio::spawn({
            let feed = feed.clone();
            async move { feed.toggle_like(id).await }
        });
        tokio::task::yield_now().await;
        let state = feed.state();
        let item = &state.items[0];
        assert_eq!((item.likes, item.has_liked), (6, true));

        toggling.await.unwrap().unwrap();
        let state = feed.state();
        let item = &state.items[0];
        assert_eq!((item.likes, item.has_liked), (9, true));
    }

    #[tokio::test]
    async fn failed_like_reverts_and_notifies() {
        let target = dream("Sea", 5, false);
        let id = target.id;
        let backend = Arc::new(
            MockBackend::default()
                .page(vec![target])
                .like(Duration::ZERO, Err(server_error())),
        );
        let feed = controller(&backend, signed_in());
        let mut notices = feed.subscribe();
        feed.refresh().await.unwrap();

        assert!(feed.toggle_like(id).await.is_err());

        let state = feed.state();
        let item = &state.items[0];
        assert_eq!((item.likes, item.has_liked), (5, false));
        assert_eq!(notices.recv().await.unwrap(), FeedNotice::LikeFailed { dream_id: id });
    }

    #[tokio::test(start_paused = true)]
    async fn second_tap_while_in_flight_is_rejected() {
        let target = dream("Sea", 5, false);
        let id = target.id;
        let backend = Arc::new(
            MockBackend::default()
                .page(vec![target])
                .like(Duration::from_secs(1), Err(server_error())),
        );
        let feed = controller(&backend, signed_in());
        feed.refresh().await.unwrap();

        let first = tokio::spawn({
            let feed = feed.clone();
            async move { feed.toggle_like(id).await }
        });
        tokio::task::yield_now().await;

        assert!(matches!(feed.toggle_like(id).await, Err(ClientError::LikeInFlight(d)) if d == id));
        let state = feed.state();
        let item = &state.items[0];
        assert_eq!((item.likes, item.has_liked), (6, true));

        assert!(first.await.unwrap().is_err());
        let state = feed.state();
        let item = &state.items[0];
        assert_eq!((item.likes, item.has_liked), (5, false));
        assert_eq!(*backend.like_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn like_is_accepted_again_after_reply() {
        let target = dream("Sea", 5, false);
        let id = target.id;
        let backend = Arc::new(
            MockBackend::default()
                .page(vec![target])
                .like(Duration::ZERO, Ok(ToggleLikeResponse { liked: true, likes: 6 }))
                .like(Duration::ZERO, Ok(ToggleLikeResponse { liked: false, likes: 5 })),
        );
        let feed = controller(&backend, signed_in());
        feed.refresh().await.unwrap();

        feed.toggle_like(id).await.unwrap();
        feed.toggle_like(id).await.unwrap();

        let state = feed.state();
        let item = &state.items[0];
        assert_eq!((item.likes, item.has_liked), (5, false));
        assert_eq!(*backend.like_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn like_requires_a_session() {
        let target = dream("Sea", 5, false);
        let id = target.id;
        let backend = Arc::new(MockBackend::default().page(vec![target]));
        let feed = controller(&backend, Session::new());
        feed.refresh().await.unwrap();

        assert!(matches!(feed.toggle_like(id).await, Err(ClientError::NotSignedIn)));
        assert_eq!(*backend.like_calls.lock().unwrap(), 0);
        assert_eq!(feed.state().items[0].likes, 5);
    }

    #[test]
    fn like_command_round_trips() {
        let mut liked = dream("Sea", 3, true);
        let command = LikeCommand::for_dream(&liked);
        command.apply(&mut liked);
        assert_eq!((liked.likes, liked.has_liked), (2, false));
        command.revert(&mut liked);
        assert_eq!((liked.likes, liked.has_liked), (3, true));
    }

    #[tokio::test]
    async fn selecting_the_current_sort_does_nothing() {
        let backend = Arc::new(MockBackend::default().page(dreams(3)));
        let feed = controller(&backend, Session::new());
        feed.refresh().await.unwrap();

        feed.set_sort(SortMode::Recent).await.unwrap();
        assert_eq!(backend.queries().len(), 1);
        assert_eq!(feed.state().items.len(), 3);
    }

    #[tokio::test]
    async fn language_switch_reloads_page_zero() {
        let spanish = dreams(3);
        let backend = Arc::new(MockBackend::default().page(dreams(10)).page(spanish.clone()));
        let feed = controller(&backend, Session::new());
        feed.refresh().await.unwrap();

        feed.set_language(Language::Es).await.unwrap();
        let state = feed.state();
        assert_eq!(state.language, Language::Es);
        assert_eq!(state.items, spanish);
        assert_eq!(state.page, Some(0));
        let queries = backend.queries();
        assert_eq!(queries[1].0.lang, Language::Es);
        assert_eq!(queries[1].0.offset, 0);

        // Same language again: no request
        feed.set_language(Language::Es).await.unwrap();
        assert_eq!(backend.queries().len(), 2);
        assert_eq!(feed.state().items, spanish);
    }

    #[tokio::test(start_paused = true)]
    async fn sort_switch_clears_and_drops_stale_page() {
        let popular = dreams(2);
        let backend = Arc::new(
            MockBackend::default()
                .page(dreams(10))
                .delayed_page(Duration::from_secs(1), Ok(dreams(10)))
                .delayed_page(Duration::from_millis(500), Ok(popular.clone())),
        );
        let feed = controller(&backend, Session::new());
        feed.refresh().await.unwrap();

        // A page of the old sequence is still in flight
        let stale = tokio::spawn({
            let feed = feed.clone();
            async move { feed.load_more().await }
        });
        tokio::task::yield_now().await;

        let switching = tokio::spawn({
            let feed = feed.clone();
            async move { feed.set_sort(SortMode::Popular).await }
        });
        tokio::task::yield_now().await;

        // Cleared while the new page is on its way
        let state = feed.state();
        assert!(state.items.is_empty());
        assert_eq!(state.status, FeedStatus::Loading);
        assert_eq!(state.page, None);

        switching.await.unwrap().unwrap();
        stale.await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let state = feed.state();
        assert_eq!(state.sort, SortMode::Popular);
        assert_eq!(state.items, popular);
        assert!(!state.has_more);
        assert_eq!(backend.queries()[2].0.sort, SortMode::Popular);
        assert_eq!(backend.queries()[2].0.offset, 0);
    }
}
