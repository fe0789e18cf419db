//! Conversation store: transcript, pending flag, and the send state machine.
//!
//! DESIGN
//! ======
//! The transcript is append-only and never empty. A send moves the store
//! `Idle -> Pending -> {Fulfilled, Failed} -> Idle`. The pending check, the
//! user-message append, and the flag flip happen under one lock acquisition
//! in `try_begin`, before any suspending call, so two sends can never
//! interleave their appends. Sends made while pending are dropped, not
//! queued.
//!
//! The pending flag is owned by a `PendingSend` ticket whose `Drop` clears
//! it. Every exit path (answer, error, or the future being dropped mid-flight)
//! releases the flag. Flag changes are mirrored into a `watch` channel so
//! callers can await idleness instead of polling.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::net::api::AnswerService;
use crate::net::types::{Citation, QueryClassification, QueryResponse};

pub const GREETING: &str = "Welcome to Project Samarth! I can help you analyze India's agricultural economy and \
                            climate data from data.gov.in. Ask me anything about crop production, rainfall patterns, \
                            or their correlations!";
pub const CLEARED: &str = "Chat cleared. How can I help you with agricultural data today?";
pub const SERVER_HINT: &str = "Please check if the backend server is running.";

/// Invoked once after every answered send so statistics can be reloaded.
pub type StatsRefreshHook = Arc<dyn Fn() + Send + Sync>;

// =============================================================================
// MESSAGE
// =============================================================================

/// Closed set of transcript entry kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    System,
    User,
    Bot,
    Error,
}

/// A single transcript entry. Never mutated after it is appended.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: u64,
    pub kind: MessageKind,
    /// Plain text, except for `Bot` where it is markdown.
    pub content: String,
    pub sources: Option<Vec<Citation>>,
    pub query_info: Option<QueryClassification>,
    pub timestamp: OffsetDateTime,
}

impl Message {
    fn plain(id: u64, kind: MessageKind, content: impl Into<String>) -> Self {
        Self { id, kind, content: content.into(), sources: None, query_info: None, timestamp: OffsetDateTime::now_utc() }
    }

    fn bot(id: u64, response: QueryResponse) -> Self {
        Self {
            id,
            kind: MessageKind::Bot,
            content: response.answer,
            sources: Some(response.sources),
            query_info: response.query_info,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Content of the transcript entry appended for a failed send.
#[must_use]
pub fn error_content(message: &str) -> String {
    format!("Error: {message}. {SERVER_HINT}")
}

// =============================================================================
// CONVERSATION STATE
// =============================================================================

/// Lock-protected state behind a `ConversationStore`.
#[derive(Debug)]
struct ConversationState {
    transcript: Vec<Message>,
    is_pending: bool,
    last_id: u64,
}

impl ConversationState {
    fn seeded() -> Self {
        let mut state = Self { transcript: Vec::new(), is_pending: false, last_id: 0 };
        let id = state.next_id();
        state.transcript.push(Message::plain(id, MessageKind::System, GREETING));
        state
    }

    /// Time-based id that never repeats within a session, even when two
    /// messages land in the same millisecond or the wall clock steps back.
    fn next_id(&mut self) -> u64 {
        let now_ms = u64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
        self.last_id = now_ms.max(self.last_id + 1);
        self.last_id
    }

    fn append(&mut self, build: impl FnOnce(u64) -> Message) {
        let id = self.next_id();
        self.transcript.push(build(id));
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Result of a `send` call, for callers that want to react to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, or another send was already pending.
    Ignored,
    /// A bot message was appended.
    Answered,
    /// An error message was appended.
    Failed,
}

struct StoreInner {
    session_id: Uuid,
    state: Mutex<ConversationState>,
    pending: watch::Sender<bool>,
    service: Arc<dyn AnswerService>,
    on_answered: Option<StatsRefreshHook>,
}

impl StoreInner {
    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Caller holds the state lock so the flag and the channel never disagree.
    fn set_pending(&self, state: &mut ConversationState, pending: bool) {
        state.is_pending = pending;
        self.pending.send_replace(pending);
    }
}

/// Owns the transcript for one chat session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<StoreInner>,
}

impl ConversationStore {
    /// Fresh store seeded with the greeting and no stats-refresh hook.
    #[must_use]
    pub fn new(service: Arc<dyn AnswerService>) -> Self {
        Self::build(service, None)
    }

    /// Fresh store that calls `hook` once after every answered send.
    #[must_use]
    pub fn with_stats_refresh(service: Arc<dyn AnswerService>, hook: StatsRefreshHook) -> Self {
        Self::build(service, Some(hook))
    }

    fn build(service: Arc<dyn AnswerService>, on_answered: Option<StatsRefreshHook>) -> Self {
        let inner = StoreInner {
            session_id: Uuid::new_v4(),
            state: Mutex::new(ConversationState::seeded()),
            pending: watch::channel(false).0,
            service,
            on_answered,
        };
        Self { inner: Arc::new(inner) }
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    /// Snapshot of the transcript in display order.
    #[must_use]
    pub fn transcript(&self) -> Vec<Message> {
        self.inner.lock().transcript.clone()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.lock().is_pending
    }

    /// Change feed for the pending flag.
    #[must_use]
    pub fn subscribe_pending(&self) -> watch::Receiver<bool> {
        self.inner.pending.subscribe()
    }

    /// Resolves once no send is pending. Returns immediately when idle.
    pub async fn wait_until_idle(&self) {
        let mut rx = self.inner.pending.subscribe();
        if rx.wait_for(|pending| !*pending).await.is_err() {
            debug!(session_id = %self.inner.session_id, "pending feed closed");
        }
    }

    /// Number of transcript entries. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().transcript.len()
    }

    /// Always `false`; the transcript keeps at least one system message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().transcript.is_empty()
    }

    #[must_use]
    pub fn last_message(&self) -> Option<Message> {
        self.inner.lock().transcript.last().cloned()
    }

    /// Submit `text` and merge the answer (or failure) into the transcript.
    ///
    /// Blank input and calls made while another send is pending are ignored.
    pub async fn send(&self, text: &str) -> SendOutcome {
        match self.try_begin(text) {
            Some(pending) => pending.resolve().await,
            None => SendOutcome::Ignored,
        }
    }

    /// Synchronous half of `send`: validate, append the user message, and
    /// take the pending flag. Returns `None` when the send must be ignored.
    #[must_use]
    pub fn try_begin(&self, text: &str) -> Option<PendingSend> {
        if text.trim().is_empty() {
            debug!(session_id = %self.inner.session_id, "blank send ignored");
            return None;
        }
        let mut state = self.inner.lock();
        if state.is_pending {
            debug!(session_id = %self.inner.session_id, "send ignored while pending");
            return None;
        }
        state.append(|id| Message::plain(id, MessageKind::User, text));
        self.inner.set_pending(&mut state, true);
        drop(state);

        Some(PendingSend { inner: Arc::clone(&self.inner), text: text.to_owned() })
    }

    /// Replace the transcript with a single "chat cleared" system message.
    /// Leaves the pending flag alone.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        let id = state.next_id();
        state.transcript = vec![Message::plain(id, MessageKind::System, CLEARED)];
        debug!(session_id = %self.inner.session_id, "transcript cleared");
    }
}

// =============================================================================
// PENDING SEND
// =============================================================================

/// An in-flight send. Holds the pending flag until dropped.
pub struct PendingSend {
    inner: Arc<StoreInner>,
    text: String,
}

impl PendingSend {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Await the answering service and append the resulting message.
    pub async fn resolve(self) -> SendOutcome {
        let session_id = self.inner.session_id;
        match self.inner.service.submit_query(&self.text).await {
            Ok(response) => {
                info!(%session_id, sources = response.sources.len(), "query answered");
                self.inner.lock().append(|id| Message::bot(id, response));
                if let Some(hook) = &self.inner.on_answered {
                    hook();
                }
                SendOutcome::Answered
            }
            Err(e) => {
                warn!(%session_id, error = %e, "query failed");
                self.inner.lock().append(|id| Message::plain(id, MessageKind::Error, error_content(e.message())));
                SendOutcome::Failed
            }
        }
    }
}

impl Drop for PendingSend {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        self.inner.set_pending(&mut state, false);
    }
}
