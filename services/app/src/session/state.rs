//! services/app/src/session/state.rs
//!
//! Defines the application's shared and session-specific states, and the
//! session coordinator that drives the creation flow end to end.

use std::sync::Arc;

use storybook_core::domain::{
    FormState, GenerationOutcome, Notification, Story, ValidationError,
};
use storybook_core::ports::{Clock, IdProvider, KeyValueStore, StoryGenerationService};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapters::mock::MockStoryAdapter;
use crate::config::Config;
use crate::session::events::{FormEdit, SessionEvent};
use crate::session::form::{FormController, FormPersistence};
use crate::session::gallery::GalleryStore;
use crate::session::generation::GenerationClient;
use crate::session::notifications::NotificationQueue;
use crate::session::reader::{ReaderError, ReaderState};
use crate::session::reader_task::{auto_advance_process, end_actions_dwell};

//=========================================================================================
// AppState (Shared Wiring)
//=========================================================================================

/// The shared application state, created once at startup: configuration plus
/// the port implementations everything else is built from.
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn StoryGenerationService>,
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdProvider>,
}

//=========================================================================================
// SessionState (Mutable Per-Session State)
//=========================================================================================

/// The mutable state for one creation session, shared between the
/// coordinator and its timer tasks.
pub struct SessionState {
    pub form: FormController,
    pub notifications: NotificationQueue,
    pub reader: Option<ReaderState>,
    pub current_story: Option<Story>,
    /// Token for the running auto-advance task, if any.
    pub auto_advance_token: Option<CancellationToken>,
    /// Token for the pending end-actions dwell timer, if any.
    pub dwell_token: Option<CancellationToken>,
    /// Whether a generation request is outstanding. At most one submission
    /// may be in flight; a concurrent attempt is rejected.
    pub in_flight: bool,
}

//=========================================================================================
// StorySession (The Coordinator)
//=========================================================================================

/// The result of asking the session to submit the form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Completed(GenerationOutcome),
    /// A generation request was already outstanding; nothing was started.
    Busy,
}

/// Drives one user's creation session: form edits, submission, reading, and
/// the gallery. Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct StorySession {
    app_state: Arc<AppState>,
    state: Arc<Mutex<SessionState>>,
    generation: Arc<GenerationClient>,
    persistence: Arc<FormPersistence>,
    gallery: GalleryStore,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl StorySession {
    /// Builds a session: restores any persisted form, loads the gallery, and
    /// wires the generation client with its local fallback.
    pub async fn start(
        app_state: Arc<AppState>,
    ) -> (StorySession, mpsc::UnboundedReceiver<SessionEvent>) {
        let persistence = Arc::new(FormPersistence::new(
            app_state.store.clone(),
            app_state.clock.clone(),
            app_state.config.form_retention,
        ));
        let form =
            FormController::restore(persistence.clone(), app_state.config.form_debounce).await;
        let gallery = GalleryStore::load(app_state.store.clone()).await;
        let generation = Arc::new(GenerationClient::new(
            app_state.backend.clone(),
            MockStoryAdapter::new(app_state.clock.clone(), app_state.ids.clone()),
        ));

        let state = Arc::new(Mutex::new(SessionState {
            form,
            notifications: NotificationQueue::new(),
            reader: None,
            current_story: None,
            auto_advance_token: None,
            dwell_token: None,
            in_flight: false,
        }));

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        (
            Self {
                app_state,
                state,
                generation,
                persistence,
                gallery,
                events: events_tx,
            },
            events_rx,
        )
    }

    //-------------------------------------------------------------------------------------
    // Form
    //-------------------------------------------------------------------------------------

    pub async fn form(&self) -> FormState {
        self.state.lock().await.form.form().clone()
    }

    pub async fn edit_form(&self, edit: FormEdit) {
        self.state.lock().await.form.apply(edit);
    }

    //-------------------------------------------------------------------------------------
    // Submission
    //-------------------------------------------------------------------------------------

    /// Submits the current form. The generation call runs without holding the
    /// session lock, so edits stay possible while it is outstanding; a second
    /// submission during that window is rejected as `Busy`.
    pub async fn submit(&self) -> Result<SubmitOutcome, ValidationError> {
        let form = {
            let mut session = self.state.lock().await;
            if session.in_flight {
                warn!("Ignoring submit while a generation request is outstanding.");
                return Ok(SubmitOutcome::Busy);
            }
            session.in_flight = true;
            session.form.form().clone()
        };

        let result = self.generation.generate(&form).await;

        let mut session = self.state.lock().await;
        session.in_flight = false;

        let outcome = result?;
        let story = outcome.story().clone();
        self.install_story(&mut session, story.clone());

        if let Err(e) = self.gallery.add(story.clone()).await {
            warn!("Failed to save the story to the gallery: {}", e);
        }

        if let Some(reason) = outcome.fallback_reason() {
            session
                .notifications
                .push(Notification::for_fallback(
                    reason,
                    self.app_state.config.notification_ttl,
                ))
                .await;
            let _ = self.events.send(SessionEvent::FallbackUsed { reason });
        }
        let _ = self.events.send(SessionEvent::StoryReady {
            story_id: story.id,
        });

        Ok(SubmitOutcome::Completed(outcome))
    }

    /// Makes a gallery story the current one. Returns false when the id is
    /// unknown.
    pub async fn select_story(&self, story_id: &str) -> bool {
        let Some(story) = self.gallery.get(story_id).await else {
            return false;
        };

        let mut session = self.state.lock().await;
        let id = story.id.clone();
        self.install_story(&mut session, story);
        let _ = self.events.send(SessionEvent::StoryReady { story_id: id });
        true
    }

    /// Replaces the current story wholesale: any timers driving the previous
    /// story are cancelled before the reader is rewound.
    fn install_story(&self, session: &mut SessionState, story: Story) {
        if let Some(token) = session.auto_advance_token.take() {
            token.cancel();
        }
        if let Some(token) = session.dwell_token.take() {
            token.cancel();
        }

        match session.reader.as_mut() {
            Some(reader) => reader.reset(&story),
            None => session.reader = Some(ReaderState::new(&story)),
        }
        info!("Now reading \"{}\".", story.title);
        session.current_story = Some(story);
    }

    //-------------------------------------------------------------------------------------
    // Reader
    //-------------------------------------------------------------------------------------

    pub async fn next_page(&self) {
        let mut session = self.state.lock().await;
        let Some(reader) = session.reader.as_mut() else {
            return;
        };
        if reader.next() {
            self.after_manual_navigation(&mut session);
        }
    }

    pub async fn prev_page(&self) {
        let mut session = self.state.lock().await;
        let Some(reader) = session.reader.as_mut() else {
            return;
        };
        if reader.prev() {
            self.after_manual_navigation(&mut session);
        }
    }

    pub async fn jump_to_page(&self, index: usize) -> Result<(), ReaderError> {
        let mut session = self.state.lock().await;
        let Some(reader) = session.reader.as_mut() else {
            return Ok(());
        };
        let before = reader.page_index();
        reader.jump_to(index)?;
        if reader.page_index() != before {
            self.after_manual_navigation(&mut session);
        }
        Ok(())
    }

    /// Cancels any pending dwell timer and, when the cursor just landed on
    /// the last page by hand, starts a fresh one.
    fn after_manual_navigation(&self, session: &mut SessionState) {
        if let Some(token) = session.dwell_token.take() {
            token.cancel();
        }

        let Some(reader) = session.reader.as_ref() else {
            return;
        };
        if reader.is_last_page() && !reader.auto_advancing() {
            let token = CancellationToken::new();
            session.dwell_token = Some(token.clone());
            tokio::spawn(end_actions_dwell(
                self.state.clone(),
                self.app_state.config.end_actions_dwell,
                token,
                self.events.clone(),
            ));
        }
    }

    /// Flips auto-advance and returns the new setting. Switching it on
    /// starts the advance timer; switching it off (or reaching the end of
    /// the story) cancels it.
    pub async fn toggle_auto_advance(&self) -> bool {
        let mut session = self.state.lock().await;
        let Some(reader) = session.reader.as_mut() else {
            return false;
        };

        if reader.auto_advancing() {
            reader.set_auto_advancing(false);
            if let Some(token) = session.auto_advance_token.take() {
                token.cancel();
            }
            false
        } else {
            reader.set_auto_advancing(true);
            // Auto-advance supersedes a pending manual dwell.
            if let Some(token) = session.dwell_token.take() {
                token.cancel();
            }
            if let Some(token) = session.auto_advance_token.take() {
                token.cancel();
            }
            let token = CancellationToken::new();
            session.auto_advance_token = Some(token.clone());
            tokio::spawn(auto_advance_process(
                self.state.clone(),
                self.app_state.config.auto_advance_period,
                token,
                self.events.clone(),
            ));
            true
        }
    }

    pub async fn current_story(&self) -> Option<Story> {
        self.state.lock().await.current_story.clone()
    }

    /// The reader's `(page_index, page_count)`, when a story is open.
    pub async fn reader_position(&self) -> Option<(usize, usize)> {
        self.state
            .lock()
            .await
            .reader
            .as_ref()
            .map(|reader| (reader.page_index(), reader.page_count()))
    }

    pub async fn auto_advancing(&self) -> bool {
        self.state
            .lock()
            .await
            .reader
            .as_ref()
            .map(|reader| reader.auto_advancing())
            .unwrap_or(false)
    }

    //-------------------------------------------------------------------------------------
    // Notifications & Gallery
    //-------------------------------------------------------------------------------------

    pub async fn current_notification(&self) -> Option<Notification> {
        self.state.lock().await.notifications.current().await
    }

    pub async fn dismiss_notification(&self) {
        self.state.lock().await.notifications.dismiss().await;
    }

    pub async fn saved_stories(&self) -> Vec<Story> {
        self.gallery.stories().await
    }

    pub async fn delete_story(&self, story_id: &str) -> bool {
        match self.gallery.remove(story_id).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Failed to delete story {}: {}", story_id, e);
                false
            }
        }
    }

    //-------------------------------------------------------------------------------------
    // Teardown
    //-------------------------------------------------------------------------------------

    /// Ends the session: cancels every pending timer and clears the
    /// persisted form so nothing survives the session boundary.
    pub async fn end_session(&self) {
        info!("Session ending; clearing transient state.");
        let mut session = self.state.lock().await;
        session.form.cancel_pending_save();
        if let Some(token) = session.auto_advance_token.take() {
            token.cancel();
        }
        if let Some(token) = session.dwell_token.take() {
            token.cancel();
        }
        session.notifications.dismiss().await;

        if let Err(e) = self.persistence.clear().await {
            warn!("Failed to clear the persisted form: {}", e);
        }
    }
}
