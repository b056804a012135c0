//! services/app/src/bin/app.rs

use app_lib::{
    adapters::{FileStore, HttpGenerationAdapter, SystemClock, UuidIdProvider},
    config::Config,
    error::AppError,
    session::{AppState, FormEdit, SessionEvent, StorySession, SubmitOutcome},
};
use std::sync::Arc;
use storybook_core::domain::StoryTheme;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting the storybook engine...");

    // --- 2. Initialize Storage & Service Adapters ---
    let store = Arc::new(FileStore::create(config.storage_dir.clone()).await?);
    let clock = Arc::new(SystemClock);
    let ids = Arc::new(UuidIdProvider);

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let backend = Arc::new(HttpGenerationAdapter::new(
        http,
        config.backend_base_url.clone(),
        clock.clone(),
        ids.clone(),
    ));

    // --- 3. Build the Shared AppState & Start a Session ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        backend,
        store,
        clock,
        ids,
    });
    let (session, mut events) = StorySession::start(app_state).await;

    // --- 4. Fill In the Creation Form ---
    // A restored form (from an earlier run within the retention window) is
    // the starting point; the demo edits below layer on top of it.
    let character = std::env::var("STORY_CHARACTER")
        .unwrap_or_else(|_| "a curious girl named Mira".to_string());
    session
        .edit_form(FormEdit::SetCharacterDescription { text: character })
        .await;

    if let Ok(theme_id) = std::env::var("STORY_THEME") {
        match StoryTheme::from_id(&theme_id) {
            Some(theme) => session.edit_form(FormEdit::SetTheme { theme }).await,
            None => warn!("Unknown story theme '{}'; keeping the default.", theme_id),
        }
    }
    if let Ok(lesson) = std::env::var("STORY_LESSON") {
        session
            .edit_form(FormEdit::SetMoralLesson { text: lesson })
            .await;
    }
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        session.edit_form(FormEdit::SetApiKey { key }).await;
    }

    // --- 5. Submit and Report the Outcome ---
    match session.submit().await? {
        SubmitOutcome::Busy => {
            warn!("A generation request was already outstanding.");
        }
        SubmitOutcome::Completed(outcome) => {
            let story = outcome.story();
            info!(
                "\"{}\" is ready with {} pages.",
                story.title,
                story.pages.len()
            );
            if let Some(toast) = session.current_notification().await {
                info!("Status: {}", toast.message);
            }
            for page in &story.pages {
                info!("Page {}: {}", page.index + 1, page.text);
            }
        }
    }

    // --- 6. Replay the Story with Auto-Advance ---
    session.toggle_auto_advance().await;
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::StoryReady { story_id } => {
                info!("Story {} became current.", story_id);
            }
            SessionEvent::FallbackUsed { reason } => {
                info!("Generation fell back locally ({:?}).", reason);
            }
            SessionEvent::EndActionsRevealed { .. } => {}
            SessionEvent::EndOfStory { .. } => {
                info!("End of story reached.");
                break;
            }
        }
    }

    // --- 7. Report the Gallery & Shut Down ---
    for story in session.saved_stories().await {
        info!(
            "Gallery: \"{}\" ({} pages, created {})",
            story.title,
            story.pages.len(),
            story.created_at
        );
    }
    session.end_session().await;
    info!("Session closed.");

    Ok(())
}
