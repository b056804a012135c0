//! services/app/src/session/form.rs
//!
//! Session-persisted form state: the expiring persistence layer over the
//! key-value port, and the controller that applies edits and coalesces the
//! resulting writes behind a debounce timer.

use std::sync::Arc;
use std::time::Duration;

use storybook_core::domain::{FormState, PersistedFormRecord};
use storybook_core::ports::{Clock, KeyValueStore, PortError, PortResult};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::session::events::FormEdit;

/// The single well-known storage key for the in-progress form.
pub const FORM_DATA_KEY: &str = "storybook_form_data";

//=========================================================================================
// FormPersistence
//=========================================================================================

/// Saves, restores and clears the form record, enforcing the retention
/// window. Side effects are confined to the underlying store.
pub struct FormPersistence {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    retention: chrono::Duration,
}

impl FormPersistence {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        retention: chrono::Duration,
    ) -> Self {
        Self {
            store,
            clock,
            retention,
        }
    }

    /// Writes the form stamped with the current time. Persisting an
    /// all-default form is skipped so storage only ever holds something the
    /// user actually typed.
    pub async fn save(&self, form: &FormState) -> PortResult<()> {
        if !form.has_meaningful_content() {
            return Ok(());
        }

        let record = PersistedFormRecord {
            form: form.clone(),
            saved_at: self.clock.now(),
        };
        let blob =
            serde_json::to_string(&record).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.put(FORM_DATA_KEY, &blob).await
    }

    /// Reads the persisted form, if any. Records older than the retention
    /// window (and records that no longer parse) are purged and treated as
    /// absent. Missing fields in surviving records fall back to defaults.
    pub async fn load(&self) -> PortResult<Option<FormState>> {
        let Some(blob) = self.store.get(FORM_DATA_KEY).await? else {
            return Ok(None);
        };

        let record: PersistedFormRecord = match serde_json::from_str(&blob) {
            Ok(record) => record,
            Err(e) => {
                warn!("Discarding unreadable form record: {}", e);
                self.clear().await?;
                return Ok(None);
            }
        };

        if self.clock.now() - record.saved_at > self.retention {
            info!("Persisted form expired; purging it.");
            self.clear().await?;
            return Ok(None);
        }

        Ok(Some(record.form))
    }

    /// Removes the record unconditionally. Invoked when the session ends so
    /// form data never survives past the session boundary.
    pub async fn clear(&self) -> PortResult<()> {
        self.store.remove(FORM_DATA_KEY).await
    }
}

//=========================================================================================
// FormController
//=========================================================================================

/// Owns the live `FormState`, applies edits, and schedules a debounced save
/// after each one. Rapid edits coalesce: every edit cancels the pending save
/// timer before starting a new one, so the store sees at most one write per
/// quiet period.
pub struct FormController {
    form: FormState,
    persistence: Arc<FormPersistence>,
    debounce: Duration,
    pending_save: Option<CancellationToken>,
}

impl FormController {
    /// Restores the form from storage (merged over defaults) or starts from
    /// defaults when nothing usable is persisted.
    pub async fn restore(persistence: Arc<FormPersistence>, debounce: Duration) -> Self {
        let form = match persistence.load().await {
            Ok(Some(form)) => {
                info!("Restored a persisted form.");
                form
            }
            Ok(None) => FormState::default(),
            Err(e) => {
                warn!("Failed to load the persisted form: {}", e);
                FormState::default()
            }
        };

        Self {
            form,
            persistence,
            debounce,
            pending_save: None,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Applies one field edit and schedules the debounced save.
    pub fn apply(&mut self, edit: FormEdit) {
        match edit.clamped() {
            FormEdit::SetAge { age } => self.form.age = age,
            FormEdit::SetTheme { theme } => self.form.theme = theme,
            FormEdit::SetCharacterDescription { text } => self.form.character_description = text,
            FormEdit::SetPageCount { pages } => self.form.page_count = pages,
            FormEdit::SetLanguage { language } => self.form.language = language,
            FormEdit::SetIllustrationStyle { style } => self.form.illustration_style = style,
            FormEdit::SetMoralLesson { text } => self.form.moral_lesson = text,
            FormEdit::SetApiKey { key } => self.form.api_key = key,
        }
        self.schedule_save();
    }

    fn schedule_save(&mut self) {
        // Cancel the previous timer before starting a new one.
        if let Some(token) = self.pending_save.take() {
            token.cancel();
        }

        let token = CancellationToken::new();
        self.pending_save = Some(token.clone());

        let persistence = self.persistence.clone();
        let form = self.form.clone();
        let quiet = self.debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(quiet) => {
                    if let Err(e) = persistence.save(&form).await {
                        warn!("Failed to persist form state: {}", e);
                    }
                }
            }
        });
    }

    /// Cancels any pending save. Used on teardown.
    pub fn cancel_pending_save(&mut self) {
        if let Some(token) = self.pending_save.take() {
            token.cancel();
        }
    }
}

impl Drop for FormController {
    fn drop(&mut self) {
        self.cancel_pending_save();
    }
}
