//! crates/storybook_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage backend or transport.

use std::ops::RangeInclusive;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Valid range for the child's age selector.
pub const AGE_RANGE: RangeInclusive<u8> = 1..=12;
/// Valid range for the number of story pages.
pub const PAGE_COUNT_RANGE: RangeInclusive<u8> = 3..=15;

//=========================================================================================
// Form Vocabulary (themes, languages, illustration styles)
//=========================================================================================

/// The six story themes offered by the creation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryTheme {
    Space,
    Underwater,
    Jungle,
    Fairy,
    Dragon,
    Unicorn,
}

impl StoryTheme {
    /// The stable identifier used on the wire and in persisted form state.
    pub fn id(&self) -> &'static str {
        match self {
            StoryTheme::Space => "space",
            StoryTheme::Underwater => "underwater",
            StoryTheme::Jungle => "jungle",
            StoryTheme::Fairy => "fairy",
            StoryTheme::Dragon => "dragon",
            StoryTheme::Unicorn => "unicorn",
        }
    }

    /// The display label used in story titles and page text.
    pub fn label(&self) -> &'static str {
        match self {
            StoryTheme::Space => "Space Adventure",
            StoryTheme::Underwater => "Underwater Quest",
            StoryTheme::Jungle => "Jungle Explorer",
            StoryTheme::Fairy => "Fairy Tale Magic",
            StoryTheme::Dragon => "Dragon Friend",
            StoryTheme::Unicorn => "Unicorn Dreams",
        }
    }

    pub fn from_id(id: &str) -> Option<StoryTheme> {
        match id {
            "space" => Some(StoryTheme::Space),
            "underwater" => Some(StoryTheme::Underwater),
            "jungle" => Some(StoryTheme::Jungle),
            "fairy" => Some(StoryTheme::Fairy),
            "dragon" => Some(StoryTheme::Dragon),
            "unicorn" => Some(StoryTheme::Unicorn),
            _ => None,
        }
    }
}

impl Default for StoryTheme {
    fn default() -> Self {
        StoryTheme::Fairy
    }
}

/// Languages the backend can write stories in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Spanish,
    French,
    German,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

/// Illustration styles the backend can render pages in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IllustrationStyle {
    ClassicCartoon,
    Watercolor,
    PixelArt,
    Sketchbook,
}

impl IllustrationStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            IllustrationStyle::ClassicCartoon => "Classic Cartoon Style",
            IllustrationStyle::Watercolor => "Watercolor",
            IllustrationStyle::PixelArt => "Pixel Art",
            IllustrationStyle::Sketchbook => "Sketchbook",
        }
    }
}

impl Default for IllustrationStyle {
    fn default() -> Self {
        IllustrationStyle::ClassicCartoon
    }
}

//=========================================================================================
// Form State and Persistence Record
//=========================================================================================

/// The complete state of the story creation form.
///
/// Every field carries a serde default so that records persisted by an older
/// build (with fewer fields) still deserialize and are merged over defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
    pub age: u8,
    pub theme: StoryTheme,
    pub character_description: String,
    pub page_count: u8,
    pub language: Language,
    pub illustration_style: IllustrationStyle,
    pub moral_lesson: String,
    pub api_key: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            age: 5,
            theme: StoryTheme::default(),
            character_description: String::new(),
            page_count: 5,
            language: Language::default(),
            illustration_style: IllustrationStyle::default(),
            moral_lesson: String::new(),
            api_key: String::new(),
        }
    }
}

impl FormState {
    /// Whether the form holds anything worth persisting. An all-default form
    /// (no API key, no character description) is never written to storage.
    pub fn has_meaningful_content(&self) -> bool {
        !self.api_key.is_empty() || !self.character_description.is_empty()
    }
}

/// A `FormState` as written to session storage, stamped with the save time so
/// stale records can be purged on the next read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedFormRecord {
    #[serde(flatten)]
    pub form: FormState,
    pub saved_at: DateTime<Utc>,
}

//=========================================================================================
// Story Request (the wire-shaped submission snapshot)
//=========================================================================================

/// Raised when a form fails the one submission-blocking check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("a character description is required to create a story")]
    EmptyCharacterDescription,
}

/// An immutable snapshot of a submitted form, shaped for the generation
/// backend. Built fresh per submission and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryRequest {
    pub short_description: String,
    pub pages: u8,
    pub age: String,
    pub topic: String,
    pub language: String,
    pub illustration_style: String,
    #[serde(rename = "openai_api_key")]
    pub api_key: Option<String>,
}

impl StoryRequest {
    /// Maps the form fields to the backend schema.
    ///
    /// The character description is required; when a moral lesson is present
    /// it is folded into the description as a trailing clause.
    pub fn from_form(form: &FormState) -> Result<StoryRequest, ValidationError> {
        let description = form.character_description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyCharacterDescription);
        }

        let lesson = form.moral_lesson.trim();
        let short_description = if lesson.is_empty() {
            description.to_string()
        } else {
            format!("{} The story teaches about {}.", description, lesson)
        };

        let api_key = match form.api_key.trim() {
            "" => None,
            key => Some(key.to_string()),
        };

        Ok(StoryRequest {
            short_description,
            pages: form.page_count,
            age: form.age.to_string(),
            topic: form.theme.id().to_string(),
            language: form.language.as_str().to_string(),
            illustration_style: form.illustration_style.as_str().to_string(),
            api_key,
        })
    }

    /// The character description portion of the request, without the folded
    /// moral lesson clause.
    pub fn subject(&self) -> &str {
        match self.short_description.find(" The story teaches about ") {
            Some(idx) => &self.short_description[..idx],
            None => &self.short_description,
        }
    }
}

//=========================================================================================
// Stories
//=========================================================================================

/// A single page of a generated story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPage {
    pub index: usize,
    pub text: String,
    pub image: String,
}

/// A generated story. Created atomically by the backend mapping step or by
/// the local mock generator, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub cover_image: String,
    pub pages: Vec<StoryPage>,
    pub created_at: DateTime<Utc>,
}

impl Story {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

//=========================================================================================
// Generation Outcomes and Notifications
//=========================================================================================

/// Why a submission was answered with a locally synthesized story instead of
/// (or in spite of) the backend result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No API key was provided.
    NoApiKey,
    /// An API key was provided but does not look like one (`sk-` prefix).
    InvalidApiKey,
    /// The backend call failed: transport error, non-2xx, or a malformed body.
    BackendError,
}

/// The single result of one submission attempt. Exactly one variant is
/// produced per attempt; no generation-path failure escapes this type.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Success(Story),
    Fallback {
        story: Story,
        reason: FallbackReason,
    },
}

impl GenerationOutcome {
    pub fn story(&self) -> &Story {
        match self {
            GenerationOutcome::Success(story) => story,
            GenerationOutcome::Fallback { story, .. } => story,
        }
    }

    pub fn into_story(self) -> Story {
        match self {
            GenerationOutcome::Success(story) => story,
            GenerationOutcome::Fallback { story, .. } => story,
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            GenerationOutcome::Success(_) => None,
            GenerationOutcome::Fallback { reason, .. } => Some(*reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient status message for the user. At most one is active at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub ttl: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            severity,
            ttl,
        }
    }

    /// The status toast shown when a submission fell back to a local story.
    /// A successful generation produces no notification.
    pub fn for_fallback(reason: FallbackReason, ttl: Duration) -> Notification {
        match reason {
            FallbackReason::NoApiKey => Notification::new(
                "No API key provided, so we created a sample story for you.",
                Severity::Info,
                ttl,
            ),
            FallbackReason::InvalidApiKey => Notification::new(
                "Your API key doesn't look right (it should start with \"sk-\"), \
                 so we created a sample story instead.",
                Severity::Warning,
                ttl,
            ),
            FallbackReason::BackendError => Notification::new(
                "The story service couldn't be reached, so we created a sample story for you.",
                Severity::Warning,
                ttl,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> FormState {
        FormState {
            character_description: "a brave little fox named Pip".to_string(),
            ..FormState::default()
        }
    }

    #[test]
    fn request_maps_form_fields() {
        let mut form = filled_form();
        form.age = 7;
        form.theme = StoryTheme::Dragon;
        form.page_count = 8;

        let request = StoryRequest::from_form(&form).unwrap();

        assert_eq!(request.pages, 8);
        assert_eq!(request.age, "7");
        assert_eq!(request.topic, "dragon");
        assert_eq!(request.language, "English");
        assert_eq!(request.illustration_style, "Classic Cartoon Style");
        assert_eq!(request.api_key, None);
    }

    #[test]
    fn request_folds_moral_lesson_into_description() {
        let mut form = filled_form();
        form.moral_lesson = "  sharing  ".to_string();

        let request = StoryRequest::from_form(&form).unwrap();

        assert_eq!(
            request.short_description,
            "a brave little fox named Pip The story teaches about sharing."
        );
        assert_eq!(request.subject(), "a brave little fox named Pip");
    }

    #[test]
    fn request_requires_a_character_description() {
        let mut form = FormState::default();
        form.character_description = "   ".to_string();

        assert_eq!(
            StoryRequest::from_form(&form),
            Err(ValidationError::EmptyCharacterDescription)
        );
    }

    #[test]
    fn blank_api_key_serializes_as_null() {
        let request = StoryRequest::from_form(&filled_form()).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["openai_api_key"], serde_json::Value::Null);
        assert_eq!(json["pages"], 5);
    }

    #[test]
    fn persisted_record_keeps_form_fields_at_the_top_level() {
        let record = PersistedFormRecord {
            form: filled_form(),
            saved_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["character_description"], "a brave little fox named Pip");
        assert!(json.get("saved_at").is_some());

        let back: PersistedFormRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.form, record.form);
    }

    #[test]
    fn unknown_persisted_fields_fall_back_to_defaults() {
        // A record written before a field existed still restores.
        let json = serde_json::json!({
            "character_description": "Pip",
            "saved_at": "2026-01-01T00:00:00Z"
        });

        let record: PersistedFormRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.form.age, 5);
        assert_eq!(record.form.theme, StoryTheme::Fairy);
        assert_eq!(record.form.character_description, "Pip");
    }
}
