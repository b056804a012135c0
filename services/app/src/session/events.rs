//! services/app/src/session/events.rs
//!
//! Defines the message surface between the UI layer and the engine: the form
//! edits the UI sends in, and the session events the engine emits back.

use serde::{Deserialize, Serialize};
use storybook_core::domain::{
    FallbackReason, IllustrationStyle, Language, StoryTheme, AGE_RANGE, PAGE_COUNT_RANGE,
};

//=========================================================================================
// Messages Sent FROM the UI TO the Engine
//=========================================================================================

/// A single form field edit. Applying an edit mutates the form state and
/// schedules a debounced save.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEdit {
    SetAge { age: u8 },
    SetTheme { theme: StoryTheme },
    SetCharacterDescription { text: String },
    SetPageCount { pages: u8 },
    SetLanguage { language: Language },
    SetIllustrationStyle { style: IllustrationStyle },
    SetMoralLesson { text: String },
    SetApiKey { key: String },
}

impl FormEdit {
    /// Numeric edits are clamped to their legal ranges rather than rejected.
    pub(crate) fn clamped(self) -> FormEdit {
        match self {
            FormEdit::SetAge { age } => FormEdit::SetAge {
                age: age.clamp(*AGE_RANGE.start(), *AGE_RANGE.end()),
            },
            FormEdit::SetPageCount { pages } => FormEdit::SetPageCount {
                pages: pages.clamp(*PAGE_COUNT_RANGE.start(), *PAGE_COUNT_RANGE.end()),
            },
            other => other,
        }
    }
}

//=========================================================================================
// Messages Sent FROM the Engine TO the UI
//=========================================================================================

/// Events the engine emits while a session runs. Status toasts travel through
/// the notification queue instead; these carry the reader and generation
/// signals the UI reacts to structurally.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new story became current (generated or selected from the gallery).
    StoryReady { story_id: String },

    /// The last submission was answered with a locally synthesized story.
    FallbackUsed { reason: FallbackReason },

    /// Auto-advance ran off the end of the story and switched itself off.
    /// Fired exactly once per run.
    EndOfStory { story_id: String },

    /// The reader dwelled on the last page long enough to reveal the
    /// end-of-story actions. Only fired for manually reached last pages.
    EndActionsRevealed { story_id: String },
}
