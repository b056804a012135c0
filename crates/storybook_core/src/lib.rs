pub mod domain;
pub mod ports;

pub use domain::{
    FallbackReason, FormState, GenerationOutcome, IllustrationStyle, Language, Notification,
    PersistedFormRecord, Severity, Story, StoryPage, StoryRequest, StoryTheme, ValidationError,
};
pub use ports::{Clock, IdProvider, KeyValueStore, PortError, PortResult, StoryGenerationService};
