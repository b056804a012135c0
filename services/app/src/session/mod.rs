pub mod events;
pub mod form;
pub mod gallery;
pub mod generation;
pub mod notifications;
pub mod reader;
pub mod reader_task;
pub mod state;

// Re-export the session coordinator and its message types to make them
// easily accessible to the binary and to embedding UIs.
pub use events::{FormEdit, SessionEvent};
pub use state::{AppState, StorySession, SubmitOutcome};
