//! services/app/src/session/generation.rs
//!
//! The submission path: classify the provided API key, build the request,
//! call the backend, and fall back to the local generator when the call
//! cannot be completed or trusted. Every submission attempt resolves to
//! exactly one `GenerationOutcome`; the only error that escapes is the
//! pre-flight validation failure, which blocks the submission entirely.

use std::sync::Arc;

use storybook_core::domain::{
    FallbackReason, FormState, GenerationOutcome, StoryRequest, ValidationError,
};
use storybook_core::ports::StoryGenerationService;
use tracing::{info, warn};

use crate::adapters::mock::MockStoryAdapter;

/// Well-formed API keys carry this prefix. Anything else is flagged, even if
/// the backend happens to answer anyway.
const API_KEY_PREFIX: &str = "sk-";

/// Pre-flight key classification, run before any network traffic.
fn classify_api_key(key: &str) -> Option<FallbackReason> {
    let key = key.trim();
    if key.is_empty() {
        Some(FallbackReason::NoApiKey)
    } else if !key.starts_with(API_KEY_PREFIX) {
        Some(FallbackReason::InvalidApiKey)
    } else {
        None
    }
}

/// Drives one submission attempt against the backend, with the mock
/// generator as the structured fallback.
pub struct GenerationClient {
    backend: Arc<dyn StoryGenerationService>,
    fallback: MockStoryAdapter,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn StoryGenerationService>, fallback: MockStoryAdapter) -> Self {
        Self { backend, fallback }
    }

    /// Generates a story for the submitted form.
    ///
    /// A malformed key downgrades even a successful backend call to a
    /// fallback outcome, so the user learns their key was not usable. A
    /// missing key does not: if the backend answered, its story stands.
    pub async fn generate(
        &self,
        form: &FormState,
    ) -> Result<GenerationOutcome, ValidationError> {
        let key_issue = classify_api_key(&form.api_key);
        let request = StoryRequest::from_form(form)?;

        match self.backend.generate_story(&request).await {
            Ok(story) => {
                if key_issue == Some(FallbackReason::InvalidApiKey) {
                    warn!("Backend call succeeded, but the provided API key is malformed.");
                    Ok(GenerationOutcome::Fallback {
                        story,
                        reason: FallbackReason::InvalidApiKey,
                    })
                } else {
                    info!("Story generated by the backend.");
                    Ok(GenerationOutcome::Success(story))
                }
            }
            Err(e) => {
                let reason = key_issue.unwrap_or(FallbackReason::BackendError);
                warn!(
                    "Story generation failed ({}); synthesizing a local story.",
                    e
                );
                Ok(GenerationOutcome::Fallback {
                    story: self.fallback.synthesize(&request),
                    reason,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storybook_core::domain::{Story, StoryPage};
    use storybook_core::ports::{IdProvider, PortError, PortResult};

    struct StaticIds;

    impl IdProvider for StaticIds {
        fn new_id(&self) -> String {
            "mock-story".to_string()
        }
    }

    /// A backend that answers with a canned story or fails, counting calls.
    struct FakeBackend {
        fails: bool,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn healthy() -> Self {
            Self {
                fails: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn broken() -> Self {
            Self {
                fails: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl StoryGenerationService for FakeBackend {
        async fn generate_story(&self, request: &StoryRequest) -> PortResult<Story> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                return Err(PortError::Backend("connection refused".to_string()));
            }
            Ok(Story {
                id: "backend-story".to_string(),
                title: "From the backend".to_string(),
                cover_image: "cover.png".to_string(),
                pages: vec![StoryPage {
                    index: 0,
                    text: format!("for {}", request.short_description),
                    image: "page.png".to_string(),
                }],
                created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            })
        }
    }

    fn client(backend: Arc<FakeBackend>) -> GenerationClient {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        ));
        GenerationClient::new(backend, MockStoryAdapter::new(clock, Arc::new(StaticIds)))
    }

    fn form(api_key: &str) -> FormState {
        FormState {
            character_description: "Mira".to_string(),
            api_key: api_key.to_string(),
            ..FormState::default()
        }
    }

    #[tokio::test]
    async fn well_formed_key_and_healthy_backend_is_a_success() {
        let outcome = client(Arc::new(FakeBackend::healthy()))
            .generate(&form("sk-valid"))
            .await
            .unwrap();

        assert!(matches!(outcome, GenerationOutcome::Success(_)));
        assert_eq!(outcome.story().id, "backend-story");
    }

    #[tokio::test]
    async fn blank_key_with_a_broken_backend_falls_back_for_the_missing_key() {
        let outcome = client(Arc::new(FakeBackend::broken()))
            .generate(&form(""))
            .await
            .unwrap();

        assert_eq!(outcome.fallback_reason(), Some(FallbackReason::NoApiKey));
        assert_eq!(outcome.story().id, "mock-story");
        assert_eq!(outcome.story().pages.len(), 5);
    }

    #[tokio::test]
    async fn blank_key_with_a_healthy_backend_still_counts_as_success() {
        let outcome = client(Arc::new(FakeBackend::healthy()))
            .generate(&form(""))
            .await
            .unwrap();

        assert!(matches!(outcome, GenerationOutcome::Success(_)));
    }

    #[tokio::test]
    async fn malformed_key_is_flagged_even_when_the_call_succeeds() {
        let outcome = client(Arc::new(FakeBackend::healthy()))
            .generate(&form("abc"))
            .await
            .unwrap();

        assert_eq!(
            outcome.fallback_reason(),
            Some(FallbackReason::InvalidApiKey)
        );
        // The backend's story is still used.
        assert_eq!(outcome.story().id, "backend-story");
    }

    #[tokio::test]
    async fn malformed_key_wins_over_a_transport_error() {
        let outcome = client(Arc::new(FakeBackend::broken()))
            .generate(&form("abc"))
            .await
            .unwrap();

        assert_eq!(
            outcome.fallback_reason(),
            Some(FallbackReason::InvalidApiKey)
        );
        assert_eq!(outcome.story().id, "mock-story");
    }

    #[tokio::test]
    async fn well_formed_key_with_a_broken_backend_is_a_transport_fallback() {
        let outcome = client(Arc::new(FakeBackend::broken()))
            .generate(&form("sk-valid"))
            .await
            .unwrap();

        assert_eq!(
            outcome.fallback_reason(),
            Some(FallbackReason::BackendError)
        );
    }

    #[tokio::test]
    async fn validation_failure_blocks_the_submission_without_a_network_call() {
        let backend = Arc::new(FakeBackend::healthy());
        let client = client(backend.clone());

        let mut empty = form("sk-valid");
        empty.character_description = "  ".to_string();

        assert_eq!(
            client.generate(&empty).await,
            Err(ValidationError::EmptyCharacterDescription)
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }
}
