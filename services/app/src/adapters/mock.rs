//! services/app/src/adapters/mock.rs
//!
//! This module contains the local mock story generator. It implements the
//! `StoryGenerationService` port so the engine can treat it like any other
//! generator, but it never fails: the fallback path calls `synthesize`
//! directly and gets a story unconditionally.

use std::sync::Arc;

use async_trait::async_trait;
use storybook_core::domain::{Story, StoryPage, StoryRequest, StoryTheme};
use storybook_core::ports::{Clock, IdProvider, PortResult, StoryGenerationService};

/// Cover used for locally synthesized stories and for backend stories that
/// arrive without any illustration.
pub(crate) const STOCK_COVER_IMAGE: &str = "https://images.unsplash.com/photo-1533561304446-88a43deb6229?crop=entropy&cs=srgb&fm=jpg&q=85&w=600&h=400";

/// Placeholder illustration used on every mock page. There is no per-page
/// variation.
const PLACEHOLDER_PAGE_IMAGE: &str = "https://images.unsplash.com/photo-1519791883288-dc8bd696e667?crop=entropy&cs=srgb&fm=jpg&q=85&w=400&h=300";

/// A generator that synthesizes a complete story locally from a fixed
/// template. Deterministic given identical inputs and pinned id/time sources.
pub struct MockStoryAdapter {
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdProvider>,
}

impl MockStoryAdapter {
    /// Creates a new `MockStoryAdapter`.
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdProvider>) -> Self {
        Self { clock, ids }
    }

    /// Builds a story for the request. Infallible.
    pub fn synthesize(&self, request: &StoryRequest) -> Story {
        let label = StoryTheme::from_id(&request.topic)
            .map(|theme| theme.label())
            .unwrap_or(&request.topic);
        let subject = request.subject();

        let pages = (0..usize::from(request.pages))
            .map(|index| StoryPage {
                index,
                text: format!(
                    "Once upon a time, {} embarked on a magical {} adventure. \
                     This brave little explorer discovered wonderful things in \
                     this enchanted world full of wonder and excitement.",
                    subject, label
                ),
                image: PLACEHOLDER_PAGE_IMAGE.to_string(),
            })
            .collect();

        Story {
            id: self.ids.new_id(),
            title: format!("{} and the {}", subject, label),
            cover_image: STOCK_COVER_IMAGE.to_string(),
            pages,
            created_at: self.clock.now(),
        }
    }
}

#[async_trait]
impl StoryGenerationService for MockStoryAdapter {
    async fn generate_story(&self, request: &StoryRequest) -> PortResult<Story> {
        Ok(self.synthesize(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use storybook_core::domain::FormState;

    struct StaticIds;

    impl IdProvider for StaticIds {
        fn new_id(&self) -> String {
            "story-1".to_string()
        }
    }

    fn adapter() -> MockStoryAdapter {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        MockStoryAdapter::new(Arc::new(ManualClock::new(start)), Arc::new(StaticIds))
    }

    fn request(pages: u8) -> StoryRequest {
        let form = FormState {
            character_description: "Pip the fox".to_string(),
            page_count: pages,
            theme: StoryTheme::Space,
            ..FormState::default()
        };
        StoryRequest::from_form(&form).unwrap()
    }

    #[test]
    fn produces_exactly_the_requested_page_count() {
        let story = adapter().synthesize(&request(8));

        assert_eq!(story.pages.len(), 8);
        for (i, page) in story.pages.iter().enumerate() {
            assert_eq!(page.index, i);
            assert!(!page.text.is_empty());
            assert!(!page.image.is_empty());
        }
    }

    #[test]
    fn titles_the_story_after_the_subject_and_theme() {
        let story = adapter().synthesize(&request(3));

        assert_eq!(story.title, "Pip the fox and the Space Adventure");
        assert!(story.pages[0].text.contains("Pip the fox"));
        assert!(story.pages[0].text.contains("Space Adventure"));
    }

    #[test]
    fn is_deterministic_with_pinned_id_and_time() {
        let adapter = adapter();
        let request = request(5);

        assert_eq!(adapter.synthesize(&request), adapter.synthesize(&request));
    }

    #[test]
    fn falls_back_to_the_raw_topic_for_unknown_themes() {
        let mut request = request(3);
        request.topic = "pirates".to_string();

        let story = adapter().synthesize(&request);
        assert_eq!(story.title, "Pip the fox and the pirates");
    }
}
