//! services/app/src/session/reader.rs
//!
//! The paginated reader: a small state machine over the ordered pages of the
//! current story. Timer-driven behavior (auto-advance, the end-actions
//! dwell) lives in `reader_task`; this type is pure state.

use storybook_core::domain::{Story, StoryPage};

/// Raised when a caller asks for a page that does not exist. Normal UI
/// interaction never produces this; treat it as a defect if it surfaces.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReaderError {
    #[error("page index {index} is out of range for a {page_count}-page story")]
    OutOfRange { index: usize, page_count: usize },
}

/// The reader's cursor over one story's pages.
///
/// Invariant: `page_index` is always a valid index into `pages`, which is
/// never empty.
#[derive(Debug)]
pub struct ReaderState {
    story_id: String,
    pages: Vec<StoryPage>,
    page_index: usize,
    auto_advancing: bool,
}

impl ReaderState {
    pub fn new(story: &Story) -> Self {
        Self {
            story_id: story.id.clone(),
            pages: story.pages.clone(),
            page_index: 0,
            auto_advancing: false,
        }
    }

    pub fn story_id(&self) -> &str {
        &self.story_id
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> &StoryPage {
        &self.pages[self.page_index]
    }

    pub fn is_last_page(&self) -> bool {
        self.page_index == self.pages.len() - 1
    }

    pub fn auto_advancing(&self) -> bool {
        self.auto_advancing
    }

    pub(crate) fn set_auto_advancing(&mut self, on: bool) {
        self.auto_advancing = on;
    }

    /// Moves forward one page. A no-op on the last page; returns whether the
    /// cursor moved.
    pub fn next(&mut self) -> bool {
        if self.page_index < self.pages.len() - 1 {
            self.page_index += 1;
            true
        } else {
            false
        }
    }

    /// Moves back one page. A no-op on the first page; returns whether the
    /// cursor moved.
    pub fn prev(&mut self) -> bool {
        if self.page_index > 0 {
            self.page_index -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps straight to a page (the page-indicator dots).
    pub fn jump_to(&mut self, index: usize) -> Result<(), ReaderError> {
        if index >= self.pages.len() {
            return Err(ReaderError::OutOfRange {
                index,
                page_count: self.pages.len(),
            });
        }
        self.page_index = index;
        Ok(())
    }

    /// Replaces the pages wholesale for a new story and rewinds the cursor.
    /// Auto-advance is switched off; the owner is responsible for cancelling
    /// its timer.
    pub fn reset(&mut self, story: &Story) {
        self.story_id = story.id.clone();
        self.pages = story.pages.clone();
        self.page_index = 0;
        self.auto_advancing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn story(pages: usize) -> Story {
        Story {
            id: "s-1".to_string(),
            title: "Test story".to_string(),
            cover_image: "cover.png".to_string(),
            pages: (0..pages)
                .map(|index| StoryPage {
                    index,
                    text: format!("page {}", index),
                    image: "page.png".to_string(),
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn prev_on_the_first_page_is_a_no_op() {
        let mut reader = ReaderState::new(&story(5));

        assert!(!reader.prev());
        assert_eq!(reader.page_index(), 0);
    }

    #[test]
    fn next_clamps_at_the_last_page() {
        let mut reader = ReaderState::new(&story(5));

        for _ in 0..4 {
            assert!(reader.next());
        }
        assert!(!reader.next());
        assert_eq!(reader.page_index(), 4);
        assert!(reader.is_last_page());
    }

    #[test]
    fn jump_to_rejects_out_of_range_indices() {
        let mut reader = ReaderState::new(&story(5));

        assert_eq!(
            reader.jump_to(10),
            Err(ReaderError::OutOfRange {
                index: 10,
                page_count: 5
            })
        );
        assert_eq!(reader.page_index(), 0);

        assert_eq!(reader.jump_to(4), Ok(()));
        assert_eq!(reader.page_index(), 4);
    }

    #[test]
    fn reset_rewinds_to_the_new_story() {
        let mut reader = ReaderState::new(&story(5));
        reader.jump_to(3).unwrap();
        reader.set_auto_advancing(true);

        let mut replacement = story(3);
        replacement.id = "s-2".to_string();
        reader.reset(&replacement);

        assert_eq!(reader.story_id(), "s-2");
        assert_eq!(reader.page_index(), 0);
        assert_eq!(reader.page_count(), 3);
        assert!(!reader.auto_advancing());
    }
}
