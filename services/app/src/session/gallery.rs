//! services/app/src/session/gallery.rs
//!
//! The saved-story gallery: an insertion-ordered collection of every story
//! generated or imported this far, most recent first. The whole list lives
//! under one storage key, loaded at startup and rewritten on every change.

use std::sync::Arc;

use storybook_core::domain::Story;
use storybook_core::ports::{KeyValueStore, PortError, PortResult};
use tokio::sync::RwLock;
use tracing::warn;

/// The single well-known storage key for the gallery.
pub const GALLERY_KEY: &str = "storybook_gallery";

/// Manages the saved stories.
#[derive(Clone)]
pub struct GalleryStore {
    inner: Arc<GalleryInner>,
}

struct GalleryInner {
    store: Arc<dyn KeyValueStore>,
    /// Most-recent-first.
    stories: RwLock<Vec<Story>>,
}

impl GalleryStore {
    /// Loads the gallery from storage. A missing or unreadable record starts
    /// an empty gallery rather than failing the session.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let stories = match store.get(GALLERY_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<Story>>(&blob) {
                Ok(stories) => stories,
                Err(e) => {
                    warn!("Discarding unreadable gallery record: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to load the gallery: {}", e);
                Vec::new()
            }
        };

        Self {
            inner: Arc::new(GalleryInner {
                store,
                stories: RwLock::new(stories),
            }),
        }
    }

    /// Prepends a story and rewrites the persisted list.
    pub async fn add(&self, story: Story) -> PortResult<()> {
        let mut stories = self.inner.stories.write().await;
        stories.insert(0, story);
        self.persist(&stories).await
    }

    /// Removes a story by id. Returns whether anything was removed.
    pub async fn remove(&self, story_id: &str) -> PortResult<bool> {
        let mut stories = self.inner.stories.write().await;
        let before = stories.len();
        stories.retain(|story| story.id != story_id);
        if stories.len() == before {
            return Ok(false);
        }
        self.persist(&stories).await?;
        Ok(true)
    }

    pub async fn get(&self, story_id: &str) -> Option<Story> {
        self.inner
            .stories
            .read()
            .await
            .iter()
            .find(|story| story.id == story_id)
            .cloned()
    }

    pub async fn stories(&self) -> Vec<Story> {
        self.inner.stories.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.stories.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.stories.read().await.is_empty()
    }

    async fn persist(&self, stories: &[Story]) -> PortResult<()> {
        let blob =
            serde_json::to_string(stories).map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.inner.store.put(GALLERY_KEY, &blob).await
    }
}
