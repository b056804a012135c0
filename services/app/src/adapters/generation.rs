//! services/app/src/adapters/generation.rs
//!
//! This module contains the HTTP adapter for the story generation backend.
//! It implements the `StoryGenerationService` port from the `core` crate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use storybook_core::domain::{Story, StoryPage, StoryRequest};
use storybook_core::ports::{Clock, IdProvider, PortError, PortResult, StoryGenerationService};

use crate::adapters::mock::STOCK_COVER_IMAGE;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `StoryGenerationService` against the REST
/// backend's `POST /storybook/get_stories` endpoint.
#[derive(Clone)]
pub struct HttpGenerationAdapter {
    http: reqwest::Client,
    base_url: String,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdProvider>,
}

impl HttpGenerationAdapter {
    /// Creates a new `HttpGenerationAdapter`.
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            http,
            base_url,
            clock,
            ids,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/storybook/get_stories",
            self.base_url.trim_end_matches('/')
        )
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
struct StoryBookResponse {
    story_title: String,
    story_book: Vec<StoryPageRecord>,
}

#[derive(Deserialize)]
struct StoryPageRecord {
    page: u32,
    story_text: String,
    #[serde(default)]
    illustration_path: String,
}

impl StoryBookResponse {
    /// Maps the wire records to a domain `Story`.
    ///
    /// Pages are ordered by their wire page number and re-indexed from zero.
    /// The wire carries neither an id, a creation time, nor a cover, so the
    /// id and timestamp are minted here and the first illustration doubles
    /// as the cover.
    fn to_domain(mut self, id: String, created_at: DateTime<Utc>) -> PortResult<Story> {
        if self.story_book.is_empty() {
            return Err(PortError::Backend(
                "backend returned a story with no pages".to_string(),
            ));
        }

        self.story_book.sort_by_key(|record| record.page);

        let cover_image = self
            .story_book
            .iter()
            .find(|record| !record.illustration_path.is_empty())
            .map(|record| record.illustration_path.clone())
            .unwrap_or_else(|| STOCK_COVER_IMAGE.to_string());

        let pages = self
            .story_book
            .into_iter()
            .enumerate()
            .map(|(index, record)| StoryPage {
                index,
                text: record.story_text,
                image: if record.illustration_path.is_empty() {
                    cover_image.clone()
                } else {
                    record.illustration_path
                },
            })
            .collect();

        Ok(Story {
            id,
            title: self.story_title,
            cover_image,
            pages,
            created_at,
        })
    }
}

//=========================================================================================
// `StoryGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl StoryGenerationService for HttpGenerationAdapter {
    /// Submits the request to the backend and maps the response into a `Story`.
    async fn generate_story(&self, request: &StoryRequest) -> PortResult<Story> {
        let response = self
            .http
            .post(self.endpoint())
            .json(request)
            .send()
            .await
            .map_err(|e| PortError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Backend(format!(
                "backend responded with {}",
                status
            )));
        }

        let body: StoryBookResponse = response
            .json()
            .await
            .map_err(|e| PortError::Backend(e.to_string()))?;

        body.to_domain(self.ids.new_id(), self.clock.now())
    }
}
