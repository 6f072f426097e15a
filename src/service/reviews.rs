//! Peer reviews on member profiles.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{MemberId, Review, ReviewSummary, ReviewView};
use crate::error::ClubError;
use crate::store::ClubStore;

/// Accepts and lists reviews members write about each other.
#[derive(Debug, Clone)]
pub struct ReviewService {
    store: Arc<dyn ClubStore>,
}

impl ReviewService {
    /// Creates the service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ClubStore>) -> Self {
        Self { store }
    }

    /// Submits a review of `target_id` written by `reviewer_id`.
    ///
    /// # Errors
    ///
    /// - [`ClubError::Unauthenticated`] if the reviewer is not a member
    /// - [`ClubError::Validation`] for a self-review, out-of-range rating,
    ///   or blank comment
    /// - [`ClubError::NotFound`] if the target does not exist
    pub async fn submit(
        &self,
        reviewer_id: MemberId,
        target_id: MemberId,
        rating: u8,
        comment: &str,
    ) -> Result<Review, ClubError> {
        if self.store.member(reviewer_id).await?.is_none() {
            return Err(ClubError::Unauthenticated(format!(
                "actor {reviewer_id} is not a member"
            )));
        }
        let review = Review::new(reviewer_id, target_id, rating, comment)?;
        let review = self.store.insert_review(review).await?;
        tracing::info!(%reviewer_id, %target_id, rating, "review submitted");
        Ok(review)
    }

    /// Lists reviews of `target_id`, newest first, with reviewer names.
    ///
    /// # Errors
    ///
    /// Only storage failures are reported.
    pub async fn list(&self, target_id: MemberId) -> Result<Vec<ReviewView>, ClubError> {
        let reviews = self.store.reviews_for(target_id).await?;
        let reviewer_ids: Vec<MemberId> = reviews.iter().map(|r| r.reviewer_id).collect();
        let names: HashMap<MemberId, String> = self
            .store
            .members(&reviewer_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m.display_name().to_string()))
            .collect();

        Ok(reviews
            .into_iter()
            .map(|review| {
                let reviewer_name = names
                    .get(&review.reviewer_id)
                    .cloned()
                    .unwrap_or_else(|| review.reviewer_id.to_string());
                ReviewView {
                    review,
                    reviewer_name,
                }
            })
            .collect())
    }

    /// Count and mean rating of reviews about `target_id`.
    ///
    /// # Errors
    ///
    /// Only storage failures are reported.
    pub async fn summary(&self, target_id: MemberId) -> Result<ReviewSummary, ClubError> {
        let reviews = self.store.reviews_for(target_id).await?;
        Ok(ReviewSummary::of(&reviews))
    }
}
