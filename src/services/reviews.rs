//! Product ratings and reviews.

use serde::Serialize;
use sqlx::SqlitePool;

use super::session::Session;
use crate::domain::aggregates::ProductId;
use crate::domain::value_objects::Rating;
use crate::store::ratings::{RatingSummary, Review};
use crate::store::{ProductRepository, RatingRepository};
use crate::{Result, StorefrontError};

pub const MAX_REVIEW_LEN: usize = 2000;

#[derive(Debug, Clone, Serialize)]
pub struct ProductReviews {
    pub product_id: ProductId,
    pub summary: RatingSummary,
    pub reviews: Vec<Review>,
}

#[derive(Clone)]
pub struct ReviewService {
    pool: SqlitePool,
}

impl ReviewService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_product(&self, product_id: ProductId) -> Result<()> {
        match ProductRepository::new(&self.pool).get(product_id).await? {
            Some(_) => Ok(()),
            None => Err(StorefrontError::not_found("product", product_id)),
        }
    }

    /// Appends a rating; a user may rate the same product more than once.
    #[tracing::instrument(skip(self, session, review), fields(user_id = session.user_id))]
    pub async fn rate_product(&self, session: &Session, product_id: ProductId, rating: u8, review: &str) -> Result<Review> {
        let rating = Rating::new(rating)?;
        let review = review.trim();
        if review.chars().count() > MAX_REVIEW_LEN {
            return Err(StorefrontError::validation(format!("review exceeds {MAX_REVIEW_LEN} characters")));
        }
        self.ensure_product(product_id).await?;
        let created_at = RatingRepository::new(&self.pool).insert(session.user_id, product_id, rating, review).await?;
        tracing::info!(product_id, rating = rating.value(), "product rated");
        Ok(Review { username: session.username.clone(), rating, review: review.to_string(), created_at })
    }

    pub async fn product_reviews(&self, product_id: ProductId) -> Result<ProductReviews> {
        self.ensure_product(product_id).await?;
        let repo = RatingRepository::new(&self.pool);
        Ok(ProductReviews { product_id, summary: repo.summary(product_id).await?, reviews: repo.for_product(product_id).await? })
    }
}
